use std::time::SystemTime;

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::format_system_time, theme::PresentationState};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE `event:` name, if any.
    pub event: Option<String>,
    /// SSE `data:` payload.
    pub data: String,
}

impl ServerEvent {
    /// Build an event from a raw data string.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether a theme is currently applied.
    pub themed: bool,
    /// Whether the theme controller has stopped.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a new scheme reaches the presentation layer.
pub struct ThemeAppliedEvent {
    /// Every theme variable keyed by role name, plus `primaryRgb`.
    #[schema(value_type = Object)]
    pub variables: IndexMap<String, String>,
    /// Title-bar accent for the current location.
    pub title_bar_accent: Option<String>,
    /// RFC 3339 timestamp.
    pub applied_at: String,
}

impl From<&PresentationState> for ThemeAppliedEvent {
    fn from(state: &PresentationState) -> Self {
        Self {
            variables: state.variables.clone(),
            title_bar_accent: state.title_bar_accent.clone(),
            applied_at: format_system_time(SystemTime::now()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when every theme variable has been cleared.
pub struct ThemeResetEvent {
    /// RFC 3339 timestamp.
    pub reset_at: String,
}

impl ThemeResetEvent {
    /// Reset event stamped with the current time.
    pub fn now() -> Self {
        Self {
            reset_at: format_system_time(SystemTime::now()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the title-bar accent changes with navigation.
pub struct TitleBarAccentEvent {
    /// Location the accent was computed for.
    pub location: String,
    /// New accent, absent without a theme.
    pub accent: Option<String>,
}
