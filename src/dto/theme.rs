use std::time::SystemTime;

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_system_time,
    theme::{ControllerStatus, PresentationState, ThemePhase},
};

/// Phase of the theme controller as exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ThemePhaseDto {
    /// No theme applied.
    Idle,
    /// A request is being computed.
    Loading,
    /// A theme is applied.
    Applied,
}

impl From<ThemePhase> for ThemePhaseDto {
    fn from(phase: ThemePhase) -> Self {
        match phase {
            ThemePhase::Idle => ThemePhaseDto::Idle,
            ThemePhase::Loading { .. } => ThemePhaseDto::Loading,
            ThemePhase::Applied { .. } => ThemePhaseDto::Applied,
        }
    }
}

/// Bookkeeping of the controller task.
#[derive(Debug, Serialize, ToSchema)]
pub struct ControllerStatusDto {
    /// Current phase.
    pub phase: ThemePhaseDto,
    /// Sequence number of the newest request.
    pub latest_seq: u64,
    /// Sequence number of the scheme on screen, if any.
    pub last_applied_seq: Option<u64>,
    /// Superseded results dropped so far.
    pub discarded: u64,
    /// Artwork decodes started so far.
    pub decode_runs: u64,
    /// Whether dark tones are selected.
    pub dark: bool,
}

impl From<ControllerStatus> for ControllerStatusDto {
    fn from(status: ControllerStatus) -> Self {
        Self {
            phase: status.phase.into(),
            latest_seq: status.latest_seq,
            last_applied_seq: status.last_applied_seq,
            discarded: status.discarded,
            decode_runs: status.decode_runs,
            dark: status.dark,
        }
    }
}

/// Snapshot returned by `GET /theme`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ThemeResponse {
    /// Every theme variable keyed by role name, plus `primaryRgb`. Empty strings when unthemed.
    #[schema(value_type = Object)]
    pub variables: IndexMap<String, String>,
    /// Title-bar accent for the current location.
    pub title_bar_accent: Option<String>,
    /// Navigation location last reported.
    pub location: String,
    /// Controller bookkeeping.
    pub controller: ControllerStatusDto,
    /// RFC 3339 timestamp of the snapshot.
    pub generated_at: String,
}

impl ThemeResponse {
    /// Combine the presentation snapshot with the controller status.
    pub fn new(presentation: PresentationState, status: ControllerStatus) -> Self {
        Self {
            variables: presentation.variables,
            title_bar_accent: presentation.title_bar_accent,
            location: presentation.location,
            controller: status.into(),
            generated_at: format_system_time(SystemTime::now()),
        }
    }
}
