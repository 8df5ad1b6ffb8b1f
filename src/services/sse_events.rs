use serde::Serialize;
use tracing::warn;

use crate::{
    dto::sse::{ServerEvent, ThemeAppliedEvent, ThemeResetEvent, TitleBarAccentEvent},
    state::SseHub,
    theme::PresentationState,
};

pub(crate) const EVENT_THEME_APPLIED: &str = "theme.applied";
pub(crate) const EVENT_THEME_RESET: &str = "theme.reset";
pub(crate) const EVENT_TITLE_BAR_ACCENT: &str = "title_bar.accent";

/// Broadcast the complete variable set of a freshly applied scheme.
pub fn broadcast_theme_applied(hub: &SseHub, state: &PresentationState) {
    send_event(hub, EVENT_THEME_APPLIED, &ThemeAppliedEvent::from(state));
}

/// Broadcast that every theme variable has been cleared.
pub fn broadcast_theme_reset(hub: &SseHub) {
    send_event(hub, EVENT_THEME_RESET, &ThemeResetEvent::now());
}

/// Broadcast the title-bar accent computed for a new navigation location.
pub fn broadcast_title_bar_accent(hub: &SseHub, location: &str, accent: Option<&str>) {
    let payload = TitleBarAccentEvent {
        location: location.to_string(),
        accent: accent.map(str::to_string),
    };
    send_event(hub, EVENT_TITLE_BAR_ACCENT, &payload);
}

fn send_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accent_event_carries_location_and_color() {
        let hub = SseHub::new(4);
        let mut receiver = hub.subscribe();

        broadcast_title_bar_accent(&hub, "/player", Some("#E8DFF8"));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_TITLE_BAR_ACCENT));
        let payload: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(payload["location"], "/player");
        assert_eq!(payload["accent"], "#E8DFF8");
    }

    #[tokio::test]
    async fn reset_event_is_named() {
        let hub = SseHub::new(4);
        let mut receiver = hub.subscribe();
        broadcast_theme_reset(&hub);
        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_THEME_RESET));
        assert!(event.data.contains("reset_at"));
    }
}
