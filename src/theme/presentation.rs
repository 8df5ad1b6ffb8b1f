use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::debug;

use crate::{
    color::scheme::{ColorScheme, Role, TONE_SPEC},
    services::sse_events,
    state::SseHub,
};

/// Variable holding the primary role as an `r,g,b` triplet.
pub const PRIMARY_RGB_VARIABLE: &str = "primaryRgb";

/// Receiver of complete schemes. Must be idempotent.
pub trait SchemePresenter: Send + Sync {
    /// Replace every theme variable with `scheme`; an empty scheme clears them.
    fn apply_scheme(&self, scheme: &ColorScheme);
}

/// What the UI currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationState {
    /// Every theme variable; empty strings when no theme is applied.
    pub variables: IndexMap<String, String>,
    /// Title-bar accent for the current location, absent without a theme.
    pub title_bar_accent: Option<String>,
    /// Navigation location the accent was computed for.
    pub location: String,
    scheme: ColorScheme,
}

impl PresentationState {
    fn new(location: String) -> Self {
        Self {
            variables: variables_for(&ColorScheme::empty()),
            title_bar_accent: None,
            location,
            scheme: ColorScheme::empty(),
        }
    }

    /// Scheme the variables were built from.
    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    /// Whether a theme is applied.
    pub fn is_themed(&self) -> bool {
        !self.scheme.is_empty()
    }
}

/// In-process variable store fanning changes out over SSE.
pub struct PresentationLayer {
    state: watch::Sender<PresentationState>,
    player_path: String,
    hub: SseHub,
}

impl PresentationLayer {
    /// Layer starting unthemed at `/`, using the `player_path` accent rule.
    pub fn new(player_path: impl Into<String>, hub: SseHub) -> Self {
        let (state, _rx) = watch::channel(PresentationState::new("/".to_string()));
        Self {
            state,
            player_path: player_path.into(),
            hub,
        }
    }

    /// Copy of the visible state.
    pub fn snapshot(&self) -> PresentationState {
        self.state.borrow().clone()
    }

    /// Watch every change of the visible state.
    pub fn subscribe(&self) -> watch::Receiver<PresentationState> {
        self.state.subscribe()
    }

    /// Record the navigation location and recompute the title-bar accent.
    ///
    /// Returns whether the accent changed.
    pub fn set_location(&self, location: &str) -> bool {
        let mut accent_changed = false;
        // Events go out under the watch lock so subscribers see them in state order.
        self.state.send_if_modified(|state| {
            if state.location == location {
                return false;
            }
            state.location = location.to_string();
            let accent = accent_for(&state.scheme, &state.location, &self.player_path);
            if accent != state.title_bar_accent {
                state.title_bar_accent = accent;
                accent_changed = true;
                sse_events::broadcast_title_bar_accent(
                    &self.hub,
                    location,
                    state.title_bar_accent.as_deref(),
                );
            }
            true
        });
        accent_changed
    }
}

impl SchemePresenter for PresentationLayer {
    fn apply_scheme(&self, scheme: &ColorScheme) {
        let modified = self.state.send_if_modified(|state| {
            if state.scheme == *scheme {
                return false;
            }
            state.scheme = scheme.clone();
            state.variables = variables_for(scheme);
            state.title_bar_accent = accent_for(scheme, &state.location, &self.player_path);
            if state.is_themed() {
                sse_events::broadcast_theme_applied(&self.hub, state);
            } else {
                sse_events::broadcast_theme_reset(&self.hub);
            }
            true
        });

        if !modified {
            debug!("scheme unchanged; nothing to present");
        }
    }
}

fn variables_for(scheme: &ColorScheme) -> IndexMap<String, String> {
    let mut variables: IndexMap<String, String> = TONE_SPEC
        .iter()
        .map(|spec| {
            let value = scheme.get(spec.role).map(|c| c.to_hex()).unwrap_or_default();
            (spec.role.name().to_string(), value)
        })
        .collect();
    let primary_rgb = scheme
        .get(Role::Primary)
        .map(|c| c.to_rgb_triplet())
        .unwrap_or_default();
    variables.insert(PRIMARY_RGB_VARIABLE.to_string(), primary_rgb);
    variables
}

fn accent_for(scheme: &ColorScheme, location: &str, player_path: &str) -> Option<String> {
    let role = if location == player_path {
        Role::SecondaryContainer
    } else {
        Role::Surface
    };
    scheme.get(role).map(|c| c.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Argb, scheme::derive_scheme, tonal::build_palettes};

    fn layer() -> PresentationLayer {
        PresentationLayer::new("/player", SseHub::new(16))
    }

    fn scheme() -> ColorScheme {
        derive_scheme(&build_palettes(Argb(0xFF62_00EE)), false)
    }

    #[test]
    fn starts_with_every_variable_cleared() {
        let state = layer().snapshot();
        assert_eq!(state.variables.len(), TONE_SPEC.len() + 1);
        assert!(state.variables.values().all(String::is_empty));
        assert_eq!(state.title_bar_accent, None);
    }

    #[test]
    fn applying_sets_variables_and_primary_rgb() {
        let layer = layer();
        layer.apply_scheme(&scheme());
        let state = layer.snapshot();
        assert_eq!(state.variables["primary"], "#6D23F8");
        assert_eq!(state.variables[PRIMARY_RGB_VARIABLE], "109,35,248");
        assert_eq!(state.title_bar_accent.as_deref(), Some("#FFFBFE"));
    }

    #[tokio::test]
    async fn applying_twice_is_idempotent() {
        let hub = SseHub::new(16);
        let layer = PresentationLayer::new("/player", hub.clone());
        let mut events = hub.subscribe();
        let mut changes = layer.subscribe();
        changes.mark_unchanged();

        layer.apply_scheme(&scheme());
        let once = layer.snapshot();
        assert!(changes.has_changed().unwrap());
        changes.mark_unchanged();

        layer.apply_scheme(&scheme());
        assert_eq!(layer.snapshot(), once);
        assert!(!changes.has_changed().unwrap());

        assert_eq!(events.recv().await.unwrap().event.as_deref(), Some("theme.applied"));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn reset_clears_variables_and_accent() {
        let layer = layer();
        layer.apply_scheme(&scheme());
        layer.apply_scheme(&ColorScheme::empty());
        let state = layer.snapshot();
        assert!(!state.is_themed());
        assert!(state.variables.values().all(String::is_empty));
        assert_eq!(state.title_bar_accent, None);
    }

    #[test]
    fn accent_follows_navigation() {
        let layer = layer();
        layer.apply_scheme(&scheme());

        assert!(layer.set_location("/player"));
        assert_eq!(layer.snapshot().title_bar_accent.as_deref(), Some("#E8DFF8"));

        assert!(!layer.set_location("/player"));
        assert!(layer.set_location("/library"));
        assert_eq!(layer.snapshot().title_bar_accent.as_deref(), Some("#FFFBFE"));
    }

    #[test]
    fn accent_events_follow_state_order_under_concurrent_navigation() {
        let hub = SseHub::new(4096);
        let mut events = hub.subscribe();
        let layer = PresentationLayer::new("/player", hub);
        let themed = scheme();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..200 {
                    let path = if round % 2 == 0 { "/player" } else { "/library" };
                    layer.set_location(path);
                }
            });
            scope.spawn(|| {
                for _ in 0..200 {
                    layer.apply_scheme(&themed);
                    layer.apply_scheme(&ColorScheme::empty());
                }
                layer.apply_scheme(&themed);
            });
        });

        let mut last_accent = None;
        while let Ok(event) = events.try_recv() {
            let payload: serde_json::Value = serde_json::from_str(&event.data).unwrap();
            last_accent = match event.event.as_deref() {
                Some("theme.applied") => payload["title_bar_accent"].as_str().map(str::to_string),
                Some("title_bar.accent") => payload["accent"].as_str().map(str::to_string),
                _ => None,
            };
        }
        let state = layer.snapshot();
        assert!(state.is_themed());
        assert_eq!(last_accent, state.title_bar_accent);
    }

    #[test]
    fn location_without_theme_keeps_accent_empty() {
        let layer = layer();
        assert!(!layer.set_location("/player"));
        assert_eq!(layer.snapshot().location, "/player");
        layer.apply_scheme(&scheme());
        assert_eq!(layer.snapshot().title_bar_accent.as_deref(), Some("#E8DFF8"));
    }
}
