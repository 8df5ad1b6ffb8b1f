mod sse;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    config::AppConfig,
    decode::ImageDecoder,
    theme::{self, PresentationLayer, SchemePresenter, ThemeHandle},
};

pub use self::sse::SseHub;

/// Reference-counted handle shared by every route.
pub type SharedState = Arc<AppState>;

/// Central application state: the presentation layer, the controller handle and the SSE hub.
pub struct AppState {
    config: AppConfig,
    sse: SseHub,
    presentation: Arc<PresentationLayer>,
    theme: ThemeHandle,
}

impl AppState {
    /// Build the state and start the theme controller task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: AppConfig, decoder: Arc<dyn ImageDecoder>) -> (SharedState, JoinHandle<()>) {
        let sse = SseHub::new(config.sse_capacity);
        let presentation = Arc::new(PresentationLayer::new(config.player_path.clone(), sse.clone()));
        let presenter: Arc<dyn SchemePresenter> = presentation.clone();
        let (theme, controller) = theme::spawn(decoder, presenter, config.theme_settings());

        let state = Arc::new(Self {
            config,
            sse,
            presentation,
            theme,
        });
        (state, controller)
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Broadcast hub used for the theme SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Variable store the controller presents schemes to.
    pub fn presentation(&self) -> &PresentationLayer {
        &self.presentation
    }

    /// Handle onto the theme controller.
    pub fn theme(&self) -> &ThemeHandle {
        &self.theme
    }

    /// Whether the controller task has stopped.
    pub fn is_degraded(&self) -> bool {
        self.theme.is_closed()
    }
}
