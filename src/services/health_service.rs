use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the theme controller is still running.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let degraded = state.is_degraded();
    if degraded {
        warn!("theme controller stopped (degraded mode)");
    }
    HealthResponse::new(degraded, state.sse().subscriber_count())
}
