use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Number of connected theme SSE clients.
    pub sse_subscribers: usize,
}

impl HealthResponse {
    /// Build the response from the controller liveness flag.
    pub fn new(degraded: bool, sse_subscribers: usize) -> Self {
        let status = if degraded { "degraded" } else { "ok" };
        Self {
            status: status.to_string(),
            sse_subscribers,
        }
    }
}
