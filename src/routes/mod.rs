use axum::Router;

use crate::state::SharedState;

/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Health check route.
pub mod health;
/// Player, appearance and navigation signals.
pub mod player;
/// Theme event stream.
pub mod sse;
/// Current theme snapshot.
pub mod theme;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(sse::router())
        .merge(player::router())
        .merge(theme::router())
        .merge(docs::router())
        .with_state(state)
}
