use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/theme",
    tag = "sse",
    responses((status = 200, description = "Theme SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream `theme.applied`, `theme.reset` and `title_bar.accent` events.
pub async fn theme_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let (handshake, receiver) = sse_service::subscribe_theme(&state);
    info!("New theme SSE connection");
    sse_service::to_sse_stream(handshake, receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/theme", get(theme_stream))
}
