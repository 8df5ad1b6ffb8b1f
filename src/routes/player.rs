use axum::{Json, Router, extract::State, routing::put};
use axum_valid::Valid;

use crate::{
    dto::player::{ActiveTrackRequest, AppearanceRequest, NavigationRequest, SignalAccepted},
    error::AppError,
    services::theme_service,
    state::SharedState,
};

/// Signals pushed by the player, the preference store and the router of the UI.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/player/track", put(set_active_track).delete(clear_active_track))
        .route("/preferences/appearance", put(set_appearance))
        .route("/navigation", put(set_navigation))
}

#[utoipa::path(
    put,
    path = "/player/track",
    tag = "player",
    request_body = ActiveTrackRequest,
    responses(
        (status = 200, description = "Theme requested for the track", body = SignalAccepted),
        (status = 400, description = "Invalid track payload"),
        (status = 503, description = "Theme controller stopped")
    )
)]
/// Make a track active and start deriving its theme.
pub async fn set_active_track(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ActiveTrackRequest>>,
) -> Result<Json<SignalAccepted>, AppError> {
    Ok(Json(theme_service::set_active_track(&state, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/player/track",
    tag = "player",
    responses(
        (status = 200, description = "Theme reset", body = SignalAccepted),
        (status = 503, description = "Theme controller stopped")
    )
)]
/// Clear the active track; every theme variable is reset.
pub async fn clear_active_track(
    State(state): State<SharedState>,
) -> Result<Json<SignalAccepted>, AppError> {
    Ok(Json(theme_service::clear_active_track(&state).await?))
}

#[utoipa::path(
    put,
    path = "/preferences/appearance",
    tag = "player",
    request_body = AppearanceRequest,
    responses(
        (status = 200, description = "Dark-mode preference recorded", body = SignalAccepted),
        (status = 503, description = "Theme controller stopped")
    )
)]
/// Switch between light and dark tones.
pub async fn set_appearance(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AppearanceRequest>>,
) -> Result<Json<SignalAccepted>, AppError> {
    Ok(Json(theme_service::set_appearance(&state, payload.dark).await?))
}

#[utoipa::path(
    put,
    path = "/navigation",
    tag = "player",
    request_body = NavigationRequest,
    responses(
        (status = 200, description = "Location recorded", body = SignalAccepted),
        (status = 400, description = "Invalid path")
    )
)]
/// Report the location shown by the UI so the title-bar accent can follow it.
pub async fn set_navigation(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<NavigationRequest>>,
) -> Json<SignalAccepted> {
    Json(theme_service::set_location(&state, &payload.path))
}
