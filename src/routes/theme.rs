use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::theme::ThemeResponse, services::theme_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/theme",
    tag = "theme",
    responses((status = 200, description = "Current theme variables", body = ThemeResponse))
)]
/// Return the variables currently presented, the title-bar accent and controller status.
pub async fn current_theme(State(state): State<SharedState>) -> Json<ThemeResponse> {
    Json(theme_service::current_theme(&state))
}

/// Configure the theme routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/theme", get(current_theme))
}
