use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the album theme service.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::theme_stream,
        crate::routes::theme::current_theme,
        crate::routes::player::set_active_track,
        crate::routes::player::clear_active_track,
        crate::routes::player::set_appearance,
        crate::routes::player::set_navigation,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::player::ActiveTrackRequest,
            crate::dto::player::AppearanceRequest,
            crate::dto::player::NavigationRequest,
            crate::dto::player::SignalAccepted,
            crate::dto::theme::ThemeResponse,
            crate::dto::theme::ControllerStatusDto,
            crate::dto::theme::ThemePhaseDto,
            crate::dto::sse::Handshake,
            crate::dto::sse::ThemeAppliedEvent,
            crate::dto::sse::ThemeResetEvent,
            crate::dto::sse::TitleBarAccentEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "player", description = "Track, appearance and navigation signals"),
        (name = "theme", description = "Current theme variables"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/healthcheck", "/sse/theme", "/theme", "/player/track", "/navigation"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
