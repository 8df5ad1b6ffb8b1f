use tracing::info;

use crate::{
    color::Argb,
    decode::ImageReference,
    dto::{
        player::{ActiveTrackRequest, SignalAccepted},
        theme::ThemeResponse,
    },
    error::ServiceError,
    state::SharedState,
    theme::{ActiveTrack, ArtSource, validate_seed},
};

/// Hand a newly active track to the controller.
pub async fn set_active_track(
    state: &SharedState,
    request: ActiveTrackRequest,
) -> Result<SignalAccepted, ServiceError> {
    let track = into_track(request)?;
    info!(track_id = %track.track_id, "active track changed");
    let message = format!("theme requested for track {}", track.track_id);
    state.theme().set_track(Some(track)).await?;
    Ok(SignalAccepted::new(message))
}

/// Tell the controller nothing is playing; the scheme resets immediately.
pub async fn clear_active_track(state: &SharedState) -> Result<SignalAccepted, ServiceError> {
    info!("active track cleared");
    state.theme().set_track(None).await?;
    Ok(SignalAccepted::new("theme reset"))
}

/// Forward the dark-mode preference.
pub async fn set_appearance(state: &SharedState, dark: bool) -> Result<SignalAccepted, ServiceError> {
    state.theme().set_dark_mode(dark).await?;
    let mode = if dark { "dark" } else { "light" };
    Ok(SignalAccepted::new(format!("{mode} mode selected")))
}

/// Record the navigation location and recompute the title-bar accent.
pub fn set_location(state: &SharedState, path: &str) -> SignalAccepted {
    if state.presentation().set_location(path) {
        info!(path, "title-bar accent updated");
    }
    SignalAccepted::new(format!("location set to {path}"))
}

/// Current variables, accent and controller bookkeeping.
pub fn current_theme(state: &SharedState) -> ThemeResponse {
    ThemeResponse::new(state.presentation().snapshot(), state.theme().status())
}

fn into_track(request: ActiveTrackRequest) -> Result<ActiveTrack, ServiceError> {
    let art = match (request.seed, request.image_path) {
        (Some(seed), _) => {
            let seed = seed
                .parse::<Argb>()
                .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
            ArtSource::Seed(validate_seed(seed)?)
        }
        (None, Some(path)) => ArtSource::Image(ImageReference::path(path)),
        (None, None) => {
            return Err(ServiceError::InvalidInput(
                "either image_path or seed must be provided".into(),
            ));
        }
    };

    Ok(ActiveTrack {
        track_id: request.track_id,
        art,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(image_path: Option<&str>, seed: Option<&str>) -> ActiveTrackRequest {
        ActiveTrackRequest {
            track_id: "t1".into(),
            image_path: image_path.map(Into::into),
            seed: seed.map(Into::into),
        }
    }

    #[test]
    fn seed_takes_precedence_over_artwork() {
        let track = into_track(request(Some("cover.jpg"), Some("#1E88E5"))).unwrap();
        assert_eq!(track.art, ArtSource::Seed(Argb(0xFF1E_88E5)));
    }

    #[test]
    fn artwork_path_becomes_image_reference() {
        let track = into_track(request(Some("covers/a.png"), None)).unwrap();
        assert_eq!(track.art, ArtSource::Image(ImageReference::path("covers/a.png")));
    }

    #[test]
    fn missing_source_or_bad_seed_is_invalid_input() {
        assert!(matches!(
            into_track(request(None, None)),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            into_track(request(None, Some("#101E88E5"))),
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
