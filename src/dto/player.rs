//! Requests pushed by the player, preference and navigation collaborators.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::dto::validation::{validate_artwork_path, validate_navigation_path, validate_seed_hex};

/// Track that just became active in the player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_art_source"))]
pub struct ActiveTrackRequest {
    /// Player-assigned track identifier.
    #[validate(length(min = 1, max = 256))]
    pub track_id: String,
    /// Artwork path relative to the configured artwork root.
    #[serde(default)]
    #[validate(custom(function = "validate_artwork_path"))]
    pub image_path: Option<String>,
    /// Precomputed seed color. When present the artwork is not decoded.
    #[serde(default)]
    #[validate(custom(function = "validate_seed_hex"))]
    #[schema(example = "#6200EE")]
    pub seed: Option<String>,
}

fn validate_art_source(request: &ActiveTrackRequest) -> Result<(), ValidationError> {
    if request.image_path.is_none() && request.seed.is_none() {
        let mut err = ValidationError::new("art_source_missing");
        err.message = Some("Either `image_path` or `seed` must be provided".into());
        return Err(err);
    }
    Ok(())
}

/// Dark-mode preference update.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AppearanceRequest {
    /// Whether dark-mode tones should be used.
    pub dark: bool,
}

/// Navigation location update.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct NavigationRequest {
    /// In-app path currently displayed, e.g. `/player`.
    #[validate(length(min = 1, max = 512), custom(function = "validate_navigation_path"))]
    pub path: String,
}

/// Acknowledgement returned once a signal has been handed to the controller.
#[derive(Debug, Serialize, ToSchema)]
pub struct SignalAccepted {
    /// Human-readable confirmation.
    pub message: String,
}

impl SignalAccepted {
    /// Build an acknowledgement with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(image_path: Option<&str>, seed: Option<&str>) -> ActiveTrackRequest {
        ActiveTrackRequest {
            track_id: "track-1".into(),
            image_path: image_path.map(Into::into),
            seed: seed.map(Into::into),
        }
    }

    #[test]
    fn track_needs_image_or_seed() {
        assert!(request(Some("cover.jpg"), None).validate().is_ok());
        assert!(request(None, Some("#6200EE")).validate().is_ok());
        assert!(request(None, None).validate().is_err());
    }

    #[test]
    fn track_fields_are_checked() {
        assert!(request(Some("../cover.jpg"), None).validate().is_err());
        assert!(request(None, Some("#00000000")).validate().is_err());

        let mut empty_id = request(Some("cover.jpg"), None);
        empty_id.track_id.clear();
        assert!(empty_id.validate().is_err());
    }

    #[test]
    fn navigation_path_must_be_absolute() {
        let ok = NavigationRequest {
            path: "/player".into(),
        };
        let bad = NavigationRequest {
            path: "player".into(),
        };
        assert!(ok.validate().is_ok());
        assert!(bad.validate().is_err());
    }
}
