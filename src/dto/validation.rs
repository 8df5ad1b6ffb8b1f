//! Validation helpers for DTOs.

use std::path::{Component, Path};

use validator::ValidationError;

use crate::color::Argb;

/// Validates that an artwork path is relative and stays inside the artwork root.
///
/// # Examples
///
/// ```ignore
/// validate_artwork_path("covers/abbey-road.jpg") // Ok
/// validate_artwork_path("/etc/passwd")            // Err - absolute
/// validate_artwork_path("../secrets.png")         // Err - parent component
/// ```
pub fn validate_artwork_path(path: &str) -> Result<(), ValidationError> {
    if path.trim().is_empty() {
        let mut err = ValidationError::new("artwork_path_empty");
        err.message = Some("Artwork path must not be empty".into());
        return Err(err);
    }

    let escapes = Path::new(path)
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        let mut err = ValidationError::new("artwork_path_escape");
        err.message =
            Some(format!("Artwork path `{path}` must be relative and must not contain `..`").into());
        return Err(err);
    }

    Ok(())
}

/// Validates a seed color literal: `#RRGGBB`, or `#AARRGGBB` with a fully opaque alpha.
pub fn validate_seed_hex(value: &str) -> Result<(), ValidationError> {
    match value.parse::<Argb>() {
        Ok(color) if color.is_opaque() => Ok(()),
        Ok(_) => {
            let mut err = ValidationError::new("seed_translucent");
            err.message = Some("Seed color must be fully opaque".into());
            Err(err)
        }
        Err(parse) => {
            let mut err = ValidationError::new("seed_format");
            err.message = Some(parse.to_string().into());
            Err(err)
        }
    }
}

/// Validates that a navigation location is an absolute in-app path.
pub fn validate_navigation_path(path: &str) -> Result<(), ValidationError> {
    if !path.starts_with('/') {
        let mut err = ValidationError::new("navigation_path_format");
        err.message = Some(format!("Navigation path must start with `/` (got `{path}`)").into());
        return Err(err);
    }
    Ok(())
}
