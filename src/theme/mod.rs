//! Reactive glue between player signals and the presentation layer.
//!
//! Track and appearance changes are sent to a single controller task that owns the
//! request sequence. Extraction and derivation run off that task and report back; only
//! the latest request's result reaches the [`SchemePresenter`].

/// Task that owns the request sequence and applies finished schemes.
pub mod controller;
/// Variable store the schemes are presented to.
pub mod presentation;
/// Idle/Loading/Applied bookkeeping with last-request-wins resolution.
pub mod state_machine;

use thiserror::Error;

use crate::{
    color::Argb,
    decode::{DecodeError, ImageReference},
};

pub use controller::{ControllerStatus, ThemeHandle, ThemeInput, ThemeSettings, spawn};
pub use presentation::{PresentationLayer, PresentationState, SchemePresenter};
pub use state_machine::{RequestSeq, ThemePhase};

/// Track currently shown by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTrack {
    /// Player-assigned identifier.
    pub track_id: String,
    /// What the seed color is taken from.
    pub art: ArtSource,
}

/// Source of a track's seed color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtSource {
    /// Decode the artwork and extract the seed.
    Image(ImageReference),
    /// Seed computed ahead of time; decoding is skipped.
    Seed(Argb),
}

/// Failures of a single theme request. None of them escape the controller.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// Artwork could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Seed carries transparency and cannot anchor a palette.
    #[error("seed {argb} is not an opaque sRGB color")]
    InvalidSeed {
        /// Rejected color.
        argb: Argb,
    },
    /// Blocking derivation task panicked or was cancelled.
    #[error("theme worker failed: {0}")]
    Worker(String),
    /// The controller task has exited.
    #[error("theme controller is not running")]
    ControllerStopped,
}

/// Reject seeds that cannot be rendered as-is.
pub fn validate_seed(argb: Argb) -> Result<Argb, ThemeError> {
    if argb.is_opaque() {
        Ok(argb)
    } else {
        Err(ThemeError::InvalidSeed { argb })
    }
}
