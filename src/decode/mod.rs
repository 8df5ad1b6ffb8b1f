//! Album art references and their decoded pixel form.

mod artwork;

pub use artwork::{ArtworkDecoder, decode_file};

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use thiserror::Error;

/// Where a track's artwork lives.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// File path, resolved against the decoder's artwork root.
    Path(PathBuf),
    /// Encoded bytes already held in memory.
    Memory(Arc<[u8]>),
}

impl ImageReference {
    /// Reference to a file relative to the artwork root.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageReference::Path(path.into())
    }

    /// Reference to encoded bytes.
    pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        ImageReference::Memory(bytes.into())
    }

    /// File path, when this reference points at one.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ImageReference::Path(path) => Some(path),
            ImageReference::Memory(_) => None,
        }
    }
}

impl fmt::Debug for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageReference::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageReference::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

/// Decoded RGBA pixels in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl PixelBuffer {
    /// Wrap raw pixels, checking that the length matches the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Result<Self, DecodeError> {
        let expected = u64::from(width) * u64::from(height);
        if expected == 0 {
            return Err(DecodeError::Empty);
        }
        if pixels.len() as u64 != expected {
            return Err(DecodeError::Rejected(format!(
                "expected {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Buffer filled with a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, DecodeError> {
        let count = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| DecodeError::Rejected(format!("{width}x{height} is too large")))?;
        Self::new(width, height, vec![rgba; count])
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels as `[r, g, b, a]`.
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }
}

/// Why an image could not be turned into pixels.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Artwork file could not be read.
    #[error("failed to read artwork `{path}`: {source}")]
    Io {
        /// Resolved path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Bytes are not a supported image format.
    #[error("unsupported or corrupt image: {0}")]
    Image(#[from] image::ImageError),
    /// Zero-sized image.
    #[error("image has no pixels")]
    Empty,
    /// Blocking decode task panicked or was cancelled.
    #[error("decoder worker failed: {0}")]
    Join(String),
    /// Reference escapes the artwork root or the buffer is malformed.
    #[error("artwork rejected: {0}")]
    Rejected(String),
}

/// Turns an [`ImageReference`] into pixels. Implementations run off the async executor.
pub trait ImageDecoder: Send + Sync {
    /// Decode `image` into RGBA pixels.
    fn decode(&self, image: ImageReference) -> BoxFuture<'static, Result<PixelBuffer, DecodeError>>;
}
