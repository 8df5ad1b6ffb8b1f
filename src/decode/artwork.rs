use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::task;
use tracing::debug;

use super::{DecodeError, ImageDecoder, ImageReference, PixelBuffer};

/// Decodes PNG, JPEG, GIF and WebP artwork with the `image` crate on the blocking pool.
#[derive(Debug, Clone)]
pub struct ArtworkDecoder {
    root: Arc<Path>,
}

impl ArtworkDecoder {
    /// Decoder resolving relative artwork paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::from(root.into()),
        }
    }

    /// Directory relative artwork paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &Path) -> Result<PathBuf, DecodeError> {
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(DecodeError::Rejected(format!(
                "`{}` must be a relative path inside the artwork root",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ImageDecoder for ArtworkDecoder {
    fn decode(&self, image: ImageReference) -> BoxFuture<'static, Result<PixelBuffer, DecodeError>> {
        let decoder = self.clone();
        Box::pin(async move {
            let source = match image {
                ImageReference::Path(relative) => Source::File(decoder.resolve(&relative)?),
                ImageReference::Memory(bytes) => Source::Bytes(bytes),
            };

            task::spawn_blocking(move || match source {
                Source::File(path) => decode_file(&path),
                Source::Bytes(bytes) => decode_bytes(&bytes),
            })
            .await
            .map_err(|err| DecodeError::Join(err.to_string()))?
        })
    }
}

enum Source {
    File(PathBuf),
    Bytes(Arc<[u8]>),
}

/// Read and decode an image file on the current thread.
pub fn decode_file(path: &Path) -> Result<PixelBuffer, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "decoding artwork");
    decode_bytes(&bytes)
}

fn decode_bytes(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.pixels().map(|pixel| pixel.0).collect();
    PixelBuffer::new(width, height, pixels)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn decodes_png_from_memory() {
        let decoder = ArtworkDecoder::new(".");
        let pixels = decoder
            .decode(ImageReference::bytes(png_bytes(4, 3, [98, 0, 238, 255])))
            .await
            .unwrap();

        assert_eq!((pixels.width(), pixels.height()), (4, 3));
        assert!(pixels.pixels().iter().all(|p| *p == [98, 0, 238, 255]));
    }

    #[tokio::test]
    async fn garbage_bytes_fail_to_decode() {
        let decoder = ArtworkDecoder::new(".");
        let err = decoder
            .decode(ImageReference::bytes(b"definitely not an image".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::Image(_)));
    }

    #[tokio::test]
    async fn missing_file_reports_io_error() {
        let decoder = ArtworkDecoder::new(std::env::temp_dir());
        let err = decoder
            .decode(ImageReference::path("album-theme-missing-cover.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::Io { .. }));
    }

    #[tokio::test]
    async fn decodes_file_under_root() {
        let root = std::env::temp_dir();
        let name = format!("album-theme-cover-{}.png", std::process::id());
        std::fs::write(root.join(&name), png_bytes(2, 2, [10, 20, 30, 255])).unwrap();

        let decoder = ArtworkDecoder::new(&root);
        let pixels = decoder.decode(ImageReference::path(&name)).await.unwrap();
        std::fs::remove_file(root.join(&name)).ok();

        assert_eq!(pixels.pixels(), &[[10, 20, 30, 255]; 4]);
    }

    #[test]
    fn paths_outside_the_root_are_rejected() {
        let decoder = ArtworkDecoder::new("/srv/artwork");
        assert!(matches!(
            decoder.resolve(Path::new("../etc/passwd")),
            Err(DecodeError::Rejected(_))
        ));
        assert!(matches!(
            decoder.resolve(Path::new("/etc/passwd")),
            Err(DecodeError::Rejected(_))
        ));
        assert!(matches!(decoder.resolve(Path::new("")), Err(DecodeError::Rejected(_))));
        assert_eq!(
            decoder.resolve(Path::new("a/b.jpg")).unwrap(),
            PathBuf::from("/srv/artwork/a/b.jpg")
        );
    }
}
