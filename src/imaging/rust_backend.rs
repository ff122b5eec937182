//! Pure Rust backend built on the `image` crate.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Sniff + decode (JPEG, PNG) | `image::guess_format` + `load_from_memory_with_format` |
//! | Fit resize | `image::imageops::resize` with `Lanczos3` |
//! | Letterbox | `image::imageops::overlay` onto an opaque black canvas |
//! | Encode | `JpegEncoder` (fixed quality) or `PngEncoder` |

use super::backend::{ImageBackend, ImagingError, Squared};
use super::codec;
use super::normalize::normalize;
use super::params::SquareParams;

/// Pure Rust backend using the `image` crate ecosystem.
#[derive(Debug, Clone, Copy)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn square(&self, bytes: &[u8], params: &SquareParams) -> Result<Squared, ImagingError> {
        let source = codec::decode(bytes)?;
        let dims = source.dimensions();
        tracing::debug!(
            width = dims.width,
            height = dims.height,
            format = %source.format(),
            "resizing image"
        );

        let squared = normalize(&source);
        let format = params.output.resolve(source.format());
        let encoded = codec::encode(&squared, format, params.quality)?;

        Ok(Squared {
            bytes: encoded,
            format,
            source_format: source.format(),
            source: dims,
            side: squared.width(),
        })
    }
}
