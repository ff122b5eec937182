//! Image pipeline trait and shared types.
//!
//! The [`ImageBackend`] trait is the single seam both call sites go through:
//! bytes in, squared and re-encoded bytes out. The production implementation
//! is [`RustBackend`](super::rust_backend::RustBackend); tests swap in a
//! recording mock so the batch walker can be exercised without pixel work.

use super::codec::Format;
use super::params::SquareParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Result of one decode → square → encode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Squared {
    /// Encoded output bytes.
    pub bytes: Vec<u8>,
    /// Format `bytes` are encoded in.
    pub format: Format,
    /// Format the input was decoded from.
    pub source_format: Format,
    /// Dimensions of the decoded input.
    pub source: Dimensions,
    /// Side of the square output.
    pub side: u32,
}

/// Trait for the square pipeline.
///
/// `Send + Sync` so one instance can be shared across request tasks.
pub trait ImageBackend: Send + Sync {
    /// Decode `bytes`, letterbox onto a black square, and encode per `params`.
    fn square(&self, bytes: &[u8], params: &SquareParams) -> Result<Squared, ImagingError>;
}
