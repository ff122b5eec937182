//! Image processing: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::guess_format` + `load_from_memory_with_format` |
//! | **Square** | Lanczos3 fit + centered overlay on black |
//! | **Encode** | `JpegEncoder` / `PngEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Codec**: [`Format`], [`RasterImage`], byte-level [`decode`] / [`encode`]
//! - **Normalize**: the letterbox transform, [`normalize`]
//! - **Parameters**: [`Quality`], [`OutputFormat`], [`SquareParams`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod codec;
pub mod normalize;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, ImageBackend, ImagingError, Squared};
pub use calculations::{calculate_fit_dimensions, center_offset, square_side};
pub use codec::{Format, RasterImage, decode, encode};
pub use normalize::normalize;
pub use params::{OutputFormat, Quality, SquareParams};
pub use rust_backend::RustBackend;
