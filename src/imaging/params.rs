//! Parameter types for the square pipeline.
//!
//! These structs describe *what* to produce, not *how*. They are the interface
//! between the call sites (upload endpoint, batch walker) and the
//! [`backend`](super::backend) that does the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`OutputFormat`]: Which format the squared image is encoded in.
//! - [`SquareParams`]: Everything the backend needs besides the input bytes.

use super::codec::Format;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Output encoding policy.
///
/// `Jpeg` always re-encodes as JPEG, whatever the upload was. `Preserve`
/// writes the result back in the format the source was decoded from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Preserve,
}

impl OutputFormat {
    /// Concrete encode format for an image decoded as `source`.
    pub fn resolve(self, source: Format) -> Format {
        match self {
            OutputFormat::Jpeg => Format::Jpeg,
            OutputFormat::Preserve => source,
        }
    }
}

/// Parameters for one decode → square → encode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquareParams {
    pub output: OutputFormat,
    pub quality: Quality,
}
