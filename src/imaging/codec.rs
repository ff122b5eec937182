//! Byte-level decode and encode.
//!
//! The source format is always sniffed from the bytes themselves. Declared
//! MIME types and filenames are only consulted by the upload endpoint as an
//! admission check and never steer decoding.

use super::backend::{Dimensions, ImagingError};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat};
use std::fmt;
use std::io::Cursor;

/// Raster formats squarefit reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Jpeg,
    Png,
}

impl Format {
    /// Map a declared MIME type to a format. `image/jpg` is accepted as an
    /// alias because browsers and older clients still send it.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Format::Jpeg),
            "image/png" => Some(Format::Png),
            _ => None,
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Format::Jpeg),
            ImageFormat::Png => Some(Format::Png),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Format::Jpeg => ImageFormat::Jpeg,
            Format::Png => ImageFormat::Png,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Jpeg => "image/jpeg",
            Format::Png => "image/png",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Jpeg => "jpg",
            Format::Png => "png",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Jpeg => f.write_str("jpeg"),
            Format::Png => f.write_str("png"),
        }
    }
}

/// A decoded image together with the format it was decoded from.
///
/// Never mutated: every pipeline step builds a new one.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: DynamicImage,
    format: Format,
}

impl RasterImage {
    pub fn new(pixels: DynamicImage, format: Format) -> Self {
        Self { pixels, format }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Format the source bytes were decoded from.
    pub fn format(&self) -> Format {
        self.format
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}

/// Decode raw bytes, detecting the container from its magic bytes.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, ImagingError> {
    let detected = image::guess_format(bytes).map_err(ImagingError::Decode)?;
    let format = Format::from_image_format(detected)
        .ok_or_else(|| ImagingError::UnsupportedFormat(format!("{detected:?}")))?;
    let pixels = image::load_from_memory_with_format(bytes, detected)
        .map_err(ImagingError::Decode)?;
    Ok(RasterImage::new(pixels, format))
}

/// Encode an image as `format`. `quality` only applies to JPEG.
pub fn encode(
    image: &RasterImage,
    format: Format,
    quality: Quality,
) -> Result<Vec<u8>, ImagingError> {
    let mut buffer = Cursor::new(Vec::new());
    let result = match format {
        Format::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(image.pixels().to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.value() as u8);
            rgb.write_with_encoder(encoder)
        }
        Format::Png => image.pixels().write_with_encoder(PngEncoder::new(&mut buffer)),
    };
    result.map_err(ImagingError::Encode)?;
    Ok(buffer.into_inner())
}
