//! Square letterboxing.
//!
//! ```text
//! 1920×1080 source          1080×1080 result
//! ┌──────────────────┐      ┌────────────┐
//! │                  │      │▓▓▓▓▓▓▓▓▓▓▓▓│  black
//! │      photo       │  →   │   photo    │  fitted 1080×608
//! │                  │      │▓▓▓▓▓▓▓▓▓▓▓▓│  black
//! └──────────────────┘      └────────────┘
//! ```
//!
//! The canvas side is the source's shorter edge, so the longer edge is scaled
//! down to it and the remaining band is filled with opaque black.

use super::calculations::{calculate_fit_dimensions, center_offset, square_side};
use super::codec::RasterImage;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

const CANVAS: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fit `source` into a black square as large as its shorter edge.
///
/// The returned image is always `s × s` with `s = min(width, height)`, 8-bit
/// RGB, and keeps the source format tag. Transparent pixels are blended onto
/// the black canvas.
pub fn normalize(source: &RasterImage) -> RasterImage {
    let dims = (source.width(), source.height());
    let side = square_side(dims);
    let (fit_w, fit_h) = calculate_fit_dimensions(dims, side);

    let rgba = source.pixels().to_rgba8();
    let fitted = if (fit_w, fit_h) == dims {
        rgba
    } else {
        imageops::resize(&rgba, fit_w, fit_h, FilterType::Lanczos3)
    };

    let mut canvas = RgbaImage::from_pixel(side, side, CANVAS);
    let (x, y) = center_offset(side, (fit_w, fit_h));
    imageops::overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));

    let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();
    RasterImage::new(DynamicImage::ImageRgb8(flattened), source.format())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec::{self, Format};
    use crate::imaging::params::Quality;
    use image::{Rgb, RgbImage};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn raster(img: RgbImage) -> RasterImage {
        RasterImage::new(DynamicImage::ImageRgb8(img), Format::Jpeg)
    }

    fn solid(width: u32, height: u32, color: Rgb<u8>) -> RasterImage {
        raster(RgbImage::from_pixel(width, height, color))
    }

    fn rgb(img: &RasterImage) -> RgbImage {
        img.pixels().to_rgb8()
    }

    #[test]
    fn output_is_square_of_short_edge() {
        for (w, h) in [(192, 108), (108, 192), (50, 50), (7, 3), (1, 9)] {
            let out = normalize(&solid(w, h, WHITE));
            let side = w.min(h);
            assert_eq!((out.width(), out.height()), (side, side), "source {w}x{h}");
        }
    }

    #[test]
    fn square_input_is_unchanged() {
        let source = RgbImage::from_fn(30, 30, |x, y| Rgb([x as u8 * 8, y as u8 * 8, 77]));
        let out = normalize(&raster(source.clone()));
        assert_eq!(rgb(&out), source);
    }

    #[test]
    fn landscape_gets_bars_top_and_bottom() {
        // 192x108 → side 108, fitted 108x61 at y offset 23
        let out = rgb(&normalize(&solid(192, 108, WHITE)));
        assert_eq!(*out.get_pixel(54, 0), BLACK);
        assert_eq!(*out.get_pixel(54, 107), BLACK);
        assert_eq!(*out.get_pixel(54, 54), WHITE);
        assert_eq!(*out.get_pixel(0, 54), WHITE);
        assert_eq!(*out.get_pixel(107, 54), WHITE);
    }

    #[test]
    fn portrait_gets_bars_left_and_right() {
        // 60x80 → side 60, fitted 45x60 at x offset 7
        let out = rgb(&normalize(&solid(60, 80, WHITE)));
        assert_eq!(*out.get_pixel(0, 30), BLACK);
        assert_eq!(*out.get_pixel(59, 30), BLACK);
        assert_eq!(*out.get_pixel(30, 30), WHITE);
        assert_eq!(*out.get_pixel(30, 0), WHITE);
    }

    #[test]
    fn transparent_pixels_become_black() {
        let clear = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 0]));
        let source = RasterImage::new(DynamicImage::ImageRgba8(clear), Format::Png);
        let out = rgb(&normalize(&source));
        assert!(out.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn keeps_source_format_tag() {
        let source = RasterImage::new(DynamicImage::new_rgb8(10, 4), Format::Png);
        assert_eq!(normalize(&source).format(), Format::Png);
    }

    #[test]
    fn normalizing_twice_keeps_dimensions() {
        let once = normalize(&solid(90, 40, WHITE));
        let twice = normalize(&once);
        assert_eq!(
            (twice.width(), twice.height()),
            (once.width(), once.height())
        );
    }

    #[test]
    fn roundtrip_through_both_codecs() {
        let once = normalize(&solid(33, 21, WHITE));
        for format in [Format::Jpeg, Format::Png] {
            let bytes = codec::encode(&once, format, Quality::default()).unwrap();
            let decoded = codec::decode(&bytes).unwrap();
            assert_eq!(decoded.format(), format);
            assert_eq!((decoded.width(), decoded.height()), (21, 21));
        }
    }
}
