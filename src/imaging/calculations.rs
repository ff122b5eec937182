//! Pure calculation functions for square letterboxing.
//!
//! All functions here are pure and testable without any I/O or images.

/// Side length of the square canvas for a source of the given dimensions.
///
/// The square is as large as the shorter edge, so it never exceeds either
/// source dimension.
///
/// # Examples
/// ```
/// # use squarefit::imaging::square_side;
/// assert_eq!(square_side((1920, 1080)), 1080);
/// assert_eq!(square_side((600, 800)), 600);
/// ```
pub fn square_side(source: (u32, u32)) -> u32 {
    source.0.min(source.1)
}

/// Calculate dimensions that fit entirely inside a `bound × bound` box.
///
/// The longer source edge becomes exactly `bound`; the shorter edge is scaled
/// by the same ratio and rounded, never collapsing below one pixel.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bound` - Side of the square bounding box
///
/// # Returns
/// * `(width, height)` - Fitted dimensions, both `<= bound`
pub fn calculate_fit_dimensions(source: (u32, u32), bound: u32) -> (u32, u32) {
    let (src_w, src_h) = source;

    if src_w >= src_h {
        // Landscape or square: width is the long edge
        let h = (src_h as f64 * bound as f64 / src_w as f64).round() as u32;
        (bound, h.clamp(1, bound))
    } else {
        // Portrait: height is the long edge
        let w = (src_w as f64 * bound as f64 / src_h as f64).round() as u32;
        (w.clamp(1, bound), bound)
    }
}

/// Offset that centers `inner` within a square of side `side`.
///
/// Odd leftovers put the extra pixel on the right/bottom margin.
pub fn center_offset(side: u32, inner: (u32, u32)) -> (u32, u32) {
    (
        side.saturating_sub(inner.0) / 2,
        side.saturating_sub(inner.1) / 2,
    )
}
