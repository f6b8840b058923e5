//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` inside `bounds`, preserving aspect ratio. Never upscales.
///
/// An image that already fits is returned unchanged. Otherwise the scale is
/// `min(max_w / w, max_h / h)` and each output edge is the floor of the scaled
/// edge, clamped to at least 1 pixel.
///
/// # Examples
/// ```
/// # use stagepage::imaging::fit_within;
/// assert_eq!(fit_within((3000, 2000), (1400, 1400)), (1400, 933));
/// assert_eq!(fit_within((800, 600), (1400, 1400)), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (w, h) = source;
    let (max_w, max_h) = bounds;

    if !needs_downscale(source, bounds) {
        return source;
    }

    let (w64, h64) = (u64::from(w), u64::from(h));
    let (mw64, mh64) = (u64::from(max_w), u64::from(max_h));

    // max_w / w <= max_h / h, cross-multiplied to stay in integers
    let (out_w, out_h) = if mw64 * h64 <= mh64 * w64 {
        (mw64, h64 * mw64 / w64)
    } else {
        (w64 * mh64 / h64, mh64)
    };

    (out_w.max(1) as u32, out_h.max(1) as u32)
}

/// Whether `source` exceeds `bounds` on either edge.
pub fn needs_downscale(source: (u32, u32), bounds: (u32, u32)) -> bool {
    source.0 > bounds.0 || source.1 > bounds.1
}
