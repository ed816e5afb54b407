//! Proportional resize math

/// Scale `(width, height)` so the longer edge equals `max_dimension`.
///
/// Images already within bounds keep their size. The shorter edge is
/// rounded to the nearest pixel and never drops below 1.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width == 0 || height == 0 || max_dimension == 0 {
        return (width.max(1), height.max(1));
    }
    if width.max(height) <= max_dimension {
        return (width, height);
    }

    let max = max_dimension as f64;
    if width > height {
        let scaled = (height as f64 * max / width as f64).round() as u32;
        (max_dimension, scaled.max(1))
    } else {
        let scaled = (width as f64 * max / height as f64).round() as u32;
        (scaled.max(1), max_dimension)
    }
}
