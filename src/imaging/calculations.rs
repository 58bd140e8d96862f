//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images. The
//! filter pipeline uses them to predict output bounds before any pixel work.

/// Calculate the output size of an exact resize.
///
/// A zero in `target` is derived from the source aspect ratio. Both zero means
/// "keep the source size".
///
/// # Examples
/// ```
/// # use site_image::imaging::calculations::calculate_resize_dimensions;
/// assert_eq!(calculate_resize_dimensions((800, 600), (400, 0)), (400, 300));
/// assert_eq!(calculate_resize_dimensions((800, 600), (0, 150)), (200, 150));
/// ```
pub fn calculate_resize_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    match target {
        (0, 0) => source,
        _ if src_w == 0 || src_h == 0 => (0, 0),
        (0, h) => {
            let w = (h as f64 * src_w as f64 / src_h as f64).round() as u32;
            (w.max(1), h)
        }
        (w, 0) => {
            let h = (w as f64 * src_h as f64 / src_w as f64).round() as u32;
            (w, h.max(1))
        }
        exact => exact,
    }
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(tgt_w), h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(tgt_h))
    }
}

/// Calculate dimensions that fit inside a box, preserving aspect ratio.
///
/// Never upscales: a source already inside the box keeps its size.
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 || (src_w <= max_w && src_h <= max_h) {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Size of the canvas that holds `source` rotated by `degrees` counter-clockwise.
///
/// Quarter turns are exact; other angles grow the canvas to the rotated
/// bounding box.
pub fn calculate_rotated_dimensions(source: (u32, u32), degrees: i32) -> (u32, u32) {
    let (w, h) = source;
    match degrees.rem_euclid(360) {
        0 | 180 => (w, h),
        90 | 270 => (h, w),
        d => {
            let theta = (d as f64).to_radians();
            let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
            let rw = (w as f64 * cos + h as f64 * sin).ceil() as u32;
            let rh = (w as f64 * sin + h as f64 * cos).ceil() as u32;
            (rw, rh)
        }
    }
}

/// Largest box with the target's aspect ratio that fits inside the source.
///
/// This is the window a smart crop slides over the image before the final
/// resize to the target size.
pub fn calculate_crop_window(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;
    if tgt_w == 0 || tgt_h == 0 {
        return source;
    }

    let tgt_aspect = tgt_w as f64 / tgt_h as f64;
    let src_aspect = src_w as f64 / src_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: full height, narrower width
        let w = ((src_h as f64 * tgt_aspect).round() as u32).clamp(1, src_w);
        (w, src_h)
    } else {
        let h = ((src_w as f64 / tgt_aspect).round() as u32).clamp(1, src_h);
        (src_w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_resize_dimensions tests
    // =========================================================================

    #[test]
    fn resize_exact() {
        assert_eq!(calculate_resize_dimensions((800, 600), (100, 100)), (100, 100));
    }

    #[test]
    fn resize_derives_height() {
        // 800x600 → width 400 keeps 4:3 → 400x300
        assert_eq!(calculate_resize_dimensions((800, 600), (400, 0)), (400, 300));
    }

    #[test]
    fn resize_derives_width() {
        assert_eq!(calculate_resize_dimensions((600, 800), (0, 400)), (300, 400));
    }

    #[test]
    fn resize_zero_target_keeps_source() {
        assert_eq!(calculate_resize_dimensions((640, 480), (0, 0)), (640, 480));
    }

    #[test]
    fn resize_derived_dimension_never_zero() {
        // 1000x1 → width 10 would round height to 0
        assert_eq!(calculate_resize_dimensions((1000, 1), (10, 0)), (10, 1));
    }

    // =========================================================================
    // calculate_fill_dimensions tests
    // =========================================================================

    #[test]
    fn fill_wider_source_to_portrait_target() {
        // 800x600 (4:3) → 400x500 target
        // Source is wider, so height matches: 500, width = 500 * (4/3) = 667
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 500)), (667, 500));
    }

    #[test]
    fn fill_taller_source_to_landscape_target() {
        // 600x800 (3:4) → 500x400 target
        // Source is taller, so width matches: 500, height = 500 * (4/3) = 667
        assert_eq!(calculate_fill_dimensions((600, 800), (500, 400)), (500, 667));
    }

    #[test]
    fn fill_same_aspect_ratio() {
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 300)), (400, 300));
    }

    // =========================================================================
    // calculate_fit_dimensions tests
    // =========================================================================

    #[test]
    fn fit_landscape_into_square() {
        assert_eq!(calculate_fit_dimensions((800, 600), (200, 200)), (200, 150));
    }

    #[test]
    fn fit_portrait_into_square() {
        assert_eq!(calculate_fit_dimensions((600, 800), (200, 200)), (150, 200));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(calculate_fit_dimensions((100, 50), (400, 400)), (100, 50));
    }

    // =========================================================================
    // calculate_rotated_dimensions tests
    // =========================================================================

    #[test]
    fn rotate_quarter_turns_swap_axes() {
        assert_eq!(calculate_rotated_dimensions((300, 200), 90), (200, 300));
        assert_eq!(calculate_rotated_dimensions((300, 200), 270), (200, 300));
        assert_eq!(calculate_rotated_dimensions((300, 200), 180), (300, 200));
        assert_eq!(calculate_rotated_dimensions((300, 200), -90), (200, 300));
    }

    #[test]
    fn rotate_45_grows_canvas() {
        // 100x100 at 45° → diagonal ≈ 141.42, ceil → 142
        assert_eq!(calculate_rotated_dimensions((100, 100), 45), (142, 142));
    }

    // =========================================================================
    // calculate_crop_window tests
    // =========================================================================

    #[test]
    fn crop_window_from_wide_source() {
        // 800x400 → square target → 400x400 window
        assert_eq!(calculate_crop_window((800, 400), (100, 100)), (400, 400));
    }

    #[test]
    fn crop_window_from_tall_source() {
        // 400x800 → 2:1 target → 400x200 window
        assert_eq!(calculate_crop_window((400, 800), (200, 100)), (400, 200));
    }

    #[test]
    fn crop_window_same_aspect_is_whole_image() {
        assert_eq!(calculate_crop_window((640, 480), (320, 240)), (640, 480));
    }
}
