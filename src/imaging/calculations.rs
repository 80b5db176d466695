//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest dimensions that fit inside `bounds` while keeping the
/// source aspect ratio.
///
/// Used by [`ResizeMode::Max`](super::ResizeMode::Max) and by profile
/// thumbnails. Both sides are at least 1 pixel.
///
/// # Examples
/// ```
/// # use image_chain::imaging::calculate_fit_dimensions;
/// // 800x600 into a 200x200 box → 200x150
/// assert_eq!(calculate_fit_dimensions((800, 600), (200, 200)), (200, 150));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    let ratio = f64::min(max_w as f64 / src_w as f64, max_h as f64 / src_h as f64);
    let w = (src_w as f64 * ratio).round().max(1.0) as u32;
    let h = (src_h as f64 * ratio).round().max(1.0) as u32;
    (w.min(max_w), h.min(max_h))
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
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

/// Top-left offset that centres a `target` window inside `filled`.
pub fn calculate_center_offset(filled: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        filled.0.saturating_sub(target.0) / 2,
        filled.1.saturating_sub(target.1) / 2,
    )
}

/// Clamp a top-left anchored crop to the image bounds.
///
/// A crop larger than the image keeps the whole image on that axis.
pub fn clamp_crop(source: (u32, u32), crop: (u32, u32)) -> (u32, u32) {
    (crop.0.min(source.0), crop.1.min(source.1))
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn fit_upscales_small_sources() {
        assert_eq!(calculate_fit_dimensions((100, 50), (400, 400)), (400, 200));
    }

    #[test]
    fn fit_never_exceeds_bounds() {
        let (w, h) = calculate_fit_dimensions((333, 777), (100, 120));
        assert!(w <= 100 && h <= 120);
        assert_eq!(h, 120);
    }

    #[test]
    fn fit_extreme_aspect_keeps_one_pixel() {
        assert_eq!(calculate_fit_dimensions((10_000, 1), (100, 100)), (100, 1));
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
        assert_eq!(calculate_fill_dimensions((600, 800), (500, 400)), (500, 667));
    }

    #[test]
    fn fill_same_aspect_ratio() {
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 300)), (400, 300));
    }

    // =========================================================================
    // offsets and crops
    // =========================================================================

    #[test]
    fn center_offset_splits_the_excess() {
        assert_eq!(calculate_center_offset((667, 500), (400, 500)), (133, 0));
        assert_eq!(calculate_center_offset((400, 300), (400, 300)), (0, 0));
    }

    #[test]
    fn clamp_crop_limits_to_source() {
        assert_eq!(clamp_crop((100, 80), (50, 200)), (50, 80));
        assert_eq!(clamp_crop((100, 80), (40, 40)), (40, 40));
    }
}
