//! Saliency-based crop selection for `fill` with the `Smart` anchor.
//!
//! The [`SmartCropper`] trait is the seam the processor calls through, so the
//! pipeline ordering can be tested with a stub that returns a fixed rectangle.
//! [`SaliencyCropper`] is the production implementation.
//!
//! ## Algorithm
//!
//! 1. Size the crop window: the largest box with the target aspect ratio that
//!    fits the source ([`calculate_crop_window`]).
//! 2. Downscale a grayscale copy so the longer edge is at most
//!    [`ANALYSIS_EDGE`] pixels, using the requested resampling kernel.
//! 3. Score each pixel by gradient magnitude and local variance.
//! 4. Slide the scaled window over a summed-area table of the scores and keep
//!    the best position. Ties keep the centred position, so flat images crop
//!    from the middle.

use super::calculations::calculate_crop_window;
use super::error::{ImageError, Result};
use super::filters::Rect;
use super::params::ResampleFilter;
use image::{DynamicImage, GenericImageView, GrayImage, imageops};

/// Longer edge of the downscaled analysis image.
pub const ANALYSIS_EDGE: u32 = 256;

/// Computes the region of an image to keep when cropping to `width`×`height`.
pub trait SmartCropper: Send + Sync {
    /// Return the crop rectangle, in source pixel coordinates, with the aspect
    /// ratio of `width`×`height`.
    fn crop_bounds(
        &self,
        img: &DynamicImage,
        width: u32,
        height: u32,
        filter: ResampleFilter,
    ) -> Result<Rect>;
}

/// Edge-density and variance saliency cropper.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaliencyCropper;

impl SaliencyCropper {
    pub fn new() -> Self {
        Self
    }
}

impl SmartCropper for SaliencyCropper {
    fn crop_bounds(
        &self,
        img: &DynamicImage,
        width: u32,
        height: u32,
        filter: ResampleFilter,
    ) -> Result<Rect> {
        let (src_w, src_h) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::SmartCrop(format!(
                "target size must be non-zero, got {width}x{height}"
            )));
        }
        if src_w == 0 || src_h == 0 {
            return Err(ImageError::SmartCrop("source image is empty".into()));
        }

        let (win_w, win_h) = calculate_crop_window((src_w, src_h), (width, height));
        if (win_w, win_h) == (src_w, src_h) {
            return Ok(Rect::new(0, 0, src_w, src_h));
        }

        let scale = (ANALYSIS_EDGE as f64 / src_w.max(src_h) as f64).min(1.0);
        let small_w = ((src_w as f64 * scale).round() as u32).max(1);
        let small_h = ((src_h as f64 * scale).round() as u32).max(1);
        let gray = img.to_luma8();
        let small = if (small_w, small_h) == (src_w, src_h) {
            gray
        } else {
            imageops::resize(&gray, small_w, small_h, filter.filter_type())
        };

        let table = SummedArea::new(&saliency_map(&small), small_w, small_h);

        let sw = ((win_w as f64 * scale).round() as u32).clamp(1, small_w);
        let sh = ((win_h as f64 * scale).round() as u32).clamp(1, small_h);
        let max_x = small_w - sw;
        let max_y = small_h - sh;

        let (mut best_x, mut best_y) = (max_x / 2, max_y / 2);
        let mut best_score = table.sum(best_x, best_y, sw, sh);
        for y in 0..=max_y {
            for x in 0..=max_x {
                let score = table.sum(x, y, sw, sh);
                if score > best_score {
                    best_score = score;
                    best_x = x;
                    best_y = y;
                }
            }
        }

        let x = ((best_x as f64 / scale).round() as u32).min(src_w - win_w);
        let y = ((best_y as f64 / scale).round() as u32).min(src_h - win_h);
        tracing::debug!(x, y, width = win_w, height = win_h, "smart crop selected");
        Ok(Rect::new(x, y, win_w, win_h))
    }
}

/// Per-pixel interest score: gradient magnitude plus local 3×3 variance.
fn saliency_map(gray: &GrayImage) -> Vec<f64> {
    let (w, h) = gray.dimensions();
    let px = |x: i64, y: i64| -> f64 {
        let cx = x.clamp(0, w as i64 - 1) as u32;
        let cy = y.clamp(0, h as i64 - 1) as u32;
        gray.get_pixel(cx, cy)[0] as f64
    };

    let mut map = vec![0.0; (w * h) as usize];
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let gx = px(x + 1, y) - px(x - 1, y);
            let gy = px(x, y + 1) - px(x, y - 1);
            let edge = (gx * gx + gy * gy).sqrt();

            let (mut sum, mut sum_sq) = (0.0, 0.0);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let v = px(x + dx, y + dy);
                    sum += v;
                    sum_sq += v * v;
                }
            }
            let mean = sum / 9.0;
            let variance = sum_sq / 9.0 - mean * mean;

            map[(y as u32 * w + x as u32) as usize] = edge * 0.6 + variance * 0.4;
        }
    }
    map
}

/// Summed-area table for O(1) window sums.
struct SummedArea {
    stride: usize,
    data: Vec<f64>,
}

impl SummedArea {
    fn new(values: &[f64], w: u32, h: u32) -> Self {
        let stride = w as usize + 1;
        let mut data = vec![0.0; stride * (h as usize + 1)];
        for y in 0..h as usize {
            let mut row = 0.0;
            for x in 0..w as usize {
                row += values[y * w as usize + x];
                data[(y + 1) * stride + x + 1] = data[y * stride + x + 1] + row;
            }
        }
        Self { stride, data }
    }

    fn sum(&self, x: u32, y: u32, w: u32, h: u32) -> f64 {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        let at = |x: usize, y: usize| self.data[y * self.stride + x];
        at(x1, y1) - at(x0, y1) - at(x1, y0) + at(x0, y0)
    }
}
