//! Pixel filters a transformation pipeline is made of.
//!
//! A [`Filter`] knows two things: the size it turns a given source size into
//! ([`Filter::bounds`]) and how to produce the pixels ([`Filter::apply`]).
//! Keeping the two apart lets the processor allocate the destination canvas
//! before any pixel work, and lets tests inspect a pipeline without running it.
//!
//! | Filter | Crate / function |
//! |---|---|
//! | Rotate (quarter turns) | `DynamicImage::rotate90/180/270` |
//! | Rotate (other angles) | `imageproc::geometric_transformations::rotate_about_center` |
//! | Resize / fit | `DynamicImage::resize_exact` |
//! | Fill | `resize_exact` + anchored `crop_imm` |
//! | Crop | `DynamicImage::crop_imm` |

use super::calculations::{
    calculate_fill_dimensions, calculate_fit_dimensions, calculate_resize_dimensions,
    calculate_rotated_dimensions,
};
use super::params::{Anchor, ResampleFilter};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};

/// A rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// This rectangle clipped to a `bounds`-sized image.
    pub fn clip(self, bounds: (u32, u32)) -> Self {
        let x0 = self.x.min(bounds.0);
        let y0 = self.y.min(bounds.1);
        let x1 = self.x.saturating_add(self.width).min(bounds.0);
        let y1 = self.y.saturating_add(self.height).min(bounds.1);
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// One step of a transformation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Counter-clockwise rotation, nearest-neighbour sampling, transparent corners.
    Rotate { degrees: i32 },
    /// Scale to exact dimensions (a zero dimension follows the aspect ratio).
    Resize {
        width: u32,
        height: u32,
        filter: ResampleFilter,
    },
    /// Scale to cover the box, then crop to it at `anchor`.
    ResizeToFill {
        width: u32,
        height: u32,
        filter: ResampleFilter,
        anchor: Anchor,
    },
    /// Scale down to fit inside the box.
    ResizeToFit {
        width: u32,
        height: u32,
        filter: ResampleFilter,
    },
    Crop { rect: Rect },
}

impl Filter {
    /// Output size for an input of size `source`.
    pub fn bounds(&self, source: (u32, u32)) -> (u32, u32) {
        if source.0 == 0 || source.1 == 0 {
            return (0, 0);
        }
        match *self {
            Filter::Rotate { degrees } => calculate_rotated_dimensions(source, degrees),
            Filter::Resize { width, height, .. } => {
                calculate_resize_dimensions(source, (width, height))
            }
            Filter::ResizeToFill { width, height, .. } => (width, height),
            Filter::ResizeToFit { width, height, .. } => {
                calculate_fit_dimensions(source, (width, height))
            }
            Filter::Crop { rect } => {
                let clipped = rect.clip(source);
                (clipped.width, clipped.height)
            }
        }
    }

    pub fn apply(&self, img: &DynamicImage) -> DynamicImage {
        let source = img.dimensions();
        let (width, height) = self.bounds(source);
        if (width, height) == (0, 0) {
            return DynamicImage::new_rgba8(0, 0);
        }

        match *self {
            Filter::Rotate { degrees } => rotate(img, degrees),
            Filter::Resize { filter, .. } | Filter::ResizeToFit { filter, .. } => {
                if (width, height) == source {
                    img.clone()
                } else {
                    img.resize_exact(width, height, filter.filter_type())
                }
            }
            Filter::ResizeToFill { filter, anchor, .. } => {
                let (fill_w, fill_h) = calculate_fill_dimensions(source, (width, height));
                let filled = if (fill_w, fill_h) == source {
                    img.clone()
                } else {
                    img.resize_exact(fill_w, fill_h, filter.filter_type())
                };
                let (x, y) = anchor.offset((fill_w, fill_h), (width, height));
                filled.crop_imm(x, y, width, height)
            }
            Filter::Crop { rect } => {
                let r = rect.clip(source);
                img.crop_imm(r.x, r.y, r.width, r.height)
            }
        }
    }
}

/// Output size of running `filters` in order over a `source`-sized image.
pub fn chain_bounds(filters: &[Filter], source: (u32, u32)) -> (u32, u32) {
    filters.iter().fold(source, |size, f| f.bounds(size))
}

fn rotate(img: &DynamicImage, degrees: i32) -> DynamicImage {
    // The image crate's quarter turns are clockwise.
    match degrees.rem_euclid(360) {
        0 => img.clone(),
        90 => img.rotate270(),
        180 => img.rotate180(),
        270 => img.rotate90(),
        d => {
            let src = img.to_rgba8();
            let (w, h) = calculate_rotated_dimensions(img.dimensions(), d);
            // The rotated box can be narrower or shorter than the source, so the
            // working canvas must hold both.
            let (pad_w, pad_h) = (w.max(src.width()), h.max(src.height()));
            let mut canvas = RgbaImage::from_pixel(pad_w, pad_h, Rgba([0, 0, 0, 0]));
            let x = (pad_w - src.width()) / 2;
            let y = (pad_h - src.height()) / 2;
            imageops::overlay(&mut canvas, &src, x as i64, y as i64);
            // imageproc rotates clockwise for positive angles
            let theta = -(d as f32).to_radians();
            let rotated = rotate_about_center(
                &canvas,
                theta,
                Interpolation::Nearest,
                Rgba([0, 0, 0, 0]),
            );
            let cx = (pad_w - w) / 2;
            let cy = (pad_h - h) / 2;
            DynamicImage::ImageRgba8(imageops::crop_imm(&rotated, cx, cy, w, h).to_image())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::solid_rgba;

    #[test]
    fn rect_clip_to_bounds() {
        assert_eq!(Rect::new(50, 50, 100, 100).clip((120, 80)), Rect::new(50, 50, 70, 30));
        assert_eq!(Rect::new(200, 0, 10, 10).clip((100, 100)).width, 0);
    }

    #[test]
    fn chain_bounds_follows_every_step() {
        let filters = vec![
            Filter::Rotate { degrees: 90 },
            Filter::Resize {
                width: 100,
                height: 0,
                filter: ResampleFilter::Lanczos,
            },
        ];
        // 400x200 → rotated 200x400 → width 100 keeps 1:2 → 100x200
        assert_eq!(chain_bounds(&filters, (400, 200)), (100, 200));
    }

    #[test]
    fn quarter_rotation_is_counter_clockwise() {
        // Mark the top-left pixel; after a CCW quarter turn it sits bottom-left.
        let mut img = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let rotated = Filter::Rotate { degrees: 90 }.apply(&DynamicImage::ImageRgba8(img));

        assert_eq!(rotated.dimensions(), (2, 4));
        assert_eq!(rotated.get_pixel(0, 3), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn arbitrary_rotation_grows_canvas_with_transparent_corners() {
        let img = solid_rgba(100, 100, [10, 20, 30, 255]);
        let rotated = Filter::Rotate { degrees: 45 }.apply(&img);

        assert_eq!(rotated.dimensions(), (142, 142));
        assert_eq!(rotated.get_pixel(0, 0)[3], 0);
        assert_eq!(rotated.get_pixel(71, 71), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn arbitrary_rotation_of_wide_image_keeps_predicted_bounds() {
        // 400x100 at 30° has a bounding box narrower than the source.
        let img = solid_rgba(400, 100, [10, 20, 30, 255]);
        let filter = Filter::Rotate { degrees: 30 };
        let expected = filter.bounds((400, 100));
        assert_eq!(expected, (397, 287));

        let rotated = filter.apply(&img);
        assert_eq!(rotated.dimensions(), expected);
        assert_eq!(rotated.get_pixel(198, 143), Rgba([10, 20, 30, 255]));
        assert_eq!(rotated.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn arbitrary_rotation_of_tall_image_keeps_predicted_bounds() {
        let img = solid_rgba(60, 300, [200, 0, 0, 255]);
        let filter = Filter::Rotate { degrees: 45 };
        let rotated = filter.apply(&img);
        assert_eq!(rotated.dimensions(), filter.bounds((60, 300)));
    }

    #[test]
    fn resize_to_fill_produces_exact_box() {
        let img = solid_rgba(800, 600, [200, 100, 50, 255]);
        let out = Filter::ResizeToFill {
            width: 400,
            height: 500,
            filter: ResampleFilter::Linear,
            anchor: Anchor::TopLeft,
        }
        .apply(&img);
        assert_eq!(out.dimensions(), (400, 500));
    }

    #[test]
    fn resize_to_fill_respects_anchor() {
        // Left half red, right half blue; a square fill anchored right keeps blue.
        let img = RgbaImage::from_fn(200, 100, |x, _| {
            if x < 100 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let out = Filter::ResizeToFill {
            width: 50,
            height: 50,
            filter: ResampleFilter::Nearest,
            anchor: Anchor::Right,
        }
        .apply(&DynamicImage::ImageRgba8(img));

        assert_eq!(out.get_pixel(25, 25), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn resize_to_fit_keeps_aspect() {
        let img = solid_rgba(800, 600, [0, 0, 0, 255]);
        let out = Filter::ResizeToFit {
            width: 200,
            height: 200,
            filter: ResampleFilter::Lanczos,
        }
        .apply(&img);
        assert_eq!(out.dimensions(), (200, 150));
    }

    #[test]
    fn crop_is_clipped_to_image() {
        let img = solid_rgba(100, 100, [0, 0, 0, 255]);
        let out = Filter::Crop {
            rect: Rect::new(60, 60, 100, 100),
        }
        .apply(&img);
        assert_eq!(out.dimensions(), (40, 40));
    }
}
