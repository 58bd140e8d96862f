//! [`TransformProcessor`]: turns a [`TransformSpec`] into a filter pipeline and runs it.
//!
//! Pipeline ordering is fixed:
//!
//! 1. A non-zero rotation always comes first, so resize targets apply to the
//!    rotated canvas.
//! 2. The action adds its geometry filters:
//!    - `resize` → [`Filter::Resize`]
//!    - `fill` with a named anchor → [`Filter::ResizeToFill`]
//!    - `fill` with [`Anchor::Smart`] → [`Filter::Crop`] at the rectangle from
//!      the [`SmartCropper`], then [`Filter::Resize`]. Cropping first fixes the
//!      aspect ratio before resampling.
//!    - `fit` → [`Filter::ResizeToFit`]
//!
//! The processor holds only read-only configuration and is shared freely
//! between threads.

use super::codec::EncodeOptions;
use super::error::Result;
use super::filters::{Filter, chain_bounds};
use super::format::Format;
use super::handle::ImageHandle;
use super::params::{Action, Quality, TransformSpec};
use super::smartcrop::{SaliencyCropper, SmartCropper};
use crate::config::ImagingConfig;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage, imageops};
use std::borrow::Cow;
use std::io::Write;

/// Applies transformations with shared defaults.
pub struct TransformProcessor {
    config: ImagingConfig,
    cropper: Box<dyn SmartCropper>,
}

impl TransformProcessor {
    pub fn new(config: ImagingConfig) -> Self {
        Self::with_cropper(config, SaliencyCropper::new())
    }

    /// Use a custom smart-crop implementation.
    pub fn with_cropper(config: ImagingConfig, cropper: impl SmartCropper + 'static) -> Self {
        Self {
            config,
            cropper: Box::new(cropper),
        }
    }

    pub fn config(&self) -> &ImagingConfig {
        &self.config
    }

    /// A spec for `action` carrying the configured quality, kernel and anchor.
    pub fn default_spec_for(&self, action: Action) -> TransformSpec {
        TransformSpec {
            quality: Quality::new(self.config.quality),
            filter: self.config.resample_filter,
            anchor: self.config.anchor,
            ..TransformSpec::new(action)
        }
    }

    /// Build a spec from an action name and an option string, on top of the defaults.
    pub fn parse_spec(&self, action: &str, options: &str) -> Result<TransformSpec> {
        let action: Action = action.parse()?;
        self.default_spec_for(action).with_options(options)
    }

    /// Decide the ordered filters for `spec` against `src`.
    ///
    /// The spec is validated first, so a hand-built spec with a missing
    /// dimension fails here instead of producing a degenerate image. Only the
    /// smart-crop branch looks at the pixels.
    pub fn build_filter_pipeline(
        &self,
        src: &DynamicImage,
        spec: &TransformSpec,
    ) -> Result<Vec<Filter>> {
        spec.validate()?;
        let mut filters = Vec::with_capacity(3);

        if spec.rotate != 0 {
            filters.push(Filter::Rotate {
                degrees: spec.rotate,
            });
        }

        let (width, height, filter) = (spec.width, spec.height, spec.filter);
        match spec.action {
            Action::Resize => filters.push(Filter::Resize {
                width,
                height,
                filter,
            }),
            Action::Fill if spec.anchor.is_smart() => {
                let rect = self.cropper.crop_bounds(src, width, height, filter)?;
                filters.push(Filter::Crop { rect });
                filters.push(Filter::Resize {
                    width,
                    height,
                    filter,
                });
            }
            Action::Fill => filters.push(Filter::ResizeToFill {
                width,
                height,
                filter,
                anchor: spec.anchor,
            }),
            Action::Fit => filters.push(Filter::ResizeToFit {
                width,
                height,
                filter,
            }),
        }

        tracing::debug!(action = %spec.action, filters = filters.len(), "built filter pipeline");
        Ok(filters)
    }

    /// Run `filters` over `src` into a fresh RGBA canvas sized by the chain.
    pub fn run_pipeline(&self, src: &DynamicImage, filters: &[Filter]) -> DynamicImage {
        let (width, height) = chain_bounds(filters, src.dimensions());
        let mut dst = RgbaImage::new(width, height);

        let filtered = filters
            .iter()
            .fold(Cow::Borrowed(src), |img, f| Cow::Owned(f.apply(&img)));
        imageops::replace(&mut dst, &filtered.to_rgba8(), 0, 0);

        DynamicImage::ImageRgba8(dst)
    }

    pub fn apply_transform(&self, src: &DynamicImage, spec: &TransformSpec) -> Result<DynamicImage> {
        let filters = self.build_filter_pipeline(src, spec)?;
        Ok(self.run_pipeline(src, &filters))
    }

    /// Decode `handle`, transform it, and wrap the result in a new handle.
    ///
    /// The new handle takes the transform's target format when one is set.
    pub fn process(&self, handle: &ImageHandle, spec: &TransformSpec) -> Result<Processed> {
        let src = handle.decode()?;
        let pixels = self.apply_transform(&src, spec)?;
        let format = spec.target_format.unwrap_or(handle.format());
        Ok(Processed {
            handle: ImageHandle::from_image(format, &pixels),
            pixels,
            options: EncodeOptions::new(spec.quality),
        })
    }
}

/// Output of [`TransformProcessor::process`], ready to encode.
#[derive(Debug)]
pub struct Processed {
    pub handle: ImageHandle,
    pub pixels: DynamicImage,
    pub options: EncodeOptions,
}

impl Processed {
    pub fn format(&self) -> Format {
        self.handle.format()
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        let target: ImageFormat = self.format().into();
        self.handle.encode_to(target, &self.options, &self.pixels, w)
    }
}
