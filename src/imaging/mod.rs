//! Image resources for site builds: lazy dimensions, transforms, encoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Dimensions** | `ImageReader::into_dimensions` (header only, once per handle) |
//! | **Resize / fill / fit** | `image::imageops` with the configured kernel |
//! | **Rotate** | `image` quarter turns, `imageproc` for other angles |
//! | **Smart crop** | edge + variance saliency over a summed-area table |
//! | **Encode** | `image` encoders; `tiff` for deflate-compressed TIFF |
//!
//! The module is split into:
//! - **Handle**: [`ImageHandle`] and the [`SourceSpec`] byte providers
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: [`TransformSpec`] and the option-string vocabulary
//! - **Filters**: [`Filter`] steps with their output bounds
//! - **Processor**: [`TransformProcessor`], which builds and runs pipelines
//! - **Codec**: format dispatch for encoding

pub mod calculations;
pub mod codec;
mod error;
pub mod filters;
mod format;
pub mod handle;
mod params;
pub mod processor;
pub mod smartcrop;

pub use codec::EncodeOptions;
pub use error::{ImageError, Result};
pub use filters::{Filter, Rect};
pub use format::Format;
pub use handle::{BytesSource, Dimensions, FileSource, ImageHandle, ReadSeek, SourceSpec};
pub use params::{Action, Anchor, Quality, ResampleFilter, TransformSpec};
pub use processor::{Processed, TransformProcessor};
pub use smartcrop::{SaliencyCropper, SmartCropper};
