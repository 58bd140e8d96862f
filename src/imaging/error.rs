//! Error type shared by the imaging core.
//!
//! [`ImageError`] is `Clone` because a failed dimension lookup is stored in the
//! handle's once-cell and handed back to every caller that asks again. Causes
//! that are not themselves `Clone` (I/O and codec errors) are kept behind an
//! [`Arc`].

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ImageError {
    #[error("failed to open image source: {0}")]
    SourceOpen(Arc<std::io::Error>),
    #[error("failed to load image config: {0}")]
    Config(#[source] Arc<ImageError>),
    #[error("failed to decode image: {0}")]
    Decode(Arc<image::ImageError>),
    #[error("format not supported: {0}")]
    UnsupportedFormat(String),
    #[error("unsupported action: {0:?}")]
    UnsupportedAction(String),
    #[error("smart crop failed: {0}")]
    SmartCrop(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("invalid image spec: {0}")]
    InvalidSpec(String),
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),
}

impl ImageError {
    /// Wrap a dimension-resolution failure.
    pub(crate) fn config(cause: ImageError) -> Self {
        ImageError::Config(Arc::new(cause))
    }

    pub(crate) fn encode(cause: impl std::fmt::Display) -> Self {
        ImageError::Encode(cause.to_string())
    }
}

impl From<std::io::Error> for ImageError {
    fn from(err: std::io::Error) -> Self {
        ImageError::Io(Arc::new(err))
    }
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Decode(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ImageError>;
