//! [`ImageHandle`]: one logical image with lazily resolved dimensions.
//!
//! A handle is either built from decoded pixels, in which case its dimensions
//! are known up front, or from a [`SourceSpec`] that can open the image bytes.
//! In the second case the first call to [`ImageHandle::width`],
//! [`ImageHandle::height`] or [`ImageHandle::dimensions`] opens the source,
//! decodes only the header and stores the result.
//!
//! The result is held in a [`OnceLock`]: concurrent first callers block on a
//! single decode and all observe its outcome. Failures are stored too, so a
//! handle whose source is broken keeps returning the same
//! [`ImageError::Config`] without touching the source again. Retrying means
//! building a new handle ([`ImageHandle::with_spec`]).

use super::codec::{self, EncodeOptions};
use super::error::{ImageError, Result};
use super::format::Format;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, Write};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(img: &DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A readable, seekable byte stream. Dropping it releases the underlying resource.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Something that can open the bytes of an image.
pub trait SourceSpec: Send + Sync + fmt::Debug {
    fn open(&self) -> io::Result<Box<dyn ReadSeek>>;
}

/// An image file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SourceSpec for FileSource {
    fn open(&self) -> io::Result<Box<dyn ReadSeek>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}

/// Image bytes already in memory, shared between handles.
#[derive(Clone)]
pub struct BytesSource {
    bytes: Arc<[u8]>,
}

impl BytesSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for BytesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BytesSource")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SourceSpec for BytesSource {
    fn open(&self) -> io::Result<Box<dyn ReadSeek>> {
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }
}

/// One logical image: its format, where its bytes come from, and its size.
///
/// Handles are never changed after construction; the `with_*` methods return
/// new handles.
#[derive(Debug)]
pub struct ImageHandle {
    format: Format,
    spec: Option<Arc<dyn SourceSpec>>,
    config: OnceLock<Result<Dimensions>>,
}

impl ImageHandle {
    /// Wrap already-decoded pixels. Dimensions are known immediately.
    pub fn from_image(format: Format, img: &DynamicImage) -> Self {
        Self {
            format,
            spec: None,
            config: OnceLock::from(Ok(Dimensions::of(img))),
        }
    }

    /// Wrap a byte source. Dimensions are resolved on first query.
    pub fn from_spec(format: Format, spec: Arc<dyn SourceSpec>) -> Self {
        Self {
            format,
            spec: Some(spec),
            config: OnceLock::new(),
        }
    }

    /// Open a file, taking the format from its extension.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = Format::from_path(&path)?;
        Ok(Self::from_spec(format, Arc::new(FileSource::new(path))))
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn spec(&self) -> Option<&Arc<dyn SourceSpec>> {
        self.spec.as_ref()
    }

    /// Whether the dimensions have been resolved (successfully or not).
    pub fn is_resolved(&self) -> bool {
        self.config.get().is_some()
    }

    pub fn width(&self) -> Result<u32> {
        self.dimensions().map(|d| d.width)
    }

    pub fn height(&self) -> Result<u32> {
        self.dimensions().map(|d| d.height)
    }

    pub fn dimensions(&self) -> Result<Dimensions> {
        self.config.get_or_init(|| self.load_config()).clone()
    }

    /// Decode the header from the source. Runs at most once per handle.
    fn load_config(&self) -> Result<Dimensions> {
        let spec = self.spec.as_ref().ok_or_else(|| {
            ImageError::config(ImageError::SourceOpen(Arc::new(io::Error::new(
                io::ErrorKind::NotFound,
                "image has no source",
            ))))
        })?;

        // The stream is owned by the reader and dropped on every return path.
        let stream = spec
            .open()
            .map_err(|e| ImageError::config(ImageError::SourceOpen(Arc::new(e))))?;
        let (width, height) = ImageReader::new(BufReader::new(stream))
            .with_guessed_format()
            .map_err(|e| ImageError::config(e.into()))?
            .into_dimensions()
            .map_err(|e| ImageError::config(e.into()))?;

        tracing::debug!(format = %self.format, width, height, "resolved image dimensions");
        Ok(Dimensions { width, height })
    }

    /// Decode the full image from the source.
    ///
    /// Not cached: every call reads the source again.
    pub fn decode(&self) -> Result<DynamicImage> {
        let spec = self.spec.as_ref().ok_or_else(|| {
            ImageError::SourceOpen(Arc::new(io::Error::new(
                io::ErrorKind::NotFound,
                "image has no source",
            )))
        })?;
        let stream = spec
            .open()
            .map_err(|e| ImageError::SourceOpen(Arc::new(e)))?;
        let reader = ImageReader::new(BufReader::new(stream)).with_guessed_format()?;
        if let Some(found) = reader.format() {
            let found = Format::from_image_format(found)?;
            if found != self.format {
                tracing::debug!(
                    declared = %self.format,
                    %found,
                    "source content differs from declared format"
                );
            }
        }
        Ok(reader.decode()?)
    }

    /// Encode `img` as `target` into `w`. The handle itself is not changed.
    pub fn encode_to<W: Write>(
        &self,
        target: ImageFormat,
        options: &EncodeOptions,
        img: &DynamicImage,
        w: &mut W,
    ) -> Result<()> {
        codec::encode_to(target, options, img, w)
    }

    /// Encode `img` in this handle's own format.
    pub fn encode<W: Write>(
        &self,
        options: &EncodeOptions,
        img: &DynamicImage,
        w: &mut W,
    ) -> Result<()> {
        self.encode_to(self.format.into(), options, img, w)
    }

    /// A new handle for `img`: same format, no source, dimensions known.
    pub fn with_image(&self, img: &DynamicImage) -> Self {
        Self::from_image(self.format, img)
    }

    /// A new handle reading from `spec`: same format, dimensions unresolved.
    pub fn with_spec(&self, spec: Arc<dyn SourceSpec>) -> Self {
        Self::from_spec(self.format, spec)
    }
}
