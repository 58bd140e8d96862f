//! Shared test utilities for the site-image test suite.
//!
//! Provides synthetic images, encoded fixtures, and [`SourceSpec`] stubs that
//! count how often they are opened and whether every stream they hand out has
//! been released.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = CountingSource::new(encoded(Format::Png, 40, 30));
//! let handle = ImageHandle::from_spec(Format::Png, source.clone());
//! assert_eq!(handle.width().unwrap(), 40);
//! assert_eq!(source.opens(), 1);
//! assert_eq!(source.open_streams(), 0);
//! ```

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, Rgba, RgbaImage};

use crate::imaging::codec::{EncodeOptions, encode_to};
use crate::imaging::{Format, ReadSeek, SourceSpec};

// =========================================================================
// Synthetic images
// =========================================================================

/// A single-colour RGBA image.
pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// A solid opaque image encoded as `format`.
pub fn encoded(format: Format, width: u32, height: u32) -> Vec<u8> {
    let img = solid_rgba(width, height, [90, 140, 200, 255]);
    let mut out = Vec::new();
    encode_to(format.into(), &EncodeOptions::default(), &img, &mut out).unwrap();
    out
}

// =========================================================================
// Source stubs
// =========================================================================

/// In-memory source that counts opens and tracks live streams.
#[derive(Debug)]
pub struct CountingSource {
    bytes: Arc<[u8]>,
    opens: AtomicUsize,
    live: Arc<AtomicUsize>,
}

impl CountingSource {
    pub fn new(bytes: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            bytes: bytes.into(),
            opens: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of times `open` was called.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Streams handed out and not yet dropped.
    pub fn open_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl SourceSpec for CountingSource {
    fn open(&self) -> io::Result<Box<dyn ReadSeek>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        // Widen the window in which concurrent callers would race.
        std::thread::sleep(std::time::Duration::from_millis(20));
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedStream {
            inner: Cursor::new(self.bytes.clone()),
            live: self.live.clone(),
        }))
    }
}

struct TrackedStream {
    inner: Cursor<Arc<[u8]>>,
    live: Arc<AtomicUsize>,
}

impl Read for TrackedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for TrackedStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Source whose `open` always fails.
#[derive(Debug, Default)]
pub struct FailingSource {
    opens: AtomicUsize,
}

impl FailingSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl SourceSpec for FailingSource {
    fn open(&self) -> io::Result<Box<dyn ReadSeek>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(20));
        Err(io::Error::new(io::ErrorKind::NotFound, "source is gone"))
    }
}
