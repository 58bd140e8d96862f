//! Raster formats a handle can carry and be encoded to.

use super::error::{ImageError, Result};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// An image file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Jpeg,
    Png,
    Gif,
    Tiff,
    Bmp,
}

/// Extension → format table. The first extension listed for a format is its
/// canonical one.
const EXTENSIONS: &[(&str, Format)] = &[
    ("jpg", Format::Jpeg),
    ("jpeg", Format::Jpeg),
    ("png", Format::Png),
    ("gif", Format::Gif),
    ("tif", Format::Tiff),
    ("tiff", Format::Tiff),
    ("bmp", Format::Bmp),
];

impl Format {
    /// Look up a format by file extension (case-insensitive, leading dot allowed).
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext = ext.trim_start_matches('.');
        EXTENSIONS
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, f)| *f)
            .ok_or_else(|| ImageError::UnsupportedFormat(ext.to_string()))
    }

    /// Look up a format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ImageError::UnsupportedFormat(format!("{} has no extension", path.display()))
        })?;
        Self::from_extension(ext)
    }

    /// Narrow an `image` crate format to the ones this crate encodes.
    pub fn from_image_format(format: ImageFormat) -> Result<Self> {
        match format {
            ImageFormat::Jpeg => Ok(Format::Jpeg),
            ImageFormat::Png => Ok(Format::Png),
            ImageFormat::Gif => Ok(Format::Gif),
            ImageFormat::Tiff => Ok(Format::Tiff),
            ImageFormat::Bmp => Ok(Format::Bmp),
            other => Err(ImageError::UnsupportedFormat(format!("{other:?}"))),
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Format::Jpeg => ImageFormat::Jpeg,
            Format::Png => ImageFormat::Png,
            Format::Gif => ImageFormat::Gif,
            Format::Tiff => ImageFormat::Tiff,
            Format::Bmp => ImageFormat::Bmp,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        EXTENSIONS
            .iter()
            .find(|(_, f)| *f == self)
            .map(|(e, _)| *e)
            .unwrap_or_default()
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Jpeg => "image/jpeg",
            Format::Png => "image/png",
            Format::Gif => "image/gif",
            Format::Tiff => "image/tiff",
            Format::Bmp => "image/bmp",
        }
    }
}

impl From<Format> for ImageFormat {
    fn from(format: Format) -> Self {
        format.image_format()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_extension_is_case_insensitive() {
        assert_eq!(Format::from_extension("JPG").unwrap(), Format::Jpeg);
        assert_eq!(Format::from_extension(".tiff").unwrap(), Format::Tiff);
        assert_eq!(Format::from_extension("Bmp").unwrap(), Format::Bmp);
    }

    #[test]
    fn from_extension_rejects_unknown() {
        assert!(matches!(
            Format::from_extension("webp"),
            Err(ImageError::UnsupportedFormat(ext)) if ext == "webp"
        ));
    }

    #[test]
    fn from_path_uses_extension() {
        assert_eq!(
            Format::from_path(Path::new("content/001-dawn.jpeg")).unwrap(),
            Format::Jpeg
        );
        assert!(Format::from_path(Path::new("content/README")).is_err());
    }

    #[test]
    fn canonical_extensions() {
        assert_eq!(Format::Jpeg.extension(), "jpg");
        assert_eq!(Format::Tiff.extension(), "tif");
        assert_eq!(Format::Gif.to_string(), "gif");
    }

    #[test]
    fn image_format_round_trips_for_supported() {
        for format in [Format::Jpeg, Format::Png, Format::Gif, Format::Tiff, Format::Bmp] {
            assert_eq!(Format::from_image_format(format.into()).unwrap(), format);
        }
        assert!(Format::from_image_format(ImageFormat::WebP).is_err());
    }
}
