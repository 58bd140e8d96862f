//! Format-specific encoding.
//!
//! | Format | Encoder | Settings |
//! |---|---|---|
//! | JPEG | `image::codecs::jpeg::JpegEncoder` | quality from [`EncodeOptions`] |
//! | PNG | `image::codecs::png::PngEncoder` | default compression, adaptive filter |
//! | GIF | `image::codecs::gif::GifEncoder` | palette of at most [`GIF_MAX_COLORS`] |
//! | TIFF | `tiff::encoder::TiffEncoder` | deflate + horizontal predictor |
//! | BMP | `image::codecs::bmp::BmpEncoder` | uncompressed |
//!
//! Dispatch is on [`image::ImageFormat`]; anything outside the table is
//! rejected with [`ImageError::UnsupportedFormat`].

use super::error::{ImageError, Result};
use super::params::Quality;
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, Frame, ImageFormat, Rgb, RgbImage, RgbaImage};
use std::borrow::Cow;
use std::io::{Cursor, Write};
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tiff::tags::Predictor;

/// Colour ceiling of a GIF palette.
pub const GIF_MAX_COLORS: usize = 256;

/// Encoder settings that vary per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    pub quality: Quality,
}

impl EncodeOptions {
    pub fn new(quality: Quality) -> Self {
        Self { quality }
    }
}

/// Serialize `img` as `format` into `w`.
pub fn encode_to<W: Write>(
    format: ImageFormat,
    options: &EncodeOptions,
    img: &DynamicImage,
    w: &mut W,
) -> Result<()> {
    tracing::debug!(
        ?format,
        width = img.width(),
        height = img.height(),
        quality = options.quality.value(),
        "encoding image"
    );
    match format {
        ImageFormat::Jpeg => encode_jpeg(img, options.quality, w),
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(w, CompressionType::Default, PngFilter::Adaptive);
            integer_pixels(img)
                .write_with_encoder(encoder)
                .map_err(ImageError::encode)
        }
        ImageFormat::Gif => encode_gif(img, w),
        ImageFormat::Tiff => encode_tiff(img, w),
        ImageFormat::Bmp => {
            let pixels = match img {
                DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(img),
                other if other.color().has_alpha() => {
                    Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8()))
                }
                other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
            };
            pixels
                .write_with_encoder(BmpEncoder::new(w))
                .map_err(ImageError::encode)
        }
        other => Err(ImageError::UnsupportedFormat(format!("{other:?}"))),
    }
}

fn encode_jpeg<W: Write>(img: &DynamicImage, quality: Quality, w: &mut W) -> Result<()> {
    let encoder = JpegEncoder::new_with_quality(w, quality.value().clamp(1, 100) as u8);
    jpeg_pixels(img)
        .write_with_encoder(encoder)
        .map_err(ImageError::encode)
}

/// Pixels the JPEG encoder can take directly.
///
/// Opaque RGBA only needs its alpha channel dropped. Anything with real
/// transparency is premultiplied first, so transparent areas come out black
/// instead of showing whatever colour they happened to carry.
fn jpeg_pixels(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => Cow::Borrowed(img),
        DynamicImage::ImageRgba8(rgba) if is_opaque(rgba) => {
            Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8()))
        }
        other if !other.color().has_alpha() => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
        other => Cow::Owned(DynamicImage::ImageRgb8(premultiply(&other.to_rgba8()))),
    }
}

pub(crate) fn is_opaque(rgba: &RgbaImage) -> bool {
    rgba.pixels().all(|p| p[3] == u8::MAX)
}

fn premultiply(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let p = rgba.get_pixel(x, y);
        let a = p[3] as u32;
        let channel = |c: u8| ((c as u32 * a + 127) / 255) as u8;
        Rgb([channel(p[0]), channel(p[1]), channel(p[2])])
    })
}

/// Float images have no PNG representation; bring them down to 8-bit.
fn integer_pixels(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8()))
        }
        _ => Cow::Borrowed(img),
    }
}

fn encode_gif<W: Write>(img: &DynamicImage, w: &mut W) -> Result<()> {
    // The encoder quantizes each frame to a palette of GIF_MAX_COLORS entries.
    tracing::trace!(max_colors = GIF_MAX_COLORS, "quantizing GIF frame");
    let mut encoder = GifEncoder::new(w);
    encoder
        .encode_frame(Frame::new(img.to_rgba8()))
        .map_err(ImageError::encode)
}

/// TIFF needs a seekable writer, so the file is built in memory first.
fn encode_tiff<W: Write>(img: &DynamicImage, w: &mut W) -> Result<()> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf)
            .map_err(ImageError::encode)?
            .with_compression(Compression::Deflate(DeflateLevel::Balanced))
            .with_predictor(Predictor::Horizontal);
        let (width, height) = (img.width(), img.height());
        let written = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            encoder.write_image::<colortype::RGBA8>(width, height, rgba.as_raw())
        } else {
            let rgb = img.to_rgb8();
            encoder.write_image::<colortype::RGB8>(width, height, rgb.as_raw())
        };
        written.map_err(ImageError::encode)?;
    }
    w.write_all(buf.get_ref())?;
    Ok(())
}
