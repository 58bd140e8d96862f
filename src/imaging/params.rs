//! Parameter types for image transformations.
//!
//! These describe *what* to do to an image, not *how*. A [`TransformSpec`] is
//! built from processor defaults ([`TransformProcessor::default_spec_for`]) and
//! then refined from an option string such as `"300x200 q80 r90 TopLeft"`.
//!
//! ## Option tokens
//!
//! Tokens are whitespace separated and case-insensitive:
//!
//! | Token | Meaning |
//! |---|---|
//! | `300x200`, `300x`, `x200` | target width and/or height |
//! | `q80` | encode quality (1–100) |
//! | `r90`, `r-45` | counter-clockwise rotation in degrees |
//! | `center`, `topleft`, … `smart` | crop anchor for `fill` |
//! | `lanczos`, `linear`, `nearest`, … | resampling filter |
//! | `jpg`, `png`, `gif`, `tif`, `bmp` | target format |
//!
//! [`TransformProcessor::default_spec_for`]: super::processor::TransformProcessor::default_spec_for

use super::error::{ImageError, Result};
use super::format::Format;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// What a transformation does to the image geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Scale to exact dimensions; a zero dimension is derived from the aspect ratio.
    Resize,
    /// Scale and crop to exactly fill the box.
    Fill,
    /// Scale down to fit inside the box, preserving aspect ratio.
    Fit,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Resize => "resize",
            Action::Fill => "fill",
            Action::Fit => "fit",
        }
    }
}

impl FromStr for Action {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "resize" => Ok(Action::Resize),
            "fill" => Ok(Action::Fill),
            "fit" => Ok(Action::Fit),
            _ => Err(ImageError::UnsupportedAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a `fill` crop is anchored, or [`Anchor::Smart`] for saliency-based cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Anchor {
    #[default]
    Smart,
    Center,
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

const ANCHORS: &[(&str, Anchor)] = &[
    ("smart", Anchor::Smart),
    ("center", Anchor::Center),
    ("topleft", Anchor::TopLeft),
    ("top", Anchor::Top),
    ("topright", Anchor::TopRight),
    ("left", Anchor::Left),
    ("right", Anchor::Right),
    ("bottomleft", Anchor::BottomLeft),
    ("bottom", Anchor::Bottom),
    ("bottomright", Anchor::BottomRight),
];

impl Anchor {
    pub fn is_smart(self) -> bool {
        self == Anchor::Smart
    }

    fn lookup(name: &str) -> Option<Self> {
        ANCHORS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, a)| *a)
    }

    /// Offset of a `inner`-sized box placed inside `outer` at this anchor.
    ///
    /// `Smart` has no fixed position and is placed like `Center`.
    pub fn offset(self, outer: (u32, u32), inner: (u32, u32)) -> (u32, u32) {
        let dx = outer.0.saturating_sub(inner.0);
        let dy = outer.1.saturating_sub(inner.1);
        let (fx, fy) = match self {
            Anchor::TopLeft => (0, 0),
            Anchor::Top => (1, 0),
            Anchor::TopRight => (2, 0),
            Anchor::Left => (0, 1),
            Anchor::Center | Anchor::Smart => (1, 1),
            Anchor::Right => (2, 1),
            Anchor::BottomLeft => (0, 2),
            Anchor::Bottom => (1, 2),
            Anchor::BottomRight => (2, 2),
        };
        (dx * fx / 2, dy * fy / 2)
    }
}

impl FromStr for Anchor {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s).ok_or_else(|| ImageError::InvalidSpec(format!("unknown anchor {s:?}")))
    }
}

impl TryFrom<String> for Anchor {
    type Error = ImageError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.to_string()
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = ANCHORS
            .iter()
            .find(|(_, a)| a == self)
            .map(|(n, _)| *n)
            .unwrap_or_default();
        f.write_str(name)
    }
}

/// Resampling kernel used when scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResampleFilter {
    Nearest,
    Linear,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos,
}

/// Accepted names, including the aliases other site generators use for kernels
/// the `image` crate approximates with one of its own.
const FILTERS: &[(&str, ResampleFilter)] = &[
    ("nearest", ResampleFilter::Nearest),
    ("nearestneighbor", ResampleFilter::Nearest),
    ("box", ResampleFilter::Nearest),
    ("linear", ResampleFilter::Linear),
    ("triangle", ResampleFilter::Linear),
    ("hermite", ResampleFilter::Linear),
    ("bartlett", ResampleFilter::Linear),
    ("catmullrom", ResampleFilter::CatmullRom),
    ("mitchellnetravali", ResampleFilter::CatmullRom),
    ("bspline", ResampleFilter::CatmullRom),
    ("gaussian", ResampleFilter::Gaussian),
    ("lanczos", ResampleFilter::Lanczos),
    ("hann", ResampleFilter::Lanczos),
    ("hamming", ResampleFilter::Lanczos),
    ("blackman", ResampleFilter::Lanczos),
    ("welch", ResampleFilter::Lanczos),
    ("cosine", ResampleFilter::Lanczos),
];

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Linear => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos => FilterType::Lanczos3,
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        FILTERS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, f)| *f)
    }
}

impl FromStr for ResampleFilter {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s)
            .ok_or_else(|| ImageError::InvalidSpec(format!("unknown resample filter {s:?}")))
    }
}

impl TryFrom<String> for ResampleFilter {
    type Error = ImageError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ResampleFilter> for String {
    fn from(filter: ResampleFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First entry per kernel is its canonical name.
        let name = FILTERS
            .iter()
            .find(|(_, k)| k == self)
            .map(|(n, _)| *n)
            .unwrap_or_default();
        f.write_str(name)
    }
}

/// A declarative transformation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformSpec {
    pub action: Action,
    /// Target width; 0 means "derive from the aspect ratio" where allowed.
    pub width: u32,
    /// Target height; 0 means "derive from the aspect ratio" where allowed.
    pub height: u32,
    /// Counter-clockwise rotation in degrees, normalized to `0..360`.
    pub rotate: i32,
    pub filter: ResampleFilter,
    pub anchor: Anchor,
    pub quality: Quality,
    /// Output format override; `None` keeps the source format.
    pub target_format: Option<Format>,
}

impl TransformSpec {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            width: 0,
            height: 0,
            rotate: 0,
            filter: ResampleFilter::default(),
            anchor: Anchor::default(),
            quality: Quality::default(),
            target_format: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_rotate(mut self, degrees: i32) -> Self {
        self.rotate = degrees.rem_euclid(360);
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Apply an option string on top of this spec and validate the result.
    pub fn with_options(mut self, options: &str) -> Result<Self> {
        for token in options.split_whitespace() {
            self.apply_token(token)?;
        }
        self.validate()?;
        Ok(self)
    }

    fn apply_token(&mut self, token: &str) -> Result<()> {
        let lower = token.to_ascii_lowercase();

        if let Some((w, h)) = parse_size(&lower) {
            self.width = w;
            self.height = h;
        } else if let Some(anchor) = Anchor::lookup(&lower) {
            self.anchor = anchor;
        } else if let Some(filter) = ResampleFilter::lookup(&lower) {
            self.filter = filter;
        } else if let Ok(format) = Format::from_extension(&lower) {
            self.target_format = Some(format);
        } else if let Some(q) = numeric_suffix::<u32>(&lower, 'q') {
            if !(1..=100).contains(&q) {
                return Err(ImageError::InvalidSpec(format!(
                    "quality must be 1-100, got {q}"
                )));
            }
            self.quality = Quality::new(q);
        } else if let Some(r) = numeric_suffix::<i32>(&lower, 'r') {
            self.rotate = r.rem_euclid(360);
        } else {
            return Err(ImageError::InvalidSpec(format!(
                "unrecognized option {token:?}"
            )));
        }
        Ok(())
    }

    /// Check that the dimensions make sense for the action.
    pub fn validate(&self) -> Result<()> {
        match self.action {
            Action::Fill | Action::Fit if self.width == 0 || self.height == 0 => {
                Err(ImageError::InvalidSpec(format!(
                    "{} needs both width and height, got {}x{}",
                    self.action, self.width, self.height
                )))
            }
            Action::Resize if self.width == 0 && self.height == 0 => Err(
                ImageError::InvalidSpec("resize needs a width or a height".into()),
            ),
            _ => Ok(()),
        }
    }

    /// Stable textual key covering every parameter, used for output naming.
    pub fn key(&self) -> String {
        let mut key = format!(
            "{}_{}x{}_q{}",
            self.action,
            self.width,
            self.height,
            self.quality.value()
        );
        if self.rotate != 0 {
            key.push_str(&format!("_r{}", self.rotate));
        }
        key.push_str(&format!("_{}", self.filter));
        if self.action == Action::Fill {
            key.push_str(&format!("_{}", self.anchor));
        }
        if let Some(format) = self.target_format {
            key.push_str(&format!("_{format}"));
        }
        key
    }
}

/// Parse `WxH`, `Wx` or `xH`. Returns `None` if the token is not a size.
fn parse_size(token: &str) -> Option<(u32, u32)> {
    let (w, h) = token.split_once('x')?;
    if w.is_empty() && h.is_empty() {
        return None;
    }
    let dim = |s: &str| -> Option<u32> {
        if s.is_empty() {
            Some(0)
        } else if s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse().ok()
        } else {
            None
        }
    };
    Some((dim(w)?, dim(h)?))
}

fn numeric_suffix<T: FromStr>(token: &str, prefix: char) -> Option<T> {
    token.strip_prefix(prefix)?.parse().ok()
}
