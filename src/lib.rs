//! # site-image
//!
//! Image resources for static site builds. An [`imaging::ImageHandle`] wraps
//! one logical image: its format, where its bytes come from, and its pixel
//! dimensions, which are read from the header the first time anyone asks and
//! never again. A [`imaging::TransformProcessor`] turns `resize`, `fill` and
//! `fit` requests into a filter pipeline, runs it, and encodes the result as
//! JPEG, PNG, GIF, TIFF or BMP.
//!
//! ```text
//! ImageHandle ──dimensions()──▶ header decode (once, cached, shared)
//!      │
//!      └─decode()──▶ TransformProcessor ──▶ [Rotate] → Crop/Resize/Fill/Fit
//!                                            │
//!                                            └──▶ codec::encode_to(format)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Handles, transform specs, filters, smart crop, encoding |
//! | [`config`] | `imaging.toml` loading, validation, merging, stock defaults |
//! | [`naming`] | Deterministic output file names from source digest + transform key |
//!
//! # Design Decisions
//!
//! ## Lazy, Shared Dimensions
//!
//! Page templates ask for width and height far more often than they transform
//! pixels. Handles resolve dimensions from the header only, at most once, even
//! when many threads ask at the same moment; a failure is remembered the same
//! way and reported to every caller.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate family. No system
//! libraries, so the binary runs anywhere it builds.
//!
//! ## Content-Addressed Output Names
//!
//! [`naming::processed_file_name`] hashes the source bytes together with every
//! transform parameter. A rebuild can skip any output whose name already exists.

pub mod config;
pub mod imaging;
pub mod naming;

#[cfg(test)]
pub(crate) mod test_helpers;
