//! Deterministic file names for processed images.
//!
//! An output name combines the source stem, a short hash over the source
//! content and the transform key, and the key itself:
//!
//! ```text
//! sunset_hu3f2a9c01d4e7_fill_300x200_q75_lanczos_smart.jpg
//! ```
//!
//! Changing either the source bytes or any transform parameter produces a
//! different name, so processed files can be cached by name alone.

use crate::imaging::{Format, TransformSpec};
use sha2::{Digest, Sha256};

/// Hex characters of the combined hash kept in file names.
const NAME_HASH_LEN: usize = 12;

/// SHA-256 of the source bytes, hex-encoded.
pub fn source_digest(bytes: &[u8]) -> String {
    hex(&Sha256::digest(bytes))
}

/// Output file name for `spec` applied to a source named `stem`.
///
/// The extension follows `format`, which callers pick from the transform's target
/// format or the source format.
pub fn processed_file_name(
    stem: &str,
    source_digest: &str,
    spec: &TransformSpec,
    format: Format,
) -> String {
    let key = spec.key();
    let mut hasher = Sha256::new();
    hasher.update(source_digest.as_bytes());
    hasher.update(b"\0");
    hasher.update(key.as_bytes());
    let hash = hex(&hasher.finalize());

    format!(
        "{stem}_hu{}_{key}.{}",
        &hash[..NAME_HASH_LEN],
        format.extension()
    )
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Action, Anchor};

    fn fill() -> TransformSpec {
        TransformSpec::new(Action::Fill)
            .with_size(300, 200)
            .with_anchor(Anchor::Center)
    }

    #[test]
    fn source_digest_is_sha256_hex() {
        assert_eq!(
            source_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn name_has_stem_hash_key_and_extension() {
        let name = processed_file_name("sunset", &source_digest(b"abc"), &fill(), Format::Jpeg);
        assert!(name.starts_with("sunset_hu"));
        assert!(name.ends_with("_fill_300x200_q75_lanczos_center.jpg"));
        let hash = &name["sunset_hu".len().."sunset_hu".len() + NAME_HASH_LEN];
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn name_is_deterministic() {
        let digest = source_digest(b"abc");
        assert_eq!(
            processed_file_name("a", &digest, &fill(), Format::Png),
            processed_file_name("a", &digest, &fill(), Format::Png)
        );
    }

    #[test]
    fn name_changes_with_source() {
        let a = processed_file_name("a", &source_digest(b"one"), &fill(), Format::Png);
        let b = processed_file_name("a", &source_digest(b"two"), &fill(), Format::Png);
        assert_ne!(a, b);
    }

    #[test]
    fn name_changes_with_parameters() {
        let digest = source_digest(b"abc");
        let a = processed_file_name("a", &digest, &fill(), Format::Png);
        let b = processed_file_name("a", &digest, &fill().with_rotate(90), Format::Png);
        assert_ne!(a, b);
    }

    #[test]
    fn extension_follows_format() {
        let digest = source_digest(b"abc");
        assert!(processed_file_name("a", &digest, &fill(), Format::Tiff).ends_with(".tif"));
        assert!(processed_file_name("a", &digest, &fill(), Format::Bmp).ends_with(".bmp"));
    }
}
