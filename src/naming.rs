//! File naming rules for saved images, thumbnails and uploads.
//!
//! ## Output names
//!
//! A saved image is named `<stem><suffix>.<ext>`, where the stem comes from
//! the source file name and the suffix is the chain's token string:
//!
//! - `a.jpg` + `_sep_100x100` as PNG → `a_sep_100x100.png`
//! - `a.jpeg` + no suffix as JPEG → `a.jpeg` (extension already accepted)
//! - `a.JPG` + no suffix as JPEG → `a.JPG`
//! - `a.tiff` as WebP → `a.webp`
//!
//! ## Thumbnail directories
//!
//! `<folder>/<profile>/<W>x<H>/`, one per profile size.
//!
//! ## Upload names
//!
//! `<stem>-<16 hex chars>.<ext>`, the hex taken from a SHA-256 over the
//! original name, the current time and a process-wide counter.

use crate::config::Size;
use crate::imaging::OutputFormat;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Split a file name into stem and extension (without the dot).
///
/// Dot-files keep their whole name as the stem: `.hidden` → (`.hidden`, None).
pub fn split_file_name(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, None),
        Some(pos) => (&file_name[..pos], Some(&file_name[pos + 1..])),
    }
}

/// Extension a saved file gets for `format`.
///
/// The source extension is kept when the format accepts it, otherwise the
/// canonical one is used.
pub fn output_extension<'a>(source_ext: Option<&'a str>, format: OutputFormat) -> &'a str {
    match source_ext {
        Some(ext) if format.accepts_extension(ext) => ext,
        _ => format.extension(),
    }
}

/// Build the output file name for a save.
pub fn output_file_name(source_file_name: &str, suffix: Option<&str>, format: OutputFormat) -> String {
    let (stem, ext) = split_file_name(source_file_name);
    format!(
        "{stem}{}.{}",
        suffix.unwrap_or_default(),
        output_extension(ext, format)
    )
}

/// Whether `file_name` ends in the canonical extension of `format`.
pub fn has_canonical_extension(file_name: &str, format: OutputFormat) -> bool {
    split_file_name(file_name)
        .1
        .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()))
}

/// Directory holding the thumbnails of one profile size.
pub fn thumbnail_dir(folder: &Path, profile_name: &str, size: Size) -> PathBuf {
    folder.join(profile_name).join(size.to_string())
}

static UPLOAD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique file name for a staged upload.
///
/// Keeps the original stem and extension so the format can still be guessed
/// from the name.
pub fn unique_file_name(original_name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let counter = UPLOAD_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(original_name.as_bytes());
    hasher.update(nanos.to_le_bytes());
    hasher.update(counter.to_le_bytes());
    let digest = hasher.finalize();
    let hex: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();

    let (stem, ext) = split_file_name(original_name);
    match ext {
        Some(ext) => format!("{stem}-{hex}.{ext}"),
        None => format!("{stem}-{hex}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_simple_name() {
        assert_eq!(split_file_name("a.jpg"), ("a", Some("jpg")));
        assert_eq!(split_file_name("a.b.png"), ("a.b", Some("png")));
    }

    #[test]
    fn split_without_extension() {
        assert_eq!(split_file_name("README"), ("README", None));
        assert_eq!(split_file_name(".hidden"), (".hidden", None));
    }

    #[test]
    fn output_name_appends_suffix_and_switches_extension() {
        assert_eq!(
            output_file_name("a.jpg", Some("_sep_100x100"), OutputFormat::Png),
            "a_sep_100x100.png"
        );
    }

    #[test]
    fn output_name_keeps_accepted_extension() {
        assert_eq!(output_file_name("a.jpeg", None, OutputFormat::Jpeg), "a.jpeg");
        assert_eq!(output_file_name("a.JPG", None, OutputFormat::Jpeg), "a.JPG");
        assert_eq!(output_file_name("scan.tiff", None, OutputFormat::Tiff), "scan.tiff");
    }

    #[test]
    fn output_name_forces_canonical_extension() {
        assert_eq!(output_file_name("a.tiff", None, OutputFormat::WebP), "a.webp");
        assert_eq!(output_file_name("a", Some("_gs"), OutputFormat::Jpeg), "a_gs.jpg");
    }

    #[test]
    fn canonical_extension_check_ignores_case() {
        assert!(has_canonical_extension("a.JPG", OutputFormat::Jpeg));
        assert!(!has_canonical_extension("a.jpeg", OutputFormat::Jpeg));
        assert!(!has_canonical_extension("a", OutputFormat::Png));
    }

    #[test]
    fn thumbnail_dir_layout() {
        assert_eq!(
            thumbnail_dir(Path::new("/out"), "gallery", Size::new(150, 100)),
            PathBuf::from("/out/gallery/150x100")
        );
    }

    #[test]
    fn unique_names_keep_stem_and_extension() {
        let name = unique_file_name("holiday.jpg");
        let (stem, ext) = split_file_name(&name);
        assert_eq!(ext, Some("jpg"));
        let hex = stem.strip_prefix("holiday-").unwrap();
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn unique_names_differ_between_calls() {
        assert_ne!(unique_file_name("a.png"), unique_file_name("a.png"));
    }
}
