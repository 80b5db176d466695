//! Shared test utilities for the image-chain test suite.
//!
//! Provides synthetic image writers and settings fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! create_test_jpeg(&tmp.path().join("a.jpg"), 200, 150);
//!
//! let settings = settings_with_profiles(vec![gallery_profile(true)]);
//! ```

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, Rgb, RgbImage};

use crate::config::{ImageProfile, Settings, Size};

// =========================================================================
// Synthetic images
// =========================================================================

/// A gradient, so encoders have something non-trivial to compress.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Write a baseline JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 90)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// Write a PNG of the given size.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height).save(path).unwrap();
}

// =========================================================================
// Settings fixtures
// =========================================================================

/// Profile `gallery` with sizes 200x200 then 100x50.
pub fn gallery_profile(keep_original: bool) -> ImageProfile {
    ImageProfile {
        name: "gallery".into(),
        sizes: vec![Size::new(200, 200), Size::new(100, 50)],
        keep_original_when_resizing: keep_original,
    }
}

pub fn settings_with_profiles(profiles: Vec<ImageProfile>) -> Settings {
    Settings {
        profiles,
        ..Settings::default()
    }
}
