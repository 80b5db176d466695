//! Settings module.
//!
//! Handles loading, validating, and merging the `image-chain.toml` settings
//! file. Settings are loaded once at startup and are read-only afterwards:
//! the [`ImageManager`](crate::manager::ImageManager) holds them behind an
//! `Arc` and every chain shares that one copy.
//!
//! ## Settings Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! temporary_folder = "/var/tmp/uploads"  # Staging area for uploaded streams
//!
//! [images]
//! quality = 90              # JPEG encoding quality (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! parallel_thumbnails = false
//!
//! [[profiles]]
//! name = "gallery"
//! sizes = [[150, 150], [800, 600]]
//! keep_original_when_resizing = true
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Process-wide image settings.
///
/// All fields have defaults. A settings file only needs the values it wants
/// to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Where uploaded streams are staged before a chain is built on them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_folder: Option<PathBuf>,
    /// Encoding settings.
    pub images: ImagesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Named thumbnail profiles, in declaration order.
    pub profiles: Vec<ImageProfile>,
}

impl Settings {
    /// Validate values and profile uniqueness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if let Some(folder) = &self.temporary_folder
            && folder.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "temporary_folder must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a profile by exact name.
    pub fn find_profile(&self, name: &str) -> Option<&ImageProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

/// Encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
    /// Encode the sizes of a profile in parallel instead of one after another.
    pub parallel_thumbnails: bool,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

/// A thumbnail bounding box, written as `[width, height]` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<[u32; 2]> for Size {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<Size> for [u32; 2] {
    fn from(size: Size) -> Self {
        [size.width, size.height]
    }
}

/// Rendered as `WIDTHxHEIGHT`, which is also the thumbnail directory name.
impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A named set of thumbnail sizes plus an original-retention policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageProfile {
    /// Unique name; also the thumbnail directory name.
    pub name: String,
    /// Bounding boxes, in the order thumbnails are produced.
    pub sizes: Vec<Size>,
    /// Keep the full-size image after its thumbnails are written.
    #[serde(default = "default_keep_original")]
    pub keep_original_when_resizing: bool,
}

fn default_keep_original() -> bool {
    true
}

impl ImageProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "profile name must not be empty".into(),
            ));
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(ConfigError::Validation(format!(
                "profile name '{}' must be a plain directory name",
                self.name
            )));
        }
        if let Some(size) = self.sizes.iter().find(|s| s.width == 0 || s.height == 0) {
            return Err(ConfigError::Validation(format!(
                "profile '{}' has a zero-sized entry {size}",
                self.name
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Settings loading, merging, and validation
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Settings::default())
        .map_err(|e| ConfigError::Validation(format!("default settings: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a
///   `profiles` array in the overlay replaces the whole list.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_settings(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Parse settings from TOML text, on top of stock defaults.
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    resolve_settings(stock_defaults_value()?, Some(overlay))
}

/// Load settings from the given file.
///
/// Returns stock defaults if the file does not exist; an existing file with
/// invalid TOML, unknown keys or bad values is an error.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return resolve_settings(stock_defaults_value()?, None);
    }
    let content = fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Returns a fully-commented stock settings file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-chain settings
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults unless marked as an example.
# Unknown keys will cause an error.

# Folder uploaded streams are copied into before processing.
# Required only for uploads. Example:
# temporary_folder = "/var/tmp/image-chain"

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[images]
# JPEG quality (1 = worst, 100 = best). Other formats ignore it.
quality = 90

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel workers. Omit to use all CPU cores.
# Values above the core count are clamped down.
# max_processes = 4

# Encode the sizes of a profile in parallel.
parallel_thumbnails = false

# ---------------------------------------------------------------------------
# Thumbnail profiles (example)
# ---------------------------------------------------------------------------
# Each profile writes one thumbnail per size into <folder>/<name>/<W>x<H>/.
# Thumbnails fit inside the box; aspect ratio is preserved.
#
# keep_original_when_resizing: keep the source image after its thumbnails
# are written. Optional, defaults to true. Set it to false to delete the
# source once the save and every thumbnail succeed.
#
# [[profiles]]
# name = "gallery"
# sizes = [[150, 150], [800, 600]]
# keep_original_when_resizing = true
"##
}
