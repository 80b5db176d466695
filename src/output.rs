//! CLI output formatting for saves, deletes and profiles.
//!
//! # Output Format
//!
//! ## Process
//!
//! ```text
//! a_sep_100x100.png (png, 100x100, 4.2 KB)
//!     Path: /tmp/a_sep_100x100.png
//!     gallery/200x200: 200x200, 3.1 KB
//!     gallery/100x50: 50x50, 1.0 KB
//! ```
//!
//! ## Delete
//!
//! ```text
//! Removed 3 files
//!     /tmp/gallery/200x200/a.png
//!     /tmp/a.png
//! Failed 1 file
//!     /tmp/avatar/32x32/a.png: permission denied
//! ```
//!
//! ## Profiles
//!
//! ```text
//! 001 gallery (2 sizes, keeps originals)
//!     200x200
//!     100x50
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::ImageProfile;
use crate::types::{DeleteReport, ImageLocation, ImageProperties};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Thumbnail label relative to the saved image: `profile/WxH`.
fn thumbnail_label(thumb: &ImageProperties, parent: &ImageLocation) -> String {
    thumb
        .location
        .folder
        .strip_prefix(&parent.folder)
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| thumb.location.folder.display().to_string())
}

// ============================================================================
// Process
// ============================================================================

/// Format the result of a save, one context line per thumbnail.
pub fn format_save_output(props: &ImageProperties) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} ({}, {}x{}, {})",
            props.location.file_name,
            props.format,
            props.width,
            props.height,
            format_bytes(props.size)
        ),
        format!("{}Path: {}", indent(1), props.location.full_path.display()),
    ];
    for thumb in &props.thumbnails {
        lines.push(format!(
            "{}{}: {}x{}, {}",
            indent(1),
            thumbnail_label(thumb, &props.location),
            thumb.width,
            thumb.height,
            format_bytes(thumb.size)
        ));
    }
    lines
}

pub fn print_save_output(props: &ImageProperties) {
    for line in format_save_output(props) {
        println!("{}", line);
    }
}

/// Format a location computed without saving.
pub fn format_location(location: &ImageLocation) -> Vec<String> {
    vec![location.full_path.display().to_string()]
}

pub fn print_location(location: &ImageLocation) {
    for line in format_location(location) {
        println!("{}", line);
    }
}

// ============================================================================
// Delete
// ============================================================================

pub fn format_delete_output(report: &DeleteReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.removed.is_empty() && report.failed.is_empty() {
        lines.push("Nothing to delete".to_string());
        return lines;
    }

    lines.push(format!("Removed {}", plural(report.removed.len(), "file")));
    for path in &report.removed {
        lines.push(format!("{}{}", indent(1), path.display()));
    }
    if !report.failed.is_empty() {
        lines.push(format!("Failed {}", plural(report.failed.len(), "file")));
        for (path, reason) in &report.failed {
            lines.push(format!("{}{}: {}", indent(1), path.display(), reason));
        }
    }
    lines
}

pub fn print_delete_output(report: &DeleteReport) {
    for line in format_delete_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Profiles
// ============================================================================

pub fn format_profiles(profiles: &[ImageProfile]) -> Vec<String> {
    if profiles.is_empty() {
        return vec!["No profiles configured".to_string()];
    }

    let mut lines = Vec::new();
    for (i, profile) in profiles.iter().enumerate() {
        let retention = if profile.keep_original_when_resizing {
            "keeps originals"
        } else {
            "removes originals"
        };
        lines.push(format!(
            "{} {} ({}, {})",
            format_index(i + 1),
            profile.name,
            plural(profile.sizes.len(), "size"),
            retention
        ));
        for size in &profile.sizes {
            lines.push(format!("{}{}", indent(1), size));
        }
    }
    lines
}

pub fn print_profiles(profiles: &[ImageProfile]) {
    for line in format_profiles(profiles) {
        println!("{}", line);
    }
}
