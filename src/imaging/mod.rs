//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Decode** | `image::ImageReader` + EXIF orientation |
//! | **Resize / crop / flip** | Lanczos3 resampling, `crop_imm`, orientation transforms |
//! | **Colour & stylisation** | [`filters`]: colour matrices, blurs, oil paint, pixelate |
//! | **Encode** | JPEG (quality-aware), PNG, GIF, BMP, TIFF, WebP |
//!
//! The module is split into:
//! - **Operations**: [`Operation`], the data a chain accumulates, and its suffix tokens
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Output formats and encoding quality
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod filters;
mod operation;
mod params;
pub mod rust_backend;
pub mod suffixes;

pub use backend::{BackendError, Dimensions, ImageBackend, WorkingImage};
pub use calculations::calculate_fit_dimensions;
pub use operation::{FlipMode, Operation, ResizeMode, ResizeOptions};
pub use params::{OutputFormat, Quality};
pub use rust_backend::RustBackend;
