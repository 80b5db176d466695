//! # Image Chain
//!
//! Chainable image transformations that write descriptive, suffixed output
//! files and optional profile thumbnails.
//!
//! # Architecture: Build, Then Run
//!
//! A chain is built up front and executed only by a terminal call:
//!
//! ```text
//! 1. Build    for_image(folder, file) → .sepia() → .resize(W, H)   (pure data)
//! 2. Run      save / export / simulate_location                   (load once, apply in order)
//! 3. Persist  output + profile thumbnails + original retention    (filesystem)
//! ```
//!
//! Building is infallible and side-effect free, so chains can be shared,
//! branched and discarded at no cost. All I/O and all parameter validation
//! happen in step 2 and 3.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manager`] | Entry factory: chains from paths or uploads, deletion, profile lookup |
//! | [`chain`] | Immutable builder and execution engine ([`ImageOperations`]) |
//! | [`persist`] | Output naming, keep-smaller rule, thumbnails, original removal |
//! | [`delete`] | Best-effort removal of an image and its thumbnails |
//! | [`config`] | `image-chain.toml` loading, validation and merging |
//! | [`naming`] | Output, thumbnail and upload file names |
//! | [`types`] | Result descriptors (`ImageProperties`, `ImageLocation`, ...) |
//! | [`imaging`] | Operations, suffix tokens, backend trait and the `image` crate backend |
//! | [`output`] | CLI output formatting |
//!
//! # Output Naming
//!
//! Every step contributes a suffix token, in call order. A save with suffixes
//! inserts them between the stem and the extension:
//!
//! ```text
//! a.jpg + sepia + resize(100, 100) as PNG → a_sep_100x100.png
//! ```
//!
//! Profile thumbnails keep that name and live under
//! `<folder>/<profile>/<W>x<H>/`.
//!
//! # Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate. Colour matrices,
//! blurs and stylisation effects the crate does not ship live in
//! [`imaging::filters`]. No system libraries are needed.

pub mod chain;
pub mod config;
pub mod delete;
pub mod imaging;
pub mod manager;
pub mod naming;
pub mod output;
pub mod persist;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chain::ImageOperations;
pub use manager::{ImageManager, ManagerError};
