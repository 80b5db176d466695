//! File name suffix tokens, one per operation.
//!
//! Parametrised operations append their argument directly after the token
//! (`_br1.5`, `_cr200_100`). Resize has no token of its own: it contributes
//! `_{width}x{height}`.

pub const BLACK_WHITE: &str = "_bw";
pub const GAUSSIAN_BLUR: &str = "_gb";
pub const KODACHROME: &str = "_kc";
pub const AUTO_ORIENT: &str = "_ao";
pub const BOKEH_BLUR: &str = "_bkb";
pub const BOX_BLUR: &str = "_bxb";
pub const BRIGHTNESS: &str = "_br";
pub const CROP: &str = "_cr";
pub const FLIP: &str = "_fl";
pub const GLOW: &str = "_gl";
pub const GRAYSCALE: &str = "_gs";
pub const HUE: &str = "_hu";
pub const INVERT: &str = "_inv";
pub const LIGHTNESS: &str = "_lig";
pub const OIL_PAINT: &str = "_oil";
pub const OPACITY: &str = "_opa";
pub const PIXELATE: &str = "_pxl";
pub const POLAROID: &str = "_pol";
pub const SATURATE: &str = "_sat";
pub const SEPIA: &str = "_sep";
pub const VIGNETTE: &str = "_vig";
