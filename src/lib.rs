//! Dominant color palettes from images.
//!
//! An image is reduced to a fixed working resolution, its pixels are
//! clustered with k-means and each centroid becomes one palette entry.
//!
//! ```no_run
//! use dominant_palette_wasm::{ExtractorConfig, extract_palette};
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! let palette = extract_palette(&bytes, 5, &ExtractorConfig::default())?;
//! for hex in palette.hex() {
//!     println!("{hex}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The same entry points are exported to JavaScript through `wasm_bindgen`
//! as `extractPalette` and `renderPalette`.

pub mod color;
pub mod config;
pub mod error;
pub mod extract;
pub mod render;
pub mod wasm;

pub use color::{Palette, PaletteColor, Rgb};
pub use config::{
    ColorSpace, DEFAULT_N_COLORS, DEFAULT_WORKING_SIZE, Downscale, ExtractorConfig, PaletteOrder,
    ResizeFilter,
};
pub use error::{PaletteError, Result};
pub use extract::{MAX_COLORS, extract_palette, extract_palette_from_image, extract_palette_hex};
pub use render::{MAX_STRIP_PIXELS, StripStyle, Theme, encode_png, render_strip};
