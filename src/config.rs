//! Tunable parameters for palette extraction.
//!
//! Configuration can be built programmatically or loaded from JSON:
//!
//! ```no_run
//! use dominant_palette_wasm::ExtractorConfig;
//! use std::path::Path;
//!
//! let config = ExtractorConfig::from_json_file(Path::new("palette.json"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Missing fields fall back to [`ExtractorConfig::default`].

use std::path::Path;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::{PaletteError, Result};

pub const DEFAULT_N_COLORS: usize = 5;
pub const DEFAULT_WORKING_SIZE: u32 = 150;

/// Complete extractor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Working resolution used for clustering. `None` clusters every pixel
    /// of the source image, so cost grows with its size.
    pub downscale: Option<Downscale>,

    /// Number of k-means restarts; the lowest-score run is kept.
    pub runs: u32,

    /// Seed of the first run. Run `i` uses `seed + i`.
    pub seed: u64,

    pub max_iter: usize,

    /// Centroid movement below which a run is considered converged.
    pub converge: f32,

    pub color_space: ColorSpace,

    pub order: PaletteOrder,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            downscale: Some(Downscale::default()),
            runs: 10,
            seed: 42,
            max_iter: 100,
            converge: 1e-4,
            color_space: ColorSpace::Rgb,
            order: PaletteOrder::Clustering,
        }
    }
}

impl ExtractorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PaletteError::invalid_argument("config", "<json>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PaletteError::invalid_argument("config", path.display(), e.to_string())
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(PaletteError::invalid_argument("runs", self.runs, "must be at least 1"));
        }
        if self.max_iter == 0 {
            return Err(PaletteError::invalid_argument(
                "max_iter",
                self.max_iter,
                "must be at least 1",
            ));
        }
        if !self.converge.is_finite() || self.converge <= 0.0 {
            return Err(PaletteError::invalid_argument(
                "converge",
                self.converge,
                "must be a positive finite number",
            ));
        }
        if let Some(d) = &self.downscale {
            if d.width == 0 || d.height == 0 {
                return Err(PaletteError::invalid_argument(
                    "downscale",
                    format!("{}x{}", d.width, d.height),
                    "dimensions must be non-zero",
                ));
            }
        }
        Ok(())
    }
}

/// Working resolution for clustering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Downscale {
    pub width: u32,
    pub height: u32,
    pub filter: ResizeFilter,
    /// When set the image is fitted inside `width`x`height` instead of being
    /// stretched to it.
    pub keep_aspect: bool,
}

impl Default for Downscale {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORKING_SIZE,
            height: DEFAULT_WORKING_SIZE,
            filter: ResizeFilter::CatmullRom,
            keep_aspect: false,
        }
    }
}

impl Downscale {
    pub fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Space the pixel sample set is clustered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
pub enum ColorSpace {
    /// Raw sRGB channel values.
    Rgb,
    /// CIE L*a*b*, perceptually uniform.
    Lab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
pub enum PaletteOrder {
    /// Order in which the clustering produced the centroids.
    Clustering,
    /// Most populated cluster first.
    Dominance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ExtractorConfig::default();
        assert_eq!(config.downscale, Some(Downscale::square(150)));
        assert_eq!(config.runs, 10);
        assert_eq!(config.seed, 42);
        assert_eq!(config.order, PaletteOrder::Clustering);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = ExtractorConfig::from_json_str(
            r#"{ "runs": 3, "order": "dominance", "downscale": { "width": 64, "height": 32 } }"#,
        )
        .unwrap();
        assert_eq!(config.runs, 3);
        assert_eq!(config.order, PaletteOrder::Dominance);
        let downscale = config.downscale.unwrap();
        assert_eq!((downscale.width, downscale.height), (64, 32));
        assert_eq!(downscale.filter, ResizeFilter::CatmullRom);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn null_downscale_disables_resizing() {
        let config = ExtractorConfig::from_json_str(r#"{ "downscale": null }"#).unwrap();
        assert!(config.downscale.is_none());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(ExtractorConfig::from_json_str(r#"{ "runs": 0 }"#).is_err());
        assert!(ExtractorConfig::from_json_str(r#"{ "converge": -1.0 }"#).is_err());
        assert!(
            ExtractorConfig::from_json_str(r#"{ "downscale": { "width": 0, "height": 10 } }"#)
                .is_err()
        );
        assert!(ExtractorConfig::from_json_str("not json").is_err());
    }
}
