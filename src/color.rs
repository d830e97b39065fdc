//! Colors and palettes produced by the extractor.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::PaletteError;

/// An 8-bit-per-channel sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    pub fn red(&self) -> u8 {
        self.0[0]
    }

    pub fn green(&self) -> u8 {
        self.0[1]
    }

    pub fn blue(&self) -> u8 {
        self.0[2]
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for Rgb {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(PaletteError::invalid_argument("color", s, "expected 6 hex digits"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| PaletteError::invalid_argument("color", s, "invalid hex digit"))
        };
        Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }
}

impl From<Srgb<u8>> for Rgb {
    fn from(c: Srgb<u8>) -> Self {
        Rgb([c.red, c.green, c.blue])
    }
}

impl From<Rgb> for Srgb<u8> {
    fn from(c: Rgb) -> Self {
        Srgb::new(c.0[0], c.0[1], c.0[2])
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb(c.0)
    }
}

/// One palette entry with the number of sampled pixels assigned to it.
///
/// Entries introduced to pad a palette past the number of distinct colors
/// carry `pixels == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub rgb: Rgb,
    pub pixels: usize,
}

/// Ordered representative colors for one image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub colors: Vec<PaletteColor>,
    /// Size of the pixel sample set the palette was computed from.
    pub sampled_pixels: usize,
}

impl Palette {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteColor> {
        self.colors.iter()
    }

    pub fn hex(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.rgb.to_hex()).collect()
    }

    /// Fraction of sampled pixels that belong to entry `i`.
    pub fn share(&self, i: usize) -> f32 {
        match self.colors.get(i) {
            Some(c) if self.sampled_pixels > 0 => c.pixels as f32 / self.sampled_pixels as f32,
            _ => 0.0,
        }
    }

    /// Builds a palette of bare colors, e.g. from user-supplied hex strings.
    pub fn from_colors(colors: impl IntoIterator<Item = Rgb>) -> Self {
        Palette {
            colors: colors
                .into_iter()
                .map(|rgb| PaletteColor { rgb, pixels: 0 })
                .collect(),
            sampled_pixels: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteColor;
    type IntoIter = std::slice::Iter<'a, PaletteColor>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_and_prefixed() {
        assert_eq!(Rgb::new(0xAB, 0x0C, 0xFF).to_hex(), "#ab0cff");
        assert_eq!(Rgb::new(0, 0, 0).to_hex(), "#000000");
    }

    #[test]
    fn parses_with_or_without_hash() {
        assert_eq!("#1C1F24".parse::<Rgb>().unwrap(), Rgb::new(0x1c, 0x1f, 0x24));
        assert_eq!("f0f2f6".parse::<Rgb>().unwrap(), Rgb::new(0xf0, 0xf2, 0xf6));
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["", "#fff", "#12345g", "1234567", "#ééé"] {
            assert!(bad.parse::<Rgb>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn share_is_fraction_of_sample() {
        let palette = Palette {
            colors: vec![
                PaletteColor { rgb: Rgb::new(1, 2, 3), pixels: 30 },
                PaletteColor { rgb: Rgb::new(4, 5, 6), pixels: 10 },
            ],
            sampled_pixels: 40,
        };
        assert_eq!(palette.share(0), 0.75);
        assert_eq!(palette.share(1), 0.25);
        assert_eq!(palette.share(2), 0.0);
        assert_eq!(palette.hex(), vec!["#010203", "#040506"]);
    }
}
