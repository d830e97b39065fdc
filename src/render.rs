//! Palette swatch rendering.
//!
//! Presentation settings are passed in explicitly through [`StripStyle`];
//! nothing here keeps state between calls.

use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::color::{Palette, Rgb};
use crate::error::{PaletteError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn background(self) -> Rgb {
        match self {
            Theme::Dark => Rgb::new(0x1c, 0x1f, 0x24),
            Theme::Light => Rgb::new(0xf0, 0xf2, 0xf6),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripStyle {
    pub theme: Theme,
    /// Side of each square swatch, in pixels.
    pub swatch_size: u32,
    /// Background margin around and between swatches.
    pub gap: u32,
}

impl Default for StripStyle {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            swatch_size: 96,
            gap: 12,
        }
    }
}

/// Largest strip, in pixels, that [`render_strip`] will allocate.
pub const MAX_STRIP_PIXELS: u64 = 4096 * 4096;

/// Lay the palette out left to right as square swatches on the theme
/// background.
///
/// Fails with `InvalidArgument` when the style asks for a strip larger than
/// [`MAX_STRIP_PIXELS`].
pub fn render_strip(palette: &Palette, style: &StripStyle) -> Result<RgbImage> {
    let size = style.swatch_size.max(1);
    let (width, height) = u32::try_from(palette.len())
        .ok()
        .and_then(|n| strip_dimensions(n, size, style.gap))
        .ok_or_else(|| {
            PaletteError::invalid_argument(
                "swatch_size",
                format!("{size} (gap {})", style.gap),
                format!("strip exceeds {MAX_STRIP_PIXELS} pixels"),
            )
        })?;

    let mut img = RgbImage::from_pixel(width.max(1), height, style.theme.background().into());
    for (i, color) in palette.iter().enumerate() {
        let x0 = style.gap + i as u32 * (size + style.gap);
        let fill: image::Rgb<u8> = color.rgb.into();
        for y in style.gap..style.gap + size {
            for x in x0..x0 + size {
                img.put_pixel(x, y, fill);
            }
        }
    }
    Ok(img)
}

/// `None` on overflow or when the strip would exceed [`MAX_STRIP_PIXELS`].
fn strip_dimensions(n: u32, size: u32, gap: u32) -> Option<(u32, u32)> {
    let width = size.checked_add(gap)?.checked_mul(n)?.checked_add(gap)?;
    let height = gap.checked_mul(2)?.checked_add(size)?;
    (u64::from(width.max(1)) * u64::from(height) <= MAX_STRIP_PIXELS).then_some((width, height))
}

pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        img.write_to(&mut cursor, ImageFormat::Png)?;
    }
    Ok(buf)
}
