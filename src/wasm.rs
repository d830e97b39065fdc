//! JavaScript bindings.

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::color::{Palette, Rgb};
use crate::config::{Downscale, ExtractorConfig, PaletteOrder};
use crate::error::PaletteError;
use crate::extract::extract_palette as extract;
use crate::render::{StripStyle, Theme, encode_png, render_strip};

fn to_js(err: PaletteError) -> JsValue {
    JsValue::from_str(&err.user_message())
}

/// Extract `n_colors` dominant colors from an encoded image.
///
/// `downscale` overrides the square working resolution; `by_dominance` orders
/// the result by cluster population. Returns `{ palette, shares }` where
/// `palette` holds `#rrggbb` strings and `shares` the matching pixel fractions.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette(
    input: Vec<u8>,
    n_colors: usize,
    downscale: Option<u32>,
    by_dominance: Option<bool>,
) -> Result<Object, JsValue> {
    let mut config = ExtractorConfig::default();
    if let Some(side) = downscale {
        config.downscale = Some(Downscale::square(side));
    }
    if by_dominance.unwrap_or(false) {
        config.order = PaletteOrder::Dominance;
    }

    let palette = extract(&input, n_colors, &config).map_err(to_js)?;

    let palette_js = Array::new();
    let shares_js = Array::new();
    for (i, hex) in palette.hex().into_iter().enumerate() {
        palette_js.push(&JsValue::from_str(&hex));
        shares_js.push(&JsValue::from_f64(f64::from(palette.share(i))));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("palette"), &palette_js)?;
    Reflect::set(&result, &JsValue::from_str("shares"), &shares_js)?;
    Ok(result)
}

/// Render hex colors as a PNG swatch strip.
#[wasm_bindgen(js_name = renderPalette)]
pub fn render_palette(
    palette: Array,
    dark: bool,
    swatch_size: Option<u32>,
) -> Result<Uint8Array, JsValue> {
    let mut colors = Vec::new();
    for val in palette.iter() {
        let s = val
            .as_string()
            .ok_or_else(|| JsValue::from_str("Palette values must be strings"))?;
        colors.push(s.parse::<Rgb>().map_err(to_js)?);
    }

    let mut style = StripStyle {
        theme: if dark { Theme::Dark } else { Theme::Light },
        ..StripStyle::default()
    };
    if let Some(size) = swatch_size {
        style.swatch_size = size;
    }

    let strip = render_strip(&Palette::from_colors(colors), &style).map_err(to_js)?;
    let png = encode_png(&strip).map_err(to_js)?;
    Ok(Uint8Array::from(png.as_slice()))
}
