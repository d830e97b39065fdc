//! Dominant color extraction.
//!
//! The pipeline:
//! 1. Decode and normalize to three-channel RGB (alpha dropped, gray expanded).
//! 2. Resize to the configured working resolution so clustering cost does not
//!    depend on the source size.
//! 3. Flatten to a pixel sample set.
//! 4. Run k-means `runs` times with consecutive seeds, keep the lowest score.
//! 5. Round centroids to 8-bit channels.

use std::collections::HashMap;

use image::{DynamicImage, GenericImageView, RgbImage};
use kmeans_colors::{Calculate, Kmeans, get_kmeans};
use log::{debug, trace};
use palette::{IntoColor, Lab, LinSrgb, Srgb};

use crate::color::{Palette, PaletteColor, Rgb};
use crate::config::{ColorSpace, Downscale, ExtractorConfig, PaletteOrder};
use crate::error::{PaletteError, Result};

/// Largest palette that can be requested; cluster labels are `u8`.
pub const MAX_COLORS: usize = 256;

/// Decode `input` and extract `n_colors` representative colors.
pub fn extract_palette(input: &[u8], n_colors: usize, config: &ExtractorConfig) -> Result<Palette> {
    check_n_colors(n_colors)?;
    let img = image::load_from_memory(input).map_err(PaletteError::decode)?;
    extract_palette_from_image(&img, n_colors, config)
}

/// Hex strings for `input` using [`ExtractorConfig::default`].
pub fn extract_palette_hex(input: &[u8], n_colors: usize) -> Result<Vec<String>> {
    Ok(extract_palette(input, n_colors, &ExtractorConfig::default())?.hex())
}

/// Extract a palette from an already decoded image.
///
/// The result always holds exactly `n_colors` entries. When the sample set
/// has no more distinct colors than requested, clustering is skipped and the
/// distinct colors are returned, padded with the most frequent one.
pub fn extract_palette_from_image(
    img: &DynamicImage,
    n_colors: usize,
    config: &ExtractorConfig,
) -> Result<Palette> {
    check_n_colors(n_colors)?;
    config.validate()?;

    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(PaletteError::Decode {
            message: format!("image has no pixels ({w}x{h})"),
            source: None,
        });
    }

    let working = working_image(img, config.downscale.as_ref());
    let samples: Vec<[u8; 3]> = working.pixels().map(|p| p.0).collect();
    let histogram = Histogram::from_samples(&samples);

    let mut colors = if histogram.len() <= n_colors {
        debug!(
            "{} distinct colors for {} requested, skipping clustering",
            histogram.len(),
            n_colors
        );
        histogram.into_padded(n_colors)
    } else {
        debug!(
            "clustering {} samples ({} distinct) into {} colors",
            samples.len(),
            histogram.len(),
            n_colors
        );
        let (centroids, indices) = cluster(&samples, n_colors, config)?;
        assign_members(centroids, &indices)
    };

    if config.order == PaletteOrder::Dominance {
        // stable: equal counts keep clustering order
        colors.sort_by(|a, b| b.pixels.cmp(&a.pixels));
    }

    Ok(Palette {
        colors,
        sampled_pixels: samples.len(),
    })
}

fn check_n_colors(n_colors: usize) -> Result<()> {
    if n_colors == 0 {
        return Err(PaletteError::invalid_argument("n_colors", n_colors, "must be at least 1"));
    }
    if n_colors > MAX_COLORS {
        return Err(PaletteError::invalid_argument(
            "n_colors",
            n_colors,
            format!("must be at most {MAX_COLORS}"),
        ));
    }
    Ok(())
}

fn working_image(img: &DynamicImage, downscale: Option<&Downscale>) -> RgbImage {
    let rgb = img.to_rgb8();
    let Some(d) = downscale else {
        return rgb;
    };
    let (in_w, in_h) = rgb.dimensions();

    let (out_w, out_h) = if d.keep_aspect {
        let ratio = (d.width as f32 / in_w as f32).min(d.height as f32 / in_h as f32);
        (
            ((in_w as f32) * ratio).round().max(1.0) as u32,
            ((in_h as f32) * ratio).round().max(1.0) as u32,
        )
    } else {
        (d.width, d.height)
    };

    // already at working size
    if out_w == in_w && out_h == in_h {
        return rgb;
    }
    image::imageops::resize(&rgb, out_w, out_h, d.filter.into())
}

/// Centroids in clustering order plus the cluster label of every sample.
fn cluster(
    samples: &[[u8; 3]],
    n_colors: usize,
    config: &ExtractorConfig,
) -> Result<(Vec<Rgb>, Vec<u8>)> {
    match config.color_space {
        ColorSpace::Rgb => {
            let points: Vec<Srgb> = samples
                .iter()
                .map(|&[r, g, b]| Srgb::<u8>::new(r, g, b).into_format::<f32>())
                .collect();
            let kmeans = best_of_runs(&points, n_colors, config)?;
            let centroids = kmeans
                .centroids
                .iter()
                .map(|&c| Rgb::from(c.into_format::<u8>()))
                .collect();
            Ok((centroids, kmeans.indices))
        }
        ColorSpace::Lab => {
            let points: Vec<Lab> = samples
                .iter()
                .map(|&[r, g, b]| {
                    let linear: LinSrgb = Srgb::<u8>::new(r, g, b).into_linear();
                    linear.into_color()
                })
                .collect();
            let kmeans = best_of_runs(&points, n_colors, config)?;
            let centroids = kmeans
                .centroids
                .iter()
                .map(|&lab| {
                    let linear: LinSrgb = lab.into_color();
                    let rgb_f32: Srgb<f32> = Srgb::from_linear(linear);
                    Rgb::from(rgb_f32.into_format::<u8>())
                })
                .collect();
            Ok((centroids, kmeans.indices))
        }
    }
}

fn best_of_runs<C: Calculate + Clone>(
    points: &[C],
    k: usize,
    config: &ExtractorConfig,
) -> Result<Kmeans<C>> {
    (0..config.runs)
        .map(|run| {
            let seed = config.seed.wrapping_add(u64::from(run));
            let result = get_kmeans(k, config.max_iter, config.converge, false, points, seed);
            trace!("k-means run {run} (seed {seed}): score {}", result.score);
            result
        })
        // first run wins ties
        .reduce(|best, next| if next.score < best.score { next } else { best })
        .ok_or_else(|| PaletteError::invalid_argument("runs", config.runs, "must be at least 1"))
}

/// Count members per cluster. A cluster that ended with no members takes the
/// centroid of the most populated cluster.
fn assign_members(centroids: Vec<Rgb>, indices: &[u8]) -> Vec<PaletteColor> {
    let mut counts = vec![0usize; centroids.len()];
    for &idx in indices {
        if let Some(count) = counts.get_mut(idx as usize) {
            *count += 1;
        }
    }

    let dominant = counts
        .iter()
        .enumerate()
        .fold(0, |best, (i, &c)| if c > counts[best] { i } else { best });

    centroids
        .iter()
        .zip(&counts)
        .map(|(&rgb, &pixels)| PaletteColor {
            rgb: if pixels == 0 { centroids[dominant] } else { rgb },
            pixels,
        })
        .collect()
}

/// Distinct colors of a sample set in first-appearance order.
struct Histogram {
    entries: Vec<([u8; 3], usize)>,
}

impl Histogram {
    fn from_samples(samples: &[[u8; 3]]) -> Self {
        let mut slots: HashMap<[u8; 3], usize> = HashMap::new();
        let mut entries: Vec<([u8; 3], usize)> = Vec::new();
        for &px in samples {
            match slots.get(&px) {
                Some(&slot) => entries[slot].1 += 1,
                None => {
                    slots.insert(px, entries.len());
                    entries.push((px, 1));
                }
            }
        }
        Histogram { entries }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// One entry per distinct color, then copies of the most frequent color
    /// up to `n` entries.
    fn into_padded(self, n: usize) -> Vec<PaletteColor> {
        let mut colors: Vec<PaletteColor> = self
            .entries
            .iter()
            .map(|&(px, pixels)| PaletteColor { rgb: Rgb(px), pixels })
            .collect();
        let dominant = colors
            .iter()
            .fold(None::<&PaletteColor>, |best, c| match best {
                Some(b) if b.pixels >= c.pixels => Some(b),
                _ => Some(c),
            })
            .map(|c| c.rgb);
        if let Some(rgb) = dominant {
            colors.resize(n.max(colors.len()), PaletteColor { rgb, pixels: 0 });
        }
        colors
    }
}
