//! Dominant colour extraction.
//!
//! The image is shrunk to a small thumbnail, similar colours are grouped by
//! truncating each channel to a few bits, and the most populated groups are
//! reported with their average colour and share of the image.

use image::{imageops, RgbImage};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{InputError, ToolError};
use crate::models::{ImageUpload, PaletteConfig};
use crate::rendering::decode_rgb;

/// One dominant colour
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteColor {
    pub rgb: [u8; 3],
    /// `#RRGGBB`
    pub hex: String,
    /// Fraction of sampled pixels in this colour group (0.0-1.0)
    pub share: f64,
    /// Number of sampled pixels in this colour group
    pub count: u64,
}

impl PaletteColor {
    fn new(rgb: [u8; 3], count: u64, total: u64) -> Self {
        Self {
            rgb,
            hex: format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2]),
            share: count as f64 / total as f64,
            count,
        }
    }
}

#[derive(Default)]
struct Bucket {
    count: u64,
    sum: [u64; 3],
}

/// Palette extraction service
pub struct PaletteService {
    config: PaletteConfig,
}

impl PaletteService {
    pub fn new(config: PaletteConfig) -> Self {
        Self { config }
    }

    /// Dominant colours of `upload`, most frequent first.
    ///
    /// `count` defaults to the configured number of colours; zero is rejected.
    pub fn extract(
        &self,
        upload: &ImageUpload,
        count: Option<usize>,
    ) -> Result<Vec<PaletteColor>, ToolError> {
        let count = count.unwrap_or(self.config.default_colors);
        if count == 0 {
            return Err(InputError::InvalidArgument(
                "number of colours must be a positive integer".to_string(),
            )
            .into());
        }

        let image = decode_rgb(upload.bytes())?;
        let colors = self.dominant_colors(&image, count);

        tracing::info!(
            file = %upload.file_name(),
            requested = count,
            found = colors.len(),
            "Palette extracted"
        );
        Ok(colors)
    }

    /// Dominant colours of an already decoded image.
    pub fn dominant_colors(&self, image: &RgbImage, count: usize) -> Vec<PaletteColor> {
        let sample = thumbnail(image, self.config.sample_size);
        let bits = self.config.bucket_bits.clamp(1, 8);
        let shift = 8 - bits;

        let mut buckets: HashMap<[u8; 3], Bucket> = HashMap::new();
        for pixel in sample.pixels() {
            let [r, g, b] = pixel.0;
            let bucket = buckets.entry([r >> shift, g >> shift, b >> shift]).or_default();
            bucket.count += 1;
            bucket.sum[0] += r as u64;
            bucket.sum[1] += g as u64;
            bucket.sum[2] += b as u64;
        }

        let total = sample.width() as u64 * sample.height() as u64;
        let mut colors: Vec<PaletteColor> = buckets
            .into_values()
            .map(|bucket| {
                let mean = |sum: u64| ((sum + bucket.count / 2) / bucket.count) as u8;
                let rgb = [mean(bucket.sum[0]), mean(bucket.sum[1]), mean(bucket.sum[2])];
                PaletteColor::new(rgb, bucket.count, total)
            })
            .collect();

        // Most frequent first; equal counts ordered by colour for stable output
        colors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.hex.cmp(&b.hex)));
        colors.truncate(count);
        colors
    }
}

/// Shrink so the longest side is at most `max_side`, keeping the aspect ratio.
fn thumbnail(image: &RgbImage, max_side: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if max_side == 0 || longest <= max_side {
        return image.clone();
    }
    let scale = max_side as f64 / longest as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);
    imageops::thumbnail(image, new_width, new_height)
}
