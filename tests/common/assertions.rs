//! Assertion helpers for tests.

use image::RgbImage;
use pretty_assertions::assert_eq;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use tilekit::rendering::{decode_rgb, is_png};

/// Assert bytes are a PNG image and decode them
pub fn assert_png(bytes: &[u8]) -> RgbImage {
    assert!(
        is_png(bytes),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
    decode_rgb(bytes).expect("PNG should decode")
}

/// Read every entry of a zip archive in stored order, decoding each as PNG
pub fn read_tiles(path: &Path) -> Vec<(String, RgbImage)> {
    let file = std::fs::File::open(path).expect("Failed to open archive");
    let mut archive = ZipArchive::new(file).expect("Not a zip archive");

    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).unwrap();
            (entry.name().to_string(), assert_png(&bytes))
        })
        .collect()
}

/// Assert the archive holds exactly `expected` entry names, in order
pub fn assert_entry_names(tiles: &[(String, RgbImage)], expected: &[&str]) {
    let names: Vec<&str> = tiles.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, expected);
}

/// Assert tile sizes, in archive order
pub fn assert_tile_sizes(tiles: &[(String, RgbImage)], expected: &[(u32, u32)]) {
    let sizes: Vec<(u32, u32)> = tiles.iter().map(|(_, tile)| tile.dimensions()).collect();
    assert_eq!(sizes, expected);
}
