//! Test fixtures and constants.

use image::{Rgb, RgbImage};

/// Named colours used by the fixtures
pub mod colors {
    use image::Rgb;

    pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
    pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
    pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
}

/// Image whose four quadrants are red, green, blue and white
/// (top-left, top-right, bottom-left, bottom-right).
pub fn quadrants(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        match (x < width / 2, y < height / 2) {
            (true, true) => colors::RED,
            (false, true) => colors::GREEN,
            (true, false) => colors::BLUE,
            (false, false) => colors::WHITE,
        }
    })
}

/// Image where each pixel encodes its coordinates (mod 256).
pub fn coordinates(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]))
}

/// Left `percent` of the columns in `left`, the rest in `right`.
pub fn two_tone(width: u32, height: u32, percent: u32, left: Rgb<u8>, right: Rgb<u8>) -> RgbImage {
    let split = width * percent / 100;
    RgbImage::from_fn(width, height, |x, _| if x < split { left } else { right })
}
