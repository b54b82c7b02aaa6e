//! Image decoding and PNG encoding shared by the services.

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

use crate::error::ImageError;

/// Decode any supported image format from memory.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let image = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageError::EmptyImage);
    }
    Ok(image)
}

/// Decode and convert to 8-bit RGB, dropping any alpha channel.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, ImageError> {
    Ok(decode(bytes)?.to_rgb8())
}

/// Encode an RGB image as an 8-bit truecolor PNG.
///
/// With `optimize`, the PNG is written with fast settings and then
/// recompressed by oxipng; if oxipng fails the fast encoding is kept.
pub fn encode_png(image: &RgbImage, optimize: bool) -> Result<Vec<u8>, ImageError> {
    let compression = if optimize {
        png::Compression::Fast
    } else {
        png::Compression::Default
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(compression);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ImageError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| ImageError::PngEncode(e.to_string()))?;
    }
    let png_bytes = buf.into_inner();

    if !optimize {
        return Ok(png_bytes);
    }

    // Re-compress with oxipng (zopfli + adaptive filter selection)
    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    );
    match optimized {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            tracing::debug!(%e, "oxipng failed, keeping fast encoding");
            Ok(png_bytes)
        }
    }
}

/// Encode a decoded image in `format`.
///
/// JPEG has no alpha channel, so images are flattened to RGB for it; other
/// formats get RGB or RGBA depending on the source.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
    let normalized = if format == ImageFormat::Jpeg || !image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        DynamicImage::ImageRgba8(image.to_rgba8())
    };

    let mut buf = Cursor::new(Vec::new());
    normalized
        .write_to(&mut buf, format)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Output format for a file extension, if the image crate can write it.
pub fn writable_format(extension: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(extension).filter(|format| {
        matches!(
            format,
            ImageFormat::Png
                | ImageFormat::Jpeg
                | ImageFormat::Bmp
                | ImageFormat::Tiff
                | ImageFormat::WebP
        )
    })
}

/// True if `bytes` starts with the PNG signature.
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.len() >= 8 && &bytes[0..8] == b"\x89PNG\r\n\x1a\n"
}
