//! Resampling to requested dimensions.

use image::{imageops::FilterType, ImageFormat};
use std::sync::Arc;
use tile_grid::Dimensions;

use crate::error::{InputError, ToolError};
use crate::models::{ImageUpload, ResizeConfig, ResizeFilter};
use crate::rendering::{decode, encode, writable_format};

/// How the requested box is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Keep the aspect ratio and stay inside the box
    #[default]
    Fit,
    /// Stretch to exactly the requested size
    Exact,
}

/// What the caller asked for. At least one of `width`/`height` must be set;
/// a missing one follows from the aspect ratio.
#[derive(Debug, Clone, Default)]
pub struct ResizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: ResizeMode,
    /// Overrides the configured filter
    pub filter: Option<ResizeFilter>,
}

impl ResizeRequest {
    pub fn fit(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn exact(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            mode: ResizeMode::Exact,
            filter: None,
        }
    }
}

#[derive(Debug)]
pub struct ResizedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
    pub format: ImageFormat,
}

/// Output size for `source` under `request`.
pub fn target_dimensions(
    source: Dimensions,
    request: &ResizeRequest,
    max_dimension: u32,
) -> Result<Dimensions, InputError> {
    let invalid = InputError::InvalidArgument;

    for (name, value) in [("width", request.width), ("height", request.height)] {
        match value {
            Some(0) => return Err(invalid(format!("{name} must be a positive integer"))),
            Some(v) if v > max_dimension => {
                return Err(invalid(format!(
                    "{name} {v} exceeds the maximum of {max_dimension}"
                )))
            }
            _ => {}
        }
    }

    let scaled = |value: u32, numerator: u32, denominator: u32| -> u32 {
        let result = (value as f64 * numerator as f64 / denominator as f64).round() as u32;
        result.max(1)
    };

    let target = match (request.width, request.height, request.mode) {
        (None, None, _) => {
            return Err(invalid(
                "at least one of width and height is required".to_string(),
            ))
        }
        (Some(w), Some(h), ResizeMode::Exact) => Dimensions::new(w, h),
        (Some(w), Some(h), ResizeMode::Fit) => {
            // Scale by whichever side is the tighter constraint
            let by_width = w as u64 * source.height as u64;
            let by_height = h as u64 * source.width as u64;
            if by_width <= by_height {
                Dimensions::new(w, scaled(source.height, w, source.width).min(h))
            } else {
                Dimensions::new(scaled(source.width, h, source.height).min(w), h)
            }
        }
        (Some(w), None, _) => Dimensions::new(w, scaled(source.height, w, source.width)),
        (None, Some(h), _) => Dimensions::new(scaled(source.width, h, source.height), h),
    };

    if target.width > max_dimension || target.height > max_dimension {
        return Err(invalid(format!(
            "resized image {target} exceeds the maximum of {max_dimension}"
        )));
    }
    Ok(target)
}

/// Name of the resized file: `<stem>_<W>x<H>.<ext>`.
pub fn resized_name(stem: &str, dimensions: Dimensions, extension: &str) -> String {
    format!("{stem}_{dimensions}.{extension}")
}

pub struct ResizeService {
    config: ResizeConfig,
}

impl ResizeService {
    pub fn new(config: ResizeConfig) -> Self {
        Self { config }
    }

    pub fn resize(
        &self,
        upload: &ImageUpload,
        request: &ResizeRequest,
    ) -> Result<ResizedImage, ToolError> {
        if request.width.is_none() && request.height.is_none() {
            return Err(InputError::InvalidArgument(
                "at least one of width and height is required".to_string(),
            )
            .into());
        }

        let image = decode(upload.bytes())?;
        let source = Dimensions::new(image.width(), image.height());
        let target = target_dimensions(source, request, self.config.max_dimension)?;
        let filter: FilterType = request.filter.unwrap_or(self.config.filter).into();

        let resized = image.resize_exact(target.width, target.height, filter);

        // Keep the input format when we can write it, PNG otherwise
        let (format, extension) = upload
            .extension()
            .and_then(|ext| writable_format(&ext).map(|format| (format, ext)))
            .unwrap_or_else(|| (ImageFormat::Png, "png".to_string()));
        let bytes = encode(&resized, format)?;

        tracing::info!(
            file = %upload.file_name(),
            from = %source,
            to = %target,
            filter = ?filter,
            "Image resized"
        );

        Ok(ResizedImage {
            file_name: resized_name(upload.stem(), target, &extension),
            bytes,
            dimensions: target,
            format,
        })
    }

    /// Run [`resize()`](Self::resize) on the blocking thread pool.
    pub async fn resize_blocking(
        self: &Arc<Self>,
        upload: ImageUpload,
        request: ResizeRequest,
    ) -> Result<ResizedImage, ToolError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.resize(&upload, &request)).await?
    }
}
