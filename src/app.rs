//! Application wiring shared by the command line and the integration tests.
//!
//! [`AppState`] owns one instance of every service, built from a single
//! [`AppConfig`]. Its file-level helpers read an input image, run a service
//! and write the result, so `main.rs` only parses arguments and prints.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tile_grid::GridRequest;

use crate::assets::AssetLoader;
use crate::error::{ImageError, ToolError};
use crate::models::{AppConfig, ImageUpload};
use crate::services::{
    OcrEngine, OcrService, PaletteColor, PaletteService, ResizeRequest, ResizeService,
    SplitService,
};

/// Default file name when extracted text is saved without an explicit name.
pub const DEFAULT_TEXT_FILE: &str = "extracted_text.txt";

/// Services shared by every command.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub splitter: Arc<SplitService>,
    pub ocr: Arc<OcrService>,
    pub palette: Arc<PaletteService>,
    pub resizer: Arc<ResizeService>,
}

/// Create application state from an asset loader.
pub fn create_app_state(asset_loader: &AssetLoader) -> AppState {
    AppState::from_config(AppConfig::load_from_assets(asset_loader))
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            splitter: Arc::new(SplitService::new(config.split.clone())),
            ocr: Arc::new(OcrService::from_config(&config.ocr)),
            palette: Arc::new(PaletteService::new(config.palette.clone())),
            resizer: Arc::new(ResizeService::new(config.resize.clone())),
            config: Arc::new(config),
        }
    }

    /// Replace the OCR engine (tests, alternative engines).
    pub fn with_ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Arc::new(OcrService::new(engine, self.config.ocr.language.clone()));
        self
    }

    /// Read and validate an input image.
    pub async fn load(&self, input: &Path) -> Result<ImageUpload, ToolError> {
        Ok(ImageUpload::from_path(input, self.config.max_input_bytes).await?)
    }

    /// Split `input` and write the archive. Returns the archive path.
    ///
    /// `output` may be a file or an existing directory; without it the
    /// archive lands in the current directory under its default name.
    pub async fn split_to_file(
        &self,
        input: &Path,
        request: GridRequest,
        output: Option<&Path>,
    ) -> Result<PathBuf, ToolError> {
        // Fail on a bad grid before reading the file
        self.splitter.check_request(request)?;

        let upload = self.load(input).await?;
        let archive = self.splitter.split_blocking(upload, request).await?;

        let path = output_path(output, &archive.file_name);
        write_output(&path, &archive.bytes).await?;
        tracing::info!(path = %path.display(), tiles = archive.entries.len(), "Archive written");
        Ok(path)
    }

    /// Extract text from `input`.
    ///
    /// An OCR engine failure is logged and yields empty text; a file that
    /// cannot be read or decoded is still an error.
    pub async fn extract_text(
        &self,
        input: &Path,
        language: Option<&str>,
    ) -> Result<String, ToolError> {
        let upload = self.load(input).await?;
        match self.ocr.extract_text(&upload, language).await {
            Ok(text) => Ok(text),
            Err(ToolError::Ocr(e)) => {
                tracing::error!(file = %upload.file_name(), error = %e, "OCR failed");
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Dominant colours of `input`.
    pub async fn palette(
        &self,
        input: &Path,
        count: Option<usize>,
    ) -> Result<Vec<PaletteColor>, ToolError> {
        let upload = self.load(input).await?;
        let service = self.palette.clone();
        tokio::task::spawn_blocking(move || service.extract(&upload, count)).await?
    }

    /// Resize `input` and write the result. Returns the written path.
    pub async fn resize_to_file(
        &self,
        input: &Path,
        request: ResizeRequest,
        output: Option<&Path>,
    ) -> Result<PathBuf, ToolError> {
        let upload = self.load(input).await?;
        let resized = self.resizer.resize_blocking(upload, request).await?;

        let path = output_path(output, &resized.file_name);
        write_output(&path, &resized.bytes).await?;
        tracing::info!(path = %path.display(), size = %resized.dimensions, "Resized image written");
        Ok(path)
    }
}

/// Where to write a result named `default_name`.
pub fn output_path(output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(default_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_name),
    }
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<(), ImageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
