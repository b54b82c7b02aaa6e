//! Test application factory for integration tests.

use async_trait::async_trait;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use tilekit::app::{create_app_state, AppState};
use tilekit::assets::AssetLoader;
use tilekit::error::OcrError;
use tilekit::models::AppConfig;
use tilekit::rendering::encode_png;
use tilekit::services::OcrEngine;

/// Application state plus a scratch directory for inputs and outputs
pub struct TestApp {
    pub state: AppState,
    dir: TempDir,
}

impl TestApp {
    /// Create a test application using the embedded config
    pub fn new() -> Self {
        let state = create_app_state(&AssetLoader::new(None));
        Self::with_state(state)
    }

    /// Create a test application with an explicit config
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_state(AppState::from_config(config))
    }

    fn with_state(state: AppState) -> Self {
        Self {
            state,
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Swap in a different OCR engine
    pub fn with_ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.state = self.state.with_ocr_engine(engine);
        self
    }

    /// Scratch directory, removed when the app is dropped
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Write `image` as a PNG into the scratch directory
    pub fn write_png(&self, name: &str, image: &RgbImage) -> PathBuf {
        let bytes = encode_png(image, false).expect("Failed to encode fixture");
        self.write_file(name, &bytes)
    }

    /// Write raw bytes into the scratch directory
    pub fn write_file(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).expect("Failed to write fixture");
        path
    }

    /// Subdirectory for outputs
    pub fn out_dir(&self) -> PathBuf {
        let path = self.dir.path().join("out");
        std::fs::create_dir_all(&path).expect("Failed to create output dir");
        path
    }
}

/// OCR engine that replies with canned text, or fails
pub struct StubOcrEngine {
    reply: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl StubOcrEngine {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Languages the engine was called with
    pub fn languages(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrEngine for StubOcrEngine {
    async fn recognize(&self, _png: &[u8], language: &str) -> Result<String, OcrError> {
        self.calls.lock().unwrap().push(language.to_string());
        self.reply.clone().ok_or_else(|| OcrError::EngineFailed {
            code: Some(1),
            stderr: "stub failure".to_string(),
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}
