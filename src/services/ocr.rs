//! Text extraction through an external OCR engine.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{OcrError, ToolError};
use crate::models::{ImageUpload, OcrConfig};
use crate::rendering::{decode_rgb, encode_png};

/// Something that turns a PNG into text
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize text in `png` using `language` (Tesseract-style codes).
    async fn recognize(&self, png: &[u8], language: &str) -> Result<String, OcrError>;

    /// Short engine name for logs
    fn name(&self) -> &str;
}

/// Runs the `tesseract` command line tool, piping the image through stdin.
pub struct TesseractEngine {
    cmd: PathBuf,
    psm: Option<u8>,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(cmd: impl Into<PathBuf>, psm: Option<u8>, timeout: Duration) -> Self {
        Self {
            cmd: cmd.into(),
            psm,
            timeout,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(
            config.tesseract_cmd.clone(),
            config.psm,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn command(&self, language: &str) -> Command {
        let mut command = Command::new(&self.cmd);
        command.arg("stdin").arg("stdout").arg("-l").arg(language);
        if let Some(psm) = self.psm {
            command.arg("--psm").arg(psm.to_string());
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, png: &[u8], language: &str) -> Result<String, OcrError> {
        let mut child = self.command(language).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OcrError::EngineNotFound {
                    cmd: self.cmd.clone(),
                }
            } else {
                OcrError::Io(e)
            }
        })?;

        // Feed stdin from a separate task so a chatty engine cannot block on
        // a full stdout pipe while we are still writing.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Io(std::io::Error::other("engine stdin unavailable")))?;
        let input = png.to_vec();
        let feeder = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| OcrError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        match feeder.await {
            Ok(Err(e)) => tracing::debug!(%e, "Engine closed stdin early"),
            Err(e) => tracing::debug!(%e, "Stdin feeder task failed"),
            Ok(Ok(())) => {}
        }

        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// OCR service: normalises the image and hands it to the engine
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
    language: String,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>, language: impl Into<String>) -> Self {
        Self {
            engine,
            language: language.into(),
        }
    }

    /// Service backed by the configured Tesseract binary
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(
            Arc::new(TesseractEngine::from_config(config)),
            config.language.clone(),
        )
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Extract text from `upload`.
    ///
    /// The image is converted to RGB and re-encoded as PNG first, so the
    /// engine only ever sees one format. `language` overrides the
    /// configured language for this call.
    pub async fn extract_text(
        &self,
        upload: &ImageUpload,
        language: Option<&str>,
    ) -> Result<String, ToolError> {
        let bytes = upload.bytes().to_vec();
        let png = tokio::task::spawn_blocking(move || {
            let image = decode_rgb(&bytes)?;
            encode_png(&image, false)
        })
        .await??;

        let language = language.unwrap_or(self.language.as_str());
        tracing::debug!(
            engine = self.engine.name(),
            language = %language,
            file = %upload.file_name(),
            "Running OCR"
        );

        let text = self.engine.recognize(&png, language).await?;
        tracing::info!(
            file = %upload.file_name(),
            chars = text.chars().count(),
            "Text extracted"
        );
        Ok(text)
    }
}

/// Write extracted text as UTF-8.
pub async fn write_text(path: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, text.as_bytes()).await
}
