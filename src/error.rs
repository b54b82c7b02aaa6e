use std::path::PathBuf;
use thiserror::Error;
use tile_grid::{Argument, PartitionError};

use crate::models::upload::ALLOWED_EXTENSIONS;

/// Top-level error for every tilekit operation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Process exit code: 2 for rejected input, 1 for processing failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Input(_) => 2,
            ToolError::Image(ImageError::Decode(_)) => 2,
            ToolError::Image(ImageError::EmptyImage) => 2,
            ToolError::Image(_) => 1,
            ToolError::Ocr(_) => 1,
            ToolError::Internal(_) => 1,
        }
    }
}

impl From<PartitionError> for ToolError {
    fn from(e: PartitionError) -> Self {
        match e {
            PartitionError::InvalidArgument {
                argument: Argument::Rows | Argument::Cols,
                ..
            } => ToolError::Input(InputError::InvalidGrid),
            PartitionError::InvalidArgument { .. } => ToolError::Image(ImageError::EmptyImage),
            PartitionError::GridTooLarge { .. } => {
                ToolError::Input(InputError::InvalidArgument(e.to_string()))
            }
        }
    }
}

impl From<tokio::task::JoinError> for ToolError {
    fn from(e: tokio::task::JoinError) -> Self {
        ToolError::Internal(format!("Task error: {e}"))
    }
}

/// Problems with what the user asked for. The request is rejected as a whole.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("No selected file")]
    NoFileName,

    #[error("File name is not valid UTF-8: {}", .path.display())]
    InvalidFileName { path: PathBuf },

    #[error("Invalid file type: {file_name}. Allowed: {}", ALLOWED_EXTENSIONS.join(", "))]
    UnsupportedExtension { file_name: String },

    #[error("Rows and Columns must be positive integers.")]
    InvalidGrid,

    #[error("Grid {rows}x{cols} is finer than the {width}x{height} image")]
    GridTooFine {
        rows: u32,
        cols: u32,
        width: u32,
        height: u32,
    },

    #[error("Too many tiles: {tiles} (max {max})")]
    TooManyTiles { tiles: u64, max: u64 },

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for ImageError {
    fn from(e: zip::result::ZipError) -> Self {
        ImageError::Archive(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine not found: {}", .cmd.display())]
    EngineNotFound { cmd: PathBuf },

    #[error("OCR engine exited with {}: {stderr}", .code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")))]
    EngineFailed { code: Option<i32>, stderr: String },

    #[error("OCR engine timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("OCR output is not valid UTF-8")]
    InvalidOutput(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
