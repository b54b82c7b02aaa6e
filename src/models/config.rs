use crate::assets::AssetLoader;
use image::imageops::FilterType;
use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Largest input file accepted, in bytes
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub split: SplitConfig,

    #[serde(default)]
    pub palette: PaletteConfig,

    #[serde(default)]
    pub resize: ResizeConfig,
}

fn default_max_input_bytes() -> u64 {
    32 * 1024 * 1024
}

/// OCR engine settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OcrConfig {
    /// Tesseract executable (looked up on PATH when not absolute)
    #[serde(default = "default_tesseract_cmd")]
    pub tesseract_cmd: PathBuf,

    /// Tesseract language code(s), e.g. "eng" or "eng+deu"
    #[serde(default = "default_language")]
    pub language: String,

    /// Page segmentation mode passed as `--psm` (engine default if unset)
    #[serde(default)]
    pub psm: Option<u8>,

    /// Seconds before the engine is killed
    #[serde(default = "default_ocr_timeout")]
    pub timeout_secs: u64,
}

fn default_tesseract_cmd() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_ocr_timeout() -> u64 {
    60
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: default_tesseract_cmd(),
            language: default_language(),
            psm: None,
            timeout_secs: default_ocr_timeout(),
        }
    }
}

/// Tile splitting settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SplitConfig {
    /// Upper bound on rows * cols
    #[serde(default = "default_max_tiles")]
    pub max_tiles: u64,

    /// Recompress each tile with oxipng (smaller archives, slower)
    #[serde(default)]
    pub optimize_png: bool,
}

fn default_max_tiles() -> u64 {
    4096
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_tiles: default_max_tiles(),
            optimize_png: false,
        }
    }
}

/// Dominant colour extraction settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PaletteConfig {
    /// Colours reported when the caller does not ask for a count
    #[serde(default = "default_colors")]
    pub default_colors: usize,

    /// Longest side of the thumbnail that is sampled
    #[serde(default = "default_sample_size")]
    pub sample_size: u32,

    /// Bits kept per channel when grouping similar colours (1-8)
    #[serde(default = "default_bucket_bits")]
    pub bucket_bits: u8,
}

fn default_colors() -> usize {
    5
}

fn default_sample_size() -> u32 {
    150
}

fn default_bucket_bits() -> u8 {
    5
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            default_colors: default_colors(),
            sample_size: default_sample_size(),
            bucket_bits: default_bucket_bits(),
        }
    }
}

/// Resampling settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ResizeConfig {
    /// Largest width or height a resize may produce
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    #[serde(default)]
    pub filter: ResizeFilter,
}

fn default_max_dimension() -> u32 {
    10_000
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            filter: ResizeFilter::default(),
        }
    }
}

/// Resampling filter, named as in config.yaml and on the command line
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl AppConfig {
    /// Load configuration from AssetLoader (embedded or external)
    pub fn load_from_assets(loader: &AssetLoader) -> Self {
        let mut config = match loader.read_config_string() {
            Ok(content) => match serde_yaml::from_str::<Self>(&content) {
                Ok(config) => {
                    tracing::debug!(source = %loader.config_source(), "Loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config
    }

    /// Apply overrides from environment variables (`TESSERACT_CMD`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(cmd) = std::env::var("TESSERACT_CMD") {
            if !cmd.is_empty() {
                tracing::debug!(cmd = %cmd, "Tesseract command overridden from environment");
                self.ocr.tesseract_cmd = PathBuf::from(cmd);
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            ocr: OcrConfig::default(),
            split: SplitConfig::default(),
            palette: PaletteConfig::default(),
            resize: ResizeConfig::default(),
        }
    }
}
