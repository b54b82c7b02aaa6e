pub mod config;
pub mod upload;

pub use config::{AppConfig, OcrConfig, PaletteConfig, ResizeConfig, ResizeFilter, SplitConfig};
pub use upload::{allowed_file, secure_filename, ImageUpload, ALLOWED_EXTENSIONS};
