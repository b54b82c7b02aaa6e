//! Tilekit - image tiles, text, palettes and resizing
//!
//! Splits images into zip archives of PNG tiles, extracts text through
//! Tesseract, reports dominant colours and writes resized copies.
//! This library exposes modules for integration testing.

pub mod app;
pub mod assets;
pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
