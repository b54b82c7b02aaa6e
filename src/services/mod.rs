pub mod ocr;
pub mod palette;
pub mod resize;
pub mod splitter;

pub use ocr::{write_text, OcrEngine, OcrService, TesseractEngine};
pub use palette::{PaletteColor, PaletteService};
pub use resize::{target_dimensions, ResizeMode, ResizeRequest, ResizeService, ResizedImage};
pub use splitter::{archive_name, tile_entry_name, SplitArchive, SplitService};
