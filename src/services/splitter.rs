//! Split an image into a grid of PNG tiles packaged as a zip archive.

use image::{imageops, RgbImage};
use std::io::{Cursor, Write};
use std::sync::Arc;
use tile_grid::{partition_grid, Dimensions, GridRequest, TileGrid};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ImageError, InputError, ToolError};
use crate::models::{ImageUpload, SplitConfig};
use crate::rendering::{decode_rgb, encode_png};

/// Name of the archive for `stem` split into `request`.
pub fn archive_name(stem: &str, request: GridRequest) -> String {
    format!("{stem}_split_{}x{}.zip", request.rows, request.cols)
}

/// Archive entry name for the tile at zero-based `(row, col)`.
///
/// Entry names count from 1: the top-left tile is `<stem>_r1_c1.png`.
pub fn tile_entry_name(stem: &str, row: u32, col: u32) -> String {
    format!("{stem}_r{}_c{}.png", row + 1, col + 1)
}

/// A finished split: the zip bytes plus what went into them.
#[derive(Debug)]
pub struct SplitArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Entry names in the order they were written (row-major)
    pub entries: Vec<String>,
    pub dimensions: Dimensions,
    pub request: GridRequest,
}

/// Tile splitting service
pub struct SplitService {
    config: SplitConfig,
}

impl SplitService {
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Reject grids that can never be satisfied, before any decoding.
    pub fn check_request(&self, request: GridRequest) -> Result<(), InputError> {
        if request.rows == 0 || request.cols == 0 {
            return Err(InputError::InvalidGrid);
        }
        if request.tile_count() > self.config.max_tiles {
            return Err(InputError::TooManyTiles {
                tiles: request.tile_count(),
                max: self.config.max_tiles,
            });
        }
        Ok(())
    }

    /// Split `upload` into `request.rows` x `request.cols` tiles.
    ///
    /// The whole request fails if any tile cannot be produced.
    pub fn split(
        &self,
        upload: &ImageUpload,
        request: GridRequest,
    ) -> Result<SplitArchive, ToolError> {
        self.check_request(request)?;

        let image = decode_rgb(upload.bytes())?;
        let dimensions = Dimensions::new(image.width(), image.height());
        let grid = partition_grid(dimensions, request)?;
        if grid.has_empty_tiles() {
            return Err(InputError::GridTooFine {
                rows: request.rows,
                cols: request.cols,
                width: dimensions.width,
                height: dimensions.height,
            }
            .into());
        }

        let (bytes, entries) = self.write_archive(&image, &grid, upload.stem())?;

        tracing::info!(
            file = %upload.file_name(),
            dimensions = %dimensions,
            grid = %request,
            tiles = entries.len(),
            size_bytes = bytes.len(),
            "Image split"
        );

        Ok(SplitArchive {
            file_name: archive_name(upload.stem(), request),
            bytes,
            entries,
            dimensions,
            request,
        })
    }

    /// Run [`split()`](Self::split) on the blocking thread pool.
    ///
    /// Decoding, cropping and PNG encoding are CPU-bound.
    pub async fn split_blocking(
        self: &Arc<Self>,
        upload: ImageUpload,
        request: GridRequest,
    ) -> Result<SplitArchive, ToolError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.split(&upload, request)).await?
    }

    fn write_archive(
        &self,
        image: &RgbImage,
        grid: &TileGrid,
        stem: &str,
    ) -> Result<(Vec<u8>, Vec<String>), ImageError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut entries = Vec::with_capacity(grid.len());

        for tile in grid {
            let rect = tile.rect;
            let cropped =
                imageops::crop_imm(image, rect.left, rect.top, rect.width(), rect.height())
                    .to_image();
            let png = encode_png(&cropped, self.config.optimize_png)?;

            let name = tile_entry_name(stem, tile.row, tile.col);
            tracing::trace!(entry = %name, rect = %rect, "Writing tile");
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            zip.start_file(name.as_str(), options)?;
            zip.write_all(&png)?;
            entries.push(name);
        }

        let cursor = zip.finish()?;
        Ok((cursor.into_inner(), entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Read;
    use zip::ZipArchive;

    /// Image where each pixel encodes its own coordinates.
    fn coordinate_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]))
    }

    fn upload(name: &str, image: &RgbImage) -> ImageUpload {
        ImageUpload::new(name, encode_png(image, false).unwrap()).unwrap()
    }

    fn service() -> SplitService {
        SplitService::new(SplitConfig::default())
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> RgbImage {
        let mut file = archive.by_name(name).unwrap();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).unwrap();
        decode_rgb(&bytes).unwrap()
    }

    #[test]
    fn test_names() {
        let request = GridRequest::new(2, 3);
        assert_eq!(archive_name("photo", request), "photo_split_2x3.zip");
        assert_eq!(tile_entry_name("photo", 0, 0), "photo_r1_c1.png");
        assert_eq!(tile_entry_name("photo", 1, 2), "photo_r2_c3.png");
    }

    #[test]
    fn test_split_two_by_two() {
        let image = coordinate_image(100, 100);
        let archive = service()
            .split(&upload("grid.png", &image), GridRequest::new(2, 2))
            .unwrap();

        assert_eq!(archive.file_name, "grid_split_2x2.zip");
        assert_eq!(
            archive.entries,
            vec![
                "grid_r1_c1.png",
                "grid_r1_c2.png",
                "grid_r2_c1.png",
                "grid_r2_c2.png"
            ]
        );

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        assert_eq!(zip.len(), 4);

        let bottom_right = read_entry(&mut zip, "grid_r2_c2.png");
        assert_eq!(bottom_right.dimensions(), (50, 50));
        // Top-left pixel of the tile is source pixel (50, 50)
        assert_eq!(bottom_right.get_pixel(0, 0), &Rgb([50, 50, 0]));
    }

    #[test]
    fn test_split_remainder_in_last_row() {
        let image = coordinate_image(10, 10);
        let archive = service()
            .split(&upload("strip.png", &image), GridRequest::new(3, 1))
            .unwrap();

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        let heights: Vec<u32> = archive
            .entries
            .iter()
            .map(|name| read_entry(&mut zip, name).height())
            .collect();
        assert_eq!(heights, vec![3, 3, 4]);
    }

    #[test]
    fn test_entries_are_deflated() {
        let image = coordinate_image(8, 8);
        let archive = service()
            .split(&upload("a.png", &image), GridRequest::new(1, 2))
            .unwrap();

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        let file = zip.by_index(0).unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn test_zero_rows_rejected_before_decoding() {
        // The bytes are not an image; the grid check must fire first
        let upload = ImageUpload::new("x.png", b"garbage".to_vec()).unwrap();
        let err = service().split(&upload, GridRequest::new(0, 2)).unwrap_err();
        assert!(matches!(err, ToolError::Input(InputError::InvalidGrid)));
    }

    #[test]
    fn test_grid_finer_than_image_rejected() {
        let image = coordinate_image(3, 3);
        let err = service()
            .split(&upload("tiny.png", &image), GridRequest::new(4, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::Input(InputError::GridTooFine {
                rows: 4,
                cols: 1,
                width: 3,
                height: 3
            })
        ));
    }

    #[test]
    fn test_too_many_tiles_rejected() {
        let service = SplitService::new(SplitConfig {
            max_tiles: 4,
            ..Default::default()
        });
        let err = service.check_request(GridRequest::new(2, 3)).unwrap_err();
        assert!(matches!(err, InputError::TooManyTiles { tiles: 6, max: 4 }));
    }

    #[test]
    fn test_undecodable_image() {
        let upload = ImageUpload::new("broken.jpg", b"not a jpeg".to_vec()).unwrap();
        let err = service().split(&upload, GridRequest::new(1, 1)).unwrap_err();
        assert!(matches!(err, ToolError::Image(ImageError::Decode(_))));
    }

    #[tokio::test]
    async fn test_split_blocking() {
        let image = coordinate_image(12, 6);
        let service = Arc::new(service());
        let archive = service
            .split_blocking(upload("async.png", &image), GridRequest::new(2, 4))
            .await
            .unwrap();
        assert_eq!(archive.entries.len(), 8);
        assert_eq!(archive.dimensions, Dimensions::new(12, 6));
    }
}
