//! The grid partitioner.
//!
//! Tiles are sized by floor division; the last row and the last column
//! extend to the image edge and absorb the remainder pixels. The result
//! always covers the image exactly, in row-major order.

use crate::error::{Argument, PartitionError};
use crate::geometry::{Dimensions, GridRequest, Tile, TileRect};

/// Split a `width` x `height` image into `rows` x `cols` rectangles.
///
/// Rectangles are returned in row-major order. Every input must be
/// non-zero, otherwise [`PartitionError::InvalidArgument`] is returned.
/// A grid whose tiles cannot be allocated yields
/// [`PartitionError::GridTooLarge`] instead of aborting.
///
/// # Example
///
/// ```
/// use tile_grid::{partition, TileRect};
///
/// let rects = partition(10, 10, 3, 1).unwrap();
/// assert_eq!(
///     rects,
///     vec![
///         TileRect::new(0, 0, 10, 3),
///         TileRect::new(0, 3, 10, 6),
///         TileRect::new(0, 6, 10, 10),
///     ]
/// );
/// ```
pub fn partition(
    width: u32,
    height: u32,
    rows: u32,
    cols: u32,
) -> Result<Vec<TileRect>, PartitionError> {
    let grid = partition_grid(Dimensions::new(width, height), GridRequest::new(rows, cols))?;
    Ok(grid.into_rects())
}

/// Like [`partition()`], but keeps each rectangle's grid position.
pub fn partition_grid(
    dimensions: Dimensions,
    request: GridRequest,
) -> Result<TileGrid, PartitionError> {
    validate(dimensions, request)?;

    let Dimensions { width, height } = dimensions;
    let GridRequest { rows, cols } = request;
    let tile_w = width / cols;
    let tile_h = height / rows;

    let too_large = PartitionError::GridTooLarge {
        tiles: request.tile_count(),
    };
    let capacity = usize::try_from(request.tile_count()).map_err(|_| too_large.clone())?;
    let mut tiles: Vec<Tile> = Vec::new();
    tiles.try_reserve_exact(capacity).map_err(|_| too_large)?;
    for row in 0..rows {
        let top = row * tile_h;
        let bottom = if row < rows - 1 { (row + 1) * tile_h } else { height };
        for col in 0..cols {
            let left = col * tile_w;
            let right = if col < cols - 1 { (col + 1) * tile_w } else { width };
            tiles.push(Tile {
                row,
                col,
                rect: TileRect::new(left, top, right, bottom),
            });
        }
    }

    Ok(TileGrid {
        dimensions,
        request,
        tiles,
    })
}

fn validate(dimensions: Dimensions, request: GridRequest) -> Result<(), PartitionError> {
    let checks = [
        (Argument::Width, dimensions.width),
        (Argument::Height, dimensions.height),
        (Argument::Rows, request.rows),
        (Argument::Cols, request.cols),
    ];
    match checks.iter().find(|(_, value)| *value == 0) {
        Some(&(argument, value)) => Err(PartitionError::invalid(argument, value)),
        None => Ok(()),
    }
}

/// The partitioned grid: `rows * cols` tiles in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    dimensions: Dimensions,
    request: GridRequest,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn request(&self) -> GridRequest {
        self.request
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false for a grid built by [`partition_grid()`].
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    /// Tile at the zero-based `(row, col)` position.
    pub fn get(&self, row: u32, col: u32) -> Option<&Tile> {
        if row >= self.request.rows || col >= self.request.cols {
            return None;
        }
        self.tiles.get((row * self.request.cols + col) as usize)
    }

    /// True when the grid is finer than the image, i.e. some tiles cover
    /// zero pixels because `rows > height` or `cols > width`.
    pub fn has_empty_tiles(&self) -> bool {
        self.tiles.iter().any(|tile| tile.rect.is_empty())
    }

    pub fn rects(&self) -> impl Iterator<Item = TileRect> + '_ {
        self.tiles.iter().map(|tile| tile.rect)
    }

    pub fn into_rects(self) -> Vec<TileRect> {
        self.tiles.into_iter().map(|tile| tile.rect).collect()
    }
}

impl<'a> IntoIterator for &'a TileGrid {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

impl IntoIterator for TileGrid {
    type Item = Tile;
    type IntoIter = std::vec::IntoIter<Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.into_iter()
    }
}
