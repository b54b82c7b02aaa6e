//! tile-grid: exact-cover grid partitioning for images
//!
//! Given an image's pixel dimensions and a row/column count, this crate
//! computes the rectangle of every tile. The tiles cover the image with no
//! gaps and no overlaps.
//!
//! # Quick Start
//!
//! ```
//! use tile_grid::{partition, TileRect};
//!
//! let rects = partition(100, 100, 2, 2).unwrap();
//! assert_eq!(
//!     rects,
//!     vec![
//!         TileRect::new(0, 0, 50, 50),
//!         TileRect::new(50, 0, 100, 50),
//!         TileRect::new(0, 50, 50, 100),
//!         TileRect::new(50, 50, 100, 100),
//!     ]
//! );
//! ```
//!
//! # Remainder Pixels
//!
//! Base tile sizes come from floor division (`width / cols`,
//! `height / rows`). When a dimension is not evenly divisible, the pixels
//! left over are absorbed by the last column or last row, which may
//! therefore be larger than the others:
//!
//! ```text
//! width = 11, cols = 4
//!
//! |  2  |  2  |  2  |    5    |
//! 0     2     4     6         11
//! ```
//!
//! The leftover is not spread across tiles and not centered. Tile sizes are
//! visible to users in the produced files, so this policy is part of the
//! contract.
//!
//! # Grid Positions
//!
//! [`partition_grid()`] keeps each rectangle's `(row, col)` position and
//! reports grids that are finer than the image:
//!
//! ```
//! use tile_grid::{partition_grid, Dimensions, GridRequest};
//!
//! let grid = partition_grid(Dimensions::new(9, 6), GridRequest::new(2, 3)).unwrap();
//! assert_eq!(grid.len(), 6);
//! assert_eq!(grid.get(1, 2).unwrap().rect.as_box(), (6, 3, 9, 6));
//! assert!(!grid.has_empty_tiles());
//! ```

pub mod error;
pub mod geometry;
pub mod partition;

pub use error::{Argument, PartitionError};
pub use geometry::{Dimensions, GridRequest, Tile, TileRect};
pub use partition::{partition, partition_grid, TileGrid};
