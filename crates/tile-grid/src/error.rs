//! Error type for grid partitioning.

use std::fmt;

/// Which partition input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Width,
    Height,
    Rows,
    Cols,
}

impl Argument {
    /// Lowercase argument name as it appears in messages.
    pub fn name(self) -> &'static str {
        match self {
            Argument::Width => "width",
            Argument::Height => "height",
            Argument::Rows => "rows",
            Argument::Cols => "cols",
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned by [`partition()`](crate::partition) and
/// [`partition_grid()`](crate::partition_grid).
///
/// Either an input is not a positive integer, or the grid has more tiles
/// than can be held in memory. No partial result is ever produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// An input was zero
    InvalidArgument {
        /// The offending input
        argument: Argument,
        /// The value that was supplied
        value: u32,
    },
    /// `rows * cols` tiles could not be allocated
    GridTooLarge {
        /// Requested number of tiles
        tiles: u64,
    },
}

impl PartitionError {
    pub(crate) fn invalid(argument: Argument, value: u32) -> Self {
        PartitionError::InvalidArgument { argument, value }
    }

    /// The input that caused the error, if a single input is to blame.
    pub fn argument(&self) -> Option<Argument> {
        match self {
            PartitionError::InvalidArgument { argument, .. } => Some(*argument),
            PartitionError::GridTooLarge { .. } => None,
        }
    }
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionError::InvalidArgument { argument, value } => {
                write!(
                    f,
                    "invalid argument: {} must be a positive integer (got {})",
                    argument, value
                )
            }
            PartitionError::GridTooLarge { tiles } => {
                write!(f, "grid of {} tiles is too large to allocate", tiles)
            }
        }
    }
}

impl std::error::Error for PartitionError {}
