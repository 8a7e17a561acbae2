//! Error types for matstore core operations

use crate::format::{Direction, Representation, StoreFormat};

/// Errors that can occur while validating, parsing or converting matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// The (format, representation) pair is not in the support table
    UnsupportedFormat {
        format: StoreFormat,
        representation: Representation,
        direction: Direction,
    },
    /// File content violates the expected layout
    MalformedInput {
        /// 1-based line number, 0 when the problem is not tied to a line
        line: usize,
        reason: &'static str,
    },
    /// Declared shape disagrees with the data present
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Index out of bounds
    IndexOutOfBounds,
    /// Dense storage for the shape cannot be allocated
    TooLarge { nrows: usize, ncols: usize },
    /// Named dataset is absent from a container file
    DatasetNotFound,
    /// Invalid container header
    InvalidHeader,
}

impl CoreError {
    /// Shorthand for a malformed-input error at `line`
    pub const fn malformed(line: usize, reason: &'static str) -> Self {
        CoreError::MalformedInput { line, reason }
    }

    /// Whether this error reports an unsupported (format, representation) pair
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, CoreError::UnsupportedFormat { .. })
    }
}

impl core::fmt::Display for CoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CoreError::UnsupportedFormat {
                format,
                representation,
                direction,
            } => write!(
                f,
                "Unsupported format: {format} cannot {direction} {representation}"
            ),
            CoreError::MalformedInput { line: 0, reason } => {
                write!(f, "Malformed input: {reason}")
            }
            CoreError::MalformedInput { line, reason } => {
                write!(f, "Malformed input at line {line}: {reason}")
            }
            CoreError::ShapeMismatch { expected, found } => write!(
                f,
                "Shape mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            CoreError::IndexOutOfBounds => write!(f, "Index out of bounds"),
            CoreError::TooLarge { nrows, ncols } => {
                write!(f, "Matrix too large: {nrows}x{ncols} dense cells cannot be allocated")
            }
            CoreError::DatasetNotFound => write!(f, "Dataset not found"),
            CoreError::InvalidHeader => write!(f, "Invalid container header"),
        }
    }
}

impl core::error::Error for CoreError {}

/// Result type for core operations
pub type Result<T> = core::result::Result<T, CoreError>;
