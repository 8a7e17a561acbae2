//! Format × representation support table
//!
//! Every store consults this table before any codec runs, so an
//! unsupported pair is rejected without touching the file.

use super::{Direction, Representation, StoreFormat};
use crate::{CoreError, Result};

/// Who performs the physical write for a supported pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Not writable
    Unsupported,
    /// Rank 0 writes, other ranks return without touching the file
    RootOnly,
    /// Every rank takes part in one collective write
    Collective,
}

/// Capabilities of one (format, representation) cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Support {
    pub read: bool,
    pub write: WriteMode,
}

impl Support {
    const NONE: Self = Self {
        read: false,
        write: WriteMode::Unsupported,
    };

    const fn read_only() -> Self {
        Self {
            read: true,
            write: WriteMode::Unsupported,
        }
    }

    const fn read_write(write: WriteMode) -> Self {
        Self { read: true, write }
    }
}

/// Rows indexed by [`StoreFormat`], columns by [`Representation`]
///
/// Column order: local dense, local sparse, distributed dense,
/// distributed sparse.
pub const SUPPORT_TABLE: [[Support; 4]; 4] = [
    // mtx
    [
        Support::read_only(),
        Support::read_write(WriteMode::RootOnly),
        Support::NONE,
        Support::read_only(),
    ],
    // hdf5
    [
        Support::read_write(WriteMode::RootOnly),
        Support::NONE,
        Support::read_write(WriteMode::Collective),
        Support::NONE,
    ],
    // txt
    [
        Support::read_write(WriteMode::RootOnly),
        Support::NONE,
        Support {
            read: false,
            write: WriteMode::Collective,
        },
        Support::NONE,
    ],
    // libsvm: only the combined features + labels read
    [Support::NONE, Support::read_only(), Support::NONE, Support::NONE],
];

/// Look up the table cell for a pair
pub const fn support(format: StoreFormat, representation: Representation) -> Support {
    SUPPORT_TABLE[format as usize][representation as usize]
}

/// Fail unless `format` can produce `representation` on read
pub fn check_read(format: StoreFormat, representation: Representation) -> Result<()> {
    if support(format, representation).read {
        Ok(())
    } else {
        Err(CoreError::UnsupportedFormat {
            format,
            representation,
            direction: Direction::Read,
        })
    }
}

/// Fail unless `format` accepts `representation` on write
pub fn check_write(format: StoreFormat, representation: Representation) -> Result<WriteMode> {
    match support(format, representation).write {
        WriteMode::Unsupported => Err(CoreError::UnsupportedFormat {
            format,
            representation,
            direction: Direction::Write,
        }),
        mode => Ok(mode),
    }
}
