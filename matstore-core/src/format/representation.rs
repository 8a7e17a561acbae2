//! Store formats, in-memory representations and I/O directions

use crate::CoreError;
use core::str::FromStr;

/// On-disk formats a store can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum StoreFormat {
    /// MatrixMarket coordinate text
    Mtx = 0,
    /// Binary named-dataset container
    Hdf5 = 1,
    /// Dense delimited text
    Txt = 2,
    /// LIBSVM sparse feature/label text
    Libsvm = 3,
}

impl StoreFormat {
    /// Every format, in table order
    pub const ALL: [StoreFormat; 4] = [
        StoreFormat::Mtx,
        StoreFormat::Hdf5,
        StoreFormat::Txt,
        StoreFormat::Libsvm,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            StoreFormat::Mtx => "mtx",
            StoreFormat::Hdf5 => "hdf5",
            StoreFormat::Txt => "txt",
            StoreFormat::Libsvm => "libsvm",
        }
    }

    /// Guess a format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mtx" | "mm" => Some(StoreFormat::Mtx),
            "h5" | "hdf5" => Some(StoreFormat::Hdf5),
            "txt" | "dat" | "csv" => Some(StoreFormat::Txt),
            "libsvm" | "svm" | "t" => Some(StoreFormat::Libsvm),
            _ => None,
        }
    }
}

impl core::fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StoreFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StoreFormat::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or(CoreError::malformed(0, "unknown store format"))
    }
}

/// In-memory shapes a matrix can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[repr(u8)]
pub enum Representation {
    /// Dense array owned by one process
    LocalDense = 0,
    /// Coordinate sparse array owned by one process
    LocalSparse = 1,
    /// Dense array partitioned by a [`Distribution`](crate::Distribution)
    DistributedDense = 2,
    /// Sparse array partitioned by row blocks
    DistributedSparse = 3,
}

impl Representation {
    /// Every representation, in table order
    pub const ALL: [Representation; 4] = [
        Representation::LocalDense,
        Representation::LocalSparse,
        Representation::DistributedDense,
        Representation::DistributedSparse,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Representation::LocalDense => "local-dense",
            Representation::LocalSparse => "local-sparse",
            Representation::DistributedDense => "distributed-dense",
            Representation::DistributedSparse => "distributed-sparse",
        }
    }

    /// Name used by the array libraries each representation stands in for
    pub const fn alias(self) -> &'static str {
        match self {
            Representation::LocalDense => "numpy-dense",
            Representation::LocalSparse => "scipy-sparse",
            Representation::DistributedDense => "elemental-dense",
            Representation::DistributedSparse => "combblas-sparse",
        }
    }

    pub const fn is_local(self) -> bool {
        matches!(
            self,
            Representation::LocalDense | Representation::LocalSparse
        )
    }

    pub const fn is_sparse(self) -> bool {
        matches!(
            self,
            Representation::LocalSparse | Representation::DistributedSparse
        )
    }
}

impl core::fmt::Display for Representation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Representation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Representation::ALL
            .into_iter()
            .find(|repr| repr.name() == s || repr.alias() == s)
            .ok_or(CoreError::malformed(0, "unknown representation name"))
    }
}

/// Direction of an I/O operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::Read => f.write_str("read"),
            Direction::Write => f.write_str("write"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representation_aliases() {
        assert_eq!(
            "combblas-sparse".parse::<Representation>(),
            Ok(Representation::DistributedSparse)
        );
        assert_eq!(
            "scipy-sparse".parse::<Representation>(),
            Ok(Representation::LocalSparse)
        );
        assert_eq!(
            "numpy-dense".parse::<Representation>(),
            Ok(Representation::LocalDense)
        );
        assert_eq!(
            "elemental-dense".parse::<Representation>(),
            Ok(Representation::DistributedDense)
        );
        assert_eq!(
            "distributed-dense".parse::<Representation>(),
            Ok(Representation::DistributedDense)
        );
        assert!("pandas-frame".parse::<Representation>().is_err());
    }

    #[test]
    fn test_format_names() {
        assert_eq!("HDF5".parse::<StoreFormat>(), Ok(StoreFormat::Hdf5));
        assert_eq!(StoreFormat::from_extension("h5"), Some(StoreFormat::Hdf5));
        assert_eq!(StoreFormat::from_extension("mtx"), Some(StoreFormat::Mtx));
        assert_eq!(StoreFormat::from_extension("bin"), None);
    }
}
