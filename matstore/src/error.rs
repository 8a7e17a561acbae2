//! Error type for store operations

use matstore_core::{CoreError, StoreFormat};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by stores, codecs and the rank coordinator
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unsupported pair, malformed content, shape mismatch, bad header
    #[error(transparent)]
    Core(#[from] CoreError),

    /// File system failure
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Labeled reads only exist for LIBSVM stores
    #[error("{format} files carry no labels: labeled reads are libsvm-only")]
    Unlabeled { format: StoreFormat },

    /// The root failed a read or write the other ranks were waiting on
    #[error("root process failed: {0}")]
    RootFailed(String),

    /// Another rank failed its part of a collective operation
    #[error("rank {rank} failed: {message}")]
    PeerFailed { rank: usize, message: String },

    /// A collective named a rank outside the group
    #[error("rank {rank} is outside a group of {size}")]
    InvalidRank { rank: usize, size: usize },

    /// Bytes received from a peer could not be decoded
    #[error("corrupt collective payload: {0}")]
    Wire(&'static str),

    /// Configuration could not be parsed
    #[cfg(feature = "serde")]
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl StoreError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error reports an unsupported (format, representation) pair
    pub fn is_unsupported(&self) -> bool {
        match self {
            StoreError::Core(core) => core.is_unsupported(),
            StoreError::Unlabeled { .. } => true,
            _ => false,
        }
    }

    /// Whether the file content itself was rejected
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            StoreError::Core(CoreError::MalformedInput { .. } | CoreError::InvalidHeader)
        )
    }
}
