//! matstore - rank-aware matrix persistence
//!
//! This library writes matrices held in any of four in-memory
//! representations (local dense, local sparse, distributed dense,
//! distributed sparse) to MatrixMarket, binary container, dense text or
//! LIBSVM files, and reads them back on any number of ranks, possibly as a
//! different representation than was written.
//!
//! ## Architecture
//!
//! matstore follows a definition/implementation separation:
//!
//! - **matstore-core**: format tags, the support table, local matrices,
//!   conversions and line parsers (no I/O)
//! - **matstore**: communicator, distributed engines, codecs, rank
//!   coordination and the [`Store`] facade
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matstore::{
//!     Communicator, CooMatrix, MatrixHandle, ReadOptions, Representation, SelfComm, Store,
//! };
//!
//! fn example() -> matstore::Result<()> {
//!     let comm = SelfComm;
//!     let matrix = CooMatrix::from_triplets(3, 3, vec![(0, 0, 1.0), (2, 1, -4.5)])?;
//!
//!     let store = Store::mtx("matrix.mtx");
//!     store.write(&comm, &MatrixHandle::LocalSparse(matrix))?;
//!     comm.barrier();
//!
//!     let dense = store.read(&comm, Representation::LocalDense, &ReadOptions::default())?;
//!     println!("read {:?}", dense.shape());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **mmap**: memory-mapped container reads
//! - **serde**: JSON configuration via [`StoreConfig::from_json_str`]
//! - **cli**: command-line converter demo

// Re-export core definitions
pub use matstore_core::{
    // Local matrices and conversions
    approx_eq, approx_eq_sparse, dense_to_sparse, sparse_to_dense, CooMatrix, DenseMatrix, Matrix,
    // Format definitions
    check_read, check_write, Direction, Distribution, Representation, StoreFormat, Support,
    WriteMode, SUPPORT_TABLE, DEFAULT_DATASET, DEFAULT_TOLERANCE, ROOT_RANK,
    // Error handling
    CoreError,
};

// Implementation modules
pub mod codec;
pub mod comm;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod dist_backend;
pub mod error;
pub mod handle;
pub mod store;
mod wire;

// Public exports
pub use comm::{Communicator, PeerPanicked, SelfComm, ThreadComm, ThreadGroup};
pub use config::{LocalReadStrategy, ReadOptions, StoreConfig};
pub use convert::convert;
pub use coordinator::RankCoordinator;
pub use dist_backend::{DistDenseMatrix, DistSparseMatrix};
pub use error::{Result, StoreError};
pub use handle::{LabeledData, MatrixHandle};
pub use store::Store;
