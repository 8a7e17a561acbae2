//! Format, representation and layout definitions
//!
//! Pure data definitions shared by every store: which formats exist, which
//! in-memory representations they exchange, how distributed layouts split a
//! matrix, and the on-disk headers. No I/O happens here.

pub mod constants;
pub mod container;
pub mod distribution;
pub mod mtx;
pub mod representation;
pub mod support;

pub use constants::{ALIGNMENT_BOUNDARY, DEFAULT_DATASET, DEFAULT_TOLERANCE, ROOT_RANK};
pub use container::{directory_entries, single_dataset_layout, ContainerHeader, DatasetEntry};
pub use distribution::{block_owner, block_range, Distribution};
pub use mtx::{MtxField, MtxHeader, MtxLayout, MtxSymmetry};
pub use representation::{Direction, Representation, StoreFormat};
pub use support::{check_read, check_write, support, Support, WriteMode, SUPPORT_TABLE};
