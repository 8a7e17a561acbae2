#![no_std]

//! matstore core - matrix representation and format definitions
//!
//! This crate provides the pure definitions every matrix store shares:
//! format and representation tags, the format × representation support
//! table, distribution layouts, local matrix types, local conversions and
//! line-level parsers. It performs no I/O.

extern crate alloc;

pub mod convert;
pub mod error;
pub mod format;
pub mod matrix;
pub mod traits;
pub mod validation;

pub use convert::{approx_eq, approx_eq_sparse, dense_to_sparse, frobenius_distance_sq, sparse_to_dense};
pub use error::*;
pub use format::*;
pub use matrix::{CooMatrix, DenseMatrix};
pub use traits::*;
