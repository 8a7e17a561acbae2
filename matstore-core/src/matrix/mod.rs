//! Local matrix types exchanged with the array libraries

pub mod coo;
pub mod dense;

pub use coo::CooMatrix;
pub use dense::DenseMatrix;
