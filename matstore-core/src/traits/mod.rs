//! Abstract interfaces for local matrices

pub mod matrix;

pub use matrix::Matrix;
