//! Local representation conversions and tolerance comparison
//!
//! Conversions preserve every value and (row, col) position; only exact
//! zeros are dropped when going dense to sparse.

use crate::validation::ensure_shape;
use crate::{CooMatrix, CoreError, DenseMatrix, Result};

/// Sparse copy of `dense`, skipping exact zeros
///
/// The result is canonical (row-major, no repeats).
pub fn dense_to_sparse(dense: &DenseMatrix) -> Result<CooMatrix> {
    let mut sparse = CooMatrix::new(dense.nrows(), dense.ncols());
    for (row, values) in dense.rows().enumerate() {
        for (col, &value) in values.iter().enumerate() {
            if value != 0.0 {
                sparse.push(row, col, value)?;
            }
        }
    }
    Ok(sparse)
}

/// Dense copy of `sparse`; repeated coordinates are summed
///
/// Fails with [`CoreError::TooLarge`] when the dense cells cannot be
/// allocated.
pub fn sparse_to_dense(sparse: &CooMatrix) -> Result<DenseMatrix> {
    let mut dense = DenseMatrix::zeros(sparse.nrows(), sparse.ncols())?;
    for (row, col, value) in sparse.triplets() {
        let current = dense.get(row, col).ok_or(CoreError::IndexOutOfBounds)?;
        dense.set(row, col, current + value)?;
    }
    Ok(dense)
}

/// Squared Frobenius norm of `a - b`
pub fn frobenius_distance_sq(a: &DenseMatrix, b: &DenseMatrix) -> Result<f64> {
    ensure_shape(a.shape(), b.shape())?;
    Ok(a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum())
}

/// Whether `a` and `b` have equal shapes and Frobenius distance at most `tol`
pub fn approx_eq(a: &DenseMatrix, b: &DenseMatrix, tol: f64) -> bool {
    frobenius_distance_sq(a, b).is_ok_and(|dist| dist <= tol * tol)
}

/// [`approx_eq`] for coordinate matrices
///
/// Shapes too large to densify compare unequal.
pub fn approx_eq_sparse(a: &CooMatrix, b: &CooMatrix, tol: f64) -> bool {
    match (sparse_to_dense(a), sparse_to_dense(b)) {
        (Ok(a), Ok(b)) => approx_eq(&a, &b, tol),
        _ => false,
    }
}
