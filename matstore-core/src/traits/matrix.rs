//! Element access shared by every local matrix type
//!
//! Codecs and converters only need dimensions and stored-entry access, so
//! both dense and coordinate matrices expose the same minimal interface.

/// Format-agnostic read access to a local matrix
pub trait Matrix {
    /// Get the non-zero value at (row, col)
    ///
    /// Returns `None` if the element is zero or the position is out of
    /// bounds.
    fn get_element(&self, row: usize, col: usize) -> Option<f64>;

    /// Get matrix dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize);

    /// Number of stored entries
    fn nnz(&self) -> usize;

    /// Whether `other` has the same dimensions
    fn same_shape<M: Matrix + ?Sized>(&self, other: &M) -> bool {
        self.dimensions() == other.dimensions()
    }
}
