//! Coordinate-format local sparse matrix

use crate::{CoreError, Matrix, Result};
use alloc::vec::Vec;

/// Sparse matrix owned by a single process, stored as (row, col, value)
/// triples with 0-based indices
///
/// A matrix is canonical when its triples are sorted row-major and no
/// coordinate repeats. Equality compares stored triples exactly, so compare
/// canonical matrices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CooMatrix {
    nrows: usize,
    ncols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl CooMatrix {
    /// Empty `nrows × ncols` matrix
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            ..Self::default()
        }
    }

    /// Build from triples, rejecting out-of-range coordinates
    pub fn from_triplets<I>(nrows: usize, ncols: usize, triplets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut matrix = Self::new(nrows, ncols);
        for (row, col, value) in triplets {
            matrix.push(row, col, value)?;
        }
        Ok(matrix)
    }

    pub fn push(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.nrows || col >= self.ncols {
            return Err(CoreError::IndexOutOfBounds);
        }
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
        Ok(())
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Number of stored triples, explicit zeros included
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.cols
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn triplets(&self) -> impl ExactSizeIterator<Item = (usize, usize, f64)> + '_ {
        (0..self.values.len()).map(move |i| (self.rows[i], self.cols[i], self.values[i]))
    }

    /// Whether triples are sorted row-major without repeats
    pub fn is_canonical(&self) -> bool {
        (1..self.values.len())
            .all(|i| (self.rows[i - 1], self.cols[i - 1]) < (self.rows[i], self.cols[i]))
    }

    /// Sort triples row-major and sum repeated coordinates
    pub fn canonicalize(&mut self) {
        if self.is_canonical() {
            return;
        }
        let mut triplets: Vec<(usize, usize, f64)> = self.triplets().collect();
        triplets.sort_by_key(|&(row, col, _)| (row, col));

        self.rows.clear();
        self.cols.clear();
        self.values.clear();
        for (row, col, value) in triplets {
            let last = self.values.len();
            if last > 0 && self.rows[last - 1] == row && self.cols[last - 1] == col {
                self.values[last - 1] += value;
            } else {
                self.rows.push(row);
                self.cols.push(col);
                self.values.push(value);
            }
        }
    }

    /// Canonical copy
    pub fn to_canonical(&self) -> Self {
        let mut copy = self.clone();
        copy.canonicalize();
        copy
    }

    /// Keep only triples whose row lies in `rows`
    pub fn retain_rows(&mut self, rows: core::ops::Range<usize>) {
        let mut kept = 0;
        for i in 0..self.values.len() {
            if rows.contains(&self.rows[i]) {
                self.rows[kept] = self.rows[i];
                self.cols[kept] = self.cols[i];
                self.values[kept] = self.values[i];
                kept += 1;
            }
        }
        self.rows.truncate(kept);
        self.cols.truncate(kept);
        self.values.truncate(kept);
    }
}

impl Matrix for CooMatrix {
    fn get_element(&self, row: usize, col: usize) -> Option<f64> {
        let sum: f64 = self
            .triplets()
            .filter(|&(r, c, _)| r == row && c == col)
            .map(|(_, _, value)| value)
            .sum();
        (sum != 0.0).then_some(sum)
    }

    fn dimensions(&self) -> (usize, usize) {
        self.shape()
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }
}
