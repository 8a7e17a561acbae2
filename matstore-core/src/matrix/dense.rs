//! Row-major local dense matrix

use crate::validation::ensure_shape;
use crate::{CoreError, Matrix, Result};
use alloc::vec::Vec;
use core::ops::Range;

/// Dense matrix owned by a single process, stored row-major
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DenseMatrix {
    nrows: usize,
    ncols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Wrap row-major `data`; its length must be `nrows * ncols`
    pub fn new(nrows: usize, ncols: usize, data: Vec<f64>) -> Result<Self> {
        let expected = nrows.checked_mul(ncols).ok_or(CoreError::IndexOutOfBounds)?;
        if data.len() != expected {
            return Err(CoreError::ShapeMismatch {
                expected: (nrows, ncols),
                found: (data.len() / ncols.max(1), ncols),
            });
        }
        Ok(Self { nrows, ncols, data })
    }

    /// All-zero matrix, or [`CoreError::TooLarge`] when the cells cannot
    /// be addressed or allocated
    pub fn zeros(nrows: usize, ncols: usize) -> Result<Self> {
        let too_large = CoreError::TooLarge { nrows, ncols };
        let cells = nrows
            .checked_mul(ncols)
            .filter(|&cells| cells <= isize::MAX as usize / core::mem::size_of::<f64>())
            .ok_or(too_large)?;
        let mut data = Vec::new();
        data.try_reserve_exact(cells).map_err(|_| too_large)?;
        data.resize(cells, 0.0);
        Ok(Self { nrows, ncols, data })
    }

    /// Build from a function of (row, col)
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in 0..nrows {
            for col in 0..ncols {
                data.push(f(row, col));
            }
        }
        Self { nrows, ncols, data }
    }

    /// Build from equally long rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * ncols);
        for row in rows {
            ensure_shape((rows.len(), ncols), (rows.len(), row.len()))?;
            data.extend_from_slice(row);
        }
        Ok(Self {
            nrows: rows.len(),
            ncols,
            data,
        })
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

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.nrows && col < self.ncols {
            Some(self.data[row * self.ncols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.nrows || col >= self.ncols {
            return Err(CoreError::IndexOutOfBounds);
        }
        self.data[row * self.ncols + col] = value;
        Ok(())
    }

    /// One row as a slice
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.ncols;
        &self.data[start..start + self.ncols]
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.nrows).map(move |row| self.row(row))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Copy of the rectangle `rows × cols`
    pub fn submatrix(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Self> {
        if rows.end > self.nrows || cols.end > self.ncols || rows.start > rows.end || cols.start > cols.end {
            return Err(CoreError::IndexOutOfBounds);
        }
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for row in rows.clone() {
            let start = row * self.ncols;
            data.extend_from_slice(&self.data[start + cols.start..start + cols.end]);
        }
        Ok(Self {
            nrows: rows.len(),
            ncols: cols.len(),
            data,
        })
    }

    /// Copy `block` into this matrix with its top-left corner at (row, col)
    pub fn paste(&mut self, row: usize, col: usize, block: &DenseMatrix) -> Result<()> {
        if row + block.nrows > self.nrows || col + block.ncols > self.ncols {
            return Err(CoreError::IndexOutOfBounds);
        }
        for (offset, source) in block.rows().enumerate() {
            let start = (row + offset) * self.ncols + col;
            self.data[start..start + block.ncols].copy_from_slice(source);
        }
        Ok(())
    }
}

impl Matrix for DenseMatrix {
    fn get_element(&self, row: usize, col: usize) -> Option<f64> {
        self.get(row, col).filter(|value| *value != 0.0)
    }

    fn dimensions(&self) -> (usize, usize) {
        self.shape()
    }

    fn nnz(&self) -> usize {
        self.data.iter().filter(|value| **value != 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_new_checks_length() {
        assert!(DenseMatrix::new(2, 3, vec![0.0; 6]).is_ok());
        assert!(matches!(
            DenseMatrix::new(2, 3, vec![0.0; 5]),
            Err(CoreError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_submatrix_and_paste() {
        let m = DenseMatrix::from_fn(4, 5, |r, c| (r * 10 + c) as f64);
        let block = m.submatrix(1..3, 2..5).unwrap();
        assert_eq!(block.shape(), (2, 3));
        assert_eq!(block.row(0), &[12.0, 13.0, 14.0]);
        assert_eq!(block.row(1), &[22.0, 23.0, 24.0]);

        let mut target = DenseMatrix::zeros(4, 5).unwrap();
        target.paste(1, 2, &block).unwrap();
        assert_eq!(target.get(2, 4), Some(24.0));
        assert_eq!(target.get(0, 0), Some(0.0));
        assert!(target.paste(3, 3, &block).is_err());
    }

    #[test]
    fn test_zeros_rejects_unaddressable_shapes() {
        assert_eq!(DenseMatrix::zeros(0, 7).unwrap().shape(), (0, 7));
        assert_eq!(
            DenseMatrix::zeros(1 << 32, (1 << 32) + 1),
            Err(CoreError::TooLarge {
                nrows: 1 << 32,
                ncols: (1 << 32) + 1
            })
        );
        assert!(matches!(
            DenseMatrix::zeros(usize::MAX / 4, 2),
            Err(CoreError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(DenseMatrix::from_rows(&rows).is_err());
    }
}
