//! Distributed sparse matrix

use crate::comm::Communicator;
use crate::error::Result;
use crate::wire::Wire;
use matstore_core::{block_range, CooMatrix, CoreError};
use std::ops::Range;

/// Sparse matrix partitioned by contiguous row blocks
///
/// Rank `r` stores the triples of rows `block_range(nrows, r, size)`, with
/// global indices.
#[derive(Debug, Clone, PartialEq)]
pub struct DistSparseMatrix {
    rank: usize,
    size: usize,
    local: CooMatrix,
}

impl DistSparseMatrix {
    /// Wrap this rank's triples
    ///
    /// `local` carries the global shape; every stored row must fall in this
    /// rank's row block.
    pub fn from_local(comm: &dyn Communicator, local: CooMatrix) -> Result<Self> {
        let rows = block_range(local.nrows(), comm.rank(), comm.size());
        if local.row_indices().iter().any(|row| !rows.contains(row)) {
            return Err(CoreError::IndexOutOfBounds.into());
        }
        Ok(Self {
            rank: comm.rank(),
            size: comm.size(),
            local,
        })
    }

    /// Keep this rank's rows of a matrix every rank holds
    pub fn from_replicated(comm: &dyn Communicator, global: &CooMatrix) -> Self {
        let mut local = global.clone();
        local.retain_rows(block_range(global.nrows(), comm.rank(), comm.size()));
        Self {
            rank: comm.rank(),
            size: comm.size(),
            local,
        }
    }

    pub fn nrows(&self) -> usize {
        self.local.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.local.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.local.shape()
    }

    /// Global rows stored on this rank
    pub fn row_range(&self) -> Range<usize> {
        block_range(self.local.nrows(), self.rank, self.size)
    }

    /// This rank's triples as a globally shaped matrix
    pub fn local(&self) -> &CooMatrix {
        &self.local
    }

    pub fn local_nnz(&self) -> usize {
        self.local.nnz()
    }

    /// This rank's (row, col, value) triples, global indices
    pub fn triples(&self) -> impl ExactSizeIterator<Item = (usize, usize, f64)> + '_ {
        self.local.triplets()
    }

    /// Every rank's triples, in rank order, on every rank
    pub fn gather_all(&self, comm: &dyn Communicator) -> Result<CooMatrix> {
        let gathered = comm.all_gather(self.local.encode());
        let mut full = CooMatrix::new(self.nrows(), self.ncols());
        for bytes in &gathered {
            for (row, col, value) in CooMatrix::decode(bytes)?.triplets() {
                full.push(row, col, value)?;
            }
        }
        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::{SelfComm, ThreadGroup};

    fn sample() -> CooMatrix {
        CooMatrix::from_triplets(
            5,
            4,
            vec![(0, 0, 1.0), (1, 3, 2.0), (2, 1, 3.0), (4, 2, 4.0), (4, 3, 5.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_rows_split_by_block() {
        let global = sample();
        let shards = ThreadGroup::run(2, |comm| {
            let dist = DistSparseMatrix::from_replicated(&comm, &global);
            (dist.row_range(), dist.triples().collect::<Vec<_>>())
        });
        assert_eq!(shards[0].0, 0..3);
        assert_eq!(shards[0].1, vec![(0, 0, 1.0), (1, 3, 2.0), (2, 1, 3.0)]);
        assert_eq!(shards[1].1, vec![(4, 2, 4.0), (4, 3, 5.0)]);
    }

    #[test]
    fn test_gather_all_restores_matrix() {
        let global = sample();
        let gathered = ThreadGroup::run(3, |comm| {
            DistSparseMatrix::from_replicated(&comm, &global)
                .gather_all(&comm)
                .unwrap()
        });
        assert!(gathered.iter().all(|coo| coo.to_canonical() == global));
    }

    #[test]
    fn test_from_local_rejects_foreign_rows() {
        let results = ThreadGroup::run(2, |comm| {
            DistSparseMatrix::from_local(&comm, sample()).is_err()
        });
        assert_eq!(results, vec![true, true]);
        assert!(DistSparseMatrix::from_local(&SelfComm, sample()).is_ok());
    }
}
