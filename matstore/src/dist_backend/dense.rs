//! Distributed dense matrix

use super::overlap;
use crate::comm::Communicator;
use crate::coordinator::RankCoordinator;
use crate::error::{Result, StoreError};
use crate::wire::{Wire, WireReader, WireWriter};
use matstore_core::{CoreError, DenseMatrix, Distribution, ROOT_RANK};
use std::ops::Range;
use tracing::debug;

/// Dense matrix whose elements are spread over a process group according
/// to a [`Distribution`]
///
/// Each rank holds one contiguous block, `local`, covering
/// `local_extent()` of the global matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DistDenseMatrix {
    nrows: usize,
    ncols: usize,
    distribution: Distribution,
    rank: usize,
    size: usize,
    local: DenseMatrix,
}

/// A contributed block and its global top-left corner
struct Block {
    row: usize,
    col: usize,
    data: DenseMatrix,
}

impl Wire for Block {
    fn encode_into(&self, out: &mut WireWriter) {
        out.word(self.row);
        out.word(self.col);
        self.data.encode_into(out);
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Block {
            row: reader.word()?,
            col: reader.word()?,
            data: DenseMatrix::decode_from(reader)?,
        })
    }
}

impl DistDenseMatrix {
    /// Wrap this rank's block of a `nrows × ncols` matrix
    ///
    /// `local` must match the block the distribution assigns to this rank.
    pub fn from_local(
        comm: &dyn Communicator,
        nrows: usize,
        ncols: usize,
        distribution: Distribution,
        local: DenseMatrix,
    ) -> Result<Self> {
        let (rows, cols) = distribution.local_extent(nrows, ncols, comm.rank(), comm.size());
        if local.shape() != (rows.len(), cols.len()) {
            return Err(CoreError::ShapeMismatch {
                expected: (rows.len(), cols.len()),
                found: local.shape(),
            }
            .into());
        }
        Ok(Self {
            nrows,
            ncols,
            distribution,
            rank: comm.rank(),
            size: comm.size(),
            local,
        })
    }

    /// All-zero matrix under `distribution`
    pub fn zeros(
        comm: &dyn Communicator,
        nrows: usize,
        ncols: usize,
        distribution: Distribution,
    ) -> Result<Self> {
        let (rows, cols) = distribution.local_extent(nrows, ncols, comm.rank(), comm.size());
        Ok(Self {
            nrows,
            ncols,
            distribution,
            rank: comm.rank(),
            size: comm.size(),
            local: DenseMatrix::zeros(rows.len(), cols.len())?,
        })
    }

    /// Cut this rank's block out of a full copy every rank holds
    ///
    /// No communication takes place.
    pub fn from_replicated(
        comm: &dyn Communicator,
        global: &DenseMatrix,
        distribution: Distribution,
    ) -> Result<Self> {
        let (nrows, ncols) = global.shape();
        let (rows, cols) = distribution.local_extent(nrows, ncols, comm.rank(), comm.size());
        let local = global.submatrix(rows, cols)?;
        Self::from_local(comm, nrows, ncols, distribution, local)
    }

    /// Scatter a matrix held by the root only
    ///
    /// `global` is ignored on other ranks. When the root holds nothing,
    /// every rank fails with [`StoreError::RootFailed`].
    pub fn from_root(
        comm: &dyn Communicator,
        global: Option<&DenseMatrix>,
        distribution: Distribution,
    ) -> Result<Self> {
        let is_root = comm.rank() == ROOT_RANK;
        let (nrows, ncols) = RankCoordinator::new(comm).root_then_broadcast(|| {
            global
                .map(DenseMatrix::shape)
                .ok_or_else(|| StoreError::RootFailed("root holds no matrix".into()))
        })?;
        let rooted = match global.filter(|_| is_root) {
            Some(matrix) => Self::from_local(comm, nrows, ncols, Distribution::Root, matrix.clone())?,
            None => Self::zeros(comm, nrows, ncols, Distribution::Root)?,
        };
        rooted.redistribute(comm, distribution)
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

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Rank this handle was created on
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Group size this handle was created for
    pub fn group_size(&self) -> usize {
        self.size
    }

    /// This rank's block
    pub fn local(&self) -> &DenseMatrix {
        &self.local
    }

    /// Global rows and columns covered by [`local`](Self::local)
    pub fn local_extent(&self) -> (Range<usize>, Range<usize>) {
        self.distribution
            .local_extent(self.nrows, self.ncols, self.rank, self.size)
    }

    /// Copy into `target`, preserving every element's global position
    ///
    /// Collective: every rank must call it with the same target.
    pub fn redistribute(&self, comm: &dyn Communicator, target: Distribution) -> Result<Self> {
        // allocation failures must not leave peers waiting in all_gather
        let mut result = RankCoordinator::new(comm)
            .agree(Self::zeros(comm, self.nrows, self.ncols, target))?;
        let (rows, cols) = self.local_extent();
        let contribution = if self.distribution.contributes(self.rank) {
            Block {
                row: rows.start,
                col: cols.start,
                data: self.local.clone(),
            }
            .encode()
        } else {
            Vec::new()
        };
        let gathered = comm.all_gather(contribution);

        let (want_rows, want_cols) = result.local_extent();
        for bytes in gathered.iter().filter(|bytes| !bytes.is_empty()) {
            let block = Block::decode(bytes)?;
            let have_rows = block.row..block.row + block.data.nrows();
            let have_cols = block.col..block.col + block.data.ncols();
            let common_rows = overlap(&want_rows, &have_rows);
            let common_cols = overlap(&want_cols, &have_cols);
            if common_rows.is_empty() || common_cols.is_empty() {
                continue;
            }
            let piece = block.data.submatrix(
                common_rows.start - block.row..common_rows.end - block.row,
                common_cols.start - block.col..common_cols.end - block.col,
            )?;
            result.local.paste(
                common_rows.start - want_rows.start,
                common_cols.start - want_cols.start,
                &piece,
            )?;
        }
        debug!(
            rank = self.rank,
            from = %self.distribution,
            to = %target,
            "redistributed {}x{} matrix",
            self.nrows,
            self.ncols
        );
        Ok(result)
    }

    /// Full copy of the matrix on every rank
    pub fn gather_all(&self, comm: &dyn Communicator) -> Result<DenseMatrix> {
        if self.distribution == Distribution::Replicated {
            return Ok(self.local.clone());
        }
        Ok(self.redistribute(comm, Distribution::Replicated)?.local)
    }

    /// Full copy on the root, `None` elsewhere
    pub fn gather_root(&self, comm: &dyn Communicator) -> Result<Option<DenseMatrix>> {
        let rooted = self.redistribute(comm, Distribution::Root)?;
        Ok((comm.rank() == ROOT_RANK).then_some(rooted.local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::{SelfComm, ThreadGroup};

    fn sample(nrows: usize, ncols: usize) -> DenseMatrix {
        DenseMatrix::from_fn(nrows, ncols, |r, c| (r * 100 + c) as f64)
    }

    #[test]
    fn test_blocks_follow_distribution() {
        let global = sample(5, 7);
        let blocks = ThreadGroup::run(3, |comm| {
            let dist = DistDenseMatrix::from_replicated(&comm, &global, Distribution::ColumnBlock)
                .unwrap();
            (dist.local_extent(), dist.local().clone())
        });
        assert_eq!(blocks[0].0, (0..5, 0..3));
        assert_eq!(blocks[1].0, (0..5, 3..5));
        assert_eq!(blocks[2].0, (0..5, 5..7));
        assert_eq!(blocks[2].1, global.submatrix(0..5, 5..7).unwrap());
    }

    #[test]
    fn test_redistribute_preserves_positions() {
        let global = sample(6, 4);
        for from in Distribution::ALL {
            for to in Distribution::ALL {
                let results = ThreadGroup::run(4, |comm| {
                    let source = DistDenseMatrix::from_replicated(&comm, &global, from).unwrap();
                    let moved = source.redistribute(&comm, to).unwrap();
                    let (rows, cols) = moved.local_extent();
                    let expected = global.submatrix(rows, cols).unwrap();
                    (moved.local().clone(), expected, moved.gather_all(&comm).unwrap())
                });
                for (local, expected, full) in results {
                    assert_eq!(local, expected, "{from} -> {to}");
                    assert_eq!(full, global);
                }
            }
        }
    }

    #[test]
    fn test_from_root_and_gather_root() {
        let global = sample(3, 9);
        let results = ThreadGroup::run(2, |comm| {
            let held = (comm.rank() == 0).then_some(&global);
            let dist = DistDenseMatrix::from_root(&comm, held, Distribution::RowBlock).unwrap();
            (dist.shape(), dist.gather_root(&comm).unwrap())
        });
        assert_eq!(results[0], ((3, 9), Some(global.clone())));
        assert_eq!(results[1], ((3, 9), None));
    }

    #[test]
    fn test_from_root_without_matrix_fails_everywhere() {
        let results = ThreadGroup::run(2, |comm| {
            DistDenseMatrix::from_root(&comm, None, Distribution::RowBlock)
        });
        for result in results {
            assert!(matches!(result, Err(StoreError::RootFailed(_))));
        }
    }

    #[test]
    fn test_unallocatable_target_fails_on_every_rank() {
        let results = ThreadGroup::run(2, |comm| {
            // shape bookkeeping only; redistribute fails before reading blocks
            let huge = DistDenseMatrix {
                nrows: 1 << 32,
                ncols: (1 << 32) + 1,
                distribution: Distribution::RowBlock,
                rank: comm.rank(),
                size: 2,
                local: DenseMatrix::default(),
            };
            huge.redistribute(&comm, Distribution::Root)
        });
        assert!(matches!(
            results[0],
            Err(StoreError::Core(CoreError::TooLarge { .. }))
        ));
        assert!(matches!(results[1], Err(StoreError::PeerFailed { rank: 0, .. })));
    }

    #[test]
    fn test_from_local_checks_block_shape() {
        let err = DistDenseMatrix::from_local(
            &SelfComm,
            2,
            2,
            Distribution::RowBlock,
            DenseMatrix::zeros(1, 2).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_more_ranks_than_rows() {
        let global = sample(2, 2);
        let results = ThreadGroup::run(3, |comm| {
            let dist = DistDenseMatrix::from_replicated(&comm, &global, Distribution::RowBlock)
                .unwrap();
            (dist.local().shape(), dist.gather_all(&comm).unwrap())
        });
        assert_eq!(results[2].0, (0, 2));
        assert!(results.iter().all(|(_, full)| *full == global));
    }
}
