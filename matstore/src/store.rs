//! Store facade: one file bound to one format
//!
//! Every call consults the support table first, so an unsupported
//! (format, representation) pair fails on every rank before any file is
//! touched. Root-only writes do not synchronize; callers place a barrier
//! between a write and reads on other ranks.

use crate::codec::libsvm::LibsvmOptions;
use crate::codec::{container, file_io, libsvm, mtx, txt};
use crate::comm::Communicator;
use crate::config::{LocalReadStrategy, ReadOptions, StoreConfig};
use crate::coordinator::RankCoordinator;
use crate::dist_backend::{DistDenseMatrix, DistSparseMatrix};
use crate::error::{Result, StoreError};
use crate::handle::{LabeledData, MatrixHandle};
use crate::wire::Wire;
use matstore_core::{
    block_range, check_read, check_write, sparse_to_dense, CoreError, Direction, Distribution,
    Representation, StoreFormat,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A (path, format) pair
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    format: StoreFormat,
    config: StoreConfig,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>, format: StoreFormat) -> Self {
        Self {
            path: path.into(),
            format,
            config: StoreConfig::default(),
        }
    }

    pub fn mtx(path: impl Into<PathBuf>) -> Self {
        Self::new(path, StoreFormat::Mtx)
    }

    pub fn hdf5(path: impl Into<PathBuf>) -> Self {
        Self::new(path, StoreFormat::Hdf5)
    }

    pub fn txt(path: impl Into<PathBuf>) -> Self {
        Self::new(path, StoreFormat::Txt)
    }

    pub fn libsvm(path: impl Into<PathBuf>) -> Self {
        Self::new(path, StoreFormat::Libsvm)
    }

    /// Bind `path` to the format its extension names
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(StoreFormat::from_extension)
            .ok_or(CoreError::malformed(0, "cannot infer format from file extension"))?;
        Ok(Self::new(path, format))
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StoreFormat {
        self.format
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn libsvm_options(&self) -> LibsvmOptions {
        LibsvmOptions {
            zero_based: self.config.libsvm_zero_based,
            n_features: self.config.libsvm_n_features,
        }
    }

    /// Persist `matrix`
    ///
    /// Local representations are written by rank 0 alone; the other ranks
    /// return immediately. Distributed dense matrices are written
    /// collectively and every rank returns only after the file is in place.
    pub fn write(&self, comm: &dyn Communicator, matrix: &MatrixHandle) -> Result<()> {
        let representation = matrix.representation();
        let mode = check_write(self.format, representation)?;
        let coordinator = RankCoordinator::new(comm);
        info!(
            rank = comm.rank(),
            format = %self.format,
            %representation,
            path = %self.path.display(),
            shape = ?matrix.shape(),
            ?mode,
            "writing matrix"
        );

        match (self.format, matrix) {
            (StoreFormat::Mtx, MatrixHandle::LocalSparse(m)) => coordinator
                .root_only("mtx write", || mtx::write(&self.path, m, &self.config))
                .map(drop),
            (StoreFormat::Hdf5, MatrixHandle::LocalDense(m)) => coordinator
                .root_only("container write", || {
                    container::write(&self.path, &self.config.dataset, m)
                })
                .map(drop),
            (StoreFormat::Hdf5, MatrixHandle::DistributedDense(m)) => {
                self.write_container_shards(&coordinator, m)
            }
            (StoreFormat::Txt, MatrixHandle::LocalDense(m)) => coordinator
                .root_only("txt write", || txt::write(&self.path, m, &self.config))
                .map(drop),
            (StoreFormat::Txt, MatrixHandle::DistributedDense(m)) => {
                let written = match m.gather_root(comm) {
                    Ok(Some(full)) => txt::write(&self.path, &full, &self.config),
                    Ok(None) => Ok(()),
                    Err(err) => Err(err),
                };
                coordinator.agree(written)
            }
            _ => Err(unsupported(self.format, representation, Direction::Write)),
        }
    }

    /// Collective container write: the root preallocates a temporary file,
    /// every rank fills in its block, the root renames it into place
    fn write_container_shards(
        &self,
        coordinator: &RankCoordinator<'_>,
        matrix: &DistDenseMatrix,
    ) -> Result<()> {
        let temp = file_io::temp_path(&self.path);
        let (nrows, ncols) = matrix.shape();
        let dataset = &self.config.dataset;

        let created = coordinator.root_only("container allocation", || {
            container::create(&temp, dataset, nrows, ncols)
        });
        coordinator.agree(created)?;
        let (_, entry) = matstore_core::single_dataset_layout(dataset, nrows, ncols)?;

        let (rows, cols) = matrix.local_extent();
        let written = if matrix.distribution().contributes(coordinator.rank()) {
            debug!(rank = coordinator.rank(), ?rows, ?cols, "writing shard");
            container::write_block(&temp, &entry, rows.start, cols.start, matrix.local())
        } else {
            Ok(())
        };
        if let Err(err) = coordinator.agree(written) {
            if coordinator.is_root() {
                file_io::discard(&temp);
            }
            return Err(err);
        }

        let committed =
            coordinator.root_only("container commit", || file_io::commit(&temp, &self.path));
        coordinator.agree(committed).map(drop)
    }

    /// Read the file as `target`
    ///
    /// Local targets yield an identical full copy on every rank. Distributed
    /// dense targets use `options.distribution`, falling back to the
    /// configured default; other targets ignore it.
    pub fn read(
        &self,
        comm: &dyn Communicator,
        target: Representation,
        options: &ReadOptions,
    ) -> Result<MatrixHandle> {
        check_read(self.format, target)?;
        let coordinator = RankCoordinator::new(comm);
        debug!(
            rank = comm.rank(),
            format = %self.format,
            %target,
            path = %self.path.display(),
            "reading matrix"
        );

        let handle = match (self.format, target) {
            (StoreFormat::Mtx, Representation::LocalSparse) => {
                MatrixHandle::LocalSparse(self.read_local(&coordinator, || mtx::read(&self.path))?)
            }
            (StoreFormat::Mtx, Representation::LocalDense) => {
                let sparse = self.read_local(&coordinator, || mtx::read(&self.path))?;
                MatrixHandle::LocalDense(sparse_to_dense(&sparse)?)
            }
            (StoreFormat::Mtx, Representation::DistributedSparse) => {
                let (rank, size) = (comm.rank(), comm.size());
                let shard = coordinator.replicated(|| {
                    mtx::read_rows(&self.path, |nrows| block_range(nrows, rank, size))
                })?;
                MatrixHandle::DistributedSparse(DistSparseMatrix::from_local(comm, shard)?)
            }
            (StoreFormat::Hdf5, Representation::LocalDense) => {
                MatrixHandle::LocalDense(self.read_local(&coordinator, || {
                    container::read(&self.path, &self.config.dataset)
                })?)
            }
            (StoreFormat::Hdf5, Representation::DistributedDense) => {
                let distribution = options.distribution_or(&self.config);
                MatrixHandle::DistributedDense(self.read_container_shards(comm, distribution)?)
            }
            (StoreFormat::Txt, Representation::LocalDense) => MatrixHandle::LocalDense(
                self.read_local(&coordinator, || txt::read(&self.path, &self.config))?,
            ),
            (StoreFormat::Libsvm, Representation::LocalSparse) => {
                MatrixHandle::LocalSparse(self.read_labeled(comm)?.features)
            }
            _ => return Err(unsupported(self.format, target, Direction::Read)),
        };
        info!(
            rank = comm.rank(),
            format = %self.format,
            %target,
            shape = ?handle.shape(),
            "read matrix"
        );
        Ok(handle)
    }

    /// Read LIBSVM features and labels, replicated on every rank
    pub fn read_labeled(&self, comm: &dyn Communicator) -> Result<LabeledData> {
        if self.format != StoreFormat::Libsvm {
            return Err(StoreError::Unlabeled {
                format: self.format,
            });
        }
        let coordinator = RankCoordinator::new(comm);
        let options = self.libsvm_options();
        let (features, labels) = self.read_local(&coordinator, || {
            libsvm::read(&self.path, options).map(|data| (data.features, data.labels))
        })?;
        Ok(LabeledData { features, labels })
    }

    /// Produce the same local value on every rank
    fn read_local<T: Wire>(
        &self,
        coordinator: &RankCoordinator<'_>,
        read: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        match self.config.local_read {
            LocalReadStrategy::Replicated => coordinator.replicated(read),
            LocalReadStrategy::RootBroadcast => coordinator.root_then_broadcast(read),
        }
    }

    /// Each rank reads its row-block stripe, then the stripes are
    /// redistributed to `distribution`
    fn read_container_shards(
        &self,
        comm: &dyn Communicator,
        distribution: Distribution,
    ) -> Result<DistDenseMatrix> {
        let coordinator = RankCoordinator::new(comm);
        let (rank, size) = (comm.rank(), comm.size());
        let ((nrows, ncols), stripe) = coordinator.replicated(|| {
            container::read_rows(&self.path, &self.config.dataset, |nrows| {
                block_range(nrows, rank, size)
            })
        })?;
        let striped = DistDenseMatrix::from_local(comm, nrows, ncols, Distribution::RowBlock, stripe)?;
        if distribution == Distribution::RowBlock {
            return Ok(striped);
        }
        striped.redistribute(comm, distribution)
    }
}

fn unsupported(format: StoreFormat, representation: Representation, direction: Direction) -> StoreError {
    CoreError::UnsupportedFormat {
        format,
        representation,
        direction,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SelfComm;
    use matstore_core::{CooMatrix, DenseMatrix};

    #[test]
    fn test_from_path_infers_format() {
        assert_eq!(Store::from_path("a/b.mtx").unwrap().format(), StoreFormat::Mtx);
        assert_eq!(Store::from_path("b.h5").unwrap().format(), StoreFormat::Hdf5);
        assert_eq!(Store::from_path("c.svm").unwrap().format(), StoreFormat::Libsvm);
        assert!(Store::from_path("noext").is_err());
    }

    #[test]
    fn test_unsupported_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        let sparse = MatrixHandle::LocalSparse(CooMatrix::new(2, 2));
        let err = Store::txt(&path).write(&SelfComm, &sparse).unwrap_err();
        assert!(err.is_unsupported());
        assert!(!path.exists());

        let err = Store::libsvm(&path)
            .write(&SelfComm, &MatrixHandle::LocalDense(DenseMatrix::zeros(1, 1).unwrap()))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::UnsupportedFormat {
                direction: Direction::Write,
                ..
            })
        ));
    }

    #[test]
    fn test_read_labeled_needs_libsvm() {
        let err = Store::mtx("m.mtx").read_labeled(&SelfComm).unwrap_err();
        assert!(err.is_unsupported());
        assert!(matches!(
            err,
            StoreError::Unlabeled {
                format: StoreFormat::Mtx
            }
        ));
        assert_eq!(
            err.to_string(),
            "mtx files carry no labels: labeled reads are libsvm-only"
        );
    }

    #[test]
    fn test_oversized_mtx_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.mtx");
        std::fs::write(
            &path,
            "%%MatrixMarket matrix coordinate real general\n4294967296 4294967297 0\n",
        )
        .unwrap();
        let store = Store::mtx(&path);
        for target in [Representation::LocalDense, Representation::LocalSparse] {
            let err = store
                .read(&SelfComm, target, &ReadOptions::default())
                .unwrap_err();
            assert!(err.is_malformed(), "{target}: {err}");
        }
    }

    #[test]
    fn test_local_dense_round_trip_on_one_rank() {
        let dir = tempfile::tempdir().unwrap();
        let matrix = DenseMatrix::from_fn(3, 2, |r, c| (r * 2 + c) as f64 - 2.5);
        for store in [
            Store::hdf5(dir.path().join("m.h5")),
            Store::txt(dir.path().join("m.txt")),
        ] {
            store
                .write(&SelfComm, &MatrixHandle::LocalDense(matrix.clone()))
                .unwrap();
            let read = store
                .read(&SelfComm, Representation::LocalDense, &ReadOptions::default())
                .unwrap();
            assert_eq!(read.into_local_dense(), Some(matrix.clone()));
        }
    }
}
