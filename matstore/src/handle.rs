//! In-memory matrix handle

use crate::dist_backend::{DistDenseMatrix, DistSparseMatrix};
use matstore_core::{CooMatrix, DenseMatrix, Representation};

/// A matrix in one of the four supported in-memory representations
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixHandle {
    LocalDense(DenseMatrix),
    LocalSparse(CooMatrix),
    DistributedDense(DistDenseMatrix),
    DistributedSparse(DistSparseMatrix),
}

impl MatrixHandle {
    pub fn representation(&self) -> Representation {
        match self {
            MatrixHandle::LocalDense(_) => Representation::LocalDense,
            MatrixHandle::LocalSparse(_) => Representation::LocalSparse,
            MatrixHandle::DistributedDense(_) => Representation::DistributedDense,
            MatrixHandle::DistributedSparse(_) => Representation::DistributedSparse,
        }
    }

    /// Global shape
    pub fn shape(&self) -> (usize, usize) {
        match self {
            MatrixHandle::LocalDense(m) => m.shape(),
            MatrixHandle::LocalSparse(m) => m.shape(),
            MatrixHandle::DistributedDense(m) => m.shape(),
            MatrixHandle::DistributedSparse(m) => m.shape(),
        }
    }

    pub fn as_local_dense(&self) -> Option<&DenseMatrix> {
        match self {
            MatrixHandle::LocalDense(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_local_sparse(&self) -> Option<&CooMatrix> {
        match self {
            MatrixHandle::LocalSparse(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_distributed_dense(&self) -> Option<&DistDenseMatrix> {
        match self {
            MatrixHandle::DistributedDense(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_distributed_sparse(&self) -> Option<&DistSparseMatrix> {
        match self {
            MatrixHandle::DistributedSparse(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_local_dense(self) -> Option<DenseMatrix> {
        match self {
            MatrixHandle::LocalDense(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_local_sparse(self) -> Option<CooMatrix> {
        match self {
            MatrixHandle::LocalSparse(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_distributed_dense(self) -> Option<DistDenseMatrix> {
        match self {
            MatrixHandle::DistributedDense(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_distributed_sparse(self) -> Option<DistSparseMatrix> {
        match self {
            MatrixHandle::DistributedSparse(m) => Some(m),
            _ => None,
        }
    }
}

impl From<DenseMatrix> for MatrixHandle {
    fn from(matrix: DenseMatrix) -> Self {
        MatrixHandle::LocalDense(matrix)
    }
}

impl From<CooMatrix> for MatrixHandle {
    fn from(matrix: CooMatrix) -> Self {
        MatrixHandle::LocalSparse(matrix)
    }
}

impl From<DistDenseMatrix> for MatrixHandle {
    fn from(matrix: DistDenseMatrix) -> Self {
        MatrixHandle::DistributedDense(matrix)
    }
}

impl From<DistSparseMatrix> for MatrixHandle {
    fn from(matrix: DistSparseMatrix) -> Self {
        MatrixHandle::DistributedSparse(matrix)
    }
}

/// Sparse features and one label per example, as read from LIBSVM files
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledData {
    /// `examples × features`
    pub features: CooMatrix,
    pub labels: Vec<f64>,
}

impl LabeledData {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
