//! Conversions between in-memory representations
//!
//! Local inputs are taken to be replicated: when the target is distributed,
//! every rank cuts its own shard out of its copy. Distributed inputs are
//! gathered so that local targets end up identical on every rank.

use crate::comm::Communicator;
use crate::dist_backend::{DistDenseMatrix, DistSparseMatrix};
use crate::error::Result;
use crate::handle::MatrixHandle;
use matstore_core::{dense_to_sparse, sparse_to_dense, Distribution, Representation};

/// Convert `handle` to `target`
///
/// `distribution` only applies when the target is distributed dense; an
/// already distributed dense source is redistributed to it. Collective
/// whenever the source or the target is distributed.
pub fn convert(
    comm: &dyn Communicator,
    handle: MatrixHandle,
    target: Representation,
    distribution: Distribution,
) -> Result<MatrixHandle> {
    use MatrixHandle as H;
    use Representation as R;

    let converted = match (handle, target) {
        (H::LocalDense(m), R::LocalDense) => H::LocalDense(m),
        (H::LocalDense(m), R::LocalSparse) => H::LocalSparse(dense_to_sparse(&m)?),
        (H::LocalDense(m), R::DistributedDense) => {
            H::DistributedDense(DistDenseMatrix::from_replicated(comm, &m, distribution)?)
        }
        (H::LocalDense(m), R::DistributedSparse) => {
            H::DistributedSparse(DistSparseMatrix::from_replicated(comm, &dense_to_sparse(&m)?))
        }

        (H::LocalSparse(m), R::LocalDense) => H::LocalDense(sparse_to_dense(&m)?),
        (H::LocalSparse(m), R::LocalSparse) => H::LocalSparse(m),
        (H::LocalSparse(m), R::DistributedDense) => H::DistributedDense(
            DistDenseMatrix::from_replicated(comm, &sparse_to_dense(&m)?, distribution)?,
        ),
        (H::LocalSparse(m), R::DistributedSparse) => {
            H::DistributedSparse(DistSparseMatrix::from_replicated(comm, &m))
        }

        (H::DistributedDense(m), R::LocalDense) => H::LocalDense(m.gather_all(comm)?),
        (H::DistributedDense(m), R::LocalSparse) => {
            H::LocalSparse(dense_to_sparse(&m.gather_all(comm)?)?)
        }
        (H::DistributedDense(m), R::DistributedDense) if m.distribution() == distribution => {
            H::DistributedDense(m)
        }
        (H::DistributedDense(m), R::DistributedDense) => {
            H::DistributedDense(m.redistribute(comm, distribution)?)
        }
        (H::DistributedDense(m), R::DistributedSparse) => {
            let full = dense_to_sparse(&m.gather_all(comm)?)?;
            H::DistributedSparse(DistSparseMatrix::from_replicated(comm, &full))
        }

        (H::DistributedSparse(m), R::LocalDense) => {
            H::LocalDense(sparse_to_dense(&m.gather_all(comm)?)?)
        }
        (H::DistributedSparse(m), R::LocalSparse) => H::LocalSparse(m.gather_all(comm)?),
        (H::DistributedSparse(m), R::DistributedDense) => {
            let full = sparse_to_dense(&m.gather_all(comm)?)?;
            H::DistributedDense(DistDenseMatrix::from_replicated(comm, &full, distribution)?)
        }
        (H::DistributedSparse(m), R::DistributedSparse) => H::DistributedSparse(m),
    };
    Ok(converted)
}
