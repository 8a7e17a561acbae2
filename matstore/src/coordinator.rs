//! Rank coordination for stores
//!
//! Rank 0 is the root. Root-only work involves no communication; every
//! other helper is collective and must be entered by all ranks in the same
//! order. Collective helpers exchange each rank's status so that a failure
//! anywhere surfaces everywhere instead of leaving peers blocked.

use crate::comm::Communicator;
use crate::error::{Result, StoreError};
use crate::wire::{decode_outcome, encode_outcome, Wire};
use matstore_core::ROOT_RANK;
use tracing::{debug, warn};

pub struct RankCoordinator<'a> {
    comm: &'a dyn Communicator,
}

impl<'a> RankCoordinator<'a> {
    pub fn new(comm: &'a dyn Communicator) -> Self {
        Self { comm }
    }

    pub fn comm(&self) -> &'a dyn Communicator {
        self.comm
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn size(&self) -> usize {
        self.comm.size()
    }

    pub fn is_root(&self) -> bool {
        self.comm.rank() == ROOT_RANK
    }

    /// Run `f` on the root only; other ranks get `None` immediately
    pub fn root_only<T>(&self, what: &str, f: impl FnOnce() -> Result<T>) -> Result<Option<T>> {
        if self.is_root() {
            f().map(Some)
        } else {
            debug!(rank = self.rank(), "skipping root-only {what}");
            Ok(None)
        }
    }

    /// Exchange every rank's outcome and fail on all ranks if any failed
    ///
    /// A rank's own error takes precedence; otherwise the lowest failing
    /// peer is reported as [`StoreError::PeerFailed`].
    pub fn agree<T>(&self, outcome: Result<T>) -> Result<T> {
        let status = encode_outcome(outcome.as_ref().map(|_| &()));
        let statuses = self.comm.all_gather(status);
        let value = outcome?;
        for (rank, bytes) in statuses.iter().enumerate() {
            if let Err(message) = decode_outcome::<()>(bytes)? {
                warn!(rank = self.rank(), peer = rank, "peer failed: {message}");
                return Err(StoreError::PeerFailed { rank, message });
            }
        }
        Ok(value)
    }

    /// Run `f` on the root and hand its result to every rank
    ///
    /// Non-root ranks see a root failure as [`StoreError::RootFailed`].
    pub fn root_then_broadcast<T: Wire>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if self.is_root() {
            let outcome = f();
            self.comm
                .broadcast(ROOT_RANK, encode_outcome(outcome.as_ref()))?;
            outcome
        } else {
            let bytes = self.comm.broadcast(ROOT_RANK, Vec::new())?;
            decode_outcome::<T>(&bytes)?.map_err(StoreError::RootFailed)
        }
    }

    /// Run `f` independently on every rank, then agree on the outcome
    pub fn replicated<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.agree(f())
    }

    /// Barrier across the group
    pub fn sync(&self) {
        self.comm.barrier();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::{SelfComm, ThreadGroup};
    use matstore_core::DenseMatrix;

    #[test]
    fn test_root_only_skips_peers() {
        let results = ThreadGroup::run(3, |comm| {
            RankCoordinator::new(&comm)
                .root_only("write", || Ok(comm.rank()))
                .unwrap()
        });
        assert_eq!(results, vec![Some(0), None, None]);
    }

    #[test]
    fn test_agree_reports_failing_peer() {
        let results = ThreadGroup::run(3, |comm| {
            let outcome = if comm.rank() == 2 {
                Err(StoreError::Wire("shard lost"))
            } else {
                Ok(comm.rank())
            };
            RankCoordinator::new(&comm).agree(outcome)
        });
        for result in &results[..2] {
            assert!(matches!(result, Err(StoreError::PeerFailed { rank: 2, .. })));
        }
        assert!(matches!(results[2], Err(StoreError::Wire(_))));
    }

    #[test]
    fn test_root_then_broadcast() {
        let results = ThreadGroup::run(2, |comm| {
            RankCoordinator::new(&comm)
                .root_then_broadcast(|| Ok(DenseMatrix::from_fn(2, 2, |r, c| (r + c) as f64)))
                .unwrap()
        });
        assert_eq!(results[0], results[1]);

        let failures = ThreadGroup::run(2, |comm| {
            RankCoordinator::new(&comm)
                .root_then_broadcast::<DenseMatrix>(|| Err(StoreError::Wire("disk gone")))
                .unwrap_err()
        });
        assert!(matches!(failures[0], StoreError::Wire(_)));
        assert!(matches!(&failures[1], StoreError::RootFailed(msg) if msg.contains("disk gone")));
    }

    #[test]
    fn test_group_of_one() {
        let coordinator = RankCoordinator::new(&SelfComm);
        assert!(coordinator.is_root());
        assert_eq!(coordinator.replicated(|| Ok(5)).unwrap(), 5);
        coordinator.sync();
    }
}
