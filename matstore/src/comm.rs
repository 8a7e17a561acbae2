//! Process-group substrate
//!
//! Stores only need a rank, a group size, a barrier and two collectives.
//! [`SelfComm`] is a group of one; [`ThreadGroup`] runs one thread per rank
//! inside the current process, which is how the SPMD scenarios are driven.

use crate::error::{Result, StoreError};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Collective operations over a fixed, numbered process group
///
/// Every rank must call each collective in the same order. A collective
/// does not return on any rank until all ranks have entered it.
pub trait Communicator: Send + Sync {
    /// This process's rank, `0..size()`
    fn rank(&self) -> usize;

    /// Number of processes in the group
    fn size(&self) -> usize;

    /// Block until every rank has arrived
    fn barrier(&self);

    /// Send `data` from `root` to every rank; non-root `data` is ignored
    ///
    /// Every rank fails with [`StoreError::InvalidRank`] when `root` is
    /// not in the group.
    fn broadcast(&self, root: usize, data: Vec<u8>) -> Result<Vec<u8>>;

    /// Collect every rank's `data`, indexed by rank, on every rank
    fn all_gather(&self, data: Vec<u8>) -> Vec<Vec<u8>>;
}

/// Group containing only the calling process
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfComm;

impl Communicator for SelfComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) {}

    fn broadcast(&self, root: usize, data: Vec<u8>) -> Result<Vec<u8>> {
        check_root(root, 1)?;
        Ok(data)
    }

    fn all_gather(&self, data: Vec<u8>) -> Vec<Vec<u8>> {
        vec![data]
    }
}

fn check_root(root: usize, size: usize) -> Result<()> {
    if root >= size {
        return Err(StoreError::InvalidRank { rank: root, size });
    }
    Ok(())
}

/// Panic payload raised on ranks blocked in a collective when a peer panics
#[derive(Debug)]
pub struct PeerPanicked;

#[derive(Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

struct Shared {
    size: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
    slots: Mutex<Vec<Vec<u8>>>,
}

impl Shared {
    fn new(size: usize) -> Self {
        Self {
            size,
            state: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
            slots: Mutex::new(vec![Vec::new(); size]),
        }
    }

    fn wait(&self) {
        let mut state = self.state.lock();
        if state.poisoned {
            std::panic::panic_any(PeerPanicked);
        }
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.size {
            state.arrived = 0;
            state.generation += 1;
            self.released.notify_all();
            return;
        }
        while state.generation == generation && !state.poisoned {
            self.released.wait(&mut state);
        }
        if state.poisoned {
            std::panic::panic_any(PeerPanicked);
        }
    }

    fn poison(&self) {
        self.state.lock().poisoned = true;
        self.released.notify_all();
    }
}

/// Releases blocked peers when its rank unwinds
struct PoisonOnPanic<'a>(&'a Shared);

impl Drop for PoisonOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.poison();
        }
    }
}

/// One rank's handle into a [`ThreadGroup`]
#[derive(Clone)]
pub struct ThreadComm {
    rank: usize,
    shared: Arc<Shared>,
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn barrier(&self) {
        self.shared.wait();
    }

    fn broadcast(&self, root: usize, data: Vec<u8>) -> Result<Vec<u8>> {
        check_root(root, self.shared.size)?;
        if self.rank == root {
            self.shared.slots.lock()[root] = data;
        }
        self.shared.wait();
        let received = self.shared.slots.lock()[root].clone();
        // nobody may overwrite the slot before every rank has copied it
        self.shared.wait();
        Ok(received)
    }

    fn all_gather(&self, data: Vec<u8>) -> Vec<Vec<u8>> {
        self.shared.slots.lock()[self.rank] = data;
        self.shared.wait();
        let received = self.shared.slots.lock().clone();
        self.shared.wait();
        received
    }
}

/// Thread-per-rank process group
pub struct ThreadGroup;

impl ThreadGroup {
    /// Run `f` on `size` ranks concurrently and return each rank's result
    ///
    /// A panic on any rank releases the others from their collectives and
    /// is re-raised here once every thread has finished.
    pub fn run<R, F>(size: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(ThreadComm) -> R + Sync,
    {
        let shared = Arc::new(Shared::new(size));
        let outcomes: Vec<std::thread::Result<R>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..size)
                .map(|rank| {
                    let comm = ThreadComm {
                        rank,
                        shared: Arc::clone(&shared),
                    };
                    let f = &f;
                    let shared = &shared;
                    scope.spawn(move || {
                        let _guard = PoisonOnPanic(shared);
                        f(comm)
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join()).collect()
        });

        let mut results = Vec::with_capacity(size);
        let mut peer_panic = None;
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(payload) if payload.is::<PeerPanicked>() => peer_panic = Some(payload),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        if let Some(payload) = peer_panic {
            std::panic::resume_unwind(payload);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_comm() {
        let comm = SelfComm;
        assert_eq!(comm.broadcast(0, vec![1, 2]).unwrap(), vec![1, 2]);
        assert!(matches!(
            comm.broadcast(1, vec![1]),
            Err(StoreError::InvalidRank { rank: 1, size: 1 })
        ));
        assert_eq!(comm.all_gather(vec![3]), vec![vec![3]]);
    }

    #[test]
    fn test_broadcast_and_all_gather() {
        let results = ThreadGroup::run(4, |comm| {
            let payload = if comm.rank() == 2 { vec![7, 7] } else { Vec::new() };
            let received = comm.broadcast(2, payload).unwrap();
            let gathered = comm.all_gather(vec![comm.rank() as u8]);
            // a second round must not observe stale slots
            let again = comm.all_gather(vec![10 + comm.rank() as u8]);
            (received, gathered, again)
        });

        for (received, gathered, again) in results {
            assert_eq!(received, vec![7, 7]);
            assert_eq!(gathered, vec![vec![0], vec![1], vec![2], vec![3]]);
            assert_eq!(again, vec![vec![10], vec![11], vec![12], vec![13]]);
        }
    }

    #[test]
    fn test_broadcast_from_missing_root_fails_everywhere() {
        let results = ThreadGroup::run(3, |comm| {
            let outcome = comm.broadcast(3, vec![1]);
            // the group is still usable afterwards
            let gathered = comm.all_gather(vec![comm.rank() as u8]);
            (outcome, gathered.len())
        });
        for (outcome, gathered) in results {
            assert!(matches!(outcome, Err(StoreError::InvalidRank { rank: 3, size: 3 })));
            assert_eq!(gathered, 3);
        }
    }

    #[test]
    fn test_results_in_rank_order() {
        let ranks = ThreadGroup::run(3, |comm| {
            comm.barrier();
            comm.rank()
        });
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    #[should_panic(expected = "rank 1 gave up")]
    fn test_panic_releases_peers() {
        ThreadGroup::run(3, |comm| {
            if comm.rank() == 1 {
                panic!("rank 1 gave up");
            }
            comm.barrier();
        });
    }
}
