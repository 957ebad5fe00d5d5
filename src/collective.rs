//! Process-group collectives
//!
//! The only cross-process step of the rank mapping is one element-wise sum
//! all-reduce. Every process of the group must call it exactly once with a
//! buffer of the same length, or the group deadlocks.
//!
//! Implementations: [`SingleProcess`] (identity) and [`LocalGroup`] (one
//! thread per process, for exercising the gather in-process). A real job
//! plugs its MPI communicator in behind the same trait.

use std::sync::{Arc, Barrier, Mutex};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectiveError {
    #[error("reduce buffers differ in length across the group")]
    LengthMismatch,

    #[error("collective state poisoned by a panicking member")]
    Poisoned,

    #[error("collective failed with code {0}")]
    Failed(i32),
}

/// Abstraction over the process group the mapping runs in
pub trait Collective {
    /// This process's rank in the group
    fn rank(&self) -> usize;

    /// Number of processes in the group
    fn size(&self) -> usize;

    /// Element-wise sum of `local` across the whole group.
    ///
    /// Blocking and collective: every member receives the same result.
    fn all_reduce_sum(&self, local: &[i32]) -> Result<Vec<i32>, CollectiveError>;

    /// Tear down the whole process group. Never returns.
    fn abort(&self, code: i32) -> !;
}

/// Group of one: reductions are the identity
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl Collective for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum(&self, local: &[i32]) -> Result<Vec<i32>, CollectiveError> {
        Ok(local.to_vec())
    }

    fn abort(&self, code: i32) -> ! {
        std::process::exit(code)
    }
}

#[derive(Debug, Default)]
struct ReduceRound {
    acc: Option<Vec<i32>>,
    mismatch: bool,
}

#[derive(Debug)]
struct Shared {
    barrier: Barrier,
    round: Mutex<ReduceRound>,
}

/// In-process group whose members run on separate threads
#[derive(Debug)]
pub struct LocalGroup;

impl LocalGroup {
    /// Create the `size` members of a new group, in rank order
    pub fn new(size: usize) -> Vec<GroupMember> {
        let shared = Arc::new(Shared {
            barrier: Barrier::new(size),
            round: Mutex::new(ReduceRound::default()),
        });
        (0..size)
            .map(|rank| GroupMember {
                rank,
                size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

/// One member of a [`LocalGroup`]
#[derive(Debug, Clone)]
pub struct GroupMember {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl GroupMember {
    fn contribute(&self, local: &[i32]) -> Result<(), CollectiveError> {
        let mut round = self.shared.round.lock().map_err(|_| CollectiveError::Poisoned)?;
        let round = &mut *round;
        if let Some(acc) = round.acc.as_mut() {
            if acc.len() == local.len() {
                for (a, v) in acc.iter_mut().zip(local) {
                    *a += v;
                }
            } else {
                round.mismatch = true;
            }
        } else {
            round.acc = Some(local.to_vec());
        }
        Ok(())
    }

    fn collect(&self) -> Result<Vec<i32>, CollectiveError> {
        let round = self.shared.round.lock().map_err(|_| CollectiveError::Poisoned)?;
        if round.mismatch {
            return Err(CollectiveError::LengthMismatch);
        }
        Ok(round.acc.clone().unwrap_or_default())
    }
}

impl Collective for GroupMember {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce_sum(&self, local: &[i32]) -> Result<Vec<i32>, CollectiveError> {
        // All three barriers are passed on every path so that an error on
        // one member cannot strand the others.
        let contributed = self.contribute(local);
        self.shared.barrier.wait();
        let result = contributed.and_then(|_| self.collect());
        if self.shared.barrier.wait().is_leader() {
            if let Ok(mut round) = self.shared.round.lock() {
                *round = ReduceRound::default();
            }
        }
        self.shared.barrier.wait();
        result
    }

    fn abort(&self, code: i32) -> ! {
        panic!("rank {}: process group aborted with code {}", self.rank, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_single_process_identity() {
        let comm = SingleProcess;
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        assert_eq!(comm.all_reduce_sum(&[1, 2, 3]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_local_group_sums_across_members() {
        let members = LocalGroup::new(4);
        let results: Vec<Vec<i32>> = thread::scope(|s| {
            let handles: Vec<_> = members
                .iter()
                .map(|m| s.spawn(move || m.all_reduce_sum(&[m.rank() as i32, 1]).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for r in results {
            assert_eq!(r, vec![6, 4]);
        }
    }

    #[test]
    fn test_local_group_supports_repeated_rounds() {
        let members = LocalGroup::new(3);
        thread::scope(|s| {
            for m in &members {
                s.spawn(move || {
                    assert_eq!(m.all_reduce_sum(&[1]).unwrap(), vec![3]);
                    assert_eq!(m.all_reduce_sum(&[2, 2]).unwrap(), vec![6, 6]);
                });
            }
        });
    }

    #[test]
    fn test_local_group_reports_length_mismatch() {
        let members = LocalGroup::new(2);
        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = members
                .iter()
                .map(|m| {
                    let len = m.rank() + 1;
                    s.spawn(move || m.all_reduce_sum(&vec![1; len]))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.iter().all(|r| r == &Err(CollectiveError::LengthMismatch)));
    }

    #[test]
    #[should_panic(expected = "aborted")]
    fn test_group_member_abort_panics() {
        let members = LocalGroup::new(1);
        members[0].abort(1);
    }
}
