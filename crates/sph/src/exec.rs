//! Execution models: sequential reference vs data-parallel.
//!
//! Every solver pass is a "for each particle" loop. [`ExecutionModel`] runs
//! that loop either in index order on the calling thread or across the rayon
//! pool. In both cases the call returns only after every item is done, which
//! is the barrier between passes.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Scheduling strategy for the per-particle passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionModel {
    /// Single thread, defined order. The correctness reference.
    #[default]
    Sequential,
    /// Rayon data-parallel passes with a join after each one.
    Parallel,
}

impl ExecutionModel {
    pub fn is_parallel(self) -> bool {
        matches!(self, Self::Parallel)
    }

    /// Calls `f(i, &mut items[i])` for every item, then returns.
    #[inline]
    pub fn for_each_mut<T, F>(self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        match self {
            Self::Sequential => items
                .iter_mut()
                .enumerate()
                .for_each(|(i, item)| f(i, item)),
            Self::Parallel => items
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, item)| f(i, item)),
        }
    }

    /// Writes `out[i] = f(i)` for every slot, then returns.
    ///
    /// Used for passes that read other particles: results land in a scratch
    /// buffer so no item observes another item's output from the same pass.
    #[inline]
    pub fn fill<T, F>(self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        self.for_each_mut(out, |i, slot| *slot = f(i));
    }

    /// Calls `f(i)` for `i` in `0..len`, then returns. For passes whose only
    /// writes go through atomics.
    #[inline]
    pub fn for_each_index<F>(self, len: usize, f: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        match self {
            Self::Sequential => (0..len).for_each(f),
            Self::Parallel => (0..len).into_par_iter().for_each(f),
        }
    }
}
