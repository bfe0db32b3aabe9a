//! Spatial hashing for neighbor search.
//!
//! Particles are bucketed by the cell `floor(position / h)`. A query visits the
//! 3x3 block of cells around a cell and reports every particle in them, which
//! covers every neighbor within h as long as the cell size equals h.
//!
//! Two backings implement [`NeighborQuery`]:
//! - [`HashGridIndex`]: hash -> bucket map, filled in particle order.
//! - [`SortedCellIndex`]: (index, hash, key) entries bitonic-sorted by key plus
//!   an offset table. No map, so every stage is a flat parallel pass.

mod hash_grid;
mod sorted;

use glam::{IVec2, Vec2};

use crate::constants::{HASH_PRIME_X, HASH_PRIME_Y};
use crate::error::SimError;
use crate::exec::ExecutionModel;
use crate::particle::Particle;

pub use hash_grid::HashGridIndex;
pub use sorted::SortedCellIndex;

/// Offsets of the 3x3 cell block, x-major.
pub const NEIGHBOR_OFFSETS: [IVec2; 9] = [
    IVec2::new(-1, -1),
    IVec2::new(-1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, -1),
    IVec2::new(0, 0),
    IVec2::new(0, 1),
    IVec2::new(1, -1),
    IVec2::new(1, 0),
    IVec2::new(1, 1),
];

/// Cell containing `position` for square cells of side `cell_size`.
#[inline]
pub fn cell_coord(position: Vec2, cell_size: f32) -> IVec2 {
    (position / cell_size).floor().as_ivec2()
}

/// `(x * P1) xor (y * P2)` with wrapping 32-bit arithmetic.
#[inline]
pub fn cell_hash(cell: IVec2) -> u32 {
    (cell.x.wrapping_mul(HASH_PRIME_X) ^ cell.y.wrapping_mul(HASH_PRIME_Y)) as u32
}

/// Reduces a cell hash into `0..bucket_count`.
#[inline]
pub fn bucket_key(hash: u32, bucket_count: usize) -> u32 {
    debug_assert!(bucket_count > 0);
    hash % bucket_count as u32
}

/// Candidate-neighbor lookup over a per-tick snapshot of positions.
pub trait NeighborQuery {
    /// Rebuilds from scratch for the current positions.
    fn rebuild(&mut self, particles: &[Particle], cell_size: f32) -> Result<(), SimError>;

    /// Cell size used by the last rebuild.
    fn cell_size(&self) -> f32;

    /// Calls `f` with every particle index in the 9 cells around `cell`.
    fn for_each_candidate<F: FnMut(usize)>(&self, cell: IVec2, f: F);

    /// Same as [`Self::for_each_candidate`] for the cell holding `position`.
    #[inline]
    fn for_each_candidate_near<F: FnMut(usize)>(&self, position: Vec2, f: F) {
        self.for_each_candidate(cell_coord(position, self.cell_size()), f);
    }

    /// Collects the candidates of `cell`.
    fn candidates(&self, cell: IVec2) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_candidate(cell, |j| out.push(j));
        out
    }
}

/// The active backing, picked from the execution model.
#[derive(Debug)]
pub enum SpatialIndex {
    HashGrid(HashGridIndex),
    Sorted(SortedCellIndex),
}

impl SpatialIndex {
    /// Map backing for the sequential model, sorted backing for the parallel
    /// one. `capacity` fixes the sorted backing's buffer sizes.
    pub fn for_model(model: ExecutionModel, capacity: usize) -> Self {
        match model {
            ExecutionModel::Sequential => Self::HashGrid(HashGridIndex::new()),
            ExecutionModel::Parallel => Self::Sorted(SortedCellIndex::new(model, capacity)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HashGrid(_) => "hash-grid",
            Self::Sorted(_) => "sorted-cells",
        }
    }
}

impl NeighborQuery for SpatialIndex {
    fn rebuild(&mut self, particles: &[Particle], cell_size: f32) -> Result<(), SimError> {
        match self {
            Self::HashGrid(index) => index.rebuild(particles, cell_size),
            Self::Sorted(index) => index.rebuild(particles, cell_size),
        }
    }

    fn cell_size(&self) -> f32 {
        match self {
            Self::HashGrid(index) => index.cell_size(),
            Self::Sorted(index) => index.cell_size(),
        }
    }

    #[inline]
    fn for_each_candidate<F: FnMut(usize)>(&self, cell: IVec2, f: F) {
        match self {
            Self::HashGrid(index) => index.for_each_candidate(cell, f),
            Self::Sorted(index) => index.for_each_candidate(cell, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coord_floors_negative() {
        assert_eq!(cell_coord(Vec2::new(0.5, 0.5), 1.0), IVec2::new(0, 0));
        assert_eq!(cell_coord(Vec2::new(-0.5, 1.5), 1.0), IVec2::new(-1, 1));
        assert_eq!(cell_coord(Vec2::new(31.9, -16.0), 16.0), IVec2::new(1, -1));
    }

    #[test]
    fn test_cell_hash_matches_formula() {
        assert_eq!(cell_hash(IVec2::ZERO), 0);
        assert_eq!(cell_hash(IVec2::new(1, 0)), 73_856_093);
        assert_eq!(cell_hash(IVec2::new(0, 1)), 19_349_663);
        assert_eq!(cell_hash(IVec2::new(1, 1)), (73_856_093 ^ 19_349_663) as u32);
        // wraps instead of overflowing
        let _ = cell_hash(IVec2::new(i32::MAX, i32::MIN));
    }

    #[test]
    fn test_backing_for_model() {
        assert_eq!(SpatialIndex::for_model(ExecutionModel::Sequential, 4).name(), "hash-grid");
        assert_eq!(SpatialIndex::for_model(ExecutionModel::Parallel, 4).name(), "sorted-cells");
    }
}
