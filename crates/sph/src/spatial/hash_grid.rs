//! Map-backed spatial hash (sequential reference).

use glam::IVec2;
use rustc_hash::FxHashMap;

use super::{cell_coord, cell_hash, NeighborQuery, NEIGHBOR_OFFSETS};
use crate::error::SimError;
use crate::particle::Particle;

/// Cell hash -> particle indices, in insertion (particle) order.
#[derive(Debug, Default)]
pub struct HashGridIndex {
    cell_size: f32,
    buckets: FxHashMap<u32, Vec<u32>>,
}

impl HashGridIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty cells.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl NeighborQuery for HashGridIndex {
    fn rebuild(&mut self, particles: &[Particle], cell_size: f32) -> Result<(), SimError> {
        self.cell_size = cell_size;
        self.buckets.clear();
        for (i, p) in particles.iter().enumerate() {
            let hash = cell_hash(cell_coord(p.position, cell_size));
            self.buckets.entry(hash).or_default().push(i as u32);
        }
        Ok(())
    }

    fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn for_each_candidate<F: FnMut(usize)>(&self, cell: IVec2, mut f: F) {
        for offset in NEIGHBOR_OFFSETS {
            if let Some(bucket) = self.buckets.get(&cell_hash(cell + offset)) {
                bucket.iter().for_each(|&j| f(j as usize));
            }
        }
    }
}
