//! Sorted-entry spatial hash (data-parallel backing).
//!
//! Rebuild runs three flat passes: hash every particle into an entry, bitonic
//! sort the entries by bucket key, then write the offset table. Buffers are
//! allocated once for a fixed capacity.

use glam::IVec2;

use super::{bucket_key, cell_coord, cell_hash, NeighborQuery, NEIGHBOR_OFFSETS};
use crate::bitonic::{BitonicSorter, OffsetTable, SpatialEntry};
use crate::error::SimError;
use crate::exec::ExecutionModel;
use crate::particle::Particle;

#[derive(Debug)]
pub struct SortedCellIndex {
    model: ExecutionModel,
    cell_size: f32,
    len: usize,
    entries: Vec<SpatialEntry>,
    offsets: OffsetTable,
    sorter: BitonicSorter,
}

impl SortedCellIndex {
    pub fn new(model: ExecutionModel, capacity: usize) -> Self {
        Self {
            model,
            cell_size: 0.0,
            len: 0,
            entries: vec![SpatialEntry::default(); capacity],
            offsets: OffsetTable::with_capacity(capacity),
            sorter: BitonicSorter::new(model, capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Entries from the last rebuild, sorted by key.
    pub fn entries(&self) -> &[SpatialEntry] {
        &self.entries[..self.len]
    }

    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }
}

impl NeighborQuery for SortedCellIndex {
    fn rebuild(&mut self, particles: &[Particle], cell_size: f32) -> Result<(), SimError> {
        let n = particles.len();
        if n > self.entries.len() {
            return Err(SimError::CapacityExceeded {
                entries: n,
                capacity: self.entries.len(),
            });
        }
        self.cell_size = cell_size;
        self.len = n;

        let entries = &mut self.entries[..n];
        self.model.fill(entries, |i| {
            let hash = cell_hash(cell_coord(particles[i].position, cell_size));
            SpatialEntry::new(i as u32, hash, bucket_key(hash, n))
        });
        self.sorter
            .sort_and_calculate_offsets(entries, &mut self.offsets)
    }

    fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn for_each_candidate<F: FnMut(usize)>(&self, cell: IVec2, mut f: F) {
        let n = self.len;
        if n == 0 {
            return;
        }
        for offset in NEIGHBOR_OFFSETS {
            let hash = cell_hash(cell + offset);
            let key = bucket_key(hash, n);
            let mut i = self.offsets.get(key) as usize;
            while i < n {
                let entry = self.entries[i];
                if entry.key != key {
                    break;
                }
                // Different cells can share a key; only the exact hash counts.
                if entry.hash == hash {
                    f(entry.index as usize);
                }
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_sorted_index_neighbors() {
        let particles = vec![
            Particle::at(Vec2::new(0.0, 0.0)),
            Particle::at(Vec2::new(5.0, 5.0)),
            Particle::at(Vec2::new(0.1, 0.1)),
        ];
        let mut index = SortedCellIndex::new(ExecutionModel::Parallel, 8);
        index.rebuild(&particles, 1.0).unwrap();

        let mut near = index.candidates(IVec2::ZERO);
        near.sort_unstable();
        assert_eq!(near, vec![0, 2]);
        assert!(index.entries().windows(2).all(|w| w[0].key <= w[1].key));
    }

    #[test]
    fn test_rebuild_over_capacity_fails() {
        let particles = vec![Particle::default(); 3];
        let mut index = SortedCellIndex::new(ExecutionModel::Parallel, 2);
        assert!(matches!(
            index.rebuild(&particles, 1.0),
            Err(SimError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_single_particle() {
        let mut index = SortedCellIndex::new(ExecutionModel::Sequential, 1);
        index
            .rebuild(&[Particle::at(Vec2::new(-3.0, 2.0))], 16.0)
            .unwrap();
        assert_eq!(index.candidates(IVec2::new(-1, 0)), vec![0]);
        assert!(index.candidates(IVec2::new(4, 4)).is_empty());
    }
}
