//! Bitonic sort of spatial-hash entries and the bucket offset table.
//!
//! The network is the flip/disperse form: for every stage the first step
//! compare-exchanges mirrored pairs inside blocks of `2 * group_width`, and the
//! remaining steps compare elements `group_width` apart. Every (stage, step)
//! is one dispatch; the next dispatch may only start after the previous one
//! has fully completed, otherwise the sort is silently corrupted.
//!
//! The virtual length is the next power of two. Slots past the real length
//! act as +inf keys, so any compare-exchange that touches one is skipped.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::SimError;
use crate::exec::ExecutionModel;

/// One spatial index record: particle index, full cell hash and bucket key.
///
/// Sorted by `key`. 12 bytes, matches the GPU entry stride.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpatialEntry {
    pub index: u32,
    pub hash: u32,
    pub key: u32,
}

impl SpatialEntry {
    pub fn new(index: u32, hash: u32, key: u32) -> Self {
        Self { index, hash, key }
    }
}

/// Addressing for one (stage, step) dispatch of the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortStep {
    pub stage: u32,
    pub step: u32,
    pub group_width: usize,
    pub group_height: usize,
}

impl SortStep {
    pub fn new(stage: u32, step: u32) -> Self {
        debug_assert!(step <= stage);
        let group_width = 1usize << (stage - step);
        Self {
            stage,
            step,
            group_width,
            group_height: 2 * group_width - 1,
        }
    }

    /// Element pair handled by compare-exchange unit `unit`.
    #[inline]
    pub fn unit_pair(&self, unit: usize) -> (usize, usize) {
        let h = unit & (self.group_width - 1);
        let left = h + (self.group_height + 1) * (unit / self.group_width);
        let right_step = if self.step == 0 {
            self.group_height - 2 * h
        } else {
            (self.group_height + 1) / 2
        };
        (left, left + right_step)
    }

    /// Partner of element `pos`, and whether `pos` is the left (smaller-key)
    /// side of its pair. Inverse of [`Self::unit_pair`].
    #[inline]
    pub fn partner(&self, pos: usize) -> (usize, bool) {
        let block = 2 * self.group_width;
        let offset = pos % block;
        let is_left = offset < self.group_width;
        let partner = if self.step == 0 {
            pos - offset + (block - 1 - offset)
        } else if is_left {
            pos + self.group_width
        } else {
            pos - self.group_width
        };
        (partner, is_left)
    }
}

/// Number of stages for `len` entries: log2 of the padded length.
pub fn stage_count(len: usize) -> u32 {
    if len <= 1 {
        0
    } else {
        len.next_power_of_two().trailing_zeros()
    }
}

/// Every (stage, step) dispatch for `len` entries, in execution order.
pub fn sort_steps(len: usize) -> impl Iterator<Item = SortStep> {
    (0..stage_count(len)).flat_map(|stage| (0..=stage).map(move |step| SortStep::new(stage, step)))
}

/// Maps bucket key -> first sorted position holding that key.
///
/// Slots are atomics so the offset pass can run unordered without locks.
/// Empty buckets hold the sentinel, which equals the number of entries.
#[derive(Debug, Default)]
pub struct OffsetTable {
    offsets: Vec<AtomicU32>,
    len: usize,
}

impl OffsetTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            offsets: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.offsets.len()
    }

    /// Number of buckets currently in use (the entry count).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Empty-bucket marker.
    pub fn sentinel(&self) -> u32 {
        self.len as u32
    }

    /// Start of bucket `key`, or the sentinel.
    #[inline]
    pub fn get(&self, key: u32) -> u32 {
        match self.offsets[..self.len].get(key as usize) {
            Some(slot) => slot.load(Ordering::Relaxed),
            None => self.sentinel(),
        }
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.offsets[..self.len]
            .iter()
            .map(|slot| slot.load(Ordering::Relaxed))
            .collect()
    }

    fn reset(&mut self, len: usize, model: ExecutionModel) -> Result<(), SimError> {
        if len > self.offsets.len() {
            return Err(SimError::CapacityExceeded {
                entries: len,
                capacity: self.offsets.len(),
            });
        }
        self.len = len;
        let sentinel = len as u32;
        let slots = &self.offsets[..len];
        model.for_each_index(len, |k| slots[k].store(sentinel, Ordering::Relaxed));
        Ok(())
    }
}

/// Bitonic sorter with a fixed-size scratch buffer.
#[derive(Debug)]
pub struct BitonicSorter {
    model: ExecutionModel,
    scratch: Vec<SpatialEntry>,
}

impl BitonicSorter {
    pub fn new(model: ExecutionModel, capacity: usize) -> Self {
        Self {
            model,
            scratch: vec![SpatialEntry::default(); capacity],
        }
    }

    pub fn model(&self) -> ExecutionModel {
        self.model
    }

    pub fn capacity(&self) -> usize {
        self.scratch.len()
    }

    /// Sorts `entries` ascending by key.
    pub fn sort(&mut self, entries: &mut [SpatialEntry]) -> Result<(), SimError> {
        let n = entries.len();
        if n > self.scratch.len() {
            return Err(SimError::CapacityExceeded {
                entries: n,
                capacity: self.scratch.len(),
            });
        }

        match self.model {
            ExecutionModel::Sequential => {
                let units = n.next_power_of_two() / 2;
                for step in sort_steps(n) {
                    for unit in 0..units {
                        let (left, right) = step.unit_pair(unit);
                        if right < n && entries[left].key > entries[right].key {
                            entries.swap(left, right);
                        }
                    }
                }
            }
            ExecutionModel::Parallel => {
                // Ping-pong between `entries` and the scratch buffer. Each
                // `fill` is one dispatch and returns only when it is complete.
                let scratch = &mut self.scratch[..n];
                let mut in_scratch = false;
                for step in sort_steps(n) {
                    if in_scratch {
                        let src: &[SpatialEntry] = scratch;
                        self.model.fill(entries, |pos| exchange(src, step, pos));
                    } else {
                        let src: &[SpatialEntry] = entries;
                        self.model.fill(scratch, |pos| exchange(src, step, pos));
                    }
                    in_scratch = !in_scratch;
                }
                if in_scratch {
                    entries.copy_from_slice(scratch);
                }
            }
        }
        Ok(())
    }

    /// Fills `offsets` from entries that are already sorted by key.
    ///
    /// Only the first entry of each key run writes, so every slot has exactly
    /// one writer and the pass needs no ordering.
    pub fn calculate_offsets(
        &self,
        entries: &[SpatialEntry],
        offsets: &mut OffsetTable,
    ) -> Result<(), SimError> {
        offsets.reset(entries.len(), self.model)?;
        let slots = &offsets.offsets[..entries.len()];
        self.model.for_each_index(entries.len(), |i| {
            let key = entries[i].key;
            if i == 0 || key != entries[i - 1].key {
                debug_assert!((key as usize) < slots.len(), "bucket key {} out of range", key);
                if let Some(slot) = slots.get(key as usize) {
                    slot.store(i as u32, Ordering::Relaxed);
                }
            }
        });
        Ok(())
    }

    pub fn sort_and_calculate_offsets(
        &mut self,
        entries: &mut [SpatialEntry],
        offsets: &mut OffsetTable,
    ) -> Result<(), SimError> {
        self.sort(entries)?;
        self.calculate_offsets(entries, offsets)
    }
}

/// Value that lands at `pos` after one compare-exchange dispatch over `src`.
#[inline]
fn exchange(src: &[SpatialEntry], step: SortStep, pos: usize) -> SpatialEntry {
    let (partner, is_left) = step.partner(pos);
    if partner >= src.len() {
        return src[pos];
    }
    let (left, right) = if is_left {
        (src[pos], src[partner])
    } else {
        (src[partner], src[pos])
    };
    let swap = left.key > right.key;
    match (is_left, swap) {
        (true, false) | (false, true) => left,
        (true, true) | (false, false) => right,
    }
}
