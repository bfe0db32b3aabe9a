//! Property tests for the bitonic sorter and offset table.
//!
//! - Output is non-decreasing by key for any length (0, 1, non-powers of two)
//! - Output is a permutation of the input
//! - offset[k] is the first sorted position with key k, or the sentinel n
//! - Sequential and parallel networks produce the same key sequence

use proptest::prelude::*;
use sph::{BitonicSorter, ExecutionModel, OffsetTable, SpatialEntry};

/// Entries with keys reduced into `0..n`, as the spatial index builds them.
fn entries_from_hashes(hashes: &[u32]) -> Vec<SpatialEntry> {
    let n = hashes.len() as u32;
    hashes
        .iter()
        .enumerate()
        .map(|(i, &hash)| SpatialEntry::new(i as u32, hash, hash % n))
        .collect()
}

fn sort_with(model: ExecutionModel, hashes: &[u32]) -> (Vec<SpatialEntry>, Vec<u32>) {
    let mut entries = entries_from_hashes(hashes);
    let mut sorter = BitonicSorter::new(model, entries.len());
    let mut offsets = OffsetTable::with_capacity(entries.len());
    sorter
        .sort_and_calculate_offsets(&mut entries, &mut offsets)
        .unwrap();
    (entries, offsets.to_vec())
}

fn check_sorted(input: &[u32], entries: &[SpatialEntry], offsets: &[u32]) -> Result<(), TestCaseError> {
    let n = input.len();
    prop_assert_eq!(entries.len(), n);
    prop_assert_eq!(offsets.len(), n);

    for w in entries.windows(2) {
        prop_assert!(w[0].key <= w[1].key, "out of order: {:?} before {:?}", w[0], w[1]);
    }

    let mut indices: Vec<u32> = entries.iter().map(|e| e.index).collect();
    indices.sort_unstable();
    prop_assert!(indices.iter().enumerate().all(|(i, &idx)| i as u32 == idx));
    for e in entries {
        prop_assert_eq!(e.hash, input[e.index as usize]);
    }

    for (key, &offset) in offsets.iter().enumerate() {
        let key = key as u32;
        match entries.iter().position(|e| e.key == key) {
            Some(first) => prop_assert_eq!(offset as usize, first),
            None => prop_assert_eq!(offset as usize, n),
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sequential_sort_and_offsets(hashes in prop::collection::vec(any::<u32>(), 0..300)) {
        let (entries, offsets) = sort_with(ExecutionModel::Sequential, &hashes);
        check_sorted(&hashes, &entries, &offsets)?;
    }

    #[test]
    fn parallel_sort_and_offsets(hashes in prop::collection::vec(any::<u32>(), 0..300)) {
        let (entries, offsets) = sort_with(ExecutionModel::Parallel, &hashes);
        check_sorted(&hashes, &entries, &offsets)?;
    }

    #[test]
    fn models_agree_on_key_order(hashes in prop::collection::vec(0u32..16, 1..200)) {
        let (seq, seq_offsets) = sort_with(ExecutionModel::Sequential, &hashes);
        let (par, par_offsets) = sort_with(ExecutionModel::Parallel, &hashes);
        let seq_keys: Vec<u32> = seq.iter().map(|e| e.key).collect();
        let par_keys: Vec<u32> = par.iter().map(|e| e.key).collect();
        prop_assert_eq!(seq_keys, par_keys);
        prop_assert_eq!(seq_offsets, par_offsets);
    }
}

#[test]
fn test_tiny_lengths() {
    for model in [ExecutionModel::Sequential, ExecutionModel::Parallel] {
        let (entries, offsets) = sort_with(model, &[]);
        assert!(entries.is_empty());
        assert!(offsets.is_empty());

        let (entries, offsets) = sort_with(model, &[12345]);
        assert_eq!(entries, vec![SpatialEntry::new(0, 12345, 0)]);
        assert_eq!(offsets, vec![0]);
    }
}

#[test]
fn test_all_equal_keys() {
    let hashes = vec![7u32; 13];
    let (entries, offsets) = sort_with(ExecutionModel::Parallel, &hashes);
    // 7 % 13 = 7: one bucket starting at 0, every other bucket empty
    assert!(entries.iter().all(|e| e.key == 7));
    for (k, &o) in offsets.iter().enumerate() {
        assert_eq!(o, if k == 7 { 0 } else { 13 });
    }
}

#[test]
fn test_buffer_reuse_across_sorts() {
    let mut sorter = BitonicSorter::new(ExecutionModel::Parallel, 64);
    let mut offsets = OffsetTable::with_capacity(64);

    let mut big = entries_from_hashes(&(0..64).rev().collect::<Vec<u32>>());
    sorter.sort_and_calculate_offsets(&mut big, &mut offsets).unwrap();
    assert_eq!(offsets.len(), 64);

    let mut small = entries_from_hashes(&[4, 1, 3, 0, 2]);
    sorter.sort_and_calculate_offsets(&mut small, &mut offsets).unwrap();
    assert_eq!(small.iter().map(|e| e.key).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert_eq!(offsets.to_vec(), vec![0, 1, 2, 3, 4]);
    assert_eq!(offsets.sentinel(), 5);
}
