//! Neighbor search tests for both spatial index backings.
//!
//! - Completeness: every particle within h of a query particle shows up in
//!   the 3x3 candidate set of the query particle's cell
//! - Both backings return the same candidate multiset for every cell

use glam::Vec2;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sph::{
    cell_coord, ExecutionModel, HashGridIndex, NeighborQuery, Particle, SortedCellIndex,
};

fn cloud_strategy() -> impl Strategy<Value = Vec<Particle>> {
    prop::collection::vec((-20.0f32..20.0, -20.0f32..20.0), 1..250)
        .prop_map(|points| points.into_iter().map(|(x, y)| Particle::at(Vec2::new(x, y))).collect())
}

fn sorted_candidates<Q: NeighborQuery>(index: &Q, cell: glam::IVec2) -> Vec<usize> {
    let mut c = index.candidates(cell);
    c.sort_unstable();
    c
}

fn assert_complete<Q: NeighborQuery>(index: &Q, particles: &[Particle], h: f32) -> Result<(), TestCaseError> {
    for (i, p) in particles.iter().enumerate() {
        let candidates = index.candidates(cell_coord(p.position, h));
        prop_assert!(candidates.contains(&i), "particle {} missing from its own cell", i);
        for (j, q) in particles.iter().enumerate() {
            // margin keeps float rounding in the cell division out of the picture
            if p.position.distance(q.position) < h * 0.999 {
                prop_assert!(
                    candidates.contains(&j),
                    "neighbor {} of {} at distance {} missing",
                    j,
                    i,
                    p.position.distance(q.position)
                );
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn hash_grid_is_complete(particles in cloud_strategy(), h in 0.5f32..6.0) {
        let mut index = HashGridIndex::new();
        index.rebuild(&particles, h).unwrap();
        assert_complete(&index, &particles, h)?;
    }

    #[test]
    fn sorted_cells_is_complete(particles in cloud_strategy(), h in 0.5f32..6.0) {
        let mut index = SortedCellIndex::new(ExecutionModel::Parallel, particles.len());
        index.rebuild(&particles, h).unwrap();
        assert_complete(&index, &particles, h)?;
    }

    #[test]
    fn backings_return_same_candidates(particles in cloud_strategy(), h in 0.5f32..6.0) {
        let mut grid = HashGridIndex::new();
        grid.rebuild(&particles, h).unwrap();
        let mut sorted = SortedCellIndex::new(ExecutionModel::Parallel, particles.len());
        sorted.rebuild(&particles, h).unwrap();

        for p in &particles {
            let cell = cell_coord(p.position, h);
            prop_assert_eq!(sorted_candidates(&grid, cell), sorted_candidates(&sorted, cell));
        }
        // an empty region far away
        let far = glam::IVec2::new(10_000, -10_000);
        prop_assert_eq!(sorted_candidates(&grid, far), sorted_candidates(&sorted, far));
    }
}

#[test]
fn test_dense_cloud_with_key_collisions() {
    // Many cells, few particles: bucket keys collide heavily and the sorted
    // backing has to filter by full hash.
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let particles: Vec<Particle> = (0..40)
        .map(|_| Particle::at(Vec2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0))))
        .collect();
    let h = 1.0;

    let mut grid = HashGridIndex::new();
    grid.rebuild(&particles, h).unwrap();
    let mut sorted = SortedCellIndex::new(ExecutionModel::Sequential, particles.len());
    sorted.rebuild(&particles, h).unwrap();

    for x in -101..=101 {
        for y in (-101..=101).step_by(7) {
            let cell = glam::IVec2::new(x, y);
            assert_eq!(sorted_candidates(&grid, cell), sorted_candidates(&sorted, cell));
        }
    }
}

#[test]
fn test_spatial_index_capacity_is_fixed() {
    let particles = vec![Particle::default(); 10];
    let mut index = SortedCellIndex::new(ExecutionModel::Parallel, 8);
    assert!(index.rebuild(&particles, 1.0).is_err());
    assert_eq!(index.capacity(), 8);
    index.rebuild(&particles[..8], 1.0).unwrap();
    assert_eq!(index.entries().len(), 8);
}
