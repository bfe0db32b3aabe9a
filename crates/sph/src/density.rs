//! Density and pressure pass.
//!
//! rho_i = sum_j m * W_poly6(r_ij) over every candidate j (i included) inside
//! the density cutoff, then p_i = k * (rho_i - rho0). Densities land in a
//! scratch buffer first so no particle reads another's new density.

use crate::config::{DensityCutoff, SimConfig};
use crate::exec::ExecutionModel;
use crate::kernels::KernelFactors;
use crate::particle::Particle;
use crate::spatial::NeighborQuery;

/// Inputs of the density pass taken from [`SimConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensityParams {
    pub mass: f32,
    pub stiffness: f32,
    pub rest_density: f32,
    pub cutoff: DensityCutoff,
}

impl DensityParams {
    /// Equation of state. Negative below rest density; no floor.
    #[inline]
    pub fn pressure(&self, density: f32) -> f32 {
        self.stiffness * (density - self.rest_density)
    }
}

impl From<&SimConfig> for DensityParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            mass: config.mass,
            stiffness: config.stiffness,
            rest_density: config.rest_density,
            cutoff: config.density_cutoff,
        }
    }
}

/// Density at particle `i`.
pub fn density_at<Q: NeighborQuery>(
    i: usize,
    particles: &[Particle],
    index: &Q,
    kernels: &KernelFactors,
    params: &DensityParams,
) -> f32 {
    let pos_i = particles[i].position;
    let mut density = 0.0;
    index.for_each_candidate_near(pos_i, |j| {
        let dist_sq = (particles[j].position - pos_i).length_squared();
        if params.cutoff.contains(dist_sq, kernels.h) {
            density += params.mass * kernels.poly6(dist_sq);
        }
    });
    density
}

/// Writes density and pressure of every particle.
///
/// `scratch` must hold one slot per particle. `index` must have been rebuilt
/// for the current positions.
pub fn solve_density_pressure<Q: NeighborQuery + Sync>(
    model: ExecutionModel,
    particles: &mut [Particle],
    index: &Q,
    kernels: &KernelFactors,
    params: &DensityParams,
    scratch: &mut [f32],
) {
    debug_assert_eq!(particles.len(), scratch.len());

    let snapshot: &[Particle] = particles;
    model.fill(scratch, |i| density_at(i, snapshot, index, kernels, params));

    let densities: &[f32] = scratch;
    model.for_each_mut(particles, |i, p| {
        p.density = densities[i];
        p.pressure = params.pressure(p.density);
    });
}
