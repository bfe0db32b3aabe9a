//! Pressure, viscosity, gravity and pointer-interaction forces.
//!
//! Pair terms divide by the neighbor's density rather than a symmetrized
//! average, so the pair forces are not exactly equal and opposite.
//!
//! The pressure term is `-dir(r_ij) * m * (p_i + p_j) / (2 rho_j) * W_spiky`
//! with `r_ij = x_j - x_i` and a negative spiky factor: negative pressure
//! (below rest density) separates a pair, positive pressure draws it together.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::constants::INTERACTION_PRESSURE_SCALE;
use crate::exec::ExecutionModel;
use crate::kernels::KernelFactors;
use crate::particle::Particle;
use crate::spatial::NeighborQuery;

/// Which way the pointer pushes fluid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    /// Primary button: draws particles toward the point.
    Pull,
    /// Secondary button: pushes particles away from the point.
    Push,
}

/// Pointer input for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub point: Vec2,
    pub mode: InteractionMode,
}

impl Interaction {
    pub fn pull(point: Vec2) -> Self {
        Self {
            point,
            mode: InteractionMode::Pull,
        }
    }

    pub fn push(point: Vec2) -> Self {
        Self {
            point,
            mode: InteractionMode::Push,
        }
    }
}

/// Inputs of the force pass taken from [`SimConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
    pub mass: f32,
    pub viscosity: f32,
    pub gravity: Vec2,
    pub interaction_pressure: f32,
    pub interaction_radius: f32,
}

impl From<&SimConfig> for ForceParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            mass: config.mass,
            viscosity: config.viscosity,
            gravity: config.gravity,
            interaction_pressure: config.interaction_pressure,
            interaction_radius: config.interaction_radius,
        }
    }
}

/// Net force on particle `i`. Always finite for finite inputs.
pub fn force_on<Q: NeighborQuery>(
    i: usize,
    particles: &[Particle],
    index: &Q,
    kernels: &KernelFactors,
    params: &ForceParams,
    interaction: Option<Interaction>,
) -> Vec2 {
    let p_i = &particles[i];
    let mut pressure_force = Vec2::ZERO;
    let mut viscosity_force = Vec2::ZERO;

    index.for_each_candidate_near(p_i.position, |j| {
        if j == i {
            return;
        }
        let p_j = &particles[j];
        // A neighbor with no density has no defined contribution.
        if !(p_j.density > 0.0) {
            return;
        }
        let r_ij = p_j.position - p_i.position;
        let dist = r_ij.length();
        if dist >= kernels.h {
            return;
        }

        pressure_force += -r_ij.normalize_or_zero() * params.mass * (p_i.pressure + p_j.pressure)
            / (2.0 * p_j.density)
            * kernels.spiky(dist);
        viscosity_force += params.viscosity * params.mass * (p_j.velocity - p_i.velocity)
            / p_j.density
            * kernels.viscosity_laplacian(dist);
    });

    let gravity_force = if p_i.density > 0.0 {
        params.gravity * params.mass / p_i.density
    } else {
        Vec2::ZERO
    };

    let mut force = pressure_force + viscosity_force + gravity_force;
    if let Some(interaction) = interaction {
        force += interaction_force(p_i.position, interaction, kernels, params);
    }
    force
}

/// Pointer term for a particle at `position`. Zero outside the radius.
pub fn interaction_force(
    position: Vec2,
    interaction: Interaction,
    kernels: &KernelFactors,
    params: &ForceParams,
) -> Vec2 {
    let to_point = interaction.point - position;
    let dist = to_point.length();
    if dist >= params.interaction_radius {
        return Vec2::ZERO;
    }
    let term = -to_point.normalize_or_zero() * (params.interaction_pressure / INTERACTION_PRESSURE_SCALE)
        * kernels.spiky(dist);
    match interaction.mode {
        InteractionMode::Pull => term,
        InteractionMode::Push => -term,
    }
}

/// Writes the net force of every particle from the current densities and
/// pressures. `scratch` must hold one slot per particle.
pub fn solve_forces<Q: NeighborQuery + Sync>(
    model: ExecutionModel,
    particles: &mut [Particle],
    index: &Q,
    kernels: &KernelFactors,
    params: &ForceParams,
    interaction: Option<Interaction>,
    scratch: &mut [Vec2],
) {
    debug_assert_eq!(particles.len(), scratch.len());

    let snapshot: &[Particle] = particles;
    model.fill(scratch, |i| {
        force_on(i, snapshot, index, kernels, params, interaction)
    });

    let forces: &[Vec2] = scratch;
    model.for_each_mut(particles, |i, p| p.force = forces[i]);
}
