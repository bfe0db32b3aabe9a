//! Leapfrog integration and box collision.
//!
//! One tick walks the phases
//! `Idle -> HalfKick1 -> Drift -> Resolve -> HalfKick2 -> Collide -> Idle`.
//! The kick, drift and collide passes only touch their own particle, so they
//! run in place.

use glam::Vec2;

use crate::config::Restitution;
use crate::exec::ExecutionModel;
use crate::particle::Particle;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IntegratorPhase {
    #[default]
    Idle,
    /// `v += F/m * dt/2` with the forces of the previous resolve.
    HalfKick1,
    /// `x += v * dt`.
    Drift,
    /// Rebuild the index, recompute density and forces.
    Resolve,
    /// `v += F/m * dt/2` with the fresh forces.
    HalfKick2,
    /// Clamp to the box and reflect velocity.
    Collide,
}

impl IntegratorPhase {
    /// Phase after this one. `Collide` wraps back to `Idle`.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::HalfKick1,
            Self::HalfKick1 => Self::Drift,
            Self::Drift => Self::Resolve,
            Self::Resolve => Self::HalfKick2,
            Self::HalfKick2 => Self::Collide,
            Self::Collide => Self::Idle,
        }
    }
}

pub fn half_kick(model: ExecutionModel, particles: &mut [Particle], mass: f32, dt: f32) {
    let half_dt = dt * 0.5;
    model.for_each_mut(particles, |_, p| {
        p.velocity += (p.force / mass) * half_dt;
    });
}

pub fn drift(model: ExecutionModel, particles: &mut [Particle], dt: f32) {
    model.for_each_mut(particles, |_, p| {
        p.position += p.velocity * dt;
    });
}

pub fn collide(
    model: ExecutionModel,
    particles: &mut [Particle],
    box_min: Vec2,
    box_max: Vec2,
    restitution: &Restitution,
) {
    model.for_each_mut(particles, |_, p| {
        reflect(p, box_min, box_max, restitution)
    });
}

/// Clamps one particle into the box. Per axis, a crossed wall scales that
/// velocity component by the wall's restitution factor.
#[inline]
pub fn reflect(p: &mut Particle, box_min: Vec2, box_max: Vec2, restitution: &Restitution) {
    for axis in 0..2 {
        if p.position[axis] < box_min[axis] {
            p.velocity[axis] *= restitution.min[axis];
            p.position[axis] = box_min[axis];
        } else if p.position[axis] > box_max[axis] {
            p.velocity[axis] *= restitution.max[axis];
            p.position[axis] = box_max[axis];
        }
    }
}
