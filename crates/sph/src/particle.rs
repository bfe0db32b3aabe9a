//! Fluid particles.
//!
//! Each particle carries its kinematic state plus the per-solve density,
//! pressure and force. Force is transient: every resolve overwrites it.

use glam::Vec2;
use rand::Rng;

/// One SPH particle. 32 bytes, GPU-uploadable as-is.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Net force from the most recent resolve.
    pub force: Vec2,
    /// Summed kernel density. Zero only if no candidate passed the cutoff.
    pub density: f32,
    /// Equation-of-state pressure. Negative below rest density.
    pub pressure: f32,
}

impl Particle {
    /// Particle at rest at `position`.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// True if every field is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.force.is_finite()
            && self.density.is_finite()
            && self.pressure.is_finite()
    }
}

/// `count` particles at rest, uniformly scattered inside `[min, max)`.
pub fn scatter_in_box<R: Rng + ?Sized>(count: usize, min: Vec2, max: Vec2, rng: &mut R) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            Particle::at(Vec2::new(
                rng.gen_range(min.x..max.x),
                rng.gen_range(min.y..max.y),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_particle_layout() {
        assert_eq!(std::mem::size_of::<Particle>(), 32);
    }

    #[test]
    fn test_scatter_stays_in_box() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let min = Vec2::new(-5.0, -1.0);
        let max = Vec2::new(5.0, 5.0);
        let particles = scatter_in_box(500, min, max, &mut rng);
        assert_eq!(particles.len(), 500);
        for p in &particles {
            assert!(p.position.cmpge(min).all() && p.position.cmplt(max).all());
            assert_eq!(p.velocity, Vec2::ZERO);
        }
    }
}
