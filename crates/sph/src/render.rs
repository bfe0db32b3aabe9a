//! Renderer boundary.
//!
//! The simulation owns no drawing resources. After each tick it hands a
//! borrowed [`Frame`] to whatever [`Renderer`] the host supplies.

use glam::Vec2;

use crate::particle::Particle;

/// Consumer of per-tick particle state.
pub trait Renderer {
    fn present(&mut self, frame: &Frame<'_>);
}

/// Speed mapped into `[0, 1]` over `[0, max_speed]`.
#[inline]
pub fn speed_color(speed: f32, max_speed: f32) -> f32 {
    if max_speed > 0.0 {
        (speed / max_speed).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Read-only view of the particles after a tick.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    particles: &'a [Particle],
    color_speed_max: f32,
    tick: u64,
}

impl<'a> Frame<'a> {
    pub fn new(particles: &'a [Particle], color_speed_max: f32, tick: u64) -> Self {
        Self {
            particles,
            color_speed_max,
            tick,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Tick number this frame was produced by. 0 before the first step.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn particles(&self) -> &'a [Particle] {
        self.particles
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + 'a {
        self.particles.iter().map(|p| p.position)
    }

    pub fn velocities(&self) -> impl Iterator<Item = Vec2> + 'a {
        self.particles.iter().map(|p| p.velocity)
    }

    /// Per-particle color value from speed.
    pub fn colors(&self) -> impl Iterator<Item = f32> + 'a {
        let max = self.color_speed_max;
        self.particles.iter().map(move |p| speed_color(p.speed(), max))
    }

    /// Raw particle buffer for GPU upload.
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.particles)
    }
}
