//! Simulation configuration.
//!
//! A [`SimConfig`] is handed to [`crate::Simulation::new`] and may be replaced
//! between ticks with [`crate::Simulation::update_config`]. It is read-only
//! while a tick runs.

use std::path::Path;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::{
    COLOR_SPEED_MAX, RESTITUTION_CEILING, RESTITUTION_FLOOR, RESTITUTION_X, TARGET_TICK_RATE,
};
use crate::error::SimError;
use crate::exec::ExecutionModel;

/// How the density pass decides whether a neighbor is inside the kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityCutoff {
    /// Squared distance compared against the unsquared kernel radius.
    ///
    /// The effective density support is `sqrt(h)`. For `h > 1` that is inside
    /// the kernel. For `h < 1` it reaches past `h`: pairs with
    /// `h < r < sqrt(h)` add a negative `(h^2 - r^2)^3` term, so density can
    /// go negative, and pairs more than one cell apart are never visited. Use
    /// [`DensityCutoff::Consistent`] for kernel radii below 1.
    #[default]
    Legacy,
    /// Squared distance compared against the squared kernel radius.
    Consistent,
}

impl DensityCutoff {
    /// Returns true if a neighbor at squared distance `dist_sq` contributes.
    #[inline]
    pub fn contains(self, dist_sq: f32, h: f32) -> bool {
        match self {
            Self::Legacy => dist_sq < h,
            Self::Consistent => dist_sq < h * h,
        }
    }

    /// True if this cutoff admits neighbors beyond the kernel radius `h`.
    pub fn reaches_past_kernel(self, h: f32) -> bool {
        matches!(self, Self::Legacy) && h < 1.0
    }
}

/// Signed velocity factors applied when a particle crosses a wall.
///
/// `min.x` / `max.x` are the left and right walls, `min.y` the floor and
/// `max.y` the ceiling. Values are multiplied into the velocity component, so
/// a bounce needs a negative factor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Restitution {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Restitution {
    fn default() -> Self {
        Self {
            min: Vec2::new(RESTITUTION_X, RESTITUTION_FLOOR),
            max: Vec2::new(RESTITUTION_X, RESTITUTION_CEILING),
        }
    }
}

impl Restitution {
    /// Same factor on every wall.
    pub fn uniform(factor: f32) -> Self {
        Self {
            min: Vec2::splat(factor),
            max: Vec2::splat(factor),
        }
    }
}

/// Parameters controlling the fluid.
///
/// Defaults are the 10 x 6 water-box scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Gravity acceleration.
    pub gravity: Vec2,
    /// Mass of every particle.
    pub mass: f32,
    /// Pressure stiffness (k in p = k * (rho - rho0)).
    pub stiffness: f32,
    /// Rest density rho0.
    pub rest_density: f32,
    /// Viscosity constant mu.
    pub viscosity: f32,
    /// Smoothing kernel radius h. Also the spatial hash cell size.
    pub kernel_radius: f32,
    /// Fixed integration time step.
    pub time_step: f32,
    /// Lower-left corner of the container.
    pub box_min: Vec2,
    /// Upper-right corner of the container.
    pub box_max: Vec2,
    /// Pointer interaction pressure.
    pub interaction_pressure: f32,
    /// Pointer interaction radius.
    pub interaction_radius: f32,
    /// Number of particles.
    pub particle_count: usize,
    /// Wall restitution factors.
    pub restitution: Restitution,
    /// Density cutoff test.
    pub density_cutoff: DensityCutoff,
    /// Sequential reference or data-parallel execution.
    pub execution: ExecutionModel,
    /// Seed for initial placement. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Tick rate the host loop should run at (Hz). Not enforced here.
    pub target_tick_rate: f32,
    /// Speed that maps to color value 1.0.
    pub color_speed_max: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -10.0),
            mass: 2.5,
            stiffness: 2000.0,
            rest_density: 300.0,
            viscosity: 200.0,
            kernel_radius: 16.0,
            time_step: 0.0007,
            box_min: Vec2::new(-5.0, -1.0),
            box_max: Vec2::new(5.0, 5.0),
            interaction_pressure: 0.0,
            interaction_radius: 0.0,
            particle_count: 1000,
            restitution: Restitution::default(),
            density_cutoff: DensityCutoff::Legacy,
            execution: ExecutionModel::Sequential,
            seed: None,
            target_tick_rate: TARGET_TICK_RATE,
            color_speed_max: COLOR_SPEED_MAX,
        }
    }
}

impl SimConfig {
    /// Checks every field. Nothing is clamped: the first bad value is reported.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.kernel_radius.is_finite() && self.kernel_radius > 0.0) {
            return Err(SimError::InvalidKernelRadius(self.kernel_radius));
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(SimError::InvalidMass(self.mass));
        }
        if self.particle_count == 0 {
            return Err(SimError::EmptyParticleSet);
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(SimError::InvalidTimeStep(self.time_step));
        }

        let finite_fields = [
            ("gravity", self.gravity.is_finite()),
            ("stiffness", self.stiffness.is_finite()),
            ("rest_density", self.rest_density.is_finite()),
            ("viscosity", self.viscosity.is_finite()),
            ("box_min", self.box_min.is_finite()),
            ("box_max", self.box_max.is_finite()),
            ("interaction_pressure", self.interaction_pressure.is_finite()),
            ("interaction_radius", self.interaction_radius.is_finite()),
            (
                "restitution",
                self.restitution.min.is_finite() && self.restitution.max.is_finite(),
            ),
            ("target_tick_rate", self.target_tick_rate.is_finite()),
            ("color_speed_max", self.color_speed_max.is_finite()),
        ];
        if let Some(&(field, _)) = finite_fields.iter().find(|(_, ok)| !ok) {
            return Err(SimError::NonFinite { field });
        }

        if self.box_min.x >= self.box_max.x
            || self.box_min.y >= self.box_max.y
            || !(self.box_max - self.box_min).is_finite()
        {
            return Err(SimError::InvalidBounds {
                min: self.box_min.to_array(),
                max: self.box_max.to_array(),
            });
        }

        if !(self.target_tick_rate > 0.0)
            || Duration::try_from_secs_f32(1.0 / self.target_tick_rate).is_err()
        {
            return Err(SimError::InvalidTickRate(self.target_tick_rate));
        }

        Ok(())
    }

    /// Wall-clock interval between ticks the host loop should aim for.
    ///
    /// `ZERO` if the rate has no representable interval, which `validate`
    /// rejects.
    pub fn tick_interval(&self) -> Duration {
        if self.target_tick_rate > 0.0 {
            Duration::try_from_secs_f32(1.0 / self.target_tick_rate).unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
