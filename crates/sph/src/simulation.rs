//! Simulation handle: owns the particles, the spatial index and the scratch
//! buffers, and drives one tick at a time.
//!
//! A tick is:
//! 1. resolve (index rebuild, density/pressure, forces) at the current positions
//! 2. `HalfKick1 -> Drift -> Resolve -> HalfKick2 -> Collide`
//! 3. hand back a [`Frame`] for rendering
//!
//! The pointer interaction given to [`Simulation::step`] is applied in both
//! resolves of that tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::SimConfig;
use crate::density::{solve_density_pressure, DensityParams};
use crate::error::SimError;
use crate::forces::{solve_forces, ForceParams, Interaction};
use crate::integrator::{self, IntegratorPhase};
use crate::kernels::KernelFactors;
use crate::particle::{scatter_in_box, Particle};
use crate::render::{Frame, Renderer};
use crate::spatial::{NeighborQuery, SpatialIndex};

pub struct Simulation {
    config: SimConfig,
    particles: Vec<Particle>,
    index: SpatialIndex,
    kernels: KernelFactors,
    density_scratch: Vec<f32>,
    force_scratch: Vec<Vec2>,
    rng: ChaCha8Rng,
    tick: u64,
    phase: IntegratorPhase,
}

impl Simulation {
    /// Validates `config` and scatters `particle_count` particles at rest
    /// inside the box.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);
        let particles = scatter_in_box(config.particle_count, config.box_min, config.box_max, &mut rng);
        Self::build(config, particles, rng)
    }

    /// Starts from caller-supplied particles. Their number must match
    /// `config.particle_count`.
    pub fn with_particles(config: SimConfig, particles: Vec<Particle>) -> Result<Self, SimError> {
        config.validate()?;
        if particles.len() != config.particle_count {
            return Err(SimError::ParticleCountMismatch {
                expected: config.particle_count,
                actual: particles.len(),
            });
        }
        let rng = seeded_rng(config.seed);
        Self::build(config, particles, rng)
    }

    fn build(config: SimConfig, particles: Vec<Particle>, rng: ChaCha8Rng) -> Result<Self, SimError> {
        let n = particles.len();
        let index = SpatialIndex::for_model(config.execution, n);
        log::info!(
            "SPH init: {} particles, h={}, dt={}, {:?} execution ({} index)",
            n,
            config.kernel_radius,
            config.time_step,
            config.execution,
            index.name()
        );
        warn_on_wide_cutoff(&config);
        Ok(Self {
            kernels: KernelFactors::new(config.kernel_radius),
            density_scratch: vec![0.0; n],
            force_scratch: vec![Vec2::ZERO; n],
            config,
            particles,
            index,
            rng,
            tick: 0,
            phase: IntegratorPhase::Idle,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current integrator phase. `Idle` between ticks.
    pub fn phase(&self) -> IntegratorPhase {
        self.phase
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Current state as a render frame.
    pub fn frame(&self) -> Frame<'_> {
        Frame::new(&self.particles, self.config.color_speed_max, self.tick)
    }

    /// Hands the current state to `renderer`.
    pub fn publish(&self, renderer: &mut impl Renderer) {
        renderer.present(&self.frame());
    }

    /// Advances one fixed time step.
    ///
    /// On error the tick is abandoned: the phase goes back to `Idle` and the
    /// tick counter does not advance.
    pub fn step(&mut self, interaction: Option<Interaction>) -> Result<Frame<'_>, SimError> {
        if let Err(err) = self.run_tick(interaction) {
            log::warn!("tick {} aborted in {:?}: {}", self.tick + 1, self.phase, err);
            self.phase = IntegratorPhase::Idle;
            return Err(err);
        }

        self.tick += 1;
        if log::log_enabled!(log::Level::Debug) {
            let max_speed = self.particles.iter().map(Particle::speed).fold(0.0f32, f32::max);
            let mean_density = self.particles.iter().map(|p| p.density).sum::<f32>()
                / self.particles.len().max(1) as f32;
            log::debug!(
                "tick {}: max speed {:.3}, mean density {:.3}{}",
                self.tick,
                max_speed,
                mean_density,
                if interaction.is_some() { ", interacting" } else { "" }
            );
        }
        Ok(self.frame())
    }

    /// Pre-kick resolve followed by one pass through the integrator phases.
    fn run_tick(&mut self, interaction: Option<Interaction>) -> Result<(), SimError> {
        let model = self.config.execution;
        let dt = self.config.time_step;
        let mass = self.config.mass;

        self.resolve(interaction)?;

        loop {
            self.phase = self.phase.next();
            log::trace!("tick {} phase {:?}", self.tick + 1, self.phase);
            match self.phase {
                IntegratorPhase::Idle => break,
                IntegratorPhase::HalfKick1 | IntegratorPhase::HalfKick2 => {
                    integrator::half_kick(model, &mut self.particles, mass, dt)
                }
                IntegratorPhase::Drift => integrator::drift(model, &mut self.particles, dt),
                IntegratorPhase::Resolve => self.resolve(interaction)?,
                IntegratorPhase::Collide => integrator::collide(
                    model,
                    &mut self.particles,
                    self.config.box_min,
                    self.config.box_max,
                    &self.config.restitution,
                ),
            }
        }
        Ok(())
    }

    /// Rebuilds the index and recomputes density, pressure and force.
    fn resolve(&mut self, interaction: Option<Interaction>) -> Result<(), SimError> {
        let model = self.config.execution;
        self.index.rebuild(&self.particles, self.kernels.h)?;
        solve_density_pressure(
            model,
            &mut self.particles,
            &self.index,
            &self.kernels,
            &DensityParams::from(&self.config),
            &mut self.density_scratch,
        );
        solve_forces(
            model,
            &mut self.particles,
            &self.index,
            &self.kernels,
            &ForceParams::from(&self.config),
            interaction,
            &mut self.force_scratch,
        );
        Ok(())
    }

    /// Swaps in a new config between ticks.
    ///
    /// A changed particle count truncates or appends random particles; a
    /// changed count or execution model reallocates the index and scratch
    /// buffers. On error the old config stays in place.
    pub fn update_config(&mut self, config: SimConfig) -> Result<(), SimError> {
        config.validate()?;

        let old_count = self.particles.len();
        let new_count = config.particle_count;
        if new_count != old_count {
            log::warn!(
                "particle count {} -> {}, reallocating buffers",
                old_count,
                new_count
            );
            if new_count < old_count {
                self.particles.truncate(new_count);
            } else {
                let extra = scatter_in_box(new_count - old_count, config.box_min, config.box_max, &mut self.rng);
                self.particles.extend(extra);
            }
            self.density_scratch = vec![0.0; new_count];
            self.force_scratch = vec![Vec2::ZERO; new_count];
        }
        if new_count != old_count || config.execution != self.config.execution {
            self.index = SpatialIndex::for_model(config.execution, new_count);
        }

        self.kernels = KernelFactors::new(config.kernel_radius);
        self.config = config;
        log::info!(
            "SPH config reloaded at tick {}: {} particles, h={}, {:?} execution",
            self.tick,
            new_count,
            self.config.kernel_radius,
            self.config.execution
        );
        warn_on_wide_cutoff(&self.config);
        Ok(())
    }

    /// Releases every buffer. Returns the final particle state.
    pub fn teardown(self) -> Vec<Particle> {
        log::info!("SPH teardown after {} ticks", self.tick);
        self.particles
    }
}

fn warn_on_wide_cutoff(config: &SimConfig) {
    if config.density_cutoff.reaches_past_kernel(config.kernel_radius) {
        log::warn!(
            "{:?} density cutoff with h={} admits neighbors past h; densities may go negative",
            config.density_cutoff,
            config.kernel_radius
        );
    }
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
