//! SPH2D - Weakly Compressible SPH Fluid Simulation
//!
//! Explicit, fixed-time-step 2D smoothed particle hydrodynamics with:
//! - Poly6 density, spiky pressure and viscosity-Laplacian kernels
//! - Leapfrog (half-kick / drift / half-kick) integration
//! - Box boundary with per-side restitution
//! - Two interchangeable neighbor searches: a hash-map grid (sequential
//!   reference) and a bitonic-sorted cell table (data-parallel)
//!
//! This crate is renderer-agnostic. Positions and speed colors are handed to
//! a [`Renderer`] implementation each tick.
//!
//! # Example
//!
//! ```
//! use sph::{ExecutionModel, SimConfig, Simulation};
//!
//! let config = SimConfig {
//!     particle_count: 64,
//!     execution: ExecutionModel::Parallel,
//!     seed: Some(7),
//!     ..SimConfig::default()
//! };
//! let mut sim = Simulation::new(config).unwrap();
//!
//! for _ in 0..10 {
//!     let frame = sim.step(None).unwrap();
//!     assert_eq!(frame.len(), 64);
//! }
//! sim.teardown();
//! ```

pub mod bitonic;
pub mod config;
pub mod constants;
pub mod density;
pub mod error;
pub mod exec;
pub mod forces;
pub mod integrator;
pub mod kernels;
pub mod particle;
pub mod render;
pub mod simulation;
pub mod spatial;

pub use bitonic::{BitonicSorter, OffsetTable, SpatialEntry};
pub use config::{DensityCutoff, Restitution, SimConfig};
pub use error::SimError;
pub use exec::ExecutionModel;
pub use forces::{Interaction, InteractionMode};
pub use glam::{IVec2, Vec2};
pub use integrator::IntegratorPhase;
pub use kernels::KernelFactors;
pub use particle::Particle;
pub use render::{speed_color, Frame, Renderer};
pub use simulation::Simulation;
pub use spatial::{cell_coord, cell_hash, HashGridIndex, NeighborQuery, SortedCellIndex, SpatialIndex};
