//! Error type shared by the whole crate.

use std::path::PathBuf;

/// Everything that can go wrong at init, on config reload, or inside a tick.
///
/// Boundary clamping is not an error and never shows up here.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("kernel radius must be positive and finite, got {0}")]
    InvalidKernelRadius(f32),
    #[error("particle mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    #[error("particle count must be positive")]
    EmptyParticleSet,
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f32),
    #[error("box min {min:?} must be strictly below box max {max:?} on both axes")]
    InvalidBounds { min: [f32; 2], max: [f32; 2] },
    #[error("target tick rate must be positive with a representable interval, got {0}")]
    InvalidTickRate(f32),
    #[error("config field `{field}` is not finite")]
    NonFinite { field: &'static str },
    #[error("particle buffer holds {actual} particles but config asks for {expected}")]
    ParticleCountMismatch { expected: usize, actual: usize },
    #[error("spatial index holds {capacity} entries, {entries} requested")]
    CapacityExceeded { entries: usize, capacity: usize },
    #[error("failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// True for errors raised by config validation.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKernelRadius(_)
                | Self::InvalidMass(_)
                | Self::EmptyParticleSet
                | Self::InvalidTimeStep(_)
                | Self::InvalidBounds { .. }
                | Self::InvalidTickRate(_)
                | Self::NonFinite { .. }
                | Self::ParticleCountMismatch { .. }
        )
    }
}
