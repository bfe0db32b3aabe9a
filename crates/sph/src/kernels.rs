//! 2D SPH kernel functions.
//!
//! Factors are precomputed once per resolve from the kernel radius h.

use std::f32::consts::PI;

/// Kernel normalisation factors for a given smoothing radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelFactors {
    pub h: f32,
    pub h_sq: f32,
    /// 4 / (pi * h^8)
    pub poly6: f32,
    /// -10 / (pi * h^5)
    pub spiky: f32,
    /// 40 / (pi * h^5)
    pub viscosity: f32,
}

impl KernelFactors {
    pub fn new(h: f32) -> Self {
        let h5 = h.powi(5);
        Self {
            h,
            h_sq: h * h,
            poly6: 4.0 / (PI * h.powi(8)),
            spiky: -10.0 / (PI * h5),
            viscosity: 40.0 / (PI * h5),
        }
    }

    /// Poly6 weight: poly6 * (h^2 - r^2)^3.
    ///
    /// No support check; callers apply their own cutoff.
    #[inline]
    pub fn poly6(&self, dist_sq: f32) -> f32 {
        let diff = self.h_sq - dist_sq;
        self.poly6 * diff * diff * diff
    }

    /// Spiky term: spiky * (h - r)^3.
    #[inline]
    pub fn spiky(&self, dist: f32) -> f32 {
        let diff = self.h - dist;
        self.spiky * diff * diff * diff
    }

    /// Viscosity Laplacian term: viscosity * (h - r).
    #[inline]
    pub fn viscosity_laplacian(&self, dist: f32) -> f32 {
        self.viscosity * (self.h - dist)
    }
}
