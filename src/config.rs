//! Mesher configuration and builder
//!
//! Every parameter that influences generator placement lives here, so the
//! same configuration applied to the same domain reproduces the same layout.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};

/// Golden-ratio spacing factor used when none is given
pub const DEFAULT_SPACING_FACTOR: f64 = 0.618;

/// Corner angle (degrees) below which a fixed vertex is treated as sharp
pub const DEFAULT_CORNER_ANGLE: f64 = 100.0;

/// Minimum interior-to-boundary distance as a fraction of the reference edge length
pub const DEFAULT_SEPARATION_FACTOR: f64 = 0.7;

/// Configuration for CVT generator placement
///
/// # Example
///
/// ```rust
/// use cvt_mesh::*;
///
/// let config = MesherConfigBuilder::new()
///     .seed(7)
///     .refine(2)
///     .unwrap()
///     .corner_angle(100.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.refine, 2);
/// assert_eq!(config.spacing_factor, 0.618);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MesherConfig {
    /// Seed for the interior rejection sampler
    pub seed: u32,

    /// Number of uniform boundary bisections applied before placement
    pub refine: usize,

    /// Spacing factor `c` scaling the averaged edge length into a vertex radius
    ///
    /// Must lie strictly between 0 and 1. Between equal radii a boundary
    /// generator sits `0.5 * h * sqrt(4c^2 - 1)` off its edge: on the edge at
    /// 0.5, about `0.87 h` away near 1. Values below 0.5 pass validation but
    /// meshing then fails with `DegenerateGeometry`.
    pub spacing_factor: f64,

    /// Sharp-corner threshold `theta`, in degrees
    pub corner_angle: f64,

    /// Interior points must be farther than `separation_factor * h0` from
    /// every boundary generator
    pub separation_factor: f64,

    /// Rejection-sampling budget, in candidates per required point
    pub attempts_per_point: usize,

    /// Upper bound on relaxation steps run by [`crate::CvtMesh::relax`]
    pub lloyd_iterations: usize,

    /// Early-exit threshold for relaxation, as a fraction of `h0`
    ///
    /// - 0.0: run every iteration
    /// - 0.01: default, stop once the summed displacement drops below 1% of `h0`
    pub lloyd_convergence: f64,
}

impl MesherConfig {
    /// Relaxation options derived from this configuration
    pub fn lloyd_options(&self) -> crate::LloydOptions {
        crate::LloydOptions {
            max_iterations: self.lloyd_iterations,
            convergence_threshold: self.lloyd_convergence,
        }
    }
}

impl Default for MesherConfig {
    fn default() -> Self {
        MesherConfigBuilder::new().seed(0).build().unwrap()
    }
}

/// Builder for [`MesherConfig`] with validation
#[derive(Debug, Clone)]
pub struct MesherConfigBuilder {
    seed: Option<u32>,
    refine: usize,
    spacing_factor: f64,
    corner_angle: f64,
    separation_factor: f64,
    attempts_per_point: usize,
    lloyd_iterations: usize,
    lloyd_convergence: f64,
}

impl MesherConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: random (drawn when `build` is called)
    /// - refine: 0
    /// - spacing_factor: 0.618
    /// - corner_angle: 100 degrees
    /// - separation_factor: 0.7
    /// - attempts_per_point: 1000
    /// - lloyd_iterations: 10
    /// - lloyd_convergence: 0.01
    pub fn new() -> Self {
        Self {
            seed: None,
            refine: 0,
            spacing_factor: DEFAULT_SPACING_FACTOR,
            corner_angle: DEFAULT_CORNER_ANGLE,
            separation_factor: DEFAULT_SEPARATION_FACTOR,
            attempts_per_point: 1000,
            lloyd_iterations: 10,
            lloyd_convergence: 0.01,
        }
    }

    /// Set the sampler seed
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of uniform boundary bisections
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `refine > 16`; each level doubles the
    /// half-edge count.
    pub fn refine(mut self, refine: usize) -> Result<Self> {
        if refine > 16 {
            return Err(MeshError::InvalidConfig(format!(
                "refine must be <= 16 (got {})",
                refine
            )));
        }
        self.refine = refine;
        Ok(self)
    }

    /// Set the spacing factor `c`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 < c < 1`
    pub fn spacing_factor(mut self, c: f64) -> Result<Self> {
        validate_spacing_factor(c)?;
        self.spacing_factor = c;
        Ok(self)
    }

    /// Set the sharp-corner threshold in degrees
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 < theta <= 180`
    pub fn corner_angle(mut self, theta: f64) -> Result<Self> {
        validate_corner_angle(theta)?;
        self.corner_angle = theta;
        Ok(self)
    }

    /// Set the interior separation factor
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the factor is not positive
    pub fn separation_factor(mut self, factor: f64) -> Result<Self> {
        if !(factor > 0.0) || !factor.is_finite() {
            return Err(MeshError::InvalidConfig(format!(
                "separation factor must be positive (got {})",
                factor
            )));
        }
        self.separation_factor = factor;
        Ok(self)
    }

    /// Set the rejection-sampling budget per required point
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `attempts` is zero
    pub fn attempts_per_point(mut self, attempts: usize) -> Result<Self> {
        if attempts == 0 {
            return Err(MeshError::InvalidConfig(
                "attempts per point must be >= 1".to_string(),
            ));
        }
        self.attempts_per_point = attempts;
        Ok(self)
    }

    /// Set the maximum number of relaxation steps
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 1000
    pub fn lloyd_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > 1000 {
            return Err(MeshError::InvalidConfig(format!(
                "Lloyd iterations must be <= 1000 (got {})",
                iterations
            )));
        }
        self.lloyd_iterations = iterations;
        Ok(self)
    }

    /// Set the relaxation convergence threshold
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if threshold is negative
    pub fn lloyd_convergence(mut self, threshold: f64) -> Result<Self> {
        if threshold < 0.0 || !threshold.is_finite() {
            return Err(MeshError::InvalidConfig(format!(
                "Lloyd convergence threshold must be >= 0 (got {})",
                threshold
            )));
        }
        self.lloyd_convergence = threshold;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, one is drawn from the thread RNG and stored in
    /// the configuration so the run can be reproduced.
    pub fn build(self) -> Result<MesherConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);

        Ok(MesherConfig {
            seed,
            refine: self.refine,
            spacing_factor: self.spacing_factor,
            corner_angle: self.corner_angle,
            separation_factor: self.separation_factor,
            attempts_per_point: self.attempts_per_point,
            lloyd_iterations: self.lloyd_iterations,
            lloyd_convergence: self.lloyd_convergence,
        })
    }
}

impl Default for MesherConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_spacing_factor(c: f64) -> Result<()> {
    if !(c > 0.0 && c < 1.0) {
        return Err(MeshError::InvalidConfig(format!(
            "spacing factor must satisfy 0 < c < 1 (got {})",
            c
        )));
    }
    Ok(())
}

pub(crate) fn validate_corner_angle(theta: f64) -> Result<()> {
    if !(theta > 0.0 && theta <= 180.0) {
        return Err(MeshError::InvalidConfig(format!(
            "corner angle must satisfy 0 < theta <= 180 degrees (got {})",
            theta
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MesherConfigBuilder::new().build().unwrap();
        assert_eq!(config.refine, 0);
        assert_eq!(config.spacing_factor, DEFAULT_SPACING_FACTOR);
        assert_eq!(config.corner_angle, DEFAULT_CORNER_ANGLE);
        assert_eq!(config.separation_factor, DEFAULT_SEPARATION_FACTOR);
        assert_eq!(config.attempts_per_point, 1000);
        assert_eq!(config.lloyd_iterations, 10);
    }

    #[test]
    fn test_builder_custom() {
        let config = MesherConfigBuilder::new()
            .seed(42)
            .refine(3)
            .unwrap()
            .spacing_factor(0.55)
            .unwrap()
            .corner_angle(60.0)
            .unwrap()
            .separation_factor(0.5)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.refine, 3);
        assert_eq!(config.spacing_factor, 0.55);
        assert_eq!(config.corner_angle, 60.0);
        assert_eq!(config.separation_factor, 0.5);
    }

    #[test]
    fn test_spacing_factor_bounds() {
        assert!(MesherConfigBuilder::new().spacing_factor(0.0).is_err());
        assert!(MesherConfigBuilder::new().spacing_factor(1.0).is_err());
        assert!(MesherConfigBuilder::new().spacing_factor(f64::NAN).is_err());
        assert!(MesherConfigBuilder::new().spacing_factor(0.99).is_ok());
    }

    #[test]
    fn test_corner_angle_bounds() {
        assert!(MesherConfigBuilder::new().corner_angle(0.0).is_err());
        assert!(MesherConfigBuilder::new().corner_angle(180.5).is_err());
        assert!(MesherConfigBuilder::new().corner_angle(180.0).is_ok());
    }

    #[test]
    fn test_builder_rejects_excessive_values() {
        assert!(MesherConfigBuilder::new().refine(17).is_err());
        assert!(MesherConfigBuilder::new().lloyd_iterations(1001).is_err());
        assert!(MesherConfigBuilder::new().lloyd_convergence(-0.1).is_err());
        assert!(MesherConfigBuilder::new().attempts_per_point(0).is_err());
        assert!(MesherConfigBuilder::new().separation_factor(0.0).is_err());
    }

    #[test]
    fn test_lloyd_options_follow_config() {
        let config = MesherConfigBuilder::new()
            .seed(1)
            .lloyd_iterations(4)
            .unwrap()
            .lloyd_convergence(0.0)
            .unwrap()
            .build()
            .unwrap();

        let options = config.lloyd_options();
        assert_eq!(options.max_iterations, 4);
        assert_eq!(options.convergence_threshold, 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = MesherConfigBuilder::new().seed(12345).build().unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: MesherConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
