//! CvtMesher entry point and the generator set it produces

use glam::DVec2;
use std::time::Instant;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::MesherConfig;
use crate::domain::HalfEdgeDomain;
use crate::error::Result;
use crate::generation::{relax, seed_generators, BoundaryNodes, InteriorPoints, LloydOptions, LloydStep};

/// Places CVT generators on a half-edge domain
///
/// # Examples
///
/// ```
/// use cvt_mesh::*;
///
/// let square = HalfEdgeDomain::polygon(
///     vec![
///         DVec2::new(0.0, 0.0),
///         DVec2::new(1.0, 0.0),
///         DVec2::new(1.0, 1.0),
///         DVec2::new(0.0, 1.0),
///     ],
///     vec![true; 4],
/// )
/// .unwrap();
///
/// let config = MesherConfigBuilder::new()
///     .seed(42)
///     .refine(3)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let mesher = CvtMesher::new(square, config);
/// let mut mesh = mesher.meshing().unwrap();
/// assert_eq!(mesh.boundary().corner_generators.len(), 4);
///
/// let report = mesh.relax(config.lloyd_options());
/// assert_eq!(report.unbounded_cells, 0);
/// ```
#[derive(Debug, Clone)]
pub struct CvtMesher {
    domain: HalfEdgeDomain,
    config: MesherConfig,
}

impl CvtMesher {
    pub fn new(domain: HalfEdgeDomain, config: MesherConfig) -> Self {
        Self { domain, config }
    }

    /// The unrefined input domain
    #[inline]
    pub fn domain(&self) -> &HalfEdgeDomain {
        &self.domain
    }

    #[inline]
    pub fn config(&self) -> &MesherConfig {
        &self.config
    }

    /// Refine a copy of the domain, then place boundary and interior generators
    ///
    /// The input domain is left untouched, so repeated calls give identical
    /// results.
    ///
    /// # Errors
    ///
    /// Propagates `DegenerateGeometry` from boundary placement and
    /// `InsufficientSamples` from interior seeding.
    pub fn meshing(&self) -> Result<CvtMesh> {
        let start = Instant::now();
        let mut domain = self.domain.clone();
        let (boundary, interior) = seed_generators(&mut domain, &self.config)?;

        let mesh = CvtMesh {
            domain,
            boundary,
            interior,
        };
        info!(
            seed = self.config.seed,
            fixed = mesh.fixed_count(),
            movable = mesh.movable_count(),
            elapsed = ?start.elapsed(),
            "Meshing finished"
        );
        Ok(mesh)
    }
}

/// Result of a relaxation run
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxReport {
    /// Steps actually run
    pub iterations: usize,
    /// Error of the last step; 0.0 when no step ran
    pub error: f64,
    /// Whether the run stopped below the convergence threshold
    pub converged: bool,
    /// Unbounded cells reported by the last step
    pub unbounded_cells: usize,
}

/// Boundary and interior generators of a refined domain
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CvtMesh {
    domain: HalfEdgeDomain,
    boundary: BoundaryNodes,
    interior: InteriorPoints,
}

impl CvtMesh {
    /// The refined domain the generators were placed on
    #[inline]
    pub fn domain(&self) -> &HalfEdgeDomain {
        &self.domain
    }

    #[inline]
    pub fn boundary(&self) -> &BoundaryNodes {
        &self.boundary
    }

    /// Interior generators per subdomain
    #[inline]
    pub fn interior(&self) -> &InteriorPoints {
        &self.interior
    }

    /// Boundary generators followed by corner generators
    pub fn fixed_generators(&self) -> Vec<DVec2> {
        self.boundary.all_generators()
    }

    /// Interior generators of all subdomains, in ascending subdomain order
    pub fn movable_generators(&self) -> Vec<DVec2> {
        self.interior.values().flatten().copied().collect()
    }

    pub fn fixed_count(&self) -> usize {
        self.boundary.generators.len() + self.boundary.corner_generators.len()
    }

    pub fn movable_count(&self) -> usize {
        self.interior.values().map(Vec::len).sum()
    }

    /// Run one Lloyd step and store the moved interior generators
    pub fn lloyd_step(&mut self) -> LloydStep {
        let step = relax(&self.fixed_generators(), &self.movable_generators());

        let mut moved = step.points.iter().copied();
        for points in self.interior.values_mut() {
            for (point, new) in points.iter_mut().zip(&mut moved) {
                *point = new;
            }
        }

        step
    }

    /// Run Lloyd steps until convergence or `options.max_iterations`
    ///
    /// Convergence means a step error below `convergence_threshold * h0`;
    /// a threshold of 0.0 runs every iteration.
    pub fn relax(&mut self, options: LloydOptions) -> RelaxReport {
        let threshold = options.convergence_threshold * self.boundary.reference_length();
        let start = Instant::now();

        info!(
            movable = self.movable_count(),
            max_iterations = options.max_iterations,
            threshold,
            "Starting relaxation"
        );

        let mut report = RelaxReport {
            iterations: 0,
            error: 0.0,
            converged: false,
            unbounded_cells: 0,
        };

        for iteration in 0..options.max_iterations {
            let step_start = Instant::now();
            let step = self.lloyd_step();

            report.iterations = iteration + 1;
            report.error = step.error;
            report.unbounded_cells = step.warnings.len();

            debug!(
                iteration = iteration + 1,
                error = step.error,
                unbounded = step.warnings.len(),
                elapsed = ?step_start.elapsed(),
                "Relaxation step"
            );

            if threshold > 0.0 && step.error < threshold {
                report.converged = true;
                break;
            }
        }

        info!(
            iterations = report.iterations,
            error = report.error,
            converged = report.converged,
            elapsed = ?start.elapsed(),
            "Relaxation finished"
        );

        report
    }
}
