//! Lloyd relaxation of interior generators
//!
//! One relaxation step moves every movable generator to the vertex average of
//! its Voronoi cell in the diagram of all generators. Fixed generators take
//! part in the diagram but never move. Iterating until convergence is left to
//! the caller, see [`crate::CvtMesh::relax`].

use glam::DVec2;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MeshWarning;
use crate::generation::voronoi::{DelaunayVoronoi, VoronoiBuilder};

/// Options for driving repeated Lloyd steps
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Maximum number of steps to run
    pub max_iterations: usize,
    /// Stop once the step error drops below this value times `h0`
    /// Set to 0.0 to disable early termination
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            convergence_threshold: 0.01,
        }
    }
}

/// Outcome of a single Lloyd step
#[derive(Debug, Clone, PartialEq)]
pub struct LloydStep {
    /// New movable positions, same length and order as the input
    pub points: Vec<DVec2>,
    /// Sum of the displacement lengths
    pub error: f64,
    /// Generators whose cell was unbounded and did not move
    pub warnings: Vec<MeshWarning>,
}

/// Run one Lloyd step with the default Delaunay-based Voronoi kernel
///
/// # Example
///
/// ```
/// use cvt_mesh::*;
///
/// let ring: Vec<DVec2> = (0..8)
///     .map(|k| {
///         let angle = k as f64 * std::f64::consts::FRAC_PI_4;
///         DVec2::new(angle.cos(), angle.sin())
///     })
///     .collect();
///
/// let step = relax(&ring, &[DVec2::new(0.2, 0.0)]);
/// assert!(step.points[0].length() < 0.2);
/// assert!(step.warnings.is_empty());
/// ```
pub fn relax(fixed: &[DVec2], movable: &[DVec2]) -> LloydStep {
    relax_with(&DelaunayVoronoi, fixed, movable)
}

/// Run one Lloyd step with a custom Voronoi kernel
pub fn relax_with<B: VoronoiBuilder + ?Sized>(
    builder: &B,
    fixed: &[DVec2],
    movable: &[DVec2],
) -> LloydStep {
    let mut generators = Vec::with_capacity(fixed.len() + movable.len());
    generators.extend_from_slice(fixed);
    generators.extend_from_slice(movable);

    let diagram = builder.build(&generators);

    let mut warnings = Vec::new();
    let mut error = 0.0;
    let points: Vec<DVec2> = movable
        .iter()
        .enumerate()
        .map(|(index, &old)| match diagram.vertex_average(fixed.len() + index) {
            Some(new) => {
                error += old.distance(new);
                new
            }
            None => {
                warn!(index, x = old.x, y = old.y, "Unbounded Voronoi cell, generator kept in place");
                warnings.push(MeshWarning::UnboundedCell { index, position: old });
                old
            }
        })
        .collect();

    debug!(
        fixed = fixed.len(),
        movable = movable.len(),
        error,
        unbounded = warnings.len(),
        "Lloyd step"
    );

    LloydStep {
        points,
        error,
        warnings,
    }
}
