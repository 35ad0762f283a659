//! Boundary generator placement
//!
//! Every half-edge gets one generator on its left, equidistant `r0` and `r1`
//! from its endpoints (radical-line construction), so the generators of a
//! half-edge and its twin form a mirrored pair whose Voronoi edge lies on the
//! boundary. Sharp corners get a corrected spacing and one merged generator
//! plus a mirrored corner generator outside the corner.

use glam::DVec2;
use std::f64::consts::{PI, TAU};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{validate_corner_angle, validate_spacing_factor};
use crate::domain::HalfEdgeDomain;
use crate::error::{MeshError, Result};

/// Rounding allowance on the radical-line discriminant
const DISCRIMINANT_TOLERANCE: f64 = 1e-12;

/// Allowance on `cos == -1` for straight corners
const STRAIGHT_TOLERANCE: f64 = 1e-12;

/// Generators placed along the domain boundary
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryNodes {
    /// Boundary generators, one per surviving half-edge slot
    pub generators: Vec<DVec2>,
    /// Mirrored generators outside each sharp corner, aligned with `corner_halfedges`
    pub corner_generators: Vec<DVec2>,
    /// Index into `generators` for every half-edge
    pub halfedge_to_generator: Vec<usize>,
    /// Half-edges ending at a sharp corner
    pub corner_halfedges: Vec<usize>,
    /// Length of every half-edge
    pub edge_lengths: Vec<f64>,
    /// Spacing radius of every vertex after corner correction
    pub radius: Vec<f64>,
}

impl BoundaryNodes {
    /// Reference edge length `h0`: the length of half-edge 0
    pub fn reference_length(&self) -> f64 {
        self.edge_lengths.first().copied().unwrap_or(0.0)
    }

    /// Boundary generators followed by corner generators
    pub fn all_generators(&self) -> Vec<DVec2> {
        let mut all = Vec::with_capacity(self.generators.len() + self.corner_generators.len());
        all.extend_from_slice(&self.generators);
        all.extend_from_slice(&self.corner_generators);
        all
    }

    /// Number of half-edge slots collapsed onto a neighbour
    pub fn merged_count(&self) -> usize {
        self.halfedge_to_generator.len() - self.generators.len()
    }
}

/// Refine the domain, then place its boundary generators
///
/// `spacing_factor` is `c` (`0 < c < 1`), `corner_angle` is `theta` in degrees
/// (`0 < theta <= 180`), and `refine` is the number of uniform bisections.
///
/// # Errors
///
/// Returns `InvalidConfig` for out-of-range parameters and
/// `DegenerateGeometry` when the boundary cannot carry finite generators.
///
/// # Example
///
/// ```rust
/// use cvt_mesh::*;
/// use cvt_mesh::generation::generate_boundary_nodes;
///
/// let mut square = HalfEdgeDomain::polygon(
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
/// let nodes = generate_boundary_nodes(&mut square, 2, 0.618, 100.0).unwrap();
/// assert_eq!(nodes.corner_generators.len(), 4);
/// assert_eq!(nodes.generators.len(), square.halfedge_count() - 4);
/// ```
pub fn generate_boundary_nodes(
    domain: &mut HalfEdgeDomain,
    refine: usize,
    spacing_factor: f64,
    corner_angle: f64,
) -> Result<BoundaryNodes> {
    validate_spacing_factor(spacing_factor)?;
    validate_corner_angle(corner_angle)?;

    domain.boundary_uniform_refine(refine);
    place_boundary_nodes(domain, spacing_factor, corner_angle)
}

/// Place boundary generators on an already refined domain
///
/// # Errors
///
/// See [`generate_boundary_nodes`].
pub fn place_boundary_nodes(
    domain: &HalfEdgeDomain,
    spacing_factor: f64,
    corner_angle: f64,
) -> Result<BoundaryNodes> {
    validate_spacing_factor(spacing_factor)?;
    validate_corner_angle(corner_angle)?;

    info!(
        halfedges = domain.halfedge_count(),
        spacing_factor,
        corner_angle,
        "Placing boundary generators"
    );

    let edge_lengths = compute_edge_lengths(domain)?;
    let averaged = averaged_radius(domain, &edge_lengths, spacing_factor);
    let corners = correct_corners(domain, &averaged, corner_angle)?;

    // Collapse the slot after each sharp corner onto the corner's own slot
    let halfedges = domain.halfedges();
    let mut slot: Vec<usize> = (0..halfedges.len()).collect();
    for &corner in &corners.halfedges {
        slot[halfedges[corner].next] = corner;
    }

    let mut keep = vec![false; halfedges.len()];
    for &s in &slot {
        keep[s] = true;
    }

    let vertices = domain.vertices();
    let mut compact = vec![usize::MAX; halfedges.len()];
    let mut generators = Vec::with_capacity(halfedges.len());
    for (e, he) in halfedges.iter().enumerate() {
        if !keep[e] {
            continue;
        }
        let origin = he.origin;
        let target = domain.target(e);
        let position = radical_point(
            vertices[origin],
            vertices[target],
            corners.radius[origin],
            corners.radius[target],
        )
        .map_err(|reason| {
            MeshError::DegenerateGeometry(format!("half-edge {} ({} -> {}): {}", e, origin, target, reason))
        })?;
        compact[e] = generators.len();
        generators.push(position);
    }

    let halfedge_to_generator: Vec<usize> = slot.iter().map(|&s| compact[s]).collect();

    debug!(
        sharp_corners = corners.halfedges.len(),
        generators = generators.len(),
        "Placed boundary generators"
    );

    Ok(BoundaryNodes {
        generators,
        corner_generators: corners.generators,
        halfedge_to_generator,
        corner_halfedges: corners.halfedges,
        edge_lengths,
        radius: corners.radius,
    })
}

/// Length of every half-edge
fn compute_edge_lengths(domain: &HalfEdgeDomain) -> Result<Vec<f64>> {
    let vertices = domain.vertices();
    domain
        .halfedges()
        .iter()
        .enumerate()
        .map(|(e, he)| {
            let target = domain.target(e);
            let length = vertices[he.origin].distance(vertices[target]);
            if !(length > 0.0) || !length.is_finite() {
                return Err(MeshError::DegenerateGeometry(format!(
                    "half-edge {} from vertex {} to {} has length {}",
                    e, he.origin, target, length
                )));
            }
            Ok(length)
        })
        .collect()
}

/// Mean incident half-edge length per vertex, scaled by `c`
fn averaged_radius(domain: &HalfEdgeDomain, edge_lengths: &[f64], spacing_factor: f64) -> Vec<f64> {
    let mut sum = vec![0.0; domain.vertex_count()];
    let mut count = vec![0usize; domain.vertex_count()];

    for (e, he) in domain.halfedges().iter().enumerate() {
        for v in [he.origin, domain.target(e)] {
            sum[v] += edge_lengths[e];
            count[v] += 1;
        }
    }

    sum.iter()
        .zip(&count)
        .map(|(&s, &n)| if n > 0 { spacing_factor * s / n as f64 } else { 0.0 })
        .collect()
}

struct CornerCorrection {
    radius: Vec<f64>,
    halfedges: Vec<usize>,
    generators: Vec<DVec2>,
}

/// Second radius pass: tighten the neighbours of every sharp corner
///
/// Reads only `averaged`. All overrides of the vertex before each corner are
/// written first, then all overrides of the vertex after it, so a vertex
/// lying between two sharp corners keeps the value from the corner before it.
fn correct_corners(
    domain: &HalfEdgeDomain,
    averaged: &[f64],
    corner_angle: f64,
) -> Result<CornerCorrection> {
    let vertices = domain.vertices();
    let fixed = domain.fixed();
    let halfedges = domain.halfedges();

    let mut corner_halfedges = Vec::new();
    let mut corner_generators = Vec::new();
    let mut previous_overrides = Vec::new();
    let mut following_overrides = Vec::new();

    for (e, he) in halfedges.iter().enumerate() {
        let corner = domain.target(e);
        if !fixed[corner] {
            continue;
        }
        let previous = he.origin;
        let following = domain.target(he.next);

        let at = vertices[corner];
        let v0 = vertices[following] - at;
        let v1 = vertices[previous] - at;
        if !(interior_angle_degrees(v0, v1) < corner_angle) {
            continue;
        }

        let bisector = (v0 + v1).try_normalize().ok_or_else(|| {
            MeshError::DegenerateGeometry(format!("corner at vertex {} has no bisector", corner))
        })?;
        let offset = bisector * averaged[corner];
        let inner = at + offset;

        previous_overrides.push((previous, inner.distance(vertices[previous])));
        following_overrides.push((following, inner.distance(vertices[following])));

        corner_halfedges.push(e);
        corner_generators.push(at - offset);
    }

    let mut radius = averaged.to_vec();
    for &(v, r) in previous_overrides.iter().chain(&following_overrides) {
        radius[v] = r;
    }

    Ok(CornerCorrection {
        radius,
        halfedges: corner_halfedges,
        generators: corner_generators,
    })
}

/// Angle at a corner from the outgoing edge `v0` to the incoming edge `v1`,
/// in degrees
///
/// `asin` of the normalized cross product, lifted into `[0, 360)` when
/// negative; a straight corner reads exactly 180.
pub fn interior_angle_degrees(v0: DVec2, v1: DVec2) -> f64 {
    let norm = v0.length() * v1.length();
    let sin = (v0.perp_dot(v1) / norm).clamp(-1.0, 1.0);
    let cos = v0.dot(v1) / norm;

    let mut angle = sin.asin();
    if sin < 0.0 {
        angle += TAU;
    }
    if (cos + 1.0).abs() <= STRAIGHT_TOLERANCE {
        angle = PI;
    }
    angle.to_degrees()
}

/// Point left of `p0 -> p1` at distance `r0` from `p0` and `r1` from `p1`
fn radical_point(p0: DVec2, p1: DVec2, r0: f64, r1: f64) -> std::result::Result<DVec2, String> {
    let v = p1 - p0;
    let h2 = v.length_squared();
    let center = (p0 + p1) * 0.5;

    let difference = r0 * r0 - r1 * r1;
    let c0 = 0.5 * difference / h2;
    let discriminant = 2.0 * (r0 * r0 + r1 * r1) / h2 - difference * difference / (h2 * h2) - 1.0;
    if discriminant < -DISCRIMINANT_TOLERANCE || discriminant.is_nan() {
        return Err(format!(
            "radii {} and {} cannot meet over length {} (discriminant {})",
            r0,
            r1,
            h2.sqrt(),
            discriminant
        ));
    }
    let c1 = 0.5 * discriminant.max(0.0).sqrt();

    Ok(center + c0 * v + c1 * v.perp())
}
