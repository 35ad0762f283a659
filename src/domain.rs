//! Half-edge domain representation
//!
//! A polygonal domain stored as an arena of half-edge records addressed by
//! integer index. Each interior subdomain is a counter-clockwise loop, so the
//! subdomain lies to the left of every half-edge. Every edge has a twin; twins
//! on the outside of the domain carry subdomain `0`.

use glam::DVec2;
use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};

/// Subdomain id carried by half-edges on the outside of the domain
pub const EXTERIOR: i32 = 0;

/// A directed boundary edge
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Vertex the half-edge starts at
    pub origin: usize,
    /// Subdomain on the left of the half-edge (`<= 0` is exterior)
    pub subdomain: i32,
    /// Following half-edge around the same subdomain
    pub next: usize,
    /// Preceding half-edge around the same subdomain
    pub prev: usize,
    /// Oppositely directed half-edge on the same edge
    pub twin: usize,
}

/// Polygonal domain with one or more subdomains
///
/// # Example
///
/// ```rust
/// use cvt_mesh::*;
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
/// assert_eq!(square.halfedge_count(), 8);
/// square.boundary_uniform_refine(2);
/// assert_eq!(square.halfedge_count(), 32);
/// assert_eq!(square.area(1), Some(1.0));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HalfEdgeDomain {
    vertices: Vec<DVec2>,
    fixed: Vec<bool>,
    halfedges: Vec<HalfEdge>,
    areas: BTreeMap<i32, f64>,
}

impl HalfEdgeDomain {
    /// Build a single-subdomain domain (id `1`) bounded by a simple polygon
    ///
    /// Clockwise input is re-oriented. `fixed` flags the corners that
    /// should keep sharp features.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDomain` for fewer than 3 vertices, a mismatched
    /// `fixed` length, or a polygon without area.
    pub fn polygon(vertices: Vec<DVec2>, fixed: Vec<bool>) -> Result<Self> {
        let n = vertices.len();
        if n < 3 {
            return Err(MeshError::InvalidDomain(format!(
                "polygon needs at least 3 vertices (got {})",
                n
            )));
        }

        let mut boundary: Vec<usize> = (0..n).collect();
        if signed_area(&vertices, &boundary) < 0.0 {
            boundary.reverse();
        }

        Self::from_faces(vertices, fixed, &[(1, boundary)])
    }

    /// Build a domain from counter-clockwise subdomain loops
    ///
    /// Edges shared by two loops become twin pairs. Edges used by a single
    /// loop get an exterior twin, and the exterior twins are chained along
    /// the outer boundary.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDomain` if a loop is malformed, clockwise or
    /// degenerate, if a directed edge appears twice, or if the outer boundary
    /// passes through a vertex more than once.
    pub fn from_faces(
        vertices: Vec<DVec2>,
        fixed: Vec<bool>,
        faces: &[(i32, Vec<usize>)],
    ) -> Result<Self> {
        if fixed.len() != vertices.len() {
            return Err(MeshError::InvalidDomain(format!(
                "{} fixed flags for {} vertices",
                fixed.len(),
                vertices.len()
            )));
        }

        let mut halfedges: Vec<HalfEdge> = Vec::new();
        let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
        let mut areas: BTreeMap<i32, f64> = BTreeMap::new();

        for (id, boundary) in faces {
            if *id <= EXTERIOR {
                return Err(MeshError::InvalidDomain(format!(
                    "subdomain ids must be positive (got {})",
                    id
                )));
            }
            let m = boundary.len();
            if m < 3 {
                return Err(MeshError::InvalidDomain(format!(
                    "subdomain {} loop has {} vertices",
                    id, m
                )));
            }
            if let Some(&bad) = boundary.iter().find(|&&v| v >= vertices.len()) {
                return Err(MeshError::InvalidDomain(format!(
                    "subdomain {} references vertex {} of {}",
                    id,
                    bad,
                    vertices.len()
                )));
            }

            let area = signed_area(&vertices, boundary);
            if !(area > 0.0) {
                return Err(MeshError::InvalidDomain(format!(
                    "subdomain {} loop must be counter-clockwise with positive area (got {})",
                    id, area
                )));
            }
            *areas.entry(*id).or_insert(0.0) += area;

            let base = halfedges.len();
            for k in 0..m {
                let a = boundary[k];
                let b = boundary[(k + 1) % m];
                if a == b {
                    return Err(MeshError::InvalidDomain(format!(
                        "subdomain {} repeats vertex {} consecutively",
                        id, a
                    )));
                }
                if directed.insert((a, b), base + k).is_some() {
                    return Err(MeshError::InvalidDomain(format!(
                        "directed edge {} -> {} used twice",
                        a, b
                    )));
                }
                halfedges.push(HalfEdge {
                    origin: a,
                    subdomain: *id,
                    next: base + (k + 1) % m,
                    prev: base + (k + m - 1) % m,
                    twin: usize::MAX,
                });
            }
        }

        // Pair shared edges, give the rest exterior twins
        let interior_count = halfedges.len();
        let mut exterior_from: HashMap<usize, usize> = HashMap::new();
        for e in 0..interior_count {
            let a = halfedges[e].origin;
            let b = halfedges[halfedges[e].next].origin;
            if let Some(&t) = directed.get(&(b, a)) {
                halfedges[e].twin = t;
                continue;
            }
            let t = halfedges.len();
            halfedges.push(HalfEdge {
                origin: b,
                subdomain: EXTERIOR,
                next: usize::MAX,
                prev: usize::MAX,
                twin: e,
            });
            halfedges[e].twin = t;
            if exterior_from.insert(b, t).is_some() {
                return Err(MeshError::InvalidDomain(format!(
                    "outer boundary passes through vertex {} more than once",
                    b
                )));
            }
        }

        for t in interior_count..halfedges.len() {
            let target = halfedges[halfedges[t].twin].origin;
            let next = *exterior_from.get(&target).ok_or_else(|| {
                MeshError::InvalidDomain(format!("outer boundary is open at vertex {}", target))
            })?;
            halfedges[t].next = next;
            halfedges[next].prev = t;
        }

        let domain = Self {
            vertices,
            fixed,
            halfedges,
            areas,
        };
        domain.check_topology()?;
        Ok(domain)
    }

    /// Vertex coordinates
    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Half-edge table
    #[inline]
    pub fn halfedges(&self) -> &[HalfEdge] {
        &self.halfedges
    }

    /// Corner flags, one per vertex
    #[inline]
    pub fn fixed(&self) -> &[bool] {
        &self.fixed
    }

    /// Number of vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges, both sides of the boundary included
    #[inline]
    pub fn halfedge_count(&self) -> usize {
        self.halfedges.len()
    }

    /// Vertex a half-edge ends at
    #[inline]
    pub fn target(&self, halfedge: usize) -> usize {
        self.halfedges[self.halfedges[halfedge].next].origin
    }

    /// Area of an interior subdomain
    pub fn area(&self, subdomain: i32) -> Option<f64> {
        self.areas.get(&subdomain).copied()
    }

    /// Areas of all interior subdomains, keyed by id
    #[inline]
    pub fn areas(&self) -> &BTreeMap<i32, f64> {
        &self.areas
    }

    /// Every subdomain id referenced by the half-edge table, exterior included
    pub fn subdomains(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.halfedges.iter().map(|he| he.subdomain).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Bisect every boundary edge `n` times
    ///
    /// Midpoints are appended as new, non-fixed vertices. Each half-edge keeps
    /// its index for the half that starts at its first endpoint.
    pub fn boundary_uniform_refine(&mut self, n: usize) {
        for _ in 0..n {
            self.bisect_edges();
        }
    }

    fn bisect_edges(&mut self) {
        let pairs: Vec<(usize, usize)> = self
            .halfedges
            .iter()
            .enumerate()
            .filter(|(e, he)| he.twin > *e)
            .map(|(e, he)| (e, he.twin))
            .collect();

        for (e, t) in pairs {
            let a = self.halfedges[e].origin;
            let b = self.halfedges[t].origin;
            let mid = self.vertices.len();
            self.vertices.push((self.vertices[a] + self.vertices[b]) * 0.5);
            self.fixed.push(false);

            // e2: mid -> b continues e, t2: mid -> a continues t
            let e2 = self.halfedges.len();
            let t2 = e2 + 1;
            let e_next = self.halfedges[e].next;
            let t_next = self.halfedges[t].next;

            self.halfedges.push(HalfEdge {
                origin: mid,
                subdomain: self.halfedges[e].subdomain,
                next: e_next,
                prev: e,
                twin: t,
            });
            self.halfedges.push(HalfEdge {
                origin: mid,
                subdomain: self.halfedges[t].subdomain,
                next: t_next,
                prev: t,
                twin: e,
            });

            self.halfedges[e_next].prev = e2;
            self.halfedges[t_next].prev = t2;
            self.halfedges[e].next = e2;
            self.halfedges[e].twin = t2;
            self.halfedges[t].next = t2;
            self.halfedges[t].twin = e2;
        }
    }

    /// Verify the half-edge links are mutually consistent
    ///
    /// # Errors
    ///
    /// Returns `InvalidDomain` naming the first inconsistent half-edge.
    pub fn check_topology(&self) -> Result<()> {
        let count = self.halfedges.len();
        for (e, he) in self.halfedges.iter().enumerate() {
            if he.next >= count || he.prev >= count || he.twin >= count {
                return Err(MeshError::InvalidDomain(format!(
                    "half-edge {} links outside the table",
                    e
                )));
            }
            if he.origin >= self.vertices.len() {
                return Err(MeshError::InvalidDomain(format!(
                    "half-edge {} starts at missing vertex {}",
                    e, he.origin
                )));
            }
            if self.halfedges[he.next].prev != e || self.halfedges[he.prev].next != e {
                return Err(MeshError::InvalidDomain(format!(
                    "half-edge {} next/prev links disagree",
                    e
                )));
            }
            if he.twin == e || self.halfedges[he.twin].twin != e {
                return Err(MeshError::InvalidDomain(format!(
                    "half-edge {} twin link is not symmetric",
                    e
                )));
            }
            if self.halfedges[he.twin].origin != self.target(e) {
                return Err(MeshError::InvalidDomain(format!(
                    "half-edge {} twin does not start at its target",
                    e
                )));
            }
        }
        Ok(())
    }
}

/// Shoelace area of a vertex loop, positive when counter-clockwise
fn signed_area(vertices: &[DVec2], boundary: &[usize]) -> f64 {
    let m = boundary.len();
    let twice: f64 = (0..m)
        .map(|k| vertices[boundary[k]].perp_dot(vertices[boundary[(k + 1) % m]]))
        .sum();
    0.5 * twice
}
