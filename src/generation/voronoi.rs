//! Voronoi diagram construction from a Delaunay triangulation
//!
//! Voronoi vertices are the circumcenters of the inner Delaunay faces. A
//! generator on the convex hull touches the outer face and therefore has an
//! unbounded cell, reported as an empty ring.

use glam::DVec2;
use spade::handles::VoronoiVertex;
use spade::{DelaunayTriangulation, Point2, Triangulation};
use tracing::warn;

/// Relative distance below which consecutive ring vertices are merged
const MERGE_TOLERANCE: f64 = 1e-12;

/// A planar Voronoi diagram
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoronoiDiagram {
    /// Generators the diagram was built from
    pub points: Vec<DVec2>,
    /// Voronoi vertices
    pub vertices: Vec<DVec2>,
    /// Region of each generator; `None` if the generator was rejected
    pub point_region: Vec<Option<usize>>,
    /// Ordered vertex ring of each region; empty for unbounded regions
    pub regions: Vec<Vec<usize>>,
}

impl VoronoiDiagram {
    /// Vertex ring of the cell owning `point`
    ///
    /// Returns `None` when the generator has no region or its region is
    /// unbounded.
    pub fn cell(&self, point: usize) -> Option<&[usize]> {
        let region = self.point_region.get(point).copied().flatten()?;
        let ring = self.regions.get(region)?;
        if ring.is_empty() {
            None
        } else {
            Some(ring)
        }
    }

    /// Whether `point` has a closed cell
    #[inline]
    pub fn is_bounded(&self, point: usize) -> bool {
        self.cell(point).is_some()
    }

    /// Arithmetic mean of the cell's vertices
    ///
    /// This is the vertex average, not the area-weighted centroid.
    pub fn vertex_average(&self, point: usize) -> Option<DVec2> {
        let ring = self.cell(point)?;
        let sum: DVec2 = ring.iter().map(|&v| self.vertices[v]).sum();
        Some(sum / ring.len() as f64)
    }
}

/// Geometry kernel that turns generators into a Voronoi diagram
pub trait VoronoiBuilder {
    /// Build the diagram of `points`; `point_region` follows input order
    fn build(&self, points: &[DVec2]) -> VoronoiDiagram;
}

/// Voronoi diagram as the dual of a `spade` Delaunay triangulation
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunayVoronoi;

impl VoronoiBuilder for DelaunayVoronoi {
    fn build(&self, points: &[DVec2]) -> VoronoiDiagram {
        let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();

        // Duplicate positions resolve to the same vertex and share a region
        let point_region: Vec<Option<usize>> = points
            .iter()
            .enumerate()
            .map(|(i, p)| match triangulation.insert(Point2::new(p.x, p.y)) {
                Ok(handle) => Some(handle.index()),
                Err(err) => {
                    warn!(point = i, error = ?err, "Generator rejected by triangulation");
                    None
                }
            })
            .collect();

        let mut face_vertex: Vec<Option<usize>> = vec![None; triangulation.num_all_faces()];
        let mut vertices = Vec::with_capacity(triangulation.num_inner_faces());
        for face in triangulation.inner_faces() {
            let center = face.circumcenter();
            face_vertex[face.fix().index()] = Some(vertices.len());
            vertices.push(DVec2::new(center.x, center.y));
        }

        let tolerance = MERGE_TOLERANCE * (1.0 + coordinate_scale(points));

        let regions: Vec<Vec<usize>> = triangulation
            .vertices()
            .map(|vertex| {
                let mut ring = Vec::new();
                for edge in vertex.as_voronoi_face().adjacent_edges() {
                    match edge.from() {
                        VoronoiVertex::Inner(face) => match face_vertex[face.fix().index()] {
                            Some(index) => ring.push(index),
                            None => return Vec::new(),
                        },
                        VoronoiVertex::Outer(_) => return Vec::new(),
                    }
                }
                merge_coincident(ring, &vertices, tolerance)
            })
            .collect();

        VoronoiDiagram {
            points: points.to_vec(),
            vertices,
            point_region,
            regions,
        }
    }
}

/// Largest absolute finite coordinate
fn coordinate_scale(points: &[DVec2]) -> f64 {
    points
        .iter()
        .flat_map(|p| [p.x.abs(), p.y.abs()])
        .filter(|c| c.is_finite())
        .fold(0.0, f64::max)
}

/// Drop ring entries that repeat the previous vertex's position
///
/// Co-circular generators produce several Delaunay faces with one
/// circumcenter; they are adjacent in the ring.
fn merge_coincident(ring: Vec<usize>, vertices: &[DVec2], tolerance: f64) -> Vec<usize> {
    let mut merged: Vec<usize> = Vec::with_capacity(ring.len());
    for index in ring {
        if let Some(&last) = merged.last() {
            if vertices[last].distance(vertices[index]) <= tolerance {
                continue;
            }
        }
        merged.push(index);
    }

    while merged.len() > 1 {
        let first = vertices[merged[0]];
        let last = vertices[merged[merged.len() - 1]];
        if first.distance(last) > tolerance {
            break;
        }
        merged.pop();
    }

    merged
}
