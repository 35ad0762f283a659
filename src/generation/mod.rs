//! Generator placement and relaxation
//!
//! Boundary generators are placed along the refined domain boundary, interior
//! generators are seeded by rejection sampling, and Lloyd steps move the
//! interior generators toward their Voronoi cell averages.

pub mod boundary;
pub mod interior;
pub mod lloyd;
pub mod voronoi;

pub use boundary::{generate_boundary_nodes, interior_angle_degrees, place_boundary_nodes, BoundaryNodes};
pub use interior::{characteristic_area, generator_subdomains, InteriorPoints, InteriorSeeder};
pub use lloyd::{relax, relax_with, LloydOptions, LloydStep};
pub use voronoi::{DelaunayVoronoi, VoronoiBuilder, VoronoiDiagram};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::MesherConfig;
use crate::domain::HalfEdgeDomain;
use crate::error::Result;

/// Refine `domain`, place its boundary generators and seed its interior
///
/// The interior is seeded from a `ChaCha8Rng` keyed by `config.seed`, so equal
/// inputs give equal generators.
pub fn seed_generators(
    domain: &mut HalfEdgeDomain,
    config: &MesherConfig,
) -> Result<(BoundaryNodes, InteriorPoints)> {
    let boundary = generate_boundary_nodes(
        domain,
        config.refine,
        config.spacing_factor,
        config.corner_angle,
    )?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed as u64);
    let interior = InteriorSeeder::from_config(config).seed(domain, &boundary, &mut rng)?;

    Ok((boundary, interior))
}
