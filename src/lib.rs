//! Generator placement for 2D centroidal Voronoi tessellation meshes
//!
//! Given a planar domain split into subdomains, places generator points so
//! that the Voronoi diagram of all generators conforms to the subdomain
//! boundaries: mirrored pairs along every boundary edge, corrected spacing and
//! corner generators at sharp corners, rejection-sampled interior points, and
//! Lloyd relaxation of the interior.
//!
//! # Quick Start
//!
//! ```rust
//! use cvt_mesh::*;
//!
//! let square = HalfEdgeDomain::polygon(
//!     vec![
//!         DVec2::new(0.0, 0.0),
//!         DVec2::new(1.0, 0.0),
//!         DVec2::new(1.0, 1.0),
//!         DVec2::new(0.0, 1.0),
//!     ],
//!     vec![true; 4],
//! )
//! .unwrap();
//!
//! let config = MesherConfigBuilder::new()
//!     .seed(42)
//!     .refine(3)
//!     .unwrap()
//!     .lloyd_iterations(5)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut mesh = CvtMesher::new(square, config).meshing().unwrap();
//! let report = mesh.relax(config.lloyd_options());
//! println!(
//!     "{} fixed, {} movable generators after {} steps",
//!     mesh.fixed_count(),
//!     mesh.movable_count(),
//!     report.iterations
//! );
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration, domains and results
//!
//! Progress is reported through `tracing`; install a subscriber to see it.

// Modules
pub mod error;
pub mod config;
pub mod domain;
pub mod spatial;
pub mod generation;
pub mod mesher;

// Re-export core types for convenience
pub use error::{MeshError, MeshWarning, Result};
pub use config::{MesherConfig, MesherConfigBuilder};
pub use domain::{HalfEdge, HalfEdgeDomain, EXTERIOR};
pub use spatial::SpatialIndex;
pub use generation::{
    relax, relax_with, BoundaryNodes, DelaunayVoronoi, InteriorPoints, InteriorSeeder,
    LloydOptions, LloydStep, VoronoiBuilder, VoronoiDiagram,
};
pub use mesher::{CvtMesh, CvtMesher, RelaxReport};

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
