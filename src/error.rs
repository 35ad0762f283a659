//! Error types for CVT mesh generation

use glam::DVec2;
use thiserror::Error;

/// Errors that can occur while placing or seeding generators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The half-edge domain description is malformed
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Boundary geometry cannot produce finite generators
    ///
    /// Raised for zero-length boundary edges, vanishing corner bisectors and
    /// radical-line constructions with a negative discriminant.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Rejection sampling ran out of attempts before filling a subdomain
    #[error(
        "insufficient samples in subdomain {subdomain}: accepted {accepted} of {required} after {attempts} attempts"
    )]
    InsufficientSamples {
        /// Subdomain being seeded
        subdomain: i32,
        /// Points accepted before the budget ran out
        accepted: usize,
        /// Points the subdomain needed
        required: usize,
        /// Candidates drawn
        attempts: usize,
    },
}

/// Non-fatal conditions reported alongside a result
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MeshWarning {
    /// A movable generator has no closed Voronoi cell; its position was kept
    #[error("generator {index} at ({}, {}) has an unbounded Voronoi cell", .position.x, .position.y)]
    UnboundedCell {
        /// Index into the movable generator slice
        index: usize,
        /// Position that was retained
        position: DVec2,
    },
}

/// Result type alias for mesh generation
pub type Result<T> = std::result::Result<T, MeshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::DegenerateGeometry("zero-length edge 3".into());
        assert_eq!(format!("{err}"), "degenerate geometry: zero-length edge 3");

        let err = MeshError::InsufficientSamples {
            subdomain: 2,
            accepted: 5,
            required: 10,
            attempts: 10_000,
        };
        let msg = format!("{err}");
        assert!(msg.contains("subdomain 2"));
        assert!(msg.contains("5 of 10"));
    }

    #[test]
    fn test_warning_display() {
        let warning = MeshWarning::UnboundedCell {
            index: 4,
            position: DVec2::new(0.5, -1.0),
        };
        assert!(format!("{warning}").contains("generator 4"));
    }
}
