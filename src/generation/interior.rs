//! Interior generator seeding by rejection sampling
//!
//! Candidates are drawn uniformly in the bounding box of a subdomain's
//! boundary generators and kept only when they are far enough from every
//! boundary generator and the nearest one belongs to the same subdomain.

use glam::DVec2;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::{MesherConfig, DEFAULT_SEPARATION_FACTOR};
use crate::domain::{HalfEdgeDomain, EXTERIOR};
use crate::error::{MeshError, Result};
use crate::generation::boundary::BoundaryNodes;
use crate::spatial::SpatialIndex;

/// Interior generators of each subdomain, keyed by subdomain id
///
/// Iteration order follows the ids and carries no meaning beyond determinism.
pub type InteriorPoints = BTreeMap<i32, Vec<DVec2>>;

/// Area of one ideal hexagonal CVT cell for boundary spacing `h0`
pub fn characteristic_area(h0: f64) -> f64 {
    6.0 * (3.0 * (h0 / 2.0) * (h0 / 4.0).powi(3) / 2.0).sqrt()
}

/// Subdomain label of every generator in [`BoundaryNodes::all_generators`] order
///
/// Boundary generators take the subdomain of the half-edges mapped onto
/// them (the last one in table order wins). Corner generators sit outside
/// their corner and take the subdomain across the corner's incoming edge.
pub fn generator_subdomains(domain: &HalfEdgeDomain, nodes: &BoundaryNodes) -> Vec<i32> {
    let halfedges = domain.halfedges();
    let mut labels = vec![EXTERIOR; nodes.generators.len()];
    for (e, &g) in nodes.halfedge_to_generator.iter().enumerate() {
        labels[g] = halfedges[e].subdomain;
    }
    labels.extend(
        nodes
            .corner_halfedges
            .iter()
            .map(|&e| halfedges[halfedges[e].twin].subdomain),
    );
    labels
}

/// Rejection sampler for interior generators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteriorSeeder {
    /// Minimum distance to boundary generators, as a fraction of `h0`
    pub separation_factor: f64,
    /// Candidates allowed per required point before giving up
    pub attempts_per_point: usize,
}

impl Default for InteriorSeeder {
    fn default() -> Self {
        Self {
            separation_factor: DEFAULT_SEPARATION_FACTOR,
            attempts_per_point: 1000,
        }
    }
}

impl InteriorSeeder {
    /// Seeder using the sampling parameters of `config`
    pub fn from_config(config: &MesherConfig) -> Self {
        Self {
            separation_factor: config.separation_factor,
            attempts_per_point: config.attempts_per_point,
        }
    }

    /// Seed every interior subdomain
    ///
    /// Each subdomain receives `floor(area / c_area)` generators in total,
    /// counting its boundary generators, where `c_area` is
    /// [`characteristic_area`] of the reference edge length.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientSamples` when a subdomain exhausts its attempt
    /// budget.
    pub fn seed<R: Rng + ?Sized>(
        &self,
        domain: &HalfEdgeDomain,
        nodes: &BoundaryNodes,
        rng: &mut R,
    ) -> Result<InteriorPoints> {
        let labels = generator_subdomains(domain, nodes);
        let index = SpatialIndex::new(&nodes.all_generators());

        let h0 = nodes.reference_length();
        let cell_area = characteristic_area(h0);
        let min_distance = self.separation_factor * h0;

        info!(
            subdomains = domain.areas().len(),
            reference_length = h0,
            min_distance,
            "Seeding interior generators"
        );

        let mut interior = InteriorPoints::new();
        for (&id, &area) in domain.areas().iter().filter(|&(&id, _)| id > EXTERIOR) {
            let owned: Vec<DVec2> = nodes
                .generators
                .iter()
                .zip(&labels)
                .filter(|&(_, &label)| label == id)
                .map(|(&g, _)| g)
                .collect();
            if owned.is_empty() {
                interior.insert(id, Vec::new());
                continue;
            }

            let min = owned.iter().copied().fold(DVec2::INFINITY, DVec2::min);
            let max = owned.iter().copied().fold(DVec2::NEG_INFINITY, DVec2::max);

            let target = (area / cell_area).floor() as usize;
            let required = target.saturating_sub(owned.len());

            let budget = required.saturating_mul(self.attempts_per_point);
            let mut points = Vec::with_capacity(required);
            let mut attempts = 0usize;
            while points.len() < required {
                if attempts >= budget {
                    return Err(MeshError::InsufficientSamples {
                        subdomain: id,
                        accepted: points.len(),
                        required,
                        attempts,
                    });
                }
                attempts += 1;

                let candidate = min + DVec2::new(rng.gen::<f64>(), rng.gen::<f64>()) * (max - min);
                let Some((distance, nearest)) = index.nearest(candidate) else {
                    break;
                };
                if distance > min_distance && labels[nearest] == id {
                    points.push(candidate);
                }
            }

            debug!(
                subdomain = id,
                boundary = owned.len(),
                seeded = points.len(),
                attempts,
                "Seeded subdomain"
            );
            interior.insert(id, points);
        }

        Ok(interior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::boundary::generate_boundary_nodes;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn square(refine: usize) -> (HalfEdgeDomain, BoundaryNodes) {
        let mut domain = HalfEdgeDomain::polygon(
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ],
            vec![true; 4],
        )
        .unwrap();
        let nodes = generate_boundary_nodes(&mut domain, refine, 0.618, 100.0).unwrap();
        (domain, nodes)
    }

    fn split_rectangle(refine: usize) -> (HalfEdgeDomain, BoundaryNodes) {
        let mut domain = HalfEdgeDomain::from_faces(
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(2.0, 0.0),
                DVec2::new(2.0, 1.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ],
            vec![true; 6],
            &[(1, vec![0, 1, 4, 5]), (2, vec![1, 2, 3, 4])],
        )
        .unwrap();
        let nodes = generate_boundary_nodes(&mut domain, refine, 0.618, 100.0).unwrap();
        (domain, nodes)
    }

    /// Brute-force nearest generator
    fn nearest(all: &[DVec2], p: DVec2) -> (f64, usize) {
        all.iter()
            .enumerate()
            .map(|(i, g)| (g.distance(p), i))
            .fold((f64::INFINITY, 0), |best, cur| if cur.0 < best.0 { cur } else { best })
    }

    #[test]
    fn test_characteristic_area() {
        assert_relative_eq!(characteristic_area(1.0), 6.0 * (3.0f64 / 256.0).sqrt());
        assert_relative_eq!(characteristic_area(0.5), characteristic_area(1.0) / 4.0, max_relative = 1e-12);
    }

    #[test]
    fn test_square_seeding_fills_quota() {
        let (domain, nodes) = square(3);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let interior = InteriorSeeder::default().seed(&domain, &nodes, &mut rng).unwrap();

        assert_eq!(interior.keys().copied().collect::<Vec<_>>(), vec![1]);

        let labels = generator_subdomains(&domain, &nodes);
        let boundary_count = nodes
            .generators
            .iter()
            .zip(&labels)
            .filter(|&(_, &l)| l == 1)
            .count();
        let target = (1.0 / characteristic_area(nodes.reference_length())).floor() as usize;
        assert_eq!(interior[&1].len(), target - boundary_count);
    }

    #[test]
    fn test_seeded_points_respect_separation_and_membership() {
        let (domain, nodes) = split_rectangle(3);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let interior = InteriorSeeder::default().seed(&domain, &nodes, &mut rng).unwrap();

        let all = nodes.all_generators();
        let labels = generator_subdomains(&domain, &nodes);
        let threshold = 0.7 * nodes.reference_length();

        assert_eq!(interior.len(), 2);
        for (&id, points) in &interior {
            assert!(!points.is_empty());
            for &p in points {
                let (distance, index) = nearest(&all, p);
                assert!(distance > threshold, "point {:?} too close ({})", p, distance);
                assert_eq!(labels[index], id);
                if id == 1 {
                    assert!(p.x > 0.0 && p.x < 1.0);
                } else {
                    assert!(p.x > 1.0 && p.x < 2.0);
                }
                assert!(p.y > 0.0 && p.y < 1.0);
            }
        }
    }

    #[test]
    fn test_generator_labels() {
        let (domain, nodes) = split_rectangle(2);
        let labels = generator_subdomains(&domain, &nodes);

        assert_eq!(labels.len(), nodes.generators.len() + nodes.corner_generators.len());
        // Both subdomains have four right-angle corners
        assert_eq!(nodes.corner_generators.len(), 8);
        assert_eq!(nodes.generators.len(), domain.halfedge_count() - 8);

        for (e, he) in domain.halfedges().iter().enumerate() {
            assert_eq!(labels[nodes.halfedge_to_generator[e]], he.subdomain);
        }
    }

    #[test]
    fn test_corner_generator_labels_follow_twin() {
        // L-shape with one concave corner at (1, 1)
        let mut domain = HalfEdgeDomain::polygon(
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(2.0, 0.0),
                DVec2::new(2.0, 1.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(1.0, 2.0),
                DVec2::new(0.0, 2.0),
            ],
            vec![true; 6],
        )
        .unwrap();
        let nodes = generate_boundary_nodes(&mut domain, 2, 0.618, 100.0).unwrap();
        let labels = generator_subdomains(&domain, &nodes);
        let halfedges = domain.halfedges();
        let nb = nodes.generators.len();

        assert_eq!(nodes.corner_halfedges.len(), 6);
        for (k, &e) in nodes.corner_halfedges.iter().enumerate() {
            assert_eq!(labels[nb + k], halfedges[halfedges[e].twin].subdomain);

            let corner = domain.vertices()[domain.target(e)];
            let generator = nodes.corner_generators[k];
            if corner == DVec2::new(1.0, 1.0) {
                // The mirrored point lands inside the L
                assert_eq!(halfedges[e].subdomain, EXTERIOR);
                assert_eq!(labels[nb + k], 1);
                assert!(generator.x < 1.0 && generator.y < 1.0 && generator.x > 0.0 && generator.y > 0.0);
            } else {
                assert_eq!(labels[nb + k], EXTERIOR);
            }
        }
    }

    #[test]
    fn test_seeding_is_deterministic() {
        let (domain, nodes) = square(3);
        let seeder = InteriorSeeder::default();

        let first = seeder
            .seed(&domain, &nodes, &mut ChaCha8Rng::seed_from_u64(99))
            .unwrap();
        let second = seeder
            .seed(&domain, &nodes, &mut ChaCha8Rng::seed_from_u64(99))
            .unwrap();
        let other = seeder
            .seed(&domain, &nodes, &mut ChaCha8Rng::seed_from_u64(100))
            .unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_exhausted_budget_fails() {
        let (domain, nodes) = square(3);
        let seeder = InteriorSeeder {
            separation_factor: 100.0,
            attempts_per_point: 5,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        match seeder.seed(&domain, &nodes, &mut rng) {
            Err(MeshError::InsufficientSamples {
                subdomain,
                accepted,
                required,
                attempts,
            }) => {
                assert_eq!(subdomain, 1);
                assert_eq!(accepted, 0);
                assert!(required > 0);
                assert_eq!(attempts, required * 5);
            }
            other => panic!("expected InsufficientSamples, got {:?}", other),
        }
    }
}
