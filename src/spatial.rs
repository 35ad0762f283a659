//! Spatial indexing for nearest-generator queries

use glam::DVec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// Static KD-tree over a fixed 2D point set
///
/// Built once per seeding pass over the boundary and corner generators, then
/// queried for every rejection-sampling candidate.
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Query: O(log n)
#[derive(Clone)]
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f64, usize, 2, 32>>,
    len: usize,
}

impl SpatialIndex {
    /// Build an index over `points`; item `i` refers to `points[i]`
    ///
    /// # Example
    ///
    /// ```
    /// use cvt_mesh::*;
    ///
    /// let points = vec![
    ///     DVec2::new(0.0, 0.0),
    ///     DVec2::new(1.0, 0.0),
    ///     DVec2::new(0.0, 1.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&points);
    /// let (distance, nearest) = index.nearest(DVec2::new(0.9, 0.0)).unwrap();
    /// assert_eq!(nearest, 1);
    /// assert!((distance - 0.1).abs() < 1e-12);
    /// ```
    pub fn new(points: &[DVec2]) -> Self {
        if points.is_empty() {
            return Self { tree: None, len: 0 };
        }

        let coords: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();

        Self {
            tree: Some(ImmutableKdTree::new_from_slice(&coords)),
            len: points.len(),
        }
    }

    /// Find the point nearest to `position`
    ///
    /// Returns the Euclidean distance and the index of the nearest point, or
    /// `None` for an empty index.
    pub fn nearest(&self, position: DVec2) -> Option<(f64, usize)> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        Some((result.distance.sqrt(), result.item as usize))
    }

    /// Number of indexed points
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
