//! Traits defining BSP tree operations for dependency inversion

use crate::float_types::Real;
use crate::bsp::node::Node;
use crate::mesh::plane::{BACK, COPLANAR, FRONT, Plane};
use crate::mesh::polygon::Polygon;

/// Core BSP operations trait - implements algorithms on BSP nodes
pub trait BspOps<S: Clone> {
    /// Build a partition from the given polygons
    fn build(&self, node: &mut Node, polygons: Vec<Polygon<S>>);

    /// Flip every plane and swap front/back subtrees, turning the described
    /// volume inside out
    fn invert(&self, node: &mut Node);

    /// Remove every part of `polygons` that lies inside the volume of `node`
    fn clip_polygons(&self, node: &Node, polygons: Vec<Polygon<S>>) -> Vec<Polygon<S>>;
}

/// Trait for picking splitting planes
pub trait SplittingPlaneStrategy<S: Clone> {
    /// Pick the best splitting plane from a non-empty set of polygons
    fn pick_best_splitting_plane(&self, polygons: &[Polygon<S>]) -> Plane;
}

/// Default splitting plane strategy using balanced heuristic
#[derive(Debug, Clone, Copy)]
pub struct BalancedSplittingStrategy {
    pub span_weight: Real,
    pub balance_weight: Real,
    pub sample_size: usize,
}

impl Default for BalancedSplittingStrategy {
    fn default() -> Self {
        Self {
            span_weight: 8.0,
            balance_weight: 1.0,
            sample_size: 20,
        }
    }
}

impl<S: Clone> SplittingPlaneStrategy<S> for BalancedSplittingStrategy {
    fn pick_best_splitting_plane(&self, polygons: &[Polygon<S>]) -> Plane {
        let mut best_plane = polygons[0].plane;
        let mut best_score = Real::MAX;

        for candidate in polygons.iter().take(self.sample_size.max(1)) {
            let plane = &candidate.plane;
            let (num_front, num_back, num_spanning) = polygons
                .iter()
                .map(|poly| match plane.classify_polygon(poly) {
                    COPLANAR => (0i64, 0i64, 0i64),
                    FRONT => (1, 0, 0),
                    BACK => (0, 1, 0),
                    _ => (0, 0, 1),
                })
                .fold((0, 0, 0), |acc, x| (acc.0 + x.0, acc.1 + x.1, acc.2 + x.2));

            let score = self.span_weight * num_spanning as Real
                + self.balance_weight * ((num_front - num_back) as Real).abs();

            if score < best_score {
                best_score = score;
                best_plane = *plane;
            }
        }

        best_plane
    }
}
