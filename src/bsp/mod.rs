//! Binary Space Partitioning (BSP) trees
//!
//! The algorithms live behind [`BspOps`] so that serial and parallel
//! implementations can be swapped with the `parallel` feature; the inherent
//! methods on [`Node`] pick the implementation the crate was built with.

pub mod node;
pub mod traits;

pub mod serial;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use node::Node;
pub use traits::{BalancedSplittingStrategy, BspOps, SplittingPlaneStrategy};

pub use serial::SerialBspOps;

#[cfg(feature = "parallel")]
pub use parallel::ParallelBspOps;

use crate::mesh::polygon::Polygon;

#[cfg(not(feature = "parallel"))]
type DefaultOps = SerialBspOps;

#[cfg(feature = "parallel")]
type DefaultOps = ParallelBspOps;

impl Node {
    /// Builds a partition describing the volume bounded by `polygons`
    pub fn from_polygons<S: Clone + Send + Sync>(polygons: Vec<Polygon<S>>) -> Self {
        let mut node = Self::new();
        if !polygons.is_empty() {
            DefaultOps::new().build(&mut node, polygons);
        }
        node
    }

    /// Remove every part of `polygons` that lies inside this tree's volume
    pub fn clip_polygons<S: Clone + Send + Sync>(&self, polygons: Vec<Polygon<S>>) -> Vec<Polygon<S>> {
        if polygons.is_empty() {
            return polygons;
        }
        DefaultOps::new().clip_polygons(self, polygons)
    }
}
