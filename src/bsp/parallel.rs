//! Parallel implementation of BSP operations

use rayon::prelude::*;

use crate::bsp::node::{Node, route};
use crate::bsp::traits::{BalancedSplittingStrategy, BspOps, SplittingPlaneStrategy};
use crate::mesh::plane::Plane;
use crate::mesh::polygon::Polygon;

/// Parallel implementation of BSP operations.
///
/// Splitting at each node runs on rayon's pool and the front and back
/// subtrees of a clip are walked with `rayon::join`.
#[derive(Debug, Clone, Default)]
pub struct ParallelBspOps<SP = BalancedSplittingStrategy> {
    splitting_strategy: SP,
}

impl ParallelBspOps<BalancedSplittingStrategy> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<SP> ParallelBspOps<SP> {
    pub const fn with_strategy(strategy: SP) -> Self {
        Self {
            splitting_strategy: strategy,
        }
    }
}

fn split_all<S: Clone + Send + Sync>(
    plane: &Plane,
    polygons: Vec<Polygon<S>>,
    keep_coplanar: bool,
) -> (Vec<Polygon<S>>, Vec<Polygon<S>>) {
    polygons
        .into_par_iter()
        .fold(
            || (Vec::new(), Vec::new()),
            |(mut front, mut back), polygon| {
                route(plane.split_polygon(polygon), keep_coplanar, &mut front, &mut back);
                (front, back)
            },
        )
        .reduce(
            || (Vec::new(), Vec::new()),
            |mut acc, x| {
                acc.0.extend(x.0);
                acc.1.extend(x.1);
                acc
            },
        )
}

impl<SP, S> BspOps<S> for ParallelBspOps<SP>
where
    SP: SplittingPlaneStrategy<S> + Sync,
    S: Clone + Send + Sync,
{
    fn build(&self, node: &mut Node, polygons: Vec<Polygon<S>>) {
        if polygons.is_empty() {
            return;
        }
        let plane = *node.plane.get_or_insert_with(|| {
            self.splitting_strategy.pick_best_splitting_plane(&polygons)
        });
        let (front, back) = split_all(&plane, polygons, false);

        let Node {
            front: front_slot,
            back: back_slot,
            ..
        } = node;
        rayon::join(
            || {
                if !front.is_empty() {
                    let child = front_slot.get_or_insert_with(|| Box::new(Node::new()));
                    self.build(child, front);
                }
            },
            || {
                if !back.is_empty() {
                    let child = back_slot.get_or_insert_with(|| Box::new(Node::new()));
                    self.build(child, back);
                }
            },
        );
    }

    fn invert(&self, node: &mut Node) {
        node.invert();
    }

    fn clip_polygons(&self, node: &Node, polygons: Vec<Polygon<S>>) -> Vec<Polygon<S>> {
        let Some(plane) = node.plane else {
            return polygons;
        };
        let (front, back) = split_all(&plane, polygons, true);

        let (mut result, kept_back) = rayon::join(
            || match node.front.as_deref() {
                Some(front_node) => self.clip_polygons(front_node, front),
                None => front,
            },
            || match node.back.as_deref() {
                Some(back_node) if !back.is_empty() => self.clip_polygons(back_node, back),
                _ => Vec::new(),
            },
        );
        result.extend(kept_back);
        result
    }
}
