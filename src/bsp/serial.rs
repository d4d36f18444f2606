//! Serial implementation of BSP operations

use crate::bsp::node::{Node, route};
use crate::bsp::traits::{BalancedSplittingStrategy, BspOps, SplittingPlaneStrategy};
use crate::mesh::polygon::Polygon;

/// Serial implementation of BSP operations.
///
/// All walks use an explicit stack, so tree depth is bounded by the heap and
/// not by the calling thread's stack.
#[derive(Debug, Clone, Default)]
pub struct SerialBspOps<SP = BalancedSplittingStrategy> {
    splitting_strategy: SP,
}

impl SerialBspOps<BalancedSplittingStrategy> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<SP> SerialBspOps<SP> {
    pub const fn with_strategy(strategy: SP) -> Self {
        Self {
            splitting_strategy: strategy,
        }
    }
}

impl<SP: SplittingPlaneStrategy<S>, S: Clone> BspOps<S> for SerialBspOps<SP> {
    fn build(&self, node: &mut Node, polygons: Vec<Polygon<S>>) {
        let mut stack = vec![(node, polygons)];

        while let Some((current, polygons)) = stack.pop() {
            if polygons.is_empty() {
                continue;
            }
            let Node { plane, front, back } = current;
            let plane = *plane.get_or_insert_with(|| {
                self.splitting_strategy.pick_best_splitting_plane(&polygons)
            });

            let mut front_polys = Vec::with_capacity(polygons.len() / 2);
            let mut back_polys = Vec::with_capacity(polygons.len() / 2);
            for polygon in polygons {
                route(plane.split_polygon(polygon), false, &mut front_polys, &mut back_polys);
            }

            if !front_polys.is_empty() {
                let child = front.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((child.as_mut(), front_polys));
            }
            if !back_polys.is_empty() {
                let child = back.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((child.as_mut(), back_polys));
            }
        }
    }

    fn invert(&self, node: &mut Node) {
        node.invert();
    }

    fn clip_polygons(&self, node: &Node, polygons: Vec<Polygon<S>>) -> Vec<Polygon<S>> {
        let mut result = Vec::with_capacity(polygons.len());
        let mut stack = vec![(node, polygons)];

        // Front subtrees are pushed last so they drain first, which keeps the
        // output in the same order a recursive front-then-back walk produces.
        while let Some((current, polygons)) = stack.pop() {
            let Some(plane) = current.plane else {
                result.extend(polygons);
                continue;
            };

            let mut front = Vec::with_capacity(polygons.len());
            let mut back = Vec::with_capacity(polygons.len());
            for polygon in polygons {
                route(plane.split_polygon(polygon), true, &mut front, &mut back);
            }

            // Back parts without a back subtree are inside: drop them.
            if let Some(back_node) = current.back.as_deref() {
                if !back.is_empty() {
                    stack.push((back_node, back));
                }
            }
            match current.front.as_deref() {
                Some(front_node) => stack.push((front_node, front)),
                None => result.extend(front),
            }
        }

        result
    }
}
