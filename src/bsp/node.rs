//! BSP tree node data structure

use crate::mesh::plane::{Plane, Split};
use crate::mesh::polygon::Polygon;

/// A node of a partition tree.
///
/// The tree only records splitting planes: it is built once from a snapshot
/// of a stream's polygons and afterwards describes that snapshot's volume,
/// independent of what happens to the stream's buffer. A point is inside the
/// volume when it ends up behind a node that has no back child.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Splitting plane for this node *or* **None** for an empty tree.
    pub plane: Option<Plane>,

    /// Subtree of the *front* half‑space.
    pub front: Option<Box<Node>>,

    /// Subtree of the *back* half‑space.
    pub back: Option<Box<Node>>,
}

impl Node {
    /// Create a new empty BSP node
    pub const fn new() -> Self {
        Self {
            plane: None,
            front: None,
            back: None,
        }
    }

    /// `true` for a tree without any splitting plane. Clipping against it
    /// keeps every polygon.
    pub const fn is_empty(&self) -> bool {
        self.plane.is_none()
    }

    /// Flip every plane and swap front/back subtrees, turning the described
    /// volume inside out.
    pub fn invert(&mut self) {
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            if let Some(ref mut plane) = current.plane {
                plane.flip();
            }
            std::mem::swap(&mut current.front, &mut current.back);
            stack.extend(
                [&mut current.front, &mut current.back]
                    .into_iter()
                    .filter_map(|child| child.as_deref_mut()),
            );
        }
    }

    /// Number of splitting planes in the tree.
    pub fn plane_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            if current.plane.is_some() {
                count += 1;
            }
            stack.extend(
                [&current.front, &current.back]
                    .into_iter()
                    .filter_map(|child| child.as_deref()),
            );
        }
        count
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((current, level)) = stack.pop() {
            deepest = deepest.max(level);
            for child in [&current.front, &current.back].into_iter().flatten() {
                stack.push((&**child, level + 1));
            }
        }
        deepest
    }
}

/// Sort one split result into the front and back lists used while clipping
/// (`keep_coplanar`) or building (coplanar polygons stay at their node and
/// are not passed down).
#[inline]
pub(crate) fn route<S: Clone>(
    split: Split<S>,
    keep_coplanar: bool,
    front: &mut Vec<Polygon<S>>,
    back: &mut Vec<Polygon<S>>,
) {
    match split {
        Split::CoplanarFront(p) if keep_coplanar => front.push(p),
        Split::CoplanarBack(p) if keep_coplanar => back.push(p),
        Split::CoplanarFront(_) | Split::CoplanarBack(_) => {},
        Split::Front(p) => front.push(p),
        Split::Back(p) => back.push(p),
        Split::Spanning { front: f, back: b } => {
            front.extend(f);
            back.extend(b);
        },
    }
}
