//! Polygon stream carrying a spatial partition, the working buffer of the
//! boolean operations.

use std::mem;
use std::sync::OnceLock;

use crate::bsp::Node;
use crate::errors::StreamError;
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::float_types::tolerance;
use crate::mesh::polygon::Polygon;
use crate::stream::pool::Recycle;
use crate::stream::recombine;
use crate::stream::{ReadablePolyStream, WritablePolyStream};

/// Lifecycle of a [`CsgPolyStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Accepting appends; no partition exists yet
    Building,
    /// Partition built; appends are rejected until the stream is recycled
    Sealed,
}

/// An append-only polygon buffer that can describe the volume it bounds.
///
/// The first call to [`intersects_with`](Self::intersects_with),
/// [`clip_to`](Self::clip_to) or [`invert`](Self::invert) seals the stream:
/// a partition tree is built from a snapshot of the polygons appended so
/// far. The partition then keeps describing that volume while the buffer is
/// clipped, which is what lets two streams be clipped against each other in
/// turn.
#[derive(Debug)]
pub struct CsgPolyStream<S: Clone> {
    polygons: Vec<Polygon<S>>,
    bounds: Aabb,
    partition: OnceLock<Node>,
}

impl<S: Clone> Default for CsgPolyStream<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> Clone for CsgPolyStream<S> {
    fn clone(&self) -> Self {
        let partition = OnceLock::new();
        if let Some(node) = self.partition.get() {
            let _ = partition.set(node.clone());
        }
        Self {
            polygons: self.polygons.clone(),
            bounds: self.bounds,
            partition,
        }
    }
}

impl<S: Clone> CsgPolyStream<S> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            polygons: Vec::with_capacity(capacity),
            bounds: Aabb::new_invalid(),
            partition: OnceLock::new(),
        }
    }

    pub fn state(&self) -> StreamState {
        if self.partition.get().is_some() {
            StreamState::Sealed
        } else {
            StreamState::Building
        }
    }

    /// Bounds of everything ever appended. Clipping never shrinks them, so
    /// they stay conservative. Invalid (`mins > maxs`) for an empty stream.
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Append while still building; used to fill freshly claimed streams.
    pub(crate) fn extend_unsealed<I: IntoIterator<Item = Polygon<S>>>(&mut self, polygons: I) {
        debug_assert_eq!(self.state(), StreamState::Building);
        for polygon in polygons {
            self.push(polygon);
        }
    }

    fn push(&mut self, polygon: Polygon<S>) {
        for v in &polygon.vertices {
            self.bounds.take_point(v.pos);
        }
        self.polygons.push(polygon);
    }

    pub fn into_polygons(self) -> Vec<Polygon<S>> {
        self.polygons
    }
}

impl<S: Clone + Send + Sync> CsgPolyStream<S> {
    /// The partition of this stream's volume, built on first use.
    pub fn partition(&self) -> &Node {
        self.partition
            .get_or_init(|| Node::from_polygons(self.polygons.clone()))
    }

    /// Stop accepting appends and build the partition.
    pub fn seal(&self) {
        self.partition();
    }

    /// Conservative overlap test between `polygon` and this stream's
    /// volume: `false` guarantees that no part of the volume touches the
    /// polygon, `true` only means that it might. Seals the stream.
    pub fn intersects_with(&self, polygon: &Polygon<S>) -> bool {
        self.seal();
        self.bounds
            .loosened(tolerance())
            .intersects(&polygon.bounding_box())
    }

    /// Replace the buffer with the parts of its polygons that lie outside
    /// `other`'s volume. Coplanar polygons facing the same way as a
    /// splitting plane count as outside. This stream's own partition is not
    /// changed. Seals both streams.
    pub fn clip_to(&mut self, other: &CsgPolyStream<S>) {
        self.seal();
        let polygons = mem::take(&mut self.polygons);
        self.polygons = other.partition().clip_polygons(polygons);
    }

    /// Turn the described volume inside out: every polygon and every
    /// partition plane is flipped. Inverting twice restores the stream
    /// exactly. Seals the stream.
    pub fn invert(&mut self) {
        self.seal();
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(node) = self.partition.get_mut() {
            node.invert();
        }
    }
}

impl<S: Clone + PartialEq> CsgPolyStream<S> {
    /// Merge this stream's fragments back into larger polygons and append
    /// them to `output`. Returns the number of polygons written.
    pub fn output_recombined_quads<W: WritablePolyStream<S> + ?Sized>(
        &self,
        output: &mut W,
    ) -> Result<usize, StreamError> {
        recombine::output_recombined([self], output)
    }
}

impl<S: Clone> ReadablePolyStream<S> for CsgPolyStream<S> {
    fn as_slice(&self) -> &[Polygon<S>] {
        &self.polygons
    }
}

impl<S: Clone> WritablePolyStream<S> for CsgPolyStream<S> {
    fn append(&mut self, polygon: Polygon<S>) -> Result<(), StreamError> {
        if self.partition.get().is_some() {
            return Err(StreamError::Sealed);
        }
        self.push(polygon);
        Ok(())
    }
}

impl<S: Clone> Recycle for CsgPolyStream<S> {
    fn with_capacity(capacity: usize) -> Self {
        CsgPolyStream::with_capacity(capacity)
    }

    fn recycle(&mut self) {
        self.polygons.clear();
        self.bounds = Aabb::new_invalid();
        self.partition = OnceLock::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::shapes::cuboid;
    use nalgebra::Point3;

    fn cube(min: f64, max: f64) -> Vec<Polygon<()>> {
        cuboid(
            Point3::new(min as _, min as _, min as _),
            Point3::new(max as _, max as _, max as _),
            None,
        )
    }

    #[test]
    fn first_query_seals_the_stream() {
        let mut stream = CsgPolyStream::new();
        for p in cube(0.0, 1.0) {
            stream.append(p).unwrap();
        }
        assert_eq!(stream.state(), StreamState::Building);

        let probe = cube(5.0, 6.0).remove(0);
        assert!(!stream.intersects_with(&probe));
        assert_eq!(stream.state(), StreamState::Sealed);
        assert_eq!(stream.append(probe), Err(StreamError::Sealed));
        assert_eq!(stream.len(), 6);
    }

    #[test]
    fn empty_stream_intersects_nothing() {
        let stream = CsgPolyStream::<()>::new();
        for p in cube(-1.0, 1.0) {
            assert!(!stream.intersects_with(&p));
        }
    }

    #[test]
    fn clipping_keeps_the_partition() {
        let mut a = CsgPolyStream::new();
        a.extend_unsealed(cube(0.0, 2.0));
        let mut b = CsgPolyStream::new();
        b.extend_unsealed(cube(0.0, 2.0));

        let planes_before = a.partition().plane_count();
        a.clip_to(&b);
        assert_eq!(a.partition().plane_count(), planes_before);

        // a's faces are coplanar with b's and face the same way, so they stay.
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn recycle_resets_to_building() {
        let mut stream = CsgPolyStream::new();
        stream.extend_unsealed(cube(0.0, 1.0));
        stream.invert();
        stream.recycle();
        assert_eq!(stream.state(), StreamState::Building);
        assert!(stream.is_empty());
        assert!(stream.bounds().mins.x > stream.bounds().maxs.x);
    }
}
