//! Boolean operations between two closed polygon meshes.
//!
//! Each operation reads its inputs through [`ReadablePolyStream`] and
//! appends the result to a [`WritablePolyStream`] without clearing it, so
//! several operations can accumulate into one output. Working streams are
//! claimed from a shared [`StreamPool`] and released before returning.
//!
//! Polygons of `a` whose bounds do not come near `b` are copied to the
//! output untouched and never enter the partition machinery. For the
//! typical case of a small cut in a large model this keeps the cost
//! proportional to the overlap.

use std::fmt::Debug;

use crate::errors::StreamError;
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::float_types::tolerance;
use crate::stream::{
    Claimed, CsgPolyStream, ReadablePolyStream, StreamPool, WritablePolyStream, output_recombined,
};

/// Entry point for boolean operations, bound to a stream pool.
///
/// ```
/// use nalgebra::Point3;
/// use polycsg::Csg;
/// use polycsg::mesh::shapes::cuboid;
/// use polycsg::stream::StreamPool;
///
/// let pool = StreamPool::new();
/// let csg = Csg::new(&pool);
/// let a = cuboid::<()>(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0), None);
/// let b = cuboid::<()>(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0), None);
///
/// let mut joined: Vec<polycsg::Polygon<()>> = Vec::new();
/// csg.union(&a, &b, &mut joined).unwrap();
/// assert_eq!(joined.len(), 6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Csg<'pool, S: Clone> {
    pool: &'pool StreamPool<S>,
}

impl<'pool, S> Csg<'pool, S>
where
    S: Clone + Send + Sync + PartialEq + Debug,
{
    pub const fn new(pool: &'pool StreamPool<S>) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &'pool StreamPool<S> {
        self.pool
    }

    /// Split `a` by proximity to `b`: polygons that may touch `b` are copied
    /// into a new working stream, the rest go straight to `output`.
    /// Returns the working copy of `b`, the near part of `a`, and the number
    /// of polygons passed through.
    ///
    /// If no single polygon of `a` comes near `b` but `a` as a whole does,
    /// `b` may sit inside a cavity of `a`, and all of `a` is kept near.
    fn partition_by_overlap<A, B, W>(
        &self,
        a: &A,
        b: &B,
        output: &mut W,
    ) -> Result<(Claimed<'pool, CsgPolyStream<S>>, Claimed<'pool, CsgPolyStream<S>>, usize), StreamError>
    where
        A: ReadablePolyStream<S> + ?Sized,
        B: ReadablePolyStream<S> + ?Sized,
        W: WritablePolyStream<S> + ?Sized,
    {
        let b_csg = self.pool.claim_copy(b);
        let mut a_bounds = Aabb::new_invalid();
        let mut near_mask: Vec<bool> = a
            .polygons()
            .map(|polygon| {
                a_bounds.merge(&polygon.bounding_box());
                b_csg.intersects_with(polygon)
            })
            .collect();
        if !near_mask.contains(&true) && b_csg.bounds().loosened(tolerance()).intersects(&a_bounds) {
            near_mask.fill(true);
        }

        let mut near = self.pool.claim();
        let mut passed = 0;
        for (polygon, is_near) in a.polygons().zip(near_mask) {
            if is_near {
                near.append_copy(polygon)?;
            } else {
                output.append_copy(polygon)?;
                passed += 1;
            }
        }
        Ok((b_csg, near, passed))
    }

    /// Append `a − b` to `output`: the part of `a`'s volume outside `b`.
    pub fn difference<A, B, W>(&self, a: &A, b: &B, output: &mut W) -> Result<(), StreamError>
    where
        A: ReadablePolyStream<S> + ?Sized,
        B: ReadablePolyStream<S> + ?Sized,
        W: WritablePolyStream<S> + ?Sized,
    {
        let (mut b_csg, mut near, passed) = self.partition_by_overlap(a, b, output)?;

        if near.is_empty() {
            log::debug!(target: "csg", "difference: a={} b={} disjoint, {passed} passed through", a.len(), b.len());
            b_csg.release()?;
            return near.release();
        }

        near.invert();
        near.clip_to(&b_csg);
        b_csg.clip_to(&near);
        b_csg.invert();
        b_csg.clip_to(&near);
        near.invert();

        let written = output_recombined([&*b_csg, &*near], output)?;
        log::debug!(
            target: "csg",
            "difference: a={} b={} passed={passed} clipped_a={} clipped_b={} written={written}",
            a.len(),
            b.len(),
            near.len(),
            b_csg.len()
        );

        b_csg.release()?;
        near.release()
    }

    /// Append `a ∩ b` to `output`: the volume inside both.
    pub fn intersect<A, B, W>(&self, a: &A, b: &B, output: &mut W) -> Result<(), StreamError>
    where
        A: ReadablePolyStream<S> + ?Sized,
        B: ReadablePolyStream<S> + ?Sized,
        W: WritablePolyStream<S> + ?Sized,
    {
        let mut a_csg = self.pool.claim_copy(a);
        let mut b_csg = self.pool.claim_copy(b);

        if !a_csg.bounds().loosened(tolerance()).intersects(&b_csg.bounds()) {
            log::debug!(target: "csg", "intersect: a={} b={} disjoint", a.len(), b.len());
            a_csg.release()?;
            return b_csg.release();
        }

        a_csg.invert();
        b_csg.clip_to(&a_csg);
        b_csg.invert();
        a_csg.clip_to(&b_csg);
        b_csg.clip_to(&a_csg);
        a_csg.invert();
        b_csg.invert();

        let written = output_recombined([&*a_csg, &*b_csg], output)?;
        log::debug!(
            target: "csg",
            "intersect: a={} b={} clipped_a={} clipped_b={} written={written}",
            a.len(),
            b.len(),
            a_csg.len(),
            b_csg.len()
        );

        a_csg.release()?;
        b_csg.release()
    }

    /// Append `a ∪ b` to `output`: the volume inside either.
    ///
    /// When no polygon of `a` comes near `b` the result is `a` followed by
    /// `b`, both unchanged.
    pub fn union<A, B, W>(&self, a: &A, b: &B, output: &mut W) -> Result<(), StreamError>
    where
        A: ReadablePolyStream<S> + ?Sized,
        B: ReadablePolyStream<S> + ?Sized,
        W: WritablePolyStream<S> + ?Sized,
    {
        let (mut b_csg, mut near, passed) = self.partition_by_overlap(a, b, output)?;

        if near.is_empty() {
            output.append_all(&*b_csg)?;
            log::debug!(target: "csg", "union: a={} b={} disjoint, {passed} passed through", a.len(), b.len());
            b_csg.release()?;
            return near.release();
        }

        near.clip_to(&b_csg);
        b_csg.clip_to(&near);
        b_csg.invert();
        b_csg.clip_to(&near);
        b_csg.invert();

        let written = output_recombined([&*near, &*b_csg], output)?;
        log::debug!(
            target: "csg",
            "union: a={} b={} passed={passed} clipped_a={} clipped_b={} written={written}",
            a.len(),
            b.len(),
            near.len(),
            b_csg.len()
        );

        b_csg.release()?;
        near.release()
    }
}
