mod support;

use nalgebra::Point3;
use polycsg::mesh::polygon::{Operand, Polygon};
use polycsg::mesh::shapes::cuboid;
use polycsg::stream::{PolyStream, StreamPool, WritablePolyStream};
use polycsg::{Csg, StreamError};
use support::{approx_eq, area, bounding_box, cube, volume, windings_match_planes};

const EPS: f64 = 1e-6;

fn eq(a: polycsg::Real, b: f64) -> bool {
    approx_eq(a, b as _, EPS as _)
}

fn unit_cubes() -> (Vec<Polygon<()>>, Vec<Polygon<()>>) {
    (cube([0.0; 3], [1.0; 3]), cube([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]))
}

fn overlapping_cubes() -> (Vec<Polygon<()>>, Vec<Polygon<()>>) {
    (cube([0.0; 3], [2.0; 3]), cube([1.0; 3], [3.0; 3]))
}

#[test]
fn union_of_face_adjacent_cubes_is_one_box() {
    let pool = StreamPool::new();
    let (a, b) = unit_cubes();
    let mut out: Vec<Polygon<()>> = Vec::new();
    Csg::new(&pool).union(&a, &b, &mut out).unwrap();

    assert_eq!(out.len(), 6);
    assert!(out.iter().all(|p| p.vertices.len() == 4));
    assert!(eq(area(&out), 10.0));
    assert!(eq(volume(&out), 2.0));
    assert_eq!(bounding_box(&out), [0.0, 0.0, 0.0, 2.0, 1.0, 1.0]);
    assert!(windings_match_planes(&out));
}

#[test]
fn intersect_of_face_adjacent_cubes_is_empty() {
    let pool = StreamPool::new();
    let (a, b) = unit_cubes();
    let mut out: Vec<Polygon<()>> = Vec::new();
    Csg::new(&pool).intersect(&a, &b, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn difference_of_face_adjacent_cubes_reproduces_a() {
    let pool = StreamPool::new();
    let (a, b) = unit_cubes();
    let mut out: Vec<Polygon<()>> = Vec::new();
    Csg::new(&pool).difference(&a, &b, &mut out).unwrap();

    assert_eq!(out.len(), 6);
    assert!(eq(volume(&out), 1.0));
    assert_eq!(bounding_box(&out), [0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    // The -X face never comes near B and is passed through first.
    assert_eq!(out[0], a[0]);
}

#[test]
fn overlapping_cubes_volumes() {
    let pool = StreamPool::new();
    let csg = Csg::new(&pool);
    let (a, b) = overlapping_cubes();

    let mut union: Vec<Polygon<()>> = Vec::new();
    csg.union(&a, &b, &mut union).unwrap();
    assert!(eq(volume(&union), 15.0));
    assert!(eq(area(&union), 42.0));
    assert_eq!(bounding_box(&union), [0.0, 0.0, 0.0, 3.0, 3.0, 3.0]);

    let mut intersection: Vec<Polygon<()>> = Vec::new();
    csg.intersect(&a, &b, &mut intersection).unwrap();
    assert_eq!(intersection.len(), 6);
    assert!(eq(volume(&intersection), 1.0));
    assert_eq!(bounding_box(&intersection), [1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);

    let mut a_minus_b: Vec<Polygon<()>> = Vec::new();
    csg.difference(&a, &b, &mut a_minus_b).unwrap();
    assert!(eq(volume(&a_minus_b), 7.0));
    assert!(eq(area(&a_minus_b), 24.0));

    let mut b_minus_a: Vec<Polygon<()>> = Vec::new();
    csg.difference(&b, &a, &mut b_minus_a).unwrap();
    assert!(eq(volume(&b_minus_a), 7.0));

    assert!(windings_match_planes(&union));
    assert!(windings_match_planes(&a_minus_b));
}

#[test]
fn difference_intersection_and_reverse_difference_make_the_union() {
    let pool = StreamPool::new();
    let csg = Csg::new(&pool);
    let (a, b) = overlapping_cubes();

    let mut pieces: Vec<Polygon<()>> = Vec::new();
    csg.difference(&a, &b, &mut pieces).unwrap();
    csg.intersect(&a, &b, &mut pieces).unwrap();
    csg.difference(&b, &a, &mut pieces).unwrap();

    let mut union: Vec<Polygon<()>> = Vec::new();
    csg.union(&a, &b, &mut union).unwrap();
    assert!(approx_eq(volume(&pieces), volume(&union), EPS as _));
}

#[test]
fn self_difference_is_empty() {
    let pool = StreamPool::new();
    let a = cube([0.0; 3], [1.0; 3]);
    let mut out: Vec<Polygon<()>> = Vec::new();
    Csg::new(&pool).difference(&a, &a, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn self_union_and_intersection_keep_the_solid() {
    let pool = StreamPool::new();
    let csg = Csg::new(&pool);
    let a = cube([0.0; 3], [1.0; 3]);

    let mut union: Vec<Polygon<()>> = Vec::new();
    csg.union(&a, &a, &mut union).unwrap();
    assert_eq!(union.len(), 6);
    assert!(eq(volume(&union), 1.0));

    let mut intersection: Vec<Polygon<()>> = Vec::new();
    csg.intersect(&a, &a, &mut intersection).unwrap();
    assert_eq!(intersection.len(), 6);
    assert!(eq(volume(&intersection), 1.0));
}

#[test]
fn disjoint_union_concatenates_inputs() {
    let pool = StreamPool::new();
    let a = cube([0.0; 3], [2.0; 3]);
    let b = cube([5.0; 3], [6.0; 3]);
    let mut out: Vec<Polygon<()>> = Vec::new();
    Csg::new(&pool).union(&a, &b, &mut out).unwrap();

    assert_eq!(out.len(), a.len() + b.len());
    assert_eq!(&out[..a.len()], a.as_slice());
    assert_eq!(&out[a.len()..], b.as_slice());
}

#[test]
fn disjoint_difference_and_intersection() {
    let pool = StreamPool::new();
    let csg = Csg::new(&pool);
    let a = cube([0.0; 3], [2.0; 3]);
    let b = cube([5.0; 3], [6.0; 3]);

    let mut difference: Vec<Polygon<()>> = Vec::new();
    csg.difference(&a, &b, &mut difference).unwrap();
    assert_eq!(difference, a);

    let mut intersection: Vec<Polygon<()>> = Vec::new();
    csg.intersect(&a, &b, &mut intersection).unwrap();
    assert!(intersection.is_empty());
}

#[test]
fn enclosed_operand_carves_a_cavity() {
    let pool = StreamPool::new();
    let csg = Csg::new(&pool);
    let outer = cube([0.0; 3], [4.0; 3]);
    let inner = cube([1.0; 3], [2.0; 3]);

    let mut hollow: Vec<Polygon<()>> = Vec::new();
    csg.difference(&outer, &inner, &mut hollow).unwrap();
    assert_eq!(hollow.len(), 12);
    assert!(eq(volume(&hollow), 63.0));

    let mut union: Vec<Polygon<()>> = Vec::new();
    csg.union(&outer, &inner, &mut union).unwrap();
    assert_eq!(union.len(), 6);
    assert!(eq(volume(&union), 64.0));

    let mut intersection: Vec<Polygon<()>> = Vec::new();
    csg.intersect(&outer, &inner, &mut intersection).unwrap();
    assert_eq!(intersection.len(), 6);
    assert!(eq(volume(&intersection), 1.0));

    let mut nothing: Vec<Polygon<()>> = Vec::new();
    csg.difference(&inner, &outer, &mut nothing).unwrap();
    assert!(nothing.is_empty());
}

#[test]
fn hole_through_a_slab() {
    let pool = StreamPool::new();
    let slab = cube([0.0; 3], [3.0, 3.0, 1.0]);
    let drill = cube([1.0, 1.0, -1.0], [2.0, 2.0, 2.0]);
    let mut out: Vec<Polygon<()>> = Vec::new();
    Csg::new(&pool).difference(&slab, &drill, &mut out).unwrap();
    assert!(eq(volume(&out), 8.0));
    assert!(eq(area(&out), 32.0));
}

#[test]
fn small_cut_in_a_block_model() {
    let pool = StreamPool::new();
    let blocks: Vec<Polygon<()>> = (0..4)
        .flat_map(|x| (0..4).map(move |z| (x, z)))
        .flat_map(|(x, z)| polycsg::mesh::shapes::block(x, 0, z, None))
        .collect();
    let cut = cube([1.25, 0.5, 1.25], [1.75, 2.0, 1.75]);

    let mut out: Vec<Polygon<()>> = Vec::new();
    Csg::new(&pool).difference(&blocks, &cut, &mut out).unwrap();
    assert!(eq(volume(&out), 15.875));
    // Blocks away from the cut pass through untouched.
    assert!(out.iter().any(|p| p == &blocks[0]));
}

#[test]
fn empty_operands() {
    let pool = StreamPool::new();
    let csg = Csg::new(&pool);
    let a = cube([0.0; 3], [1.0; 3]);
    let none: Vec<Polygon<()>> = Vec::new();

    let mut out: Vec<Polygon<()>> = Vec::new();
    csg.union(&none, &a, &mut out).unwrap();
    assert_eq!(out, a);

    let mut out: Vec<Polygon<()>> = Vec::new();
    csg.difference(&a, &none, &mut out).unwrap();
    assert_eq!(out, a);

    let mut out: Vec<Polygon<()>> = Vec::new();
    csg.difference(&none, &a, &mut out).unwrap();
    csg.intersect(&none, &a, &mut out).unwrap();
    csg.intersect(&a, &none, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn operations_accumulate_into_one_output() {
    let pool = StreamPool::new();
    let csg = Csg::new(&pool);
    let a = cube([0.0; 3], [1.0; 3]);
    let b = cube([5.0; 3], [6.0; 3]);

    let mut out = PolyStream::new();
    out.append_copy(&a[0]).unwrap();
    csg.union(&a, &b, &mut out).unwrap();
    csg.union(&b, &a, &mut out).unwrap();
    assert_eq!(polycsg::ReadablePolyStream::len(&out), 25);
}

#[test]
fn sealed_output_is_reported_and_streams_are_returned() {
    let pool = StreamPool::new();
    let (a, b) = overlapping_cubes();
    let mut out = PolyStream::new();
    out.seal();

    assert_eq!(
        Csg::new(&pool).union(&a, &b, &mut out),
        Err(StreamError::Sealed)
    );
    let stats = pool.stats();
    assert_eq!(stats.csg.claimed, 0);
}

#[test]
fn metadata_and_source_survive() {
    let pool = StreamPool::new();
    let a: Vec<Polygon<&str>> = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0), Some("oak"))
        .into_iter()
        .map(|p| p.with_source(Operand::A))
        .collect();
    let b: Vec<Polygon<&str>> = cuboid(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0), Some("glass"))
        .into_iter()
        .map(|p| p.with_source(Operand::B))
        .collect();

    let mut out: Vec<Polygon<&str>> = Vec::new();
    Csg::new(&pool).union(&a, &b, &mut out).unwrap();

    // Different materials keep the side faces apart.
    assert_eq!(out.len(), 10);
    assert!(eq(volume(&out), 2.0));
    for p in &out {
        match p.metadata {
            Some("oak") => assert_eq!(p.source, Some(Operand::A)),
            Some("glass") => assert_eq!(p.source, Some(Operand::B)),
            other => panic!("unexpected metadata {other:?}"),
        }
    }
}
