//! Fragment recombination.
//!
//! Clipping leaves a face cut into many convex pieces. Neighbouring pieces
//! that share an edge, lie on the same plane, carry the same metadata and
//! agree on their vertex attributes along that edge are merged back, as long
//! as the merged polygon stays convex. Vertices left in the middle of a
//! straight edge are dropped when their attributes are exactly what
//! interpolating the neighbours would give. Coincident polygons facing
//! opposite ways enclose no volume and are removed.

use hashbrown::HashMap;

use crate::errors::StreamError;
use crate::float_types::{Real, quantize, tolerance};
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use crate::stream::csg_stream::CsgPolyStream;
use crate::stream::{ReadablePolyStream, WritablePolyStream};
use nalgebra::{Point3, Vector3};

type QPoint = (i64, i64, i64);

#[inline]
fn qpoint(p: &Point3<Real>) -> QPoint {
    (quantize(p.x), quantize(p.y), quantize(p.z))
}

/// Assigns one id to every group of positions within tolerance of a first
/// seen representative. Neighbouring cells are searched too, so positions on
/// either side of a cell boundary still weld.
struct Welder {
    cells: HashMap<QPoint, Vec<(usize, Point3<Real>)>>,
    eps_sq: Real,
    next: usize,
}

impl Welder {
    fn new() -> Self {
        let eps = tolerance();
        Self {
            cells: HashMap::new(),
            eps_sq: eps * eps,
            next: 0,
        }
    }

    fn id(&mut self, p: &Point3<Real>) -> usize {
        let (x, y, z) = qpoint(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(entries) = self.cells.get(&(x + dx, y + dy, z + dz)) else {
                        continue;
                    };
                    if let Some(&(id, _)) = entries.iter().find(|(_, q)| (q - p).norm_squared() <= self.eps_sq) {
                        return id;
                    }
                }
            }
        }
        let id = self.next;
        self.next += 1;
        self.cells.entry((x, y, z)).or_default().push((id, *p));
        id
    }

    fn ring(&mut self, polygon: &Polygon<impl Clone>) -> Vec<usize> {
        polygon.vertices.iter().map(|v| self.id(&v.pos)).collect()
    }
}

/// Recombine the polygons of all `streams` as one set and append the result
/// to `output`. Returns the number of polygons written.
///
/// Streams that together make up one solid should be recombined jointly so
/// that fragments split across them can merge.
pub fn output_recombined<'a, S, I, W>(streams: I, output: &mut W) -> Result<usize, StreamError>
where
    S: Clone + PartialEq + 'a,
    I: IntoIterator<Item = &'a CsgPolyStream<S>>,
    W: WritablePolyStream<S> + ?Sized,
{
    let polygons: Vec<Polygon<S>> = streams
        .into_iter()
        .flat_map(|stream| stream.polygons().cloned())
        .collect();

    let merged = recombine_polygons(polygons);
    let count = merged.len();
    for polygon in merged {
        output.append(polygon)?;
    }
    Ok(count)
}

/// Merge coplanar, compatible neighbours until no pair can be merged.
/// Relative order is kept: a merged polygon takes the place of the first of
/// its two parts.
pub fn recombine_polygons<S: Clone + PartialEq>(polygons: Vec<Polygon<S>>) -> Vec<Polygon<S>> {
    let mut welder = Welder::new();
    let polygons = cancel_opposing_pairs(polygons, &mut welder);
    let mut slots: Vec<Option<Polygon<S>>> = polygons.into_iter().map(Some).collect();

    loop {
        let rings: Vec<Vec<usize>> = slots
            .iter()
            .map(|slot| slot.as_ref().map_or_else(Vec::new, |polygon| welder.ring(polygon)))
            .collect();

        // Directed edge -> every (polygon, edge index) running along it.
        let mut edges: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
        for (i, ring) in rings.iter().enumerate() {
            for e in 0..ring.len() {
                edges
                    .entry((ring[e], ring[(e + 1) % ring.len()]))
                    .or_default()
                    .push((i, e));
            }
        }

        // Each polygon takes part in at most one merge per pass, so the edge
        // map stays valid for the whole pass.
        let mut touched = vec![false; slots.len()];
        let mut merged_any = false;

        for i in 0..slots.len() {
            if touched[i] {
                continue;
            }
            let Some(p) = slots[i].as_ref() else { continue };

            let ring = &rings[i];
            let mut found = None;
            'edges: for e in 0..ring.len() {
                let reversed = (ring[(e + 1) % ring.len()], ring[e]);
                let Some(owners) = edges.get(&reversed) else { continue };
                for &(j, f) in owners {
                    if j == i || touched[j] {
                        continue;
                    }
                    let Some(q) = slots[j].as_ref() else { continue };
                    if let Some(merged) = try_merge(p, e, q, f) {
                        found = Some((j, merged));
                        break 'edges;
                    }
                }
            }

            if let Some((j, merged)) = found {
                slots[i] = Some(merged);
                slots[j] = None;
                touched[i] = true;
                touched[j] = true;
                merged_any = true;
            }
        }

        if !merged_any {
            break;
        }
    }

    slots.into_iter().flatten().collect()
}

/// Merge `p` and `q` across p's edge `e`, which runs opposite to q's edge `f`.
fn try_merge<S: Clone + PartialEq>(p: &Polygon<S>, e: usize, q: &Polygon<S>, f: usize) -> Option<Polygon<S>> {
    if p.metadata != q.metadata || !p.plane.coplanar_with(&q.plane) {
        return None;
    }

    let eps = tolerance();
    let n = p.vertices.len();
    let m = q.vertices.len();
    let (pa, pb) = (&p.vertices[e], &p.vertices[(e + 1) % n]);
    let (qa, qb) = (&q.vertices[f], &q.vertices[(f + 1) % m]);
    // Welded endpoints may sit up to twice the tolerance apart.
    if !(pa.coincident(qb, 2.0 * eps) && pb.coincident(qa, 2.0 * eps)) {
        return None;
    }
    if !(pa.same_attributes(qb) && pb.same_attributes(qa)) {
        return None;
    }

    // p from the end of the shared edge around to its start, then q's
    // vertices that are not on the shared edge.
    let mut ring = Vec::with_capacity(n + m - 2);
    ring.extend((0..n).map(|k| p.vertices[(e + 1 + k) % n]));
    ring.extend((0..m - 2).map(|k| q.vertices[(f + 2 + k) % m]));

    remove_collinear(&mut ring, eps);
    if ring.len() < 3 || !is_convex(&ring, &p.plane.normal(), eps) {
        return None;
    }

    let mut merged = p.fragment(ring)?;
    if p.source != q.source {
        merged.source = None;
    }
    Some(merged)
}

/// Drop vertices that sit on the straight line between their neighbours
/// and whose attributes equal the interpolation of the neighbours'.
fn remove_collinear(ring: &mut Vec<Vertex>, eps: Real) {
    'scan: while ring.len() > 3 {
        let len = ring.len();
        for i in 0..len {
            let prev = &ring[(i + len - 1) % len];
            let next = &ring[(i + 1) % len];
            if is_redundant(prev, &ring[i], next, eps) {
                ring.remove(i);
                continue 'scan;
            }
        }
        break;
    }
}

fn is_redundant(prev: &Vertex, v: &Vertex, next: &Vertex, eps: Real) -> bool {
    let along = next.pos - prev.pos;
    let length_sq = along.norm_squared();
    if length_sq <= eps * eps {
        return false;
    }
    let offset = v.pos - prev.pos;
    let t = offset.dot(&along) / length_sq;
    if t <= 0.0 || t >= 1.0 {
        return false;
    }
    if (offset - along * t).norm() > eps {
        return false;
    }
    v.same_attributes(&prev.interpolate(next, t))
}

fn is_convex(ring: &[Vertex], normal: &Vector3<Real>, eps: Real) -> bool {
    let len = ring.len();
    (0..len).all(|i| {
        let a = ring[(i + len - 1) % len].pos;
        let b = ring[i].pos;
        let c = ring[(i + 1) % len].pos;
        let e1 = b - a;
        let e2 = c - b;
        e1.cross(&e2).dot(normal) >= -eps * e1.norm() * e2.norm()
    })
}

/// Remove pairs of polygons with the same outline and opposite facing.
fn cancel_opposing_pairs<S: Clone>(polygons: Vec<Polygon<S>>, welder: &mut Welder) -> Vec<Polygon<S>> {
    let mut groups: HashMap<Vec<usize>, Vec<usize>> = HashMap::new();
    for (i, polygon) in polygons.iter().enumerate() {
        let mut key = welder.ring(polygon);
        key.sort_unstable();
        groups.entry(key).or_default().push(i);
    }

    let mut removed = vec![false; polygons.len()];
    for members in groups.values().filter(|members| members.len() > 1) {
        for (k, &i) in members.iter().enumerate() {
            if removed[i] {
                continue;
            }
            let opposite = members[k + 1..].iter().copied().find(|&j| {
                !removed[j] && polygons[i].plane.normal().dot(&polygons[j].plane.normal()) < 0.0
            });
            if let Some(j) = opposite {
                removed[i] = true;
                removed[j] = true;
            }
        }
    }

    polygons
        .into_iter()
        .zip(removed)
        .filter_map(|(polygon, removed)| (!removed).then_some(polygon))
        .collect()
}
