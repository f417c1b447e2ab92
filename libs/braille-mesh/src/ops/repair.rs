//! # Mesh Repair
//!
//! Turns the polygon soup a boolean produces into a closed, indexed mesh.
//!
//! ## Passes
//!
//! 1. Weld vertices closer than the tolerance (grid hash, 27-cell lookup)
//! 2. Insert every vertex lying on a polygon edge into that edge, so both
//!    polygons along a seam walk the same sub-edges
//! 3. Remove spikes (`a → b → a`) and split rings that revisit a vertex
//! 4. Triangulate: fan from the first corner when every fan triangle has
//!    height, otherwise fan from the ring's centroid
//! 5. Cancel coincident faces of opposite winding, drop unused vertices
//!
//! Every pass keeps each directed edge balanced against its reverse, so a
//! soup that is watertight up to the tolerance comes out closed.

use std::collections::{HashMap, HashSet};

use glam::DVec3;
use rayon::prelude::*;
use tracing::trace;

use crate::mesh::Mesh;

/// Runs every pass over a triangle mesh.
pub fn repair(mesh: Mesh, tolerance: f64) -> Mesh {
    let rings: Vec<[DVec3; 3]> = mesh.iter_triangles().collect();
    stitch(&rings, tolerance)
}

/// Builds a closed mesh from planar polygons given as vertex rings.
pub fn stitch<R: AsRef<[DVec3]>>(rings: &[R], tolerance: f64) -> Mesh {
    let mut welder = Welder::new(tolerance);
    let rings: Vec<Vec<u32>> = rings
        .iter()
        .map(|ring| simplify(ring.as_ref().iter().map(|&p| welder.id(p)).collect()))
        .filter(|ring| ring.len() >= 3)
        .collect();
    let vertices = welder.into_vertices();

    let rings = insert_edge_points(rings, &vertices, tolerance);
    let mut loops = Vec::with_capacity(rings.len());
    for ring in rings {
        split_loops(simplify(ring), &mut loops);
    }

    let loops = cancel_opposite(loops);

    let mut mesh = Mesh::from_parts(vertices, Vec::new());
    let mut centroid_fans = 0usize;
    for ring in &loops {
        centroid_fans += usize::from(triangulate(&mut mesh, ring, tolerance));
    }
    trace!(loops = loops.len(), centroid_fans, "rings triangulated");

    let (vertices, triangles) = mesh.into_parts();
    let triangles = cancel_opposite(triangles.iter().map(|t| t.to_vec()).collect())
        .into_iter()
        .map(|t| [t[0], t[1], t[2]])
        .collect();
    compact(Mesh::from_parts(vertices, triangles))
}

/// Merges vertices within `tolerance` of an earlier vertex.
pub fn weld(mesh: Mesh, tolerance: f64) -> Mesh {
    let (vertices, triangles) = mesh.into_parts();
    let mut welder = Welder::new(tolerance);
    let remap: Vec<u32> = vertices.iter().map(|&p| welder.id(p)).collect();
    let triangles = triangles.into_iter().map(|t| t.map(|i| remap[i as usize])).collect();
    Mesh::from_parts(welder.into_vertices(), triangles)
}

// =============================================================================
// SPATIAL HASH
// =============================================================================

static NEIGHBOURS: [i64; 3] = [-1, 0, 1];

/// Uniform grid of vertex ids.
struct PointGrid {
    cell: f64,
    buckets: HashMap<[i64; 3], Vec<u32>>,
}

impl PointGrid {
    fn new(cell: f64) -> Self {
        Self {
            cell: cell.max(f64::MIN_POSITIVE),
            buckets: HashMap::new(),
        }
    }

    fn key(&self, p: DVec3) -> [i64; 3] {
        let k = (p / self.cell).floor();
        [k.x as i64, k.y as i64, k.z as i64]
    }

    fn insert(&mut self, p: DVec3, id: u32) {
        let key = self.key(p);
        self.buckets.entry(key).or_default().push(id);
    }

    /// Ids in the 27 cells around `key`, skipping cells already in `seen`.
    fn around<'a>(
        &'a self,
        key: [i64; 3],
        seen: &'a mut HashSet<[i64; 3]>,
    ) -> impl Iterator<Item = u32> + 'a {
        NEIGHBOURS
            .iter()
            .flat_map(|&dx| NEIGHBOURS.iter().map(move |&dy| (dx, dy)))
            .flat_map(|(dx, dy)| NEIGHBOURS.iter().map(move |&dz| [dx, dy, dz]))
            .map(move |[dx, dy, dz]| [key[0] + dx, key[1] + dy, key[2] + dz])
            .filter(move |cell| seen.insert(*cell))
            .filter_map(move |cell| self.buckets.get(&cell))
            .flat_map(|bucket| bucket.iter().copied())
    }
}

/// Assigns one id to every cluster of points within the tolerance.
struct Welder {
    tolerance: f64,
    grid: PointGrid,
    vertices: Vec<DVec3>,
}

impl Welder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            grid: PointGrid::new(tolerance),
            vertices: Vec::new(),
        }
    }

    fn id(&mut self, p: DVec3) -> u32 {
        let limit = self.tolerance * self.tolerance;
        let mut seen = HashSet::with_capacity(27);
        let found = self
            .grid
            .around(self.grid.key(p), &mut seen)
            .find(|&id| self.vertices[id as usize].distance_squared(p) <= limit);
        if let Some(id) = found {
            return id;
        }

        let id = self.vertices.len() as u32;
        self.vertices.push(p);
        self.grid.insert(p, id);
        id
    }

    fn into_vertices(self) -> Vec<DVec3> {
        self.vertices
    }
}

// =============================================================================
// EDGE POINTS
// =============================================================================

/// Inserts, in order, every vertex lying strictly inside each ring edge.
fn insert_edge_points(rings: Vec<Vec<u32>>, vertices: &[DVec3], tolerance: f64) -> Vec<Vec<u32>> {
    let (total, count) = rings
        .iter()
        .flat_map(|ring| ring_edges(ring))
        .fold((0.0, 0usize), |(total, count), (a, b)| {
            (total + vertices[a as usize].distance(vertices[b as usize]), count + 1)
        });
    if count == 0 {
        return rings;
    }

    // Sampling a segment every `cell` finds anything within `tolerance` of it
    // as long as the tolerance is under half a cell.
    let mut grid = PointGrid::new((total / count as f64).max(4.0 * tolerance));
    for (id, &p) in vertices.iter().enumerate() {
        grid.insert(p, id as u32);
    }

    rings
        .into_par_iter()
        .map(|ring| {
            let mut out = Vec::with_capacity(ring.len());
            for (a, b) in ring_edges(&ring) {
                out.push(a);
                out.extend(points_on_segment(&grid, vertices, a, b, tolerance));
            }
            out
        })
        .collect()
}

fn points_on_segment(grid: &PointGrid, vertices: &[DVec3], a: u32, b: u32, tolerance: f64) -> Vec<u32> {
    let (pa, pb) = (vertices[a as usize], vertices[b as usize]);
    let edge = pb - pa;
    let length = edge.length();
    if length <= 2.0 * tolerance {
        return Vec::new();
    }

    let steps = (length / grid.cell).ceil().max(1.0) as usize;
    let mut seen = HashSet::new();
    let mut hits: Vec<(f64, u32)> = Vec::new();
    for step in 0..=steps {
        let sample = pa.lerp(pb, step as f64 / steps as f64);
        for v in grid.around(grid.key(sample), &mut seen) {
            if v == a || v == b {
                continue;
            }
            let p = vertices[v as usize];
            let t = (p - pa).dot(edge) / (length * length);
            let along = t * length;
            if along > tolerance && along < length - tolerance && (pa + edge * t).distance(p) <= tolerance {
                hits.push((t, v));
            }
        }
    }

    hits.sort_by(|x, y| x.0.total_cmp(&y.0));
    hits.into_iter().map(|(_, v)| v).collect()
}

fn ring_edges(ring: &[u32]) -> impl Iterator<Item = (u32, u32)> + '_ {
    (0..ring.len()).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

// =============================================================================
// RING CLEANUP
// =============================================================================

/// Drops repeated neighbours and spikes, including across the seam.
fn simplify(ring: Vec<u32>) -> Vec<u32> {
    let mut out: Vec<u32> = Vec::with_capacity(ring.len());
    for id in ring {
        if out.last() == Some(&id) {
            continue;
        }
        if out.len() >= 2 && out[out.len() - 2] == id {
            out.pop();
            continue;
        }
        out.push(id);
    }

    while out.len() >= 3 {
        let n = out.len();
        if out[0] == out[n - 1] || out[n - 2] == out[0] {
            out.pop();
        } else if out[n - 1] == out[1] {
            out.remove(0);
        } else {
            break;
        }
    }
    out
}

/// Splits a ring that passes a vertex twice into simple loops.
fn split_loops(ring: Vec<u32>, out: &mut Vec<Vec<u32>>) {
    let mut first_seen: HashMap<u32, usize> = HashMap::with_capacity(ring.len());
    for (i, &id) in ring.iter().enumerate() {
        if let Some(&j) = first_seen.get(&id) {
            let inner = ring[j..i].to_vec();
            let mut outer = ring[..j].to_vec();
            outer.extend_from_slice(&ring[i..]);
            split_loops(simplify(inner), out);
            split_loops(simplify(outer), out);
            return;
        }
        first_seen.insert(id, i);
    }
    if ring.len() >= 3 {
        out.push(ring);
    }
}

// =============================================================================
// TRIANGULATION
// =============================================================================

/// Adds the triangles of one simple loop. Returns true if a centroid vertex
/// had to be added.
fn triangulate(mesh: &mut Mesh, ring: &[u32], tolerance: f64) -> bool {
    if ring.len() == 3 {
        mesh.add_triangle(ring[0], ring[1], ring[2]);
        return false;
    }

    let point = |i: usize| mesh.vertices()[ring[i] as usize];
    let fan_ok = (1..ring.len() - 1).all(|i| min_height(point(0), point(i), point(i + 1)) > tolerance);
    if fan_ok {
        for i in 1..ring.len() - 1 {
            mesh.add_triangle(ring[0], ring[i], ring[i + 1]);
        }
        return false;
    }

    let centroid = ring.iter().map(|&id| mesh.vertices()[id as usize]).sum::<DVec3>() / ring.len() as f64;
    let center = mesh.add_vertex(centroid);
    for (a, b) in ring_edges(ring) {
        mesh.add_triangle(center, a, b);
    }
    true
}

/// Smallest altitude of a triangle.
fn min_height(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let longest = a.distance(b).max(b.distance(c)).max(c.distance(a));
    if longest == 0.0 {
        return 0.0;
    }
    (b - a).cross(c - a).length() / longest
}

/// Removes pairs of rings over the same vertex cycle with opposite winding;
/// they bound nothing.
fn cancel_opposite(rings: Vec<Vec<u32>>) -> Vec<Vec<u32>> {
    let canonical = |ring: &[u32]| {
        let start = (0..ring.len()).min_by_key(|&i| ring[i]).unwrap_or(0);
        let mut key = ring[start..].to_vec();
        key.extend_from_slice(&ring[..start]);
        key
    };

    let mut open: HashMap<Vec<u32>, Vec<usize>> = HashMap::new();
    let mut dropped = vec![false; rings.len()];
    for (i, ring) in rings.iter().enumerate() {
        let key = canonical(ring);
        let reversed: Vec<u32> = ring.iter().rev().copied().collect();
        if let Some(j) = open.get_mut(&canonical(&reversed)).and_then(Vec::pop) {
            dropped[i] = true;
            dropped[j] = true;
            continue;
        }
        open.entry(key).or_default().push(i);
    }

    rings
        .into_iter()
        .zip(dropped)
        .filter_map(|(ring, dropped)| (!dropped).then_some(ring))
        .collect()
}

// =============================================================================
// COMPACTION
// =============================================================================

/// Drops vertices no triangle references.
pub fn compact(mesh: Mesh) -> Mesh {
    let (vertices, triangles) = mesh.into_parts();
    let mut remap = vec![u32::MAX; vertices.len()];
    let mut kept = Vec::with_capacity(vertices.len());

    let triangles = triangles
        .into_iter()
        .map(|tri| {
            tri.map(|i| {
                let slot = &mut remap[i as usize];
                if *slot == u32::MAX {
                    *slot = kept.len() as u32;
                    kept.push(vertices[i as usize]);
                }
                *slot
            })
        })
        .collect();
    Mesh::from_parts(kept, triangles)
}
