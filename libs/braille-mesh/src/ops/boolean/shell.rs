//! # Shells
//!
//! One operand split into groups of connected components whose bounding
//! boxes overlap. A boolean only clips a polygon against the shells of the
//! other operand it actually reaches, so a feature never cuts geometry far
//! from it and features never cut each other.

use std::collections::HashMap;

use config::constants::DEGENERATE_AREA;
use rayon::prelude::*;

use super::bsp::BspTree;
use super::polygon::Polygon;
use super::BoundingBox;
use crate::mesh::Mesh;

/// A group of components and its combined bounds.
#[derive(Debug, Clone)]
pub struct Shell {
    pub bounds: BoundingBox,
    pub polygons: Vec<Polygon>,
}

/// Splits `mesh` into shells. Components closer than `tolerance` share one.
pub fn shells(mesh: &Mesh, tolerance: f64) -> Vec<Shell> {
    let mut parent: Vec<u32> = (0..mesh.vertex_count() as u32).collect();
    for t in mesh.triangles() {
        join(&mut parent, t[0], t[1]);
        join(&mut parent, t[1], t[2]);
    }

    let mut slots: HashMap<u32, usize> = HashMap::new();
    let mut components: Vec<Shell> = Vec::new();
    for t in mesh.triangles() {
        let root = find(&mut parent, t[0]);
        let slot = *slots.entry(root).or_insert_with(|| {
            components.push(Shell {
                bounds: BoundingBox::EMPTY,
                polygons: Vec::new(),
            });
            components.len() - 1
        });

        let [a, b, c] = t.map(|i| mesh.vertex(i));
        let component = &mut components[slot];
        component.bounds = component.bounds.union(&BoundingBox::from_points(&[a, b, c]));
        if (b - a).cross(c - a).length() >= DEGENERATE_AREA {
            component.polygons.extend(Polygon::new(vec![a, b, c]));
        }
    }

    merge_overlapping(components, tolerance)
}

/// Sweeps along x and joins components whose bounds overlap.
fn merge_overlapping(components: Vec<Shell>, tolerance: f64) -> Vec<Shell> {
    let mut order: Vec<usize> = (0..components.len()).collect();
    order.sort_by(|&i, &j| components[i].bounds.min.x.total_cmp(&components[j].bounds.min.x));

    let mut group: Vec<u32> = (0..components.len() as u32).collect();
    let mut active: Vec<usize> = Vec::new();
    for &i in &order {
        let bounds = components[i].bounds;
        active.retain(|&j| components[j].bounds.max.x + tolerance >= bounds.min.x);
        for &j in &active {
            if components[j].bounds.overlaps(&bounds, tolerance) {
                join(&mut group, i as u32, j as u32);
            }
        }
        active.push(i);
    }

    let mut slots: HashMap<u32, usize> = HashMap::new();
    let mut merged: Vec<Shell> = Vec::new();
    for (i, component) in components.into_iter().enumerate() {
        if component.polygons.is_empty() {
            continue;
        }
        let root = find(&mut group, i as u32);
        match slots.get(&root) {
            Some(&slot) => {
                let shell = &mut merged[slot];
                shell.bounds = shell.bounds.union(&component.bounds);
                shell.polygons.extend(component.polygons);
            }
            None => {
                slots.insert(root, merged.len());
                merged.push(component);
            }
        }
    }
    merged
}

fn find(parent: &mut [u32], mut i: u32) -> u32 {
    while parent[i as usize] != i {
        let next = parent[parent[i as usize] as usize];
        parent[i as usize] = next;
        i = next;
    }
    i
}

fn join(parent: &mut [u32], a: u32, b: u32) {
    let (a, b) = (find(parent, a), find(parent, b));
    if a != b {
        parent[a.max(b) as usize] = a.min(b);
    }
}

// =============================================================================
// CLIPPING
// =============================================================================

/// Shells of one operand that reach the other, each with its BSP tree.
pub struct Clipper {
    shells: Vec<(BoundingBox, BspTree)>,
    tolerance: f64,
}

impl Clipper {
    /// Builds trees for the shells of `own` that overlap any shell of
    /// `other`; the rest are left out.
    pub fn new(own: &[Shell], other: &[Shell], tolerance: f64) -> Self {
        let shells = own
            .par_iter()
            .filter(|shell| other.iter().any(|o| o.bounds.overlaps(&shell.bounds, tolerance)))
            .map(|shell| (shell.bounds, BspTree::new(shell.polygons.clone())))
            .collect();
        Self { shells, tolerance }
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    /// Trees turned inside out: each one's solid becomes its complement.
    pub fn inverted(mut self) -> Self {
        for (_, tree) in &mut self.shells {
            tree.invert();
        }
        self
    }

    /// Removes the parts of `polygons` inside any shell. Polygons away from
    /// every shell come back untouched.
    pub fn outside(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        self.shells.iter().fold(polygons, |polygons, (bounds, tree)| {
            if !polygons.iter().any(|p| p.bounds().overlaps(bounds, self.tolerance)) {
                return polygons;
            }
            let (near, mut far): (Vec<_>, Vec<_>) = polygons
                .into_iter()
                .partition(|p| p.bounds().overlaps(bounds, self.tolerance));
            far.extend(tree.clip_polygons(near));
            far
        })
    }

    /// Over inverted trees: the parts of `polygon` inside each shell, kept
    /// where they face the same way as that shell's boundary. Nothing comes
    /// back for a polygon away from every shell.
    pub fn inside_each(&self, polygon: &Polygon) -> Vec<Polygon> {
        let bounds = polygon.bounds();
        let mut kept = Vec::new();
        for (shell_bounds, tree) in &self.shells {
            if !bounds.overlaps(shell_bounds, self.tolerance) {
                continue;
            }
            let mut inside = tree.clip_polygons(vec![polygon.clone()]);
            for p in &mut inside {
                p.flip();
            }
            kept.extend(tree.clip_polygons(inside));
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::create_box;
    use glam::DVec3;

    fn cube(min: DVec3, size: f64) -> Mesh {
        create_box(min, min + DVec3::splat(size)).unwrap()
    }

    #[test]
    fn test_components_become_shells() {
        let mut mesh = cube(DVec3::ZERO, 1.0);
        mesh.merge(&cube(DVec3::new(5.0, 0.0, 0.0), 1.0));
        mesh.merge(&cube(DVec3::new(0.0, 5.0, 0.0), 1.0));

        let shells = shells(&mesh, 1e-5);
        assert_eq!(shells.len(), 3);
        assert!(shells.iter().all(|s| s.polygons.len() == 12));
    }

    #[test]
    fn test_overlapping_components_share_a_shell() {
        let mut mesh = cube(DVec3::ZERO, 1.0);
        mesh.merge(&cube(DVec3::splat(0.5), 1.0));
        mesh.merge(&cube(DVec3::new(9.0, 0.0, 0.0), 1.0));

        let mut shells = shells(&mesh, 1e-5);
        shells.sort_by_key(|s| s.polygons.len());
        assert_eq!(shells.len(), 2);
        assert_eq!(shells[1].polygons.len(), 24);
        assert_eq!(shells[1].bounds.max, DVec3::splat(1.5));
    }

    #[test]
    fn test_outside_leaves_far_polygons_whole() {
        let tool = shells(&cube(DVec3::ZERO, 1.0), 1e-5);
        let target = shells(&cube(DVec3::splat(0.5), 10.0), 1e-5);
        let clipper = Clipper::new(&tool, &target, 1e-5);
        assert!(!clipper.is_empty());

        let far = Polygon::new(vec![
            DVec3::new(5.0, 5.0, 3.0),
            DVec3::new(6.0, 5.0, 3.0),
            DVec3::new(6.0, 6.0, 3.0),
        ])
        .unwrap();
        let kept = clipper.outside(vec![far.clone()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].vertices, far.vertices);

        let inner = Polygon::new(vec![
            DVec3::new(0.2, 0.2, 0.5),
            DVec3::new(0.8, 0.2, 0.5),
            DVec3::new(0.8, 0.8, 0.5),
        ])
        .unwrap();
        assert!(clipper.outside(vec![inner.clone()]).is_empty());
        assert!(clipper.inverted().inside_each(&far).is_empty());
    }
}
