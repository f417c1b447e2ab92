//! # BSP Tree
//!
//! Binary Space Partitioning tree for CSG boolean operations.
//! Based on the csg.js algorithm by Evan Wallace.
//!
//! ## Algorithm
//!
//! Each BSP node contains:
//! - A dividing plane
//! - Polygons coplanar with the plane
//! - Front subtree (polygons in front of plane)
//! - Back subtree (polygons behind plane)
//!
//! ## Stack Safety
//!
//! Nodes live in an arena (`Vec<Node>`) addressed by index, and every
//! operation walks it with an explicit work stack. Deep trees from large
//! plates never recurse on the thread stack.

use super::plane::Plane;
use super::polygon::Polygon;

#[derive(Debug, Clone, Default)]
struct Node {
    plane: Option<Plane>,
    polygons: Vec<Polygon>,
    front: Option<usize>,
    back: Option<usize>,
}

/// A BSP tree over convex polygons.
///
/// Node 0 is the root.
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<Node>,
}

impl BspTree {
    /// Builds a tree from polygons.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut tree = Self {
            nodes: vec![Node::default()],
        };
        tree.build(polygons);
        tree
    }

    /// Number of nodes.
    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts polygons into the tree, splitting as needed.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        let mut stack = vec![(0usize, polygons)];

        while let Some((index, polygons)) = stack.pop() {
            if polygons.is_empty() {
                continue;
            }

            let plane = match self.nodes[index].plane {
                Some(plane) => plane,
                None => {
                    let plane = polygons[0].plane;
                    self.nodes[index].plane = Some(plane);
                    plane
                }
            };

            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            let mut front = Vec::new();
            let mut back = Vec::new();
            for polygon in polygons {
                polygon.split(
                    &plane,
                    &mut coplanar_front,
                    &mut coplanar_back,
                    &mut front,
                    &mut back,
                );
            }

            let node = &mut self.nodes[index];
            node.polygons.append(&mut coplanar_front);
            node.polygons.append(&mut coplanar_back);

            if !front.is_empty() {
                let child = self.child(index, true);
                stack.push((child, front));
            }
            if !back.is_empty() {
                let child = self.child(index, false);
                stack.push((child, back));
            }
        }
    }

    /// Returns the front or back child of `index`, creating it if missing.
    fn child(&mut self, index: usize, front: bool) -> usize {
        let existing = if front {
            self.nodes[index].front
        } else {
            self.nodes[index].back
        };
        if let Some(child) = existing {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(Node::default());
        if front {
            self.nodes[index].front = Some(child);
        } else {
            self.nodes[index].back = Some(child);
        }
        child
    }

    /// Converts solid space to empty space and back.
    ///
    /// Flips every polygon and plane and swaps front and back subtrees.
    pub fn invert(&mut self) {
        for node in &mut self.nodes {
            for polygon in &mut node.polygons {
                polygon.flip();
            }
            if let Some(plane) = &mut node.plane {
                plane.flip();
            }
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Removes the parts of `polygons` that lie inside this tree's solid.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let mut result = Vec::new();
        let mut stack = vec![(0usize, polygons)];

        while let Some((index, polygons)) = stack.pop() {
            let node = &self.nodes[index];
            let Some(plane) = node.plane else {
                result.extend(polygons);
                continue;
            };

            let mut front = Vec::new();
            let mut back = Vec::new();
            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            for polygon in polygons {
                polygon.split(
                    &plane,
                    &mut coplanar_front,
                    &mut coplanar_back,
                    &mut front,
                    &mut back,
                );
            }
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);

            match node.front {
                Some(child) if !front.is_empty() => stack.push((child, front)),
                Some(_) => {}
                None => result.extend(front),
            }
            // Without a back subtree the back side is solid: drop.
            if let Some(child) = node.back {
                if !back.is_empty() {
                    stack.push((child, back));
                }
            }
        }

        result
    }

    /// Collects every polygon in the tree.
    #[cfg(test)]
    pub fn all_polygons(&self) -> Vec<Polygon> {
        self.nodes
            .iter()
            .flat_map(|node| node.polygons.iter().cloned())
            .collect()
    }
}
