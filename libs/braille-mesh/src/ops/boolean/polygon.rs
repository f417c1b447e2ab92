//! # Polygon for BSP Operations
//!
//! Convex polygon with plane and splitting support.

use glam::DVec3;

use super::plane::{Plane, Side};
use super::BoundingBox;

/// A convex polygon with its supporting plane.
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Vertices in counter-clockwise order seen from the front.
    pub vertices: Vec<DVec3>,
    pub plane: Plane,
}

impl Polygon {
    /// Creates a polygon, taking the plane from its first three vertices.
    ///
    /// Returns `None` for fewer than three vertices or a degenerate start.
    pub fn new(vertices: Vec<DVec3>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])?;
        Some(Self { vertices, plane })
    }

    /// Reverses winding and plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// Splits this polygon by `plane` into the four output lists.
    ///
    /// Coplanar polygons go to `coplanar_front` or `coplanar_back` by facing.
    /// Spanning polygons are cut in two; pieces keep the parent's plane.
    pub fn split(
        self,
        plane: &Plane,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let sides: Vec<Side> = self.vertices.iter().map(|&v| plane.classify(v)).collect();
        let class = Side::from_bits(sides.iter().fold(0u8, |acc, &s| acc | s as u8));

        match class {
            Side::Coplanar => {
                if self.plane.normal.dot(plane.normal) > 0.0 {
                    coplanar_front.push(self);
                } else {
                    coplanar_back.push(self);
                }
            }
            Side::Front => front.push(self),
            Side::Back => back.push(self),
            Side::Spanning => {
                let n = self.vertices.len();
                let mut f = Vec::with_capacity(n + 1);
                let mut b = Vec::with_capacity(n + 1);

                for i in 0..n {
                    let j = (i + 1) % n;
                    let (si, sj) = (sides[i], sides[j]);
                    let (vi, vj) = (self.vertices[i], self.vertices[j]);

                    if si != Side::Back {
                        f.push(vi);
                    }
                    if si != Side::Front {
                        b.push(vi);
                    }
                    if Side::from_bits(si as u8 | sj as u8) == Side::Spanning {
                        let t = (plane.w - plane.normal.dot(vi)) / plane.normal.dot(vj - vi);
                        let v = vi.lerp(vj, t);
                        f.push(v);
                        b.push(v);
                    }
                }

                if f.len() >= 3 {
                    front.push(Polygon {
                        vertices: f,
                        plane: self.plane,
                    });
                }
                if b.len() >= 3 {
                    back.push(Polygon {
                        vertices: b,
                        plane: self.plane,
                    });
                }
            }
        }
    }
}
