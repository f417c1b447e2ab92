//! # Profile Revolution
//!
//! Sweeps a 2D profile a full turn around the Z axis.
//!
//! ## Algorithm
//!
//! 1. The profile is an open polyline in the (r, z) half-plane, running from
//!    a point on the axis up the outside of the solid back to the axis
//! 2. The two axis points become single pole vertices
//! 3. Every interior point becomes a ring of `segments` vertices
//! 4. Neighbouring rings are joined by quad bands, poles by triangle fans
//!
//! The result is closed with no duplicated seam, so it needs no welding.

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use glam::{DVec2, DVec3};

/// Revolves an axis-to-axis profile around Z.
///
/// `profile[i] = (radius, z)`. The first and last points must lie on the
/// axis (radius 0), every other point strictly off it.
///
/// # Example
///
/// ```rust
/// use braille_mesh::primitives::revolve_profile;
/// use glam::DVec2;
///
/// // Closed cylinder of radius 1, height 2
/// let profile = [
///     DVec2::new(0.0, 0.0),
///     DVec2::new(1.0, 0.0),
///     DVec2::new(1.0, 2.0),
///     DVec2::new(0.0, 2.0),
/// ];
/// let mesh = revolve_profile(&profile, 16).unwrap();
/// assert_eq!(mesh.vertex_count(), 2 + 2 * 16);
/// assert!(mesh.is_closed());
/// ```
pub fn revolve_profile(profile: &[DVec2], segments: u32) -> MeshResult<Mesh> {
    if segments < 3 {
        return Err(MeshError::degenerate(format!(
            "revolution needs at least 3 segments, got {segments}"
        )));
    }
    if profile.len() < 3 {
        return Err(MeshError::degenerate(
            "revolution profile needs two poles and one ring",
        ));
    }
    if profile.iter().any(|p| !p.is_finite()) {
        return Err(MeshError::degenerate("revolution profile is not finite"));
    }

    let (first, last) = (profile[0], profile[profile.len() - 1]);
    if first.x != 0.0 || last.x != 0.0 {
        return Err(MeshError::degenerate(
            "revolution profile must start and end on the axis",
        ));
    }
    let rings = &profile[1..profile.len() - 1];
    if rings.iter().any(|p| p.x <= 0.0) {
        return Err(MeshError::degenerate(
            "revolution profile interior must stay off the axis",
        ));
    }

    let n = segments as usize;
    let mut mesh = Mesh::with_capacity(2 + rings.len() * n, 2 * rings.len() * n);

    let bottom = mesh.add_vertex(DVec3::new(0.0, 0.0, first.y));
    let angles: Vec<(f64, f64)> = (0..n)
        .map(|j| (std::f64::consts::TAU * j as f64 / n as f64).sin_cos())
        .collect();
    for p in rings {
        for &(sin, cos) in &angles {
            mesh.add_vertex(DVec3::new(p.x * cos, p.x * sin, p.y));
        }
    }
    let top = mesh.add_vertex(DVec3::new(0.0, 0.0, last.y));

    let ring = |i: usize, j: usize| (1 + i * n + j % n) as u32;

    for j in 0..n {
        mesh.add_triangle(bottom, ring(0, j + 1), ring(0, j));
    }
    for i in 0..rings.len() - 1 {
        for j in 0..n {
            mesh.add_triangle(ring(i, j), ring(i, j + 1), ring(i + 1, j + 1));
            mesh.add_triangle(ring(i, j), ring(i + 1, j + 1), ring(i + 1, j));
        }
    }
    let last_ring = rings.len() - 1;
    for j in 0..n {
        mesh.add_triangle(ring(last_ring, j), ring(last_ring, j + 1), top);
    }

    Ok(mesh)
}
