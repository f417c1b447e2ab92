//! # Dot Primitives
//!
//! Raised dot (post plus dome) and recessed bowl, both built as a single
//! revolved profile so each is one closed solid.
//!
//! Both solids reach `embed` past the carrier surface (below it for the
//! raised dot, above it for the bowl) so no face lies on the surface.

use glam::DVec2;

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::spec::{DotSpec, Resolution};

use super::revolve::revolve_profile;

/// Number of latitude bands for a dome or bowl with `facets` segments.
#[inline]
fn latitude_bands(facets: u32) -> usize {
    (facets as usize / 4).max(2)
}

/// Raised braille dot in its local frame, surface at z = 0.
///
/// A post of radius `base_diameter / 2` from `z = −embed` to `cap_height`,
/// then a hemisphere scaled to `dome_height`, sharing the post's top ring.
///
/// # Example
///
/// ```rust
/// use braille_mesh::primitives::raised_dot;
/// use braille_mesh::spec::{DotSpec, Resolution};
///
/// let mesh = raised_dot(&DotSpec::default(), 0.2, &Resolution::default()).unwrap();
/// assert!(mesh.is_closed());
/// let (_, max) = mesh.bounding_box();
/// assert!((max.z - 0.8).abs() < 1e-12);
/// ```
pub fn raised_dot(dot: &DotSpec, embed: f64, resolution: &Resolution) -> MeshResult<Mesh> {
    let radius = dot.base_diameter * 0.5;
    if !(radius > 0.0) || !(dot.dome_height > 0.0) || !(dot.cap_height >= 0.0) {
        return Err(MeshError::degenerate(format!(
            "dot needs positive diameter and dome height: {dot:?}"
        )));
    }

    let facets = resolution.facets(radius);
    let bands = latitude_bands(facets);
    let top = dot.cap_height;

    let mut profile = Vec::with_capacity(bands + 4);
    profile.push(DVec2::new(0.0, -embed));
    profile.push(DVec2::new(radius, -embed));
    profile.push(DVec2::new(radius, top));
    for k in 1..bands {
        let phi = std::f64::consts::FRAC_PI_2 * k as f64 / bands as f64;
        let (sin, cos) = phi.sin_cos();
        profile.push(DVec2::new(radius * cos, top + dot.dome_height * sin));
    }
    profile.push(DVec2::new(0.0, top + dot.dome_height));

    revolve_profile(&profile, facets)
}

/// Recess bowl in its local frame, floor at z = 0.
///
/// A spherical cap of rim radius `radius` and depth `depth` (clamped to
/// `(0, radius]`; equal values give a hemisphere), followed by a straight
/// lip rising `embed` above the rim.
pub fn recess_bowl(radius: f64, depth: f64, embed: f64, resolution: &Resolution) -> MeshResult<Mesh> {
    if !(radius > 0.0) || !(depth > 0.0) || !(embed > 0.0) {
        return Err(MeshError::degenerate(format!(
            "recess needs positive radius, depth and lip: r={radius}, d={depth}, lip={embed}"
        )));
    }
    let depth = depth.min(radius);
    let sphere_radius = (radius * radius + depth * depth) / (2.0 * depth);
    let max_angle = radius.atan2(sphere_radius - depth);

    let facets = resolution.facets(radius);
    let bands = latitude_bands(facets);

    let mut profile = Vec::with_capacity(bands + 3);
    profile.push(DVec2::ZERO);
    for k in 1..bands {
        let alpha = max_angle * k as f64 / bands as f64;
        let (sin, cos) = alpha.sin_cos();
        profile.push(DVec2::new(
            sphere_radius * sin,
            sphere_radius * (1.0 - cos),
        ));
    }
    profile.push(DVec2::new(radius, depth));
    profile.push(DVec2::new(radius, depth + embed));
    profile.push(DVec2::new(0.0, depth + embed));

    revolve_profile(&profile, facets)
}
