//! # Solid Factory
//!
//! Turns mapped features into posed solids.
//!
//! Templates for the raised dot, the recess bowl and both indicator prisms
//! are built once per plate; each feature gets a clone placed by its pose.

use config::constants::EMBED_OVERLAP;
use tracing::debug;

use crate::error::MeshResult;
use crate::layout::{Feature, FeatureKind, FeatureOp};
use crate::mesh::Mesh;
use crate::primitives::{self, indicator};
use crate::spec::{CarrierSpec, PlateSpec};
use crate::surface::{map_feature, Pose};

/// A closed mesh in its local frame plus its placement on the carrier.
#[derive(Debug, Clone)]
pub struct Solid {
    pub mesh: Mesh,
    pub pose: Pose,
}

impl Solid {
    pub fn new(mesh: Mesh, pose: Pose) -> Self {
        Self { mesh, pose }
    }

    /// Solid already in carrier space.
    pub fn unposed(mesh: Mesh) -> Self {
        Self::new(mesh, Pose::IDENTITY)
    }

    /// Returns the mesh with the pose baked into its vertices.
    pub fn to_world(&self) -> Mesh {
        let mut mesh = self.mesh.clone();
        mesh.transform(&self.pose.to_affine());
        mesh
    }
}

/// Per-plate primitive templates.
#[derive(Debug)]
pub struct SolidFactory<'a> {
    spec: &'a PlateSpec,
    dot: Mesh,
    recess: Mesh,
    start_raised: Mesh,
    start_recessed: Mesh,
    end_raised: Mesh,
    end_recessed: Mesh,
}

impl<'a> SolidFactory<'a> {
    /// Builds every template for `spec`.
    ///
    /// Fails if a primitive would be degenerate, which only happens for
    /// specs that skipped [`PlateSpec::sanitized`].
    pub fn new(spec: &'a PlateSpec) -> MeshResult<Self> {
        let embed = EMBED_OVERLAP;
        let start = indicator::start_outline(spec);
        let end = indicator::end_outline(spec);

        let factory = Self {
            spec,
            dot: primitives::raised_dot(&spec.dot, embed, &spec.resolution)?,
            recess: primitives::recess_bowl(
                spec.recess_radius(),
                spec.recess.depth,
                embed,
                &spec.resolution,
            )?,
            start_raised: indicator::raised_indicator(&start, spec, embed)?,
            start_recessed: indicator::recessed_indicator(&start, spec, embed)?,
            end_raised: indicator::raised_indicator(&end, spec, embed)?,
            end_recessed: indicator::recessed_indicator(&end, spec, embed)?,
        };

        debug!(
            dot_triangles = factory.dot.triangle_count(),
            recess_triangles = factory.recess.triangle_count(),
            "solid templates built"
        );
        Ok(factory)
    }

    /// Base carrier without the bore.
    pub fn carrier(&self) -> MeshResult<Mesh> {
        match &self.spec.carrier {
            CarrierSpec::Flat(flat) => primitives::flat_carrier(flat),
            CarrierSpec::Cylinder(cyl) => primitives::cylinder_carrier(cyl, &self.spec.resolution),
        }
    }

    /// Bore prism, if the carrier has one.
    pub fn bore(&self) -> MeshResult<Option<Mesh>> {
        match &self.spec.carrier {
            CarrierSpec::Cylinder(cyl) => cyl
                .bore
                .as_ref()
                .map(|bore| primitives::bore_prism(bore, cyl.height))
                .transpose(),
            CarrierSpec::Flat(_) => Ok(None),
        }
    }

    /// Posed solid for a surface feature. Returns `None` for bores, which
    /// belong to the carrier.
    pub fn feature_solid(&self, feature: &Feature) -> Option<Solid> {
        let template = match (feature.kind, feature.op) {
            (FeatureKind::Bore, _) => return None,
            (FeatureKind::Dot, FeatureOp::Union) => &self.dot,
            (FeatureKind::Dot, FeatureOp::Subtract) => &self.recess,
            (FeatureKind::IndicatorStart, FeatureOp::Union) => &self.start_raised,
            (FeatureKind::IndicatorStart, FeatureOp::Subtract) => &self.start_recessed,
            (FeatureKind::IndicatorEnd, FeatureOp::Union) => &self.end_raised,
            (FeatureKind::IndicatorEnd, FeatureOp::Subtract) => &self.end_recessed,
        };
        Some(Solid::new(template.clone(), map_feature(self.spec, feature)))
    }
}
