//! # Generation Pipeline
//!
//! One synchronous call from braille lines to a finished solid:
//!
//! ```text
//! PlateSpec ──sanitize──▶ layout ──▶ SolidFactory ──▶ Compositor ──▶ CompositeResult
//! ```
//!
//! Diagnostics travel back with the mesh instead of being logged as side
//! effects only.
//!
//! ## Example
//!
//! ```rust,no_run
//! use braille_mesh::pipeline::generate_default;
//! use braille_mesh::spec::PlateSpec;
//!
//! let result = generate_default(&PlateSpec::default(), &["⠁⠃"]).unwrap();
//! assert_eq!(result.diagnostics.dot_count, 3);
//! ```

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::compositor::{Assembly, CompositeStats, Compositor, CompositorConfig};
use crate::error::MeshResult;
use crate::factory::SolidFactory;
use crate::layout::{layout, Feature, FeatureKind, FeatureOp};
use crate::mesh::Mesh;
use crate::ops::{BooleanKernel, BspKernel};
use crate::spec::PlateSpec;
use crate::timing::StageTimer;

/// What one generation produced and how it went.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Raised dots.
    pub dot_count: usize,
    /// Row start and end markers, raised or recessed.
    pub indicator_count: usize,
    /// Recessed dots.
    pub recess_count: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub boolean_ops: usize,
    pub failed_ops: usize,
    /// Some boolean fell back to its left operand.
    pub degraded: bool,
    /// Lines came from the pass-through mapping, not the translator.
    pub translation_fallback: bool,
    pub elapsed_ms: f64,
}

impl Diagnostics {
    /// Counts come from `combined`, the features whose solids made it into
    /// `mesh`. A feature dropped by a failed boolean is not counted.
    fn new(combined: &[&Feature], mesh: &Mesh, stats: CompositeStats, elapsed_ms: f64) -> Self {
        let count = |wanted: fn(&Feature) -> bool| combined.iter().filter(|f| wanted(f)).count();
        Self {
            dot_count: count(|f| f.kind == FeatureKind::Dot && f.op == FeatureOp::Union),
            indicator_count: count(|f| {
                matches!(f.kind, FeatureKind::IndicatorStart | FeatureKind::IndicatorEnd)
            }),
            recess_count: count(|f| f.kind == FeatureKind::Dot && f.op == FeatureOp::Subtract),
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            boolean_ops: stats.boolean_ops,
            failed_ops: stats.failed_ops,
            degraded: stats.degraded(),
            translation_fallback: false,
            elapsed_ms,
        }
    }
}

/// Final solid plus diagnostics.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    pub mesh: Mesh,
    pub diagnostics: Diagnostics,
}

/// Builds a plate with the default BSP kernel.
pub fn generate<S: AsRef<str>>(
    spec: &PlateSpec,
    lines: &[S],
    config: &CompositorConfig,
    cancel: &CancellationToken,
) -> MeshResult<CompositeResult> {
    let kernel = BspKernel {
        weld_tolerance: config.weld_tolerance,
    };
    generate_with_kernel(spec, lines, config, &kernel, cancel)
}

/// Builds a plate with default compositor settings and no cancellation.
pub fn generate_default<S: AsRef<str>>(spec: &PlateSpec, lines: &[S]) -> MeshResult<CompositeResult> {
    generate(spec, lines, &CompositorConfig::default(), &CancellationToken::new())
}

/// Builds a plate with a caller-supplied kernel.
///
/// # Errors
///
/// - [`crate::MeshError::NonFiniteParameter`] if a plate parameter is NaN or infinite
/// - [`crate::MeshError::Cancelled`] if `cancel` fires before the last boolean
pub fn generate_with_kernel<S: AsRef<str>>(
    spec: &PlateSpec,
    lines: &[S],
    config: &CompositorConfig,
    kernel: &dyn BooleanKernel,
    cancel: &CancellationToken,
) -> MeshResult<CompositeResult> {
    let timer = StageTimer::new("generate");
    let _enter = timer.span().enter();

    let spec = spec.sanitized()?;
    let features = layout(&spec, lines);

    let factory = SolidFactory::new(&spec)?;
    let carrier = factory.carrier()?;
    let bore = if features.iter().any(|f| f.kind == FeatureKind::Bore) {
        factory.bore()?
    } else {
        None
    };
    let (solid_features, solids): (Vec<&Feature>, Vec<_>) = features
        .iter()
        .filter_map(|feature| {
            factory
                .feature_solid(feature)
                .map(|solid| (feature, (feature.op, solid)))
        })
        .unzip();

    let composition = Compositor::new(kernel, *config)
        .with_cancellation(cancel.clone())
        .compose(Assembly {
            carrier,
            bore,
            features: solids,
        })?;

    let combined: Vec<&Feature> = solid_features
        .iter()
        .enumerate()
        .filter(|(i, _)| composition.dropped.binary_search(i).is_err())
        .map(|(_, &feature)| feature)
        .collect();
    let diagnostics = Diagnostics::new(
        &combined,
        &composition.mesh,
        composition.stats,
        timer.elapsed_ms(),
    );
    info!(
        carrier = ?spec.carrier.kind(),
        mode = ?spec.mode,
        dots = diagnostics.dot_count,
        recesses = diagnostics.recess_count,
        indicators = diagnostics.indicator_count,
        triangles = diagnostics.triangle_count,
        degraded = diagnostics.degraded,
        "plate generated"
    );

    Ok(CompositeResult {
        mesh: composition.mesh,
        diagnostics,
    })
}
