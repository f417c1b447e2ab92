//! # CSG Compositor
//!
//! Combines the carrier and every feature solid into one closed mesh.
//!
//! ## Order of operations
//!
//! 1. Jitter every feature pose by a seeded random offset so that no two
//!    solids share exactly coplanar faces
//! 2. Subtract the bore from the carrier
//! 3. Union the additive solids with a balanced reduction tree, then union
//!    the tree with the carrier
//! 4. Union the subtractive solids the same way, then subtract the tree
//!
//! A balanced tree keeps both operands of every boolean about the same
//! size, which keeps BSP depth (and numeric error) down compared to a left
//! fold. Each level's pairs are independent and run on rayon.
//!
//! ## Failure policy
//!
//! A pairwise boolean that errors, returns non-finite vertices, comes back
//! empty from non-empty inputs, or opens up a pair of closed inputs is
//! replaced by its left operand. The failure is counted and the build is
//! marked degraded; it never aborts. Only cancellation aborts.
//!
//! Features inside a right operand that was thrown away are reported in
//! [`Composition::dropped`] by their index in [`Assembly::features`].

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use config::constants::{DEFAULT_JITTER, DEFAULT_JITTER_SEED, WELD_TOLERANCE};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, info_span, warn};

use crate::error::{MeshError, MeshResult};
use crate::factory::Solid;
use crate::layout::FeatureOp;
use crate::mesh::Mesh;
use crate::ops::BooleanKernel;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Compositor settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Half-width of the uniform jitter cube (mm). Zero disables jitter.
    pub jitter: f64,
    /// Seed for the jitter generator.
    pub seed: u64,
    /// Run the pairs of each reduction level on the rayon pool.
    pub parallel: bool,
    /// Weld tolerance handed to the default kernel.
    pub weld_tolerance: f64,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            jitter: DEFAULT_JITTER,
            seed: DEFAULT_JITTER_SEED,
            parallel: true,
            weld_tolerance: WELD_TOLERANCE,
        }
    }
}

// =============================================================================
// INPUT / OUTPUT
// =============================================================================

/// Pairwise boolean kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Difference,
}

impl BooleanOp {
    pub fn name(self) -> &'static str {
        match self {
            BooleanOp::Union => "union",
            BooleanOp::Difference => "difference",
        }
    }
}

/// Everything one plate is built from.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// Carrier in carrier space. Never jittered.
    pub carrier: Mesh,
    /// Bore prism subtracted from the carrier before any feature.
    pub bore: Option<Mesh>,
    /// Feature solids in layout order.
    pub features: Vec<(FeatureOp, Solid)>,
}

/// Boolean bookkeeping for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeStats {
    pub boolean_ops: usize,
    pub failed_ops: usize,
}

impl CompositeStats {
    /// True if any boolean fell back to its left operand.
    pub fn degraded(&self) -> bool {
        self.failed_ops > 0
    }
}

/// Composed mesh and its stats.
#[derive(Debug, Clone)]
pub struct Composition {
    pub mesh: Mesh,
    pub stats: CompositeStats,
    /// Indices of input solids left out of `mesh` by failed booleans,
    /// ascending.
    pub dropped: Vec<usize>,
}

/// A mesh and the input solids merged into it.
struct Part {
    mesh: Mesh,
    members: Vec<usize>,
}

impl Part {
    fn numbered(meshes: Vec<Mesh>) -> Vec<Part> {
        meshes
            .into_iter()
            .enumerate()
            .map(|(i, mesh)| Part {
                mesh,
                members: vec![i],
            })
            .collect()
    }
}

#[derive(Default)]
struct Counters {
    ops: AtomicUsize,
    failed: AtomicUsize,
    dropped: Mutex<Vec<usize>>,
}

impl Counters {
    fn snapshot(&self) -> CompositeStats {
        CompositeStats {
            boolean_ops: self.ops.load(Ordering::Relaxed),
            failed_ops: self.failed.load(Ordering::Relaxed),
        }
    }

    fn drop_members(&self, members: &[usize]) {
        self.dropped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(members);
    }

    fn finish(self, mesh: Mesh) -> Composition {
        let stats = self.snapshot();
        let mut dropped = self.dropped.into_inner().unwrap_or_else(PoisonError::into_inner);
        dropped.sort_unstable();
        Composition {
            mesh,
            stats,
            dropped,
        }
    }
}

// =============================================================================
// JITTER
// =============================================================================

/// Random offsets in `[-magnitude, magnitude]³`, one per solid, in order.
///
/// The same `(count, magnitude, seed)` always yields the same offsets.
pub fn jitter_offsets(count: usize, magnitude: f64, seed: u64) -> Vec<DVec3> {
    if magnitude <= 0.0 || !magnitude.is_finite() {
        return vec![DVec3::ZERO; count];
    }
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            DVec3::new(
                rng.random_range(-magnitude..=magnitude),
                rng.random_range(-magnitude..=magnitude),
                rng.random_range(-magnitude..=magnitude),
            )
        })
        .collect()
}

// =============================================================================
// COMPOSITOR
// =============================================================================

/// Balanced-tree CSG over a [`BooleanKernel`].
pub struct Compositor<'k> {
    kernel: &'k dyn BooleanKernel,
    config: CompositorConfig,
    cancel: CancellationToken,
}

impl<'k> Compositor<'k> {
    pub fn new(kernel: &'k dyn BooleanKernel, config: CompositorConfig) -> Self {
        Self {
            kernel,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Checks `cancel` before every pairwise boolean.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds the final solid from `assembly`.
    pub fn compose(&self, assembly: Assembly) -> MeshResult<Composition> {
        let Assembly {
            carrier,
            bore,
            features,
        } = assembly;
        let span = info_span!("compose", features = features.len(), bore = bore.is_some());
        let _guard = span.enter();

        self.check_cancelled()?;
        let counters = Counters::default();
        let (additive, subtractive) = self.place(features);
        debug!(
            additive = additive.len(),
            subtractive = subtractive.len(),
            "feature solids placed"
        );

        let mut result = carrier;
        if let Some(bore) = bore {
            result = self.combine(&counters, BooleanOp::Difference, result, &bore)?.0;
        }
        for (op, set, parts) in [
            (BooleanOp::Union, "additive", additive),
            (BooleanOp::Difference, "subtractive", subtractive),
        ] {
            let Some(tree) = self.reduce(&counters, parts, set)? else {
                continue;
            };
            let (mesh, combined) = self.combine(&counters, op, result, &tree.mesh)?;
            result = mesh;
            if !combined {
                counters.drop_members(&tree.members);
            }
        }

        let stats = counters.snapshot();
        if stats.degraded() {
            warn!(
                failed_ops = stats.failed_ops,
                boolean_ops = stats.boolean_ops,
                "plate composed with failed booleans"
            );
        } else {
            debug!(
                boolean_ops = stats.boolean_ops,
                triangles = result.triangle_count(),
                "plate composed"
            );
        }
        Ok(counters.finish(result))
    }

    /// Unions `meshes` with the balanced tree.
    pub fn reduce_union(&self, meshes: Vec<Mesh>) -> MeshResult<Composition> {
        let counters = Counters::default();
        let mesh = self
            .reduce(&counters, Part::numbered(meshes), "union")?
            .map(|part| part.mesh)
            .unwrap_or_default();
        Ok(counters.finish(mesh))
    }

    /// Unions `meshes` one after another, left to right.
    ///
    /// Same result as [`Compositor::reduce_union`] up to tolerance; kept as
    /// the reference the balanced tree is checked against.
    pub fn fold_union(&self, meshes: Vec<Mesh>) -> MeshResult<Composition> {
        let counters = Counters::default();
        let mut iter = meshes.into_iter().enumerate();
        let mut acc = iter.next().map(|(_, mesh)| mesh).unwrap_or_default();
        for (i, mesh) in iter {
            let (merged, combined) = self.combine(&counters, BooleanOp::Union, acc, &mesh)?;
            acc = merged;
            if !combined {
                counters.drop_members(&[i]);
            }
        }
        Ok(counters.finish(acc))
    }

    /// Jitters and bakes every feature pose, split by role.
    fn place(&self, features: Vec<(FeatureOp, Solid)>) -> (Vec<Part>, Vec<Part>) {
        let offsets = jitter_offsets(features.len(), self.config.jitter, self.config.seed);
        let bake = |((op, solid), offset): ((FeatureOp, Solid), DVec3)| {
            let posed = Solid::new(solid.mesh, solid.pose.translated(offset));
            (op, posed.to_world())
        };

        let placed: Vec<(FeatureOp, Mesh)> = if self.config.parallel {
            features.into_par_iter().zip(offsets).map(bake).collect()
        } else {
            features.into_iter().zip(offsets).map(bake).collect()
        };

        let mut additive = Vec::new();
        let mut subtractive = Vec::new();
        for (i, (op, mesh)) in placed.into_iter().enumerate() {
            let part = Part {
                mesh,
                members: vec![i],
            };
            match op {
                FeatureOp::Union => additive.push(part),
                FeatureOp::Subtract => subtractive.push(part),
            }
        }
        (additive, subtractive)
    }

    /// Unions a list level by level until one mesh remains.
    fn reduce(
        &self,
        counters: &Counters,
        mut list: Vec<Part>,
        set: &'static str,
    ) -> MeshResult<Option<Part>> {
        let mut level = 0usize;
        while list.len() > 1 {
            let _level = debug_span!("reduce_level", set, level, operands = list.len()).entered();
            let pairs = pair_up(list);
            let merge = |(mut left, right): (Part, Option<Part>)| -> MeshResult<Part> {
                let Some(right) = right else {
                    return Ok(left);
                };
                let (mesh, combined) = self.combine(counters, BooleanOp::Union, left.mesh, &right.mesh)?;
                left.mesh = mesh;
                if combined {
                    left.members.extend(right.members);
                } else {
                    counters.drop_members(&right.members);
                }
                Ok(left)
            };
            list = if self.config.parallel {
                pairs.into_par_iter().map(merge).collect::<MeshResult<Vec<_>>>()?
            } else {
                pairs.into_iter().map(merge).collect::<MeshResult<Vec<_>>>()?
            };
            level += 1;
        }
        Ok(list.pop())
    }

    /// One pairwise boolean with the fallback policy applied. The flag is
    /// false when the left operand came back unchanged.
    fn combine(
        &self,
        counters: &Counters,
        op: BooleanOp,
        left: Mesh,
        right: &Mesh,
    ) -> MeshResult<(Mesh, bool)> {
        self.check_cancelled()?;
        counters.ops.fetch_add(1, Ordering::Relaxed);

        let outcome = match op {
            BooleanOp::Union => self.kernel.union(&left, right),
            BooleanOp::Difference => self.kernel.difference(&left, right),
        };
        let reason = match outcome {
            Ok(mesh) => match rejection(op, &mesh, &left, right) {
                None => return Ok((mesh, true)),
                Some(reason) => reason.to_string(),
            },
            Err(MeshError::Cancelled) => return Err(MeshError::Cancelled),
            Err(err) => err.to_string(),
        };

        counters.failed.fetch_add(1, Ordering::Relaxed);
        warn!(
            operation = op.name(),
            reason = %reason,
            left_triangles = left.triangle_count(),
            right_triangles = right.triangle_count(),
            "boolean failed, keeping left operand"
        );
        Ok((left, false))
    }

    fn check_cancelled(&self) -> MeshResult<()> {
        if self.cancel.is_cancelled() {
            return Err(MeshError::Cancelled);
        }
        Ok(())
    }
}

/// Why a kernel result is unusable, if it is.
fn rejection(op: BooleanOp, result: &Mesh, left: &Mesh, right: &Mesh) -> Option<&'static str> {
    if !result.is_finite() {
        return Some("non-finite result");
    }
    let may_be_empty = match op {
        BooleanOp::Union => left.is_empty() && right.is_empty(),
        BooleanOp::Difference => left.is_empty(),
    };
    if result.is_empty() && !may_be_empty {
        return Some("empty result");
    }
    (!result.is_closed() && left.is_closed() && right.is_closed()).then_some("open result")
}

/// `[a, b, c, d, e]` → `[(a, b), (c, d), (e, -)]`.
fn pair_up<T>(list: Vec<T>) -> Vec<(T, Option<T>)> {
    let mut pairs = Vec::with_capacity(list.len().div_ceil(2));
    let mut iter = list.into_iter();
    while let Some(left) = iter.next() {
        pairs.push((left, iter.next()));
    }
    pairs
}
