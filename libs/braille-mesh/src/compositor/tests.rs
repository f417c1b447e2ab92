//! Tests for the compositor

use super::*;
use crate::ops::BspKernel;
use crate::primitives::create_box;
use crate::surface::Pose;
use approx::assert_abs_diff_eq;

// =============================================================================
// HELPERS
// =============================================================================

fn no_jitter() -> CompositorConfig {
    CompositorConfig {
        jitter: 0.0,
        ..Default::default()
    }
}

fn diagonal_cubes(count: usize) -> Vec<Mesh> {
    (0..count)
        .map(|i| {
            let min = DVec3::splat(i as f64 * 0.7);
            create_box(min, min + DVec3::ONE).unwrap()
        })
        .collect()
}

fn plate() -> Mesh {
    create_box(DVec3::ZERO, DVec3::new(10.0, 10.0, 2.0)).unwrap()
}

/// Box sitting on the plate top at `(x, y)`, embedded 0.2 below it.
fn bump(x: f64, y: f64) -> Solid {
    let mesh = create_box(DVec3::new(-0.5, -0.5, -0.2), DVec3::new(0.5, 0.5, 0.8)).unwrap();
    Solid::new(mesh, Pose::at(DVec3::new(x, y, 2.0)))
}

/// Box cutting 0.5 into the plate top at `(x, y)`.
fn pit(x: f64, y: f64) -> Solid {
    let mesh = create_box(DVec3::new(-0.5, -0.5, 0.0), DVec3::new(0.5, 0.5, 0.7)).unwrap();
    Solid::new(mesh, Pose::at(DVec3::new(x, y, 1.5)))
}

/// Kernel whose operations fail on demand.
struct Flaky {
    inner: BspKernel,
    fail_union: bool,
    fail_difference: bool,
    empty_instead: bool,
}

impl Flaky {
    fn failing_difference() -> Self {
        Self {
            inner: BspKernel::default(),
            fail_union: false,
            fail_difference: true,
            empty_instead: false,
        }
    }

    fn failing_everything() -> Self {
        Self {
            inner: BspKernel::default(),
            fail_union: true,
            fail_difference: true,
            empty_instead: false,
        }
    }

    fn outcome(&self, op: &'static str) -> MeshResult<Mesh> {
        if self.empty_instead {
            Ok(Mesh::new())
        } else {
            Err(MeshError::boolean_failed(op, "injected"))
        }
    }
}

impl BooleanKernel for Flaky {
    fn union(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
        if self.fail_union {
            return self.outcome("union");
        }
        self.inner.union(a, b)
    }

    fn difference(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
        if self.fail_difference {
            return self.outcome("difference");
        }
        self.inner.difference(a, b)
    }
}

/// Kernel whose unions come back with one triangle missing.
struct Leaky {
    inner: BspKernel,
}

impl BooleanKernel for Leaky {
    fn union(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
        let (vertices, mut triangles) = self.inner.union(a, b)?.into_parts();
        triangles.pop();
        Ok(Mesh::from_parts(vertices, triangles))
    }

    fn difference(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
        self.inner.difference(a, b)
    }
}

// =============================================================================
// REDUCTION
// =============================================================================

#[test]
fn test_balanced_matches_left_fold() {
    let kernel = BspKernel::default();
    let compositor = Compositor::new(&kernel, no_jitter());

    let balanced = compositor.reduce_union(diagonal_cubes(4)).unwrap();
    let folded = compositor.fold_union(diagonal_cubes(4)).unwrap();

    // Neighbours overlap in a 0.3³ cube; cubes two apart do not touch.
    let expected = 4.0 - 3.0 * 0.027;
    assert_abs_diff_eq!(balanced.mesh.volume(), expected, epsilon = 1e-9);
    assert_abs_diff_eq!(folded.mesh.volume(), expected, epsilon = 1e-9);
    assert!(balanced.mesh.is_closed());
    assert!(folded.mesh.is_closed());

    let (bmin, bmax) = balanced.mesh.bounding_box();
    let (fmin, fmax) = folded.mesh.bounding_box();
    assert_abs_diff_eq!(bmin, fmin, epsilon = 1e-9);
    assert_abs_diff_eq!(bmax, fmax, epsilon = 1e-9);

    assert_eq!(balanced.stats.boolean_ops, 3);
    assert_eq!(folded.stats.boolean_ops, 3);
    assert!(!balanced.stats.degraded());
}

#[test]
fn test_reduce_odd_count() {
    let kernel = BspKernel::default();
    let compositor = Compositor::new(&kernel, no_jitter());
    let result = compositor.reduce_union(diagonal_cubes(5)).unwrap();
    assert_abs_diff_eq!(result.mesh.volume(), 5.0 - 4.0 * 0.027, epsilon = 1e-9);
    assert_eq!(result.stats.boolean_ops, 4);
}

#[test]
fn test_reduce_empty_and_single() {
    let kernel = BspKernel::default();
    let compositor = Compositor::new(&kernel, no_jitter());

    let empty = compositor.reduce_union(Vec::new()).unwrap();
    assert!(empty.mesh.is_empty());
    assert_eq!(empty.stats.boolean_ops, 0);

    let single = compositor.reduce_union(diagonal_cubes(1)).unwrap();
    assert_eq!(single.mesh, diagonal_cubes(1)[0]);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let kernel = BspKernel::default();
    let parallel = Compositor::new(&kernel, no_jitter());
    let sequential = Compositor::new(
        &kernel,
        CompositorConfig {
            parallel: false,
            ..no_jitter()
        },
    );

    let a = parallel.reduce_union(diagonal_cubes(6)).unwrap();
    let b = sequential.reduce_union(diagonal_cubes(6)).unwrap();
    assert_eq!(a.mesh, b.mesh);
}

// =============================================================================
// COMPOSE
// =============================================================================

#[test]
fn test_compose_carrier_only() {
    let kernel = BspKernel::default();
    let compositor = Compositor::new(&kernel, CompositorConfig::default());
    let result = compositor
        .compose(Assembly {
            carrier: plate(),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(result.mesh, plate());
    assert_eq!(result.stats, CompositeStats::default());
}

#[test]
fn test_compose_bumps_and_pits() {
    let kernel = BspKernel::default();
    let compositor = Compositor::new(&kernel, no_jitter());
    let result = compositor
        .compose(Assembly {
            carrier: plate(),
            bore: None,
            features: vec![
                (FeatureOp::Union, bump(2.0, 2.0)),
                (FeatureOp::Subtract, pit(5.0, 5.0)),
                (FeatureOp::Union, bump(8.0, 8.0)),
                (FeatureOp::Subtract, pit(8.0, 2.0)),
            ],
        })
        .unwrap();

    assert!(result.mesh.is_closed());
    assert_abs_diff_eq!(result.mesh.volume(), 200.0 + 2.0 * 0.8 - 2.0 * 0.5, epsilon = 1e-9);
    // Two tree unions, carrier union, carrier difference
    assert_eq!(result.stats.boolean_ops, 4);
    assert!(!result.stats.degraded());
    assert!(result.dropped.is_empty());
}

#[test]
fn test_compose_subtracts_bore_first() {
    let kernel = BspKernel::default();
    let compositor = Compositor::new(&kernel, no_jitter());
    let carrier = create_box(DVec3::ZERO, DVec3::new(4.0, 4.0, 2.0)).unwrap();
    let bore = create_box(DVec3::new(1.0, 1.0, -1.0), DVec3::new(3.0, 3.0, 3.0)).unwrap();

    let result = compositor
        .compose(Assembly {
            carrier,
            bore: Some(bore),
            features: Vec::new(),
        })
        .unwrap();

    assert!(result.mesh.is_closed());
    assert_abs_diff_eq!(result.mesh.volume(), 32.0 - 8.0, epsilon = 1e-9);
    assert_eq!(result.stats.boolean_ops, 1);
}

#[test]
fn test_compose_with_jitter_stays_close() {
    let kernel = BspKernel::default();
    let compositor = Compositor::new(&kernel, CompositorConfig::default());
    let result = compositor
        .compose(Assembly {
            carrier: plate(),
            bore: None,
            features: vec![(FeatureOp::Union, bump(5.0, 5.0))],
        })
        .unwrap();

    assert!(result.mesh.is_closed());
    let (_, max) = result.mesh.bounding_box();
    assert_abs_diff_eq!(max.z, 2.8, epsilon = DEFAULT_JITTER + 1e-12);
    // Jitter moves the bump but not how much of it sits above the plate
    // by more than the jitter band.
    assert_abs_diff_eq!(result.mesh.volume(), 200.8, epsilon = 2.0 * DEFAULT_JITTER);
}

// =============================================================================
// FAILURE POLICY
// =============================================================================

#[test]
fn test_failed_difference_keeps_accumulated_geometry() {
    let kernel = Flaky::failing_difference();
    let compositor = Compositor::new(&kernel, no_jitter());
    let result = compositor
        .compose(Assembly {
            carrier: plate(),
            bore: None,
            features: vec![
                (FeatureOp::Union, bump(5.0, 5.0)),
                (FeatureOp::Subtract, pit(2.0, 2.0)),
            ],
        })
        .unwrap();

    assert!(result.mesh.is_closed());
    assert_abs_diff_eq!(result.mesh.volume(), 200.8, epsilon = 1e-9);
    assert_eq!(result.stats.boolean_ops, 2);
    assert_eq!(result.stats.failed_ops, 1);
    assert!(result.stats.degraded());
    assert_eq!(result.dropped, vec![1]);
}

#[test]
fn test_everything_failing_returns_carrier() {
    let kernel = Flaky::failing_everything();
    let compositor = Compositor::new(&kernel, no_jitter());
    let result = compositor
        .compose(Assembly {
            carrier: plate(),
            bore: None,
            features: vec![
                (FeatureOp::Union, bump(2.0, 2.0)),
                (FeatureOp::Union, bump(5.0, 5.0)),
                (FeatureOp::Union, bump(8.0, 8.0)),
            ],
        })
        .unwrap();

    assert_eq!(result.mesh, plate());
    // (0,1) at level one, (01,2) at level two, then the carrier union
    assert_eq!(result.stats.boolean_ops, 3);
    assert_eq!(result.stats.failed_ops, 3);
    assert_eq!(result.dropped, vec![0, 1, 2]);
}

#[test]
fn test_failed_pair_drops_only_its_right_side() {
    /// Fails any union whose right operand reaches past x = 7.
    struct FarRight {
        inner: BspKernel,
    }

    impl BooleanKernel for FarRight {
        fn union(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
            if b.bounding_box().1.x > 7.0 {
                return Err(MeshError::boolean_failed("union", "injected"));
            }
            self.inner.union(a, b)
        }

        fn difference(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
            self.inner.difference(a, b)
        }
    }

    let kernel = FarRight {
        inner: BspKernel::default(),
    };
    let compositor = Compositor::new(&kernel, no_jitter());
    let result = compositor
        .compose(Assembly {
            carrier: plate(),
            bore: None,
            features: vec![
                (FeatureOp::Union, bump(2.0, 2.0)),
                (FeatureOp::Union, bump(8.0, 8.0)),
                (FeatureOp::Union, bump(4.0, 4.0)),
            ],
        })
        .unwrap();

    assert!(result.mesh.is_closed());
    assert_abs_diff_eq!(result.mesh.volume(), 200.0 + 2.0 * 0.8, epsilon = 1e-9);
    assert_eq!(result.stats.failed_ops, 1);
    assert_eq!(result.dropped, vec![1]);
}

#[test]
fn test_open_result_is_rejected() {
    let kernel = Leaky {
        inner: BspKernel::default(),
    };
    let compositor = Compositor::new(&kernel, no_jitter());
    let result = compositor
        .compose(Assembly {
            carrier: plate(),
            bore: None,
            features: vec![
                (FeatureOp::Union, bump(3.0, 3.0)),
                (FeatureOp::Subtract, pit(7.0, 7.0)),
            ],
        })
        .unwrap();

    // The union leaks, the difference goes through
    assert!(result.mesh.is_closed());
    assert_abs_diff_eq!(result.mesh.volume(), 200.0 - 0.5, epsilon = 1e-9);
    assert_eq!(result.stats.failed_ops, 1);
    assert_eq!(result.dropped, vec![0]);
}

#[test]
fn test_empty_result_is_rejected() {
    let kernel = Flaky {
        empty_instead: true,
        ..Flaky::failing_everything()
    };
    let compositor = Compositor::new(&kernel, no_jitter());
    let result = compositor
        .compose(Assembly {
            carrier: plate(),
            bore: None,
            features: vec![(FeatureOp::Union, bump(5.0, 5.0))],
        })
        .unwrap();

    assert_eq!(result.mesh, plate());
    assert_eq!(result.stats.failed_ops, 1);
}

#[test]
fn test_rejection_rules() {
    let cube = create_box(DVec3::ZERO, DVec3::ONE).unwrap();
    let empty = Mesh::new();

    assert_eq!(
        rejection(BooleanOp::Union, &empty, &cube, &cube),
        Some("empty result")
    );
    assert_eq!(rejection(BooleanOp::Union, &empty, &empty, &empty), None);
    assert_eq!(rejection(BooleanOp::Difference, &empty, &empty, &cube), None);
    assert_eq!(rejection(BooleanOp::Union, &cube, &cube, &cube), None);

    let mut broken = cube.clone();
    broken.add_vertex(DVec3::new(f64::NAN, 0.0, 0.0));
    assert_eq!(
        rejection(BooleanOp::Union, &broken, &cube, &cube),
        Some("non-finite result")
    );

    let (vertices, mut triangles) = cube.clone().into_parts();
    triangles.pop();
    let open = Mesh::from_parts(vertices, triangles);
    assert_eq!(
        rejection(BooleanOp::Difference, &open, &cube, &cube),
        Some("open result")
    );
    // An open input cannot be held against the result
    assert_eq!(rejection(BooleanOp::Union, &open, &open, &cube), None);
}

// =============================================================================
// CANCELLATION
// =============================================================================

#[test]
fn test_cancelled_before_start() {
    let kernel = BspKernel::default();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let compositor = Compositor::new(&kernel, no_jitter()).with_cancellation(cancel);

    let result = compositor.compose(Assembly {
        carrier: plate(),
        bore: None,
        features: vec![(FeatureOp::Union, bump(5.0, 5.0))],
    });
    assert!(matches!(result, Err(MeshError::Cancelled)));
}

#[test]
fn test_cancel_during_reduction() {
    /// Cancels the token on its first union.
    struct Cancelling {
        inner: BspKernel,
        cancel: CancellationToken,
    }

    impl BooleanKernel for Cancelling {
        fn union(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
            self.cancel.cancel();
            self.inner.union(a, b)
        }

        fn difference(&self, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
            self.inner.difference(a, b)
        }
    }

    let cancel = CancellationToken::new();
    let kernel = Cancelling {
        inner: BspKernel::default(),
        cancel: cancel.clone(),
    };
    let compositor = Compositor::new(
        &kernel,
        CompositorConfig {
            parallel: false,
            ..no_jitter()
        },
    )
    .with_cancellation(cancel);

    let result = compositor.reduce_union(diagonal_cubes(4));
    assert!(matches!(result, Err(MeshError::Cancelled)));
}

// =============================================================================
// JITTER
// =============================================================================

#[test]
fn test_jitter_is_deterministic_and_bounded() {
    let a = jitter_offsets(50, 5e-4, 7);
    let b = jitter_offsets(50, 5e-4, 7);
    let c = jitter_offsets(50, 5e-4, 8);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.iter().all(|o| o.abs().max_element() <= 5e-4));
    assert!(a.iter().any(|o| *o != DVec3::ZERO));
}

#[test]
fn test_jitter_disabled() {
    assert!(jitter_offsets(3, 0.0, 1).iter().all(|o| *o == DVec3::ZERO));
    assert_eq!(jitter_offsets(3, f64::NAN, 1).len(), 3);
}

#[test]
fn test_same_seed_same_mesh() {
    let kernel = BspKernel::default();
    let compositor = Compositor::new(&kernel, CompositorConfig::default());
    let assembly = Assembly {
        carrier: plate(),
        bore: None,
        features: vec![
            (FeatureOp::Union, bump(3.0, 3.0)),
            (FeatureOp::Union, bump(6.0, 6.0)),
        ],
    };

    let first = compositor.compose(assembly.clone()).unwrap();
    let second = compositor.compose(assembly).unwrap();
    assert_eq!(first.mesh, second.mesh);
}
