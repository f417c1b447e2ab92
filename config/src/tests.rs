//! Tests for configuration constants.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_tolerances_are_ordered() {
    assert!(EPSILON < BSP_EPSILON, "comparison epsilon must be finest");
    assert!(
        WELD_TOLERANCE >= BSP_EPSILON,
        "weld must absorb kernel split error"
    );
    assert!(DEFAULT_JITTER > WELD_TOLERANCE * 10.0, "jitter must survive welding");
}

#[test]
fn test_approx_equal() {
    assert!(approx_equal(0.1 + 0.2, 0.3));
    assert!(!approx_equal(0.0, 1e-9));
}

// =============================================================================
// RESOLUTION TESTS
// =============================================================================

#[test]
fn test_compute_facets_clamps_low() {
    assert_eq!(compute_facets(0.05, DEFAULT_SURFACE_RESOLUTION), MIN_FACETS);
}

#[test]
fn test_compute_facets_clamps_high() {
    assert_eq!(compute_facets(50.0, DEFAULT_SURFACE_RESOLUTION), MAX_FACETS);
}

#[test]
fn test_compute_facets_dot_radius() {
    // 2π·0.9 / 0.15 ≈ 37.7
    assert_eq!(compute_facets(0.9, DEFAULT_SURFACE_RESOLUTION), 38);
}

#[test]
fn test_compute_facets_rejects_bad_input() {
    assert_eq!(compute_facets(0.0, 0.15), MIN_FACETS);
    assert_eq!(compute_facets(1.0, 0.0), MIN_FACETS);
    assert_eq!(compute_facets(f64::NAN, 0.15), MIN_FACETS);
}

#[test]
fn test_carrier_tile_covers_a_dot() {
    assert!(CARRIER_TILE >= DEFAULT_DOT_BASE_DIAMETER);
    assert!(CARRIER_TILE < DEFAULT_CARD_THICKNESS * 10.0);
}

// =============================================================================
// DEFAULT GEOMETRY TESTS
// =============================================================================

#[test]
fn test_default_grid_fits_card() {
    let grid_width = (DEFAULT_COLUMNS - 1) as f64 * DEFAULT_CELL_PITCH + DEFAULT_DOT_PITCH;
    assert!(grid_width < DEFAULT_CARD_WIDTH, "grid {grid_width} wider than card");

    let grid_height = (DEFAULT_ROWS - 1) as f64 * DEFAULT_LINE_PITCH + 2.0 * DEFAULT_DOT_PITCH;
    assert!(grid_height < DEFAULT_CARD_HEIGHT, "grid {grid_height} taller than card");
}

#[test]
fn test_default_recess_shallower_than_card() {
    assert!(DEFAULT_RECESS_DEPTH + EMBED_OVERLAP < DEFAULT_CARD_THICKNESS);
    assert!(DEFAULT_INDICATOR_DEPTH < DEFAULT_CARD_THICKNESS);
}

#[test]
fn test_default_dot_fits_cell() {
    assert!(DEFAULT_DOT_BASE_DIAMETER < DEFAULT_DOT_PITCH);
    assert!(DEFAULT_DOT_BASE_DIAMETER + DEFAULT_RECESS_OFFSET < DEFAULT_DOT_PITCH);
}

#[test]
fn test_reserved_columns_below_default() {
    assert!(RESERVED_INDICATOR_COLUMNS < DEFAULT_COLUMNS);
    assert!(MAX_LINES >= 1);
}
