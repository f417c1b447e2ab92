//! # Configuration Constants
//!
//! Centralized constants for the braille plate pipeline. Default plate
//! dimensions, tessellation parameters, and precision values are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison and welding tolerances
//! - **Resolution**: Target surface resolution and facet bounds
//! - **Plate Defaults**: Card, grid, spacing, and dot geometry
//! - **Limits**: Clamping bounds for user-supplied parameters

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Plane classification tolerance for the BSP boolean kernel, in millimetres.
///
/// Points closer than this to a splitting plane are treated as lying on it.
pub const BSP_EPSILON: f64 = 1e-5;

/// Distance below which two vertices are merged after a boolean operation.
///
/// Must not be smaller than [`BSP_EPSILON`], otherwise split points that the
/// kernel considered coplanar are left as hairline cracks.
///
/// # Example
///
/// ```rust
/// use config::constants::{BSP_EPSILON, WELD_TOLERANCE};
///
/// assert!(WELD_TOLERANCE >= BSP_EPSILON);
/// ```
pub const WELD_TOLERANCE: f64 = 1e-5;

/// Triangles with a doubled area below this value (mm²) are degenerate.
pub const DEGENERATE_AREA: f64 = 1e-12;

/// Default magnitude of the placement jitter applied to feature solids (mm).
///
/// Sub-micron. Empirically tuned against the BSP kernel: it must stay well
/// above [`BSP_EPSILON`] so that nudged faces stop being classified as
/// coplanar, and well below printer resolution.
///
/// # Example
///
/// ```rust
/// use config::constants::{BSP_EPSILON, DEFAULT_JITTER};
///
/// assert!(DEFAULT_JITTER > BSP_EPSILON);
/// assert!(DEFAULT_JITTER < 1e-3);
/// ```
pub const DEFAULT_JITTER: f64 = 5e-4;

/// Default seed for the placement jitter generator.
pub const DEFAULT_JITTER_SEED: u64 = 0x0B5A_11E5;

// =============================================================================
// RESOLUTION CONSTANTS
// =============================================================================

/// Target chord length used to tessellate curved primitives (mm).
///
/// The facet count of a circle is its circumference divided by this value.
pub const DEFAULT_SURFACE_RESOLUTION: f64 = 0.15;

/// Minimum number of facets for any curved primitive.
///
/// Fewer facets than this leave dot posts too coarse to survive subtraction.
pub const MIN_FACETS: u32 = 8;

/// Maximum number of facets for any curved primitive.
pub const MAX_FACETS: u32 = 128;

/// Edge length of the tiles carrier surfaces are built from (mm).
///
/// A feature only splits the tiles under its footprint, so BSP splitting
/// planes stop at tile edges instead of crossing the whole plate. Kept at
/// one dot pitch so a dot overlaps at most four tiles.
pub const CARRIER_TILE: f64 = 2.5;

// =============================================================================
// PLATE DEFAULTS
// =============================================================================

/// Default card width (mm).
pub const DEFAULT_CARD_WIDTH: f64 = 90.0;

/// Default card height (mm).
pub const DEFAULT_CARD_HEIGHT: f64 = 52.0;

/// Default card thickness (mm).
pub const DEFAULT_CARD_THICKNESS: f64 = 2.0;

/// Default cylinder outer diameter (mm).
pub const DEFAULT_CYLINDER_DIAMETER: f64 = 31.35;

/// Default cylinder height (mm).
pub const DEFAULT_CYLINDER_HEIGHT: f64 = 51.0;

/// Default number of sides of the axial bore polygon.
pub const DEFAULT_BORE_SIDES: u32 = 6;

/// Extra bore length past each end of the cylinder (mm).
pub const BORE_OVERSHOOT: f64 = 1.0;

/// Default number of braille cells per row, including reserved indicator cells.
pub const DEFAULT_COLUMNS: usize = 13;

/// Default number of rows.
pub const DEFAULT_ROWS: usize = 4;

/// Maximum number of translated lines accepted per plate.
pub const MAX_LINES: usize = 4;

/// Number of grid columns reserved for row indicators when they are enabled.
pub const RESERVED_INDICATOR_COLUMNS: usize = 2;

/// Default distance between neighbouring cell origins (mm).
pub const DEFAULT_CELL_PITCH: f64 = 6.5;

/// Default distance between neighbouring row centerlines (mm).
pub const DEFAULT_LINE_PITCH: f64 = 10.0;

/// Default distance between dots inside one cell (mm).
pub const DEFAULT_DOT_PITCH: f64 = 2.5;

/// Default dot base diameter (mm).
pub const DEFAULT_DOT_BASE_DIAMETER: f64 = 1.8;

/// Default height of the cylindrical dot post (mm).
pub const DEFAULT_DOT_CAP_HEIGHT: f64 = 0.2;

/// Default height of the dome on top of the post (mm).
pub const DEFAULT_DOT_DOME_HEIGHT: f64 = 0.6;

/// Default recess diameter offset added to the dot base diameter (mm).
pub const DEFAULT_RECESS_OFFSET: f64 = 0.4;

/// Default recess depth (mm).
pub const DEFAULT_RECESS_DEPTH: f64 = 0.9;

/// Depth of recessed row indicator prisms (mm).
pub const DEFAULT_INDICATOR_DEPTH: f64 = 0.5;

/// How far additive solids reach below, and subtractive solids above, the
/// carrier surface (mm).
///
/// Keeps feature faces off the carrier surface so booleans never see
/// coplanar or tangent faces; must exceed the facet sagitta of a dot seated
/// on the cylinder wall.
pub const EMBED_OVERLAP: f64 = 0.2;

// =============================================================================
// LIMITS
// =============================================================================

/// Smallest accepted length for any plate dimension (mm).
pub const MIN_DIMENSION: f64 = 0.05;

/// Largest accepted length for any plate dimension (mm).
pub const MAX_DIMENSION: f64 = 1000.0;

/// Largest accepted grid column count.
pub const MAX_COLUMNS: usize = 64;

/// Largest accepted grid row count.
pub const MAX_ROWS: usize = 16;

/// Smallest accepted bore side count.
pub const MIN_BORE_SIDES: u32 = 3;

/// Largest accepted bore side count.
pub const MAX_BORE_SIDES: u32 = 64;

/// Minimum wall left between the bore and the cylinder surface (mm).
pub const MIN_BORE_WALL: f64 = 1.0;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Computes the number of facets for a circle of the given radius.
///
/// `ceil(2πr / resolution)` clamped to `MIN_FACETS..=MAX_FACETS`.
///
/// # Example
///
/// ```rust
/// use config::constants::{compute_facets, MAX_FACETS, MIN_FACETS};
///
/// assert_eq!(compute_facets(0.01, 0.15), MIN_FACETS);
/// assert_eq!(compute_facets(100.0, 0.15), MAX_FACETS);
/// assert_eq!(compute_facets(0.9, 0.15), 38);
/// ```
pub fn compute_facets(radius: f64, resolution: f64) -> u32 {
    if !(radius > 0.0) || !(resolution > 0.0) {
        return MIN_FACETS;
    }
    let raw = (2.0 * std::f64::consts::PI * radius / resolution).ceil();
    if raw >= MAX_FACETS as f64 {
        MAX_FACETS
    } else {
        (raw as u32).max(MIN_FACETS)
    }
}

/// Checks if two f64 values are approximately equal within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-11));
/// assert!(!approx_equal(1.0, 1.1));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}
