//! # Layout Engine
//!
//! Computes plate-space positions for every dot, row indicator and bore of
//! one plate.
//!
//! Plate-space is 2D. On a flat card the origin is the card's lower-left
//! corner. On a cylinder X is the arc length around the circumference and Y
//! the axial offset from the midplane.
//!
//! ## Cell geometry
//!
//! A cell origin is the cell's center. Dots sit at
//! `(±dot_pitch/2, {+dot_pitch, 0, −dot_pitch})` around it.

use glam::DVec2;
use tracing::debug;

use crate::cell::{dot_slot, DotPattern};
use crate::spec::{CarrierSpec, CounterFill, PlateMode, PlateSpec};

/// Kind of a placeable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Dot,
    /// Triangle marking the start of a row.
    IndicatorStart,
    /// Rectangle marking the end of a row.
    IndicatorEnd,
    /// Axial bore through a cylinder.
    Bore,
}

/// Boolean role of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureOp {
    Union,
    Subtract,
}

/// One placeable geometric element in plate-space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feature {
    pub kind: FeatureKind,
    /// Plate-space position (mm).
    pub local: DVec2,
    pub op: FeatureOp,
    /// Grid row, if the feature belongs to one.
    pub row: Option<usize>,
    /// Grid column (indicator columns included).
    pub col: Option<usize>,
    /// Dot number 1–6 for dots.
    pub slot: Option<u8>,
}

impl Feature {
    /// Returns true for solids that carve the carrier.
    #[inline]
    pub fn is_subtractive(&self) -> bool {
        self.op == FeatureOp::Subtract
    }
}

/// Plate-space origin of the cell in `row` at grid column `grid_col`.
///
/// # Example
///
/// ```rust
/// use braille_mesh::layout::cell_origin;
/// use braille_mesh::spec::PlateSpec;
///
/// let spec = PlateSpec::flat(88.0, 54.0, 3.0).with_grid(14, 4);
/// let origin = cell_origin(&spec, 0, 1);
/// assert!((origin.x - 8.25).abs() < 1e-12);
/// assert!((origin.y - 42.0).abs() < 1e-12);
/// ```
pub fn cell_origin(spec: &PlateSpec, row: usize, grid_col: usize) -> DVec2 {
    let spacing = &spec.spacing;
    let grid_width = spec.grid.columns.saturating_sub(1) as f64 * spacing.cell_pitch;
    let grid_height = spec.grid.rows.saturating_sub(1) as f64 * spacing.line_pitch;

    let (surface_width, y) = match spec.carrier {
        CarrierSpec::Flat(flat) => {
            let top_margin = (flat.height - grid_height) * 0.5;
            (flat.width, flat.height - top_margin - row as f64 * spacing.line_pitch)
        }
        CarrierSpec::Cylinder(cyl) => {
            let half_span = spec.grid.rows.saturating_sub(1) as f64 * 0.5;
            (cyl.circumference(), (half_span - row as f64) * spacing.line_pitch)
        }
    };

    let left_margin = (surface_width - grid_width) * 0.5;
    DVec2::new(
        left_margin + grid_col as f64 * spacing.cell_pitch + spec.x_bias,
        y + spec.y_bias,
    )
}

/// Offset of dot `n` (1–6) from its cell origin.
///
/// Returns `None` for numbers outside 1–6.
pub fn dot_offset(spec: &PlateSpec, n: u8) -> Option<DVec2> {
    let pitch = spec.spacing.dot_pitch;
    let (row, col) = dot_slot(n)?;
    let x = if col == 0 { -0.5 * pitch } else { 0.5 * pitch };
    let y = [pitch, 0.0, -pitch][row];
    Some(DVec2::new(x, y))
}

/// Produces the full feature list for one plate.
///
/// Lines past `spec.grid.rows` are ignored. Each line is truncated to
/// [`PlateSpec::available_columns`] cells. Rows without a line still get
/// their indicators.
pub fn layout<S: AsRef<str>>(spec: &PlateSpec, lines: &[S]) -> Vec<Feature> {
    let available = spec.available_columns();
    let first_text_col = if spec.indicators { 1 } else { 0 };
    let op = match spec.mode {
        PlateMode::Emboss => FeatureOp::Union,
        PlateMode::Counter => FeatureOp::Subtract,
    };
    let fill_all = spec.mode == PlateMode::Counter && spec.counter_fill == CounterFill::AllCells;

    if lines.len() > spec.grid.rows {
        debug!(
            lines = lines.len(),
            rows = spec.grid.rows,
            "more lines than rows, extra lines ignored"
        );
    }

    let mut features = Vec::new();

    for row in 0..spec.grid.rows {
        if spec.indicators && spec.grid.columns >= 2 {
            let col = 0;
            features.push(Feature {
                kind: FeatureKind::IndicatorStart,
                local: cell_origin(spec, row, col),
                op,
                row: Some(row),
                col: Some(col),
                slot: None,
            });
        }

        let cells: Vec<DotPattern> = if fill_all {
            vec![DotPattern::FULL; available]
        } else {
            lines
                .get(row)
                .map(|line| {
                    line.as_ref()
                        .chars()
                        .take(available)
                        .map(DotPattern::decode)
                        .collect()
                })
                .unwrap_or_default()
        };

        for (text_col, pattern) in cells.iter().enumerate() {
            let col = text_col + first_text_col;
            let origin = cell_origin(spec, row, col);
            for n in pattern.dots() {
                let Some(offset) = dot_offset(spec, n) else {
                    continue;
                };
                features.push(Feature {
                    kind: FeatureKind::Dot,
                    local: origin + offset,
                    op,
                    row: Some(row),
                    col: Some(col),
                    slot: Some(n),
                });
            }
        }

        if spec.indicators && spec.grid.columns >= 2 {
            let col = spec.grid.columns - 1;
            features.push(Feature {
                kind: FeatureKind::IndicatorEnd,
                local: cell_origin(spec, row, col),
                op,
                row: Some(row),
                col: Some(col),
                slot: None,
            });
        }
    }

    if let CarrierSpec::Cylinder(cyl) = spec.carrier {
        if cyl.bore.is_some() {
            features.push(Feature {
                kind: FeatureKind::Bore,
                local: DVec2::ZERO,
                op: FeatureOp::Subtract,
                row: None,
                col: None,
                slot: None,
            });
        }
    }

    debug!(
        features = features.len(),
        available_columns = available,
        rows = spec.grid.rows,
        "layout complete"
    );

    features
}
