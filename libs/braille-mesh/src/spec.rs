//! # Plate Parameters
//!
//! The immutable parameter set for one generation request.
//!
//! A [`PlateSpec`] is built once (from [`Default`], the `with_*` builders or
//! JSON), passed through [`PlateSpec::sanitized`] once, and then borrowed by
//! every pipeline stage. Nothing downstream mutates it.
//!
//! ## Example
//!
//! ```rust
//! use braille_mesh::spec::{PlateMode, PlateSpec};
//!
//! let spec = PlateSpec::flat(88.0, 54.0, 3.0)
//!     .with_grid(14, 4)
//!     .with_mode(PlateMode::Counter)
//!     .sanitized()
//!     .unwrap();
//! assert_eq!(spec.available_columns(), 12);
//! ```

use config::constants::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MeshError, MeshResult};

// =============================================================================
// ENUMS
// =============================================================================

/// Shape of the base solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierKind {
    Flat,
    Cylinder,
}

/// Whether the plate carries raised dots or the matching recesses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateMode {
    /// Dots and indicators are unioned onto the carrier.
    #[default]
    Emboss,
    /// Dots and indicators are subtracted from the carrier.
    Counter,
}

/// Which dot slots a counter plate recesses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterFill {
    /// Only slots raised by the text.
    #[default]
    MatchText,
    /// Every slot of every available cell, so the plate fits any text.
    AllCells,
}

// =============================================================================
// CARRIER
// =============================================================================

/// Flat card dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatSpec {
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
}

impl Default for FlatSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_CARD_WIDTH,
            height: DEFAULT_CARD_HEIGHT,
            thickness: DEFAULT_CARD_THICKNESS,
        }
    }
}

/// Polygonal axial bore through a cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoreSpec {
    /// Distance from the axis to the middle of each bore face (mm).
    pub inscribed_radius: f64,
    /// Number of bore faces.
    pub sides: u32,
}

impl Default for BoreSpec {
    fn default() -> Self {
        Self {
            inscribed_radius: 6.5,
            sides: DEFAULT_BORE_SIDES,
        }
    }
}

impl BoreSpec {
    /// Radius of the circle through the bore's corners.
    pub fn circumscribed_radius(&self) -> f64 {
        self.inscribed_radius / (std::f64::consts::PI / self.sides as f64).cos()
    }
}

/// Cylindrical shell dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CylinderSpec {
    pub diameter: f64,
    pub height: f64,
    /// Angle at which plate-space X = 0 lands, in degrees.
    pub seam_offset_deg: f64,
    pub bore: Option<BoreSpec>,
}

impl Default for CylinderSpec {
    fn default() -> Self {
        Self {
            diameter: DEFAULT_CYLINDER_DIAMETER,
            height: DEFAULT_CYLINDER_HEIGHT,
            seam_offset_deg: 0.0,
            bore: None,
        }
    }
}

impl CylinderSpec {
    /// Outer radius.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.diameter * 0.5
    }

    /// Outer circumference, the length of the plate-space X axis.
    #[inline]
    pub fn circumference(&self) -> f64 {
        std::f64::consts::PI * self.diameter
    }

    /// Seam offset in radians.
    #[inline]
    pub fn seam_offset_rad(&self) -> f64 {
        self.seam_offset_deg.to_radians()
    }
}

/// Base solid of the plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CarrierSpec {
    Flat(FlatSpec),
    Cylinder(CylinderSpec),
}

impl Default for CarrierSpec {
    fn default() -> Self {
        Self::Flat(FlatSpec::default())
    }
}

impl CarrierSpec {
    /// Returns the carrier kind.
    pub fn kind(&self) -> CarrierKind {
        match self {
            Self::Flat(_) => CarrierKind::Flat,
            Self::Cylinder(_) => CarrierKind::Cylinder,
        }
    }
}

// =============================================================================
// GRID AND FEATURE GEOMETRY
// =============================================================================

/// Grid shape in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Cells per row, including reserved indicator cells.
    pub columns: usize,
    pub rows: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

/// Distances between cells, rows and dots (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingSpec {
    pub cell_pitch: f64,
    pub line_pitch: f64,
    pub dot_pitch: f64,
}

impl Default for SpacingSpec {
    fn default() -> Self {
        Self {
            cell_pitch: DEFAULT_CELL_PITCH,
            line_pitch: DEFAULT_LINE_PITCH,
            dot_pitch: DEFAULT_DOT_PITCH,
        }
    }
}

/// Raised dot shape (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotSpec {
    pub base_diameter: f64,
    /// Height of the straight post.
    pub cap_height: f64,
    /// Height of the dome above the post.
    pub dome_height: f64,
}

impl Default for DotSpec {
    fn default() -> Self {
        Self {
            base_diameter: DEFAULT_DOT_BASE_DIAMETER,
            cap_height: DEFAULT_DOT_CAP_HEIGHT,
            dome_height: DEFAULT_DOT_DOME_HEIGHT,
        }
    }
}

impl DotSpec {
    /// Total dot height above the surface.
    #[inline]
    pub fn total_height(&self) -> f64 {
        self.cap_height + self.dome_height
    }
}

/// Counter-plate recess shape (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecessSpec {
    /// Added to the dot base diameter.
    pub diameter_offset: f64,
    pub depth: f64,
}

impl Default for RecessSpec {
    fn default() -> Self {
        Self {
            diameter_offset: DEFAULT_RECESS_OFFSET,
            depth: DEFAULT_RECESS_DEPTH,
        }
    }
}

/// Tessellation density for curved primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolution {
    /// Target chord length (mm).
    pub target: f64,
    pub min_facets: u32,
    pub max_facets: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            target: DEFAULT_SURFACE_RESOLUTION,
            min_facets: MIN_FACETS,
            max_facets: MAX_FACETS,
        }
    }
}

impl Resolution {
    /// Facet count for a circle of the given radius.
    ///
    /// # Example
    ///
    /// ```rust
    /// use braille_mesh::spec::Resolution;
    ///
    /// let res = Resolution::default();
    /// assert_eq!(res.facets(0.9), 38);
    /// assert_eq!(res.facets(15.675), 128);
    /// ```
    pub fn facets(&self, radius: f64) -> u32 {
        compute_facets(radius, self.target).clamp(self.min_facets, self.max_facets)
    }
}

// =============================================================================
// PLATE SPEC
// =============================================================================

/// Complete parameter set for one plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateSpec {
    pub carrier: CarrierSpec,
    pub mode: PlateMode,
    pub counter_fill: CounterFill,
    pub grid: GridSpec,
    pub spacing: SpacingSpec,
    pub dot: DotSpec,
    pub recess: RecessSpec,
    /// Added to every cell origin X (mm).
    pub x_bias: f64,
    /// Added to every row centerline Y (mm).
    pub y_bias: f64,
    /// Reserve the first and last grid column for row indicators.
    pub indicators: bool,
    /// Depth of recessed indicator prisms (mm).
    pub indicator_depth: f64,
    pub resolution: Resolution,
}

impl Default for PlateSpec {
    fn default() -> Self {
        Self {
            carrier: CarrierSpec::default(),
            mode: PlateMode::default(),
            counter_fill: CounterFill::default(),
            grid: GridSpec::default(),
            spacing: SpacingSpec::default(),
            dot: DotSpec::default(),
            recess: RecessSpec::default(),
            x_bias: 0.0,
            y_bias: 0.0,
            indicators: true,
            indicator_depth: DEFAULT_INDICATOR_DEPTH,
            resolution: Resolution::default(),
        }
    }
}

impl PlateSpec {
    /// Default plate on a flat card of the given size.
    pub fn flat(width: f64, height: f64, thickness: f64) -> Self {
        Self {
            carrier: CarrierSpec::Flat(FlatSpec {
                width,
                height,
                thickness,
            }),
            ..Self::default()
        }
    }

    /// Default plate on a cylinder of the given size.
    pub fn cylinder(diameter: f64, height: f64) -> Self {
        Self {
            carrier: CarrierSpec::Cylinder(CylinderSpec {
                diameter,
                height,
                ..CylinderSpec::default()
            }),
            ..Self::default()
        }
    }

    /// Parses a spec from a JSON settings object; missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_mode(mut self, mode: PlateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_counter_fill(mut self, fill: CounterFill) -> Self {
        self.counter_fill = fill;
        self
    }

    pub fn with_grid(mut self, columns: usize, rows: usize) -> Self {
        self.grid = GridSpec { columns, rows };
        self
    }

    pub fn with_indicators(mut self, indicators: bool) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_bias(mut self, x_bias: f64, y_bias: f64) -> Self {
        self.x_bias = x_bias;
        self.y_bias = y_bias;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the seam offset. No effect on flat carriers.
    pub fn with_seam_offset_deg(mut self, degrees: f64) -> Self {
        if let CarrierSpec::Cylinder(cyl) = &mut self.carrier {
            cyl.seam_offset_deg = degrees;
        }
        self
    }

    /// Sets the axial bore. No effect on flat carriers.
    pub fn with_bore(mut self, bore: Option<BoreSpec>) -> Self {
        if let CarrierSpec::Cylinder(cyl) = &mut self.carrier {
            cyl.bore = bore;
        }
        self
    }

    /// Grid columns consumed by row indicators.
    #[inline]
    pub fn reserved_columns(&self) -> usize {
        if self.indicators {
            RESERVED_INDICATOR_COLUMNS
        } else {
            0
        }
    }

    /// Grid columns left for text. Never negative.
    #[inline]
    pub fn available_columns(&self) -> usize {
        self.grid.columns.saturating_sub(self.reserved_columns())
    }

    /// Recess base radius: half of dot diameter plus offset.
    #[inline]
    pub fn recess_radius(&self) -> f64 {
        (self.dot.base_diameter + self.recess.diameter_offset) * 0.5
    }

    /// Returns a copy with every parameter inside its valid range.
    ///
    /// Finite out-of-range values are clamped with a warning. Non-finite
    /// values fail with [`MeshError::NonFiniteParameter`].
    pub fn sanitized(&self) -> MeshResult<Self> {
        let mut s = *self;

        s.carrier = match self.carrier {
            CarrierSpec::Flat(flat) => CarrierSpec::Flat(FlatSpec {
                width: clamp_field("carrier.width", flat.width, MIN_DIMENSION, MAX_DIMENSION)?,
                height: clamp_field("carrier.height", flat.height, MIN_DIMENSION, MAX_DIMENSION)?,
                thickness: clamp_field(
                    "carrier.thickness",
                    flat.thickness,
                    MIN_DIMENSION,
                    MAX_DIMENSION,
                )?,
            }),
            CarrierSpec::Cylinder(cyl) => {
                let diameter =
                    clamp_field("carrier.diameter", cyl.diameter, MIN_DIMENSION, MAX_DIMENSION)?;
                let height =
                    clamp_field("carrier.height", cyl.height, MIN_DIMENSION, MAX_DIMENSION)?;
                let seam_offset_deg =
                    clamp_field("carrier.seam_offset_deg", cyl.seam_offset_deg, -360.0, 360.0)?;
                let bore = match cyl.bore {
                    Some(bore) => sanitize_bore(bore, diameter * 0.5)?,
                    None => None,
                };
                CarrierSpec::Cylinder(CylinderSpec {
                    diameter,
                    height,
                    seam_offset_deg,
                    bore,
                })
            }
        };

        s.grid.columns = clamp_count("grid.columns", self.grid.columns, MAX_COLUMNS);
        s.grid.rows = clamp_count("grid.rows", self.grid.rows, MAX_ROWS);

        s.spacing.cell_pitch = clamp_field(
            "spacing.cell_pitch",
            self.spacing.cell_pitch,
            MIN_DIMENSION,
            MAX_DIMENSION,
        )?;
        s.spacing.line_pitch = clamp_field(
            "spacing.line_pitch",
            self.spacing.line_pitch,
            MIN_DIMENSION,
            MAX_DIMENSION,
        )?;
        s.spacing.dot_pitch = clamp_field(
            "spacing.dot_pitch",
            self.spacing.dot_pitch,
            MIN_DIMENSION,
            MAX_DIMENSION,
        )?;

        s.dot.base_diameter = clamp_field(
            "dot.base_diameter",
            self.dot.base_diameter,
            MIN_DIMENSION,
            MAX_DIMENSION,
        )?;
        s.dot.cap_height = clamp_field("dot.cap_height", self.dot.cap_height, 0.0, MAX_DIMENSION)?;
        s.dot.dome_height = clamp_field(
            "dot.dome_height",
            self.dot.dome_height,
            MIN_DIMENSION,
            MAX_DIMENSION,
        )?;

        s.recess.diameter_offset = clamp_field(
            "recess.diameter_offset",
            self.recess.diameter_offset,
            0.0,
            MAX_DIMENSION,
        )?;
        // A bowl deeper than its radius is no longer a spherical cap.
        let recess_radius = s.recess_radius();
        s.recess.depth = clamp_field(
            "recess.depth",
            self.recess.depth,
            MIN_DIMENSION.min(recess_radius),
            recess_radius,
        )?;

        s.x_bias = clamp_field("x_bias", self.x_bias, -MAX_DIMENSION, MAX_DIMENSION)?;
        s.y_bias = clamp_field("y_bias", self.y_bias, -MAX_DIMENSION, MAX_DIMENSION)?;
        s.indicator_depth = clamp_field(
            "indicator_depth",
            self.indicator_depth,
            MIN_DIMENSION,
            MAX_DIMENSION,
        )?;

        s.resolution.target =
            clamp_field("resolution.target", self.resolution.target, 0.01, 10.0)?;
        s.resolution.min_facets = self.resolution.min_facets.clamp(3, 1024);
        s.resolution.max_facets = self
            .resolution
            .max_facets
            .clamp(s.resolution.min_facets, 1024);

        Ok(s)
    }
}

fn clamp_field(name: &'static str, value: f64, min: f64, max: f64) -> MeshResult<f64> {
    if !value.is_finite() {
        return Err(MeshError::non_finite(name, value));
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(field = name, value, clamped, "parameter out of range, clamped");
    }
    Ok(clamped)
}

fn clamp_count(name: &'static str, value: usize, max: usize) -> usize {
    if value > max {
        warn!(field = name, value, clamped = max, "count out of range, clamped");
        max
    } else {
        value
    }
}

fn sanitize_bore(bore: BoreSpec, outer_radius: f64) -> MeshResult<Option<BoreSpec>> {
    let sides = bore.sides.clamp(MIN_BORE_SIDES, MAX_BORE_SIDES);
    if sides != bore.sides {
        warn!(field = "bore.sides", value = bore.sides, clamped = sides, "count out of range, clamped");
    }
    // Keep the bore corners inside the wall, not just the flats.
    let max_radius = (outer_radius - MIN_BORE_WALL) * (std::f64::consts::PI / sides as f64).cos();
    if max_radius < MIN_DIMENSION {
        if !bore.inscribed_radius.is_finite() {
            return Err(MeshError::non_finite("bore.inscribed_radius", bore.inscribed_radius));
        }
        warn!(outer_radius, "cylinder too thin for a bore, bore dropped");
        return Ok(None);
    }
    let inscribed_radius = clamp_field(
        "bore.inscribed_radius",
        bore.inscribed_radius,
        MIN_DIMENSION,
        max_radius,
    )?;
    Ok(Some(BoreSpec {
        inscribed_radius,
        sides,
    }))
}
