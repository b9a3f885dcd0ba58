//! Oxygen / CO2 gas field on a coarse grid.
//!
//! The world rectangle is divided into square cells of `cell_size` world
//! units. Each [`GasCell`] holds an oxygen and a CO2 level in `[0, 100]`,
//! both starting at the baseline (50).
//!
//! # Diffusion
//!
//! Once per tick [`GasField::diffuse`] runs a double-buffered sweep: every
//! cell reads its 8 Moore neighbours from the pre-diffusion snapshot, then
//!
//! ```text
//! blended = old * retention + neighbour_mean * (1 - retention)
//! relaxed = blended + (baseline - blended) * relaxation
//! new     = clamp(relaxed, 0, 100)
//! ```
//!
//! Neighbours outside the grid are excluded from the mean. The gas field
//! does not wrap, unlike blocks and organisms.

use serde::{Deserialize, Serialize};

use accretion_types::{Gas, Vec2, WorldBounds};

use crate::error::WorldError;

/// Lowest level a gas can reach.
pub const GAS_MIN: f64 = 0.0;

/// Highest level a gas can reach.
pub const GAS_MAX: f64 = 100.0;

/// Row/column offsets of the 8 Moore neighbours.
const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Gas field parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasConfig {
    /// Edge length of one grid cell in world units (default: 20).
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,

    /// Level every cell starts at and relaxes toward (default: 50).
    #[serde(default = "default_baseline")]
    pub baseline: f64,

    /// Weight of a cell's own value in the blend (default: 0.95).
    /// The neighbour mean gets `1 - retention`.
    #[serde(default = "default_retention")]
    pub retention: f64,

    /// Fraction of the distance to baseline recovered per tick (default: 0.001).
    #[serde(default = "default_relaxation")]
    pub relaxation: f64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            baseline: default_baseline(),
            retention: default_retention(),
            relaxation: default_relaxation(),
        }
    }
}

const fn default_cell_size() -> f64 {
    20.0
}

const fn default_baseline() -> f64 {
    50.0
}

const fn default_retention() -> f64 {
    0.95
}

const fn default_relaxation() -> f64 {
    0.001
}

/// Oxygen and CO2 levels of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasCell {
    /// Oxygen level in `[0, 100]`.
    pub oxygen: f64,
    /// CO2 level in `[0, 100]`.
    pub co2: f64,
}

impl GasCell {
    /// A cell with both gases at `level`.
    pub const fn uniform(level: f64) -> Self {
        Self {
            oxygen: level,
            co2: level,
        }
    }

    /// Current level of the given gas.
    pub const fn level(&self, gas: Gas) -> f64 {
        match gas {
            Gas::Oxygen => self.oxygen,
            Gas::CarbonDioxide => self.co2,
        }
    }

    /// Add `delta` (may be negative) to the given gas, clamped to `[0, 100]`.
    pub fn adjust(&mut self, gas: Gas, delta: f64) {
        let slot = match gas {
            Gas::Oxygen => &mut self.oxygen,
            Gas::CarbonDioxide => &mut self.co2,
        };
        *slot = (*slot + delta).clamp(GAS_MIN, GAS_MAX);
    }
}

/// The gas grid covering the world rectangle.
#[derive(Debug, Clone)]
pub struct GasField {
    /// Number of cell rows.
    rows: usize,
    /// Number of cell columns.
    cols: usize,
    /// Cell edge length in world units.
    cell_size: f64,
    /// Diffusion and relaxation parameters.
    config: GasConfig,
    /// Live cells, row-major.
    cells: Vec<GasCell>,
    /// Write buffer for the diffusion sweep, swapped with `cells`.
    scratch: Vec<GasCell>,
}

impl GasField {
    /// Create a grid covering `bounds`, every cell at the baseline.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidBounds`] for a non-positive or
    /// non-finite world, and [`WorldError::InvalidGrid`] for an unusable
    /// cell size.
    pub fn new(bounds: WorldBounds, config: &GasConfig) -> Result<Self, WorldError> {
        let valid_extent = |v: f64| v.is_finite() && v > 0.0;
        if !valid_extent(bounds.width) || !valid_extent(bounds.height) {
            return Err(WorldError::InvalidBounds {
                width: bounds.width,
                height: bounds.height,
            });
        }
        if !valid_extent(config.cell_size) {
            return Err(WorldError::InvalidGrid {
                reason: format!("cell size must be positive, got {}", config.cell_size),
            });
        }

        let cols = cells_along(bounds.width, config.cell_size)?;
        let rows = cells_along(bounds.height, config.cell_size)?;
        let len = rows.checked_mul(cols).ok_or_else(|| WorldError::InvalidGrid {
            reason: format!("{rows}x{cols} cells overflow"),
        })?;

        let baseline = config.baseline.clamp(GAS_MIN, GAS_MAX);
        Ok(Self {
            rows,
            cols,
            cell_size: config.cell_size,
            config: config.clone(),
            cells: vec![GasCell::uniform(baseline); len],
            scratch: vec![GasCell::uniform(baseline); len],
        })
    }

    /// Restore every cell to the baseline.
    pub fn reset(&mut self) {
        let baseline = self.config.baseline.clamp(GAS_MIN, GAS_MAX);
        self.cells.fill(GasCell::uniform(baseline));
    }

    /// Number of cell rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of cell columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Cell edge length in world units.
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// All cells in row-major order, for rendering.
    pub fn cells(&self) -> &[GasCell] {
        &self.cells
    }

    /// The cell at `(row, col)`, if inside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<&GasCell> {
        self.flat_index(row, col).and_then(|i| self.cells.get(i))
    }

    /// Mutable access to the cell at `(row, col)`, if inside the grid.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut GasCell> {
        self.flat_index(row, col).and_then(|i| self.cells.get_mut(i))
    }

    /// The `(row, col)` of the cell containing a world position.
    ///
    /// Returns `None` for positions outside the grid or non-finite input.
    pub fn locate(&self, position: Vec2) -> Option<(usize, usize)> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let col_f = (position.x / self.cell_size).floor();
        let row_f = (position.y / self.cell_size).floor();
        // Both values are finite and non-negative here.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (row, col) = (row_f as usize, col_f as usize);
        if row < self.rows && col < self.cols {
            Some((row, col))
        } else {
            None
        }
    }

    /// The cell containing a world position.
    pub fn cell_at(&self, position: Vec2) -> Option<&GasCell> {
        let (row, col) = self.locate(position)?;
        self.cell(row, col)
    }

    /// Mutable access to the cell containing a world position.
    pub fn cell_at_mut(&mut self, position: Vec2) -> Option<&mut GasCell> {
        let (row, col) = self.locate(position)?;
        self.cell_mut(row, col)
    }

    /// Level of `gas` at a world position, if inside the grid.
    pub fn level_at(&self, position: Vec2, gas: Gas) -> Option<f64> {
        self.cell_at(position).map(|cell| cell.level(gas))
    }

    /// Run one double-buffered diffusion sweep.
    pub fn diffuse(&mut self) {
        let retention = self.config.retention;
        let neighbour_weight = 1.0 - retention;
        let baseline = self.config.baseline;
        let relaxation = self.config.relaxation;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let Some(index) = self.flat_index(row, col) else {
                    continue;
                };
                let Some(old) = self.cells.get(index).copied() else {
                    continue;
                };

                let mut sum = GasCell::uniform(0.0);
                let mut neighbours: u32 = 0;
                for (dr, dc) in MOORE_OFFSETS {
                    let Some(cell) = row
                        .checked_add_signed(dr)
                        .zip(col.checked_add_signed(dc))
                        .and_then(|(r, c)| self.cell(r, c))
                    else {
                        continue;
                    };
                    sum.oxygen += cell.oxygen;
                    sum.co2 += cell.co2;
                    neighbours = neighbours.saturating_add(1);
                }

                let blended = if neighbours == 0 {
                    old
                } else {
                    let n = f64::from(neighbours);
                    GasCell {
                        oxygen: old.oxygen * retention + (sum.oxygen / n) * neighbour_weight,
                        co2: old.co2 * retention + (sum.co2 / n) * neighbour_weight,
                    }
                };

                let relax = |v: f64| (v + (baseline - v) * relaxation).clamp(GAS_MIN, GAS_MAX);
                if let Some(slot) = self.scratch.get_mut(index) {
                    *slot = GasCell {
                        oxygen: relax(blended.oxygen),
                        co2: relax(blended.co2),
                    };
                }
            }
        }

        std::mem::swap(&mut self.cells, &mut self.scratch);
    }

    /// Mean `(oxygen, co2)` over the grid, or `(0, 0)` for an empty grid.
    pub fn mean_levels(&self) -> (f64, f64) {
        if self.cells.is_empty() {
            return (0.0, 0.0);
        }
        let (oxygen, co2) = self
            .cells
            .iter()
            .fold((0.0, 0.0), |(o, c), cell| (o + cell.oxygen, c + cell.co2));
        // Grid sizes are far below 2^52.
        #[allow(clippy::cast_precision_loss)]
        let n = self.cells.len() as f64;
        (oxygen / n, co2 / n)
    }

    /// Row-major index of `(row, col)`, if inside the grid.
    fn flat_index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        row.checked_mul(self.cols)?.checked_add(col)
    }
}

/// Number of cells needed to cover `extent` with cells of `cell_size`.
fn cells_along(extent: f64, cell_size: f64) -> Result<usize, WorldError> {
    let count = (extent / cell_size).ceil();
    if !count.is_finite() || count < 1.0 || count > f64::from(u32::MAX) {
        return Err(WorldError::InvalidGrid {
            reason: format!("extent {extent} with cell size {cell_size} gives {count} cells"),
        });
    }
    // Range checked above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = count as usize;
    Ok(count)
}
