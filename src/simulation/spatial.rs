//! Uniform spatial hash over the plane.
//!
//! Maps integer cell coordinates to the ids of the segments whose axis-aligned
//! bounding box overlaps that cell. The grid only deals in bounding boxes and
//! cell traversal; exact geometry happens in [`super::segments`].

use std::collections::HashMap;

use geo::Coord;

use super::error::{Error, Result};
use super::geometric_utils::{OrientedBox, unit_direction};

/// Two signed 32-bit cell coordinates packed losslessly into one `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey(pub i64);

impl CellKey {
    /// Packs `(cx, cy)`; the high half holds `cx`, the low half the bits of `cy`.
    #[inline]
    pub fn pack(cx: i32, cy: i32) -> Self {
        Self((i64::from(cx) << 32) | i64::from(cy as u32))
    }

    /// Recovers the `(cx, cy)` pair.
    #[inline]
    pub fn unpack(self) -> (i32, i32) {
        ((self.0 >> 32) as i32, self.0 as i32)
    }
}

/// Uniform grid mapping cells to segment ids.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    /// Creates an empty grid with square cells of edge `cell_size`.
    pub fn new(cell_size: f64) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::InvalidConfig("cell_size must be positive and finite"));
        }
        Ok(Self {
            cell_size,
            cells: HashMap::new(),
        })
    }

    /// Edge length of a cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell coordinate along one axis (floor division, saturating at the `i32` range).
    #[inline]
    pub fn cell_coord(&self, v: f64) -> i32 {
        (v / self.cell_size).floor() as i32
    }

    /// Cell containing `p`.
    #[inline]
    pub fn cell_of(&self, p: Coord<f64>) -> (i32, i32) {
        (self.cell_coord(p.x), self.cell_coord(p.y))
    }

    /// Segment ids registered in `key` (empty for unknown cells).
    pub fn cell(&self, key: CellKey) -> &[usize] {
        self.cells.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Registers segment `id` in every cell its bounding box overlaps.
    pub fn insert(&mut self, id: usize, a: Coord<f64>, b: Coord<f64>) {
        for key in self.cells_for_segment(a, b) {
            self.cells.entry(key).or_default().push(id);
        }
    }

    /// Cells covered by the bounding box of segment `a`-`b`.
    pub fn cells_for_segment(&self, a: Coord<f64>, b: Coord<f64>) -> Vec<CellKey> {
        let min = Coord {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
        };
        let max = Coord {
            x: a.x.max(b.x),
            y: a.y.max(b.y),
        };
        self.cells_in_rect(min, max)
    }

    /// Cells covered by the axis-aligned bounds of a rotated box.
    ///
    /// This over-approximates the box; callers filter with an exact test.
    pub fn cells_for_box(
        &self,
        center: Coord<f64>,
        half_width: f64,
        half_height: f64,
        angle: f64,
    ) -> Vec<CellKey> {
        let obb = OrientedBox {
            center,
            half_width,
            half_height,
            angle,
        };
        let (min, max) = obb.bounds();
        self.cells_in_rect(min, max)
    }

    /// Cells visited by a ray, in traversal order.
    pub fn cells_along_ray(&self, origin: Coord<f64>, angle: f64, max_length: f64) -> Vec<CellKey> {
        self.ray_cells(origin, angle, max_length)
            .map(|(key, _)| key)
            .collect()
    }

    /// DDA traversal yielding each visited cell with the distance at which the ray enters it.
    pub fn ray_cells(&self, origin: Coord<f64>, angle: f64, max_length: f64) -> RayCells {
        RayCells::new(self, origin, angle, max_length)
    }

    fn cells_in_rect(&self, min: Coord<f64>, max: Coord<f64>) -> Vec<CellKey> {
        let (x0, y0) = self.cell_of(min);
        let (x1, y1) = self.cell_of(max);
        let mut keys = Vec::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                keys.push(CellKey::pack(cx, cy));
            }
        }
        keys
    }
}

/// Iterator over the grid cells crossed by a ray.
///
/// Starts at the origin's cell and repeatedly steps across whichever cell
/// boundary (vertical or horizontal) is reached first. Stops once the
/// distance travelled exceeds the maximum length.
#[derive(Debug, Clone)]
pub struct RayCells {
    cx: i32,
    cy: i32,
    step_x: i32,
    step_y: i32,
    t_max_x: f64,
    t_max_y: f64,
    t_delta_x: f64,
    t_delta_y: f64,
    max_length: f64,
    started: bool,
    degenerate: bool,
    done: bool,
}

impl RayCells {
    fn new(grid: &SpatialGrid, origin: Coord<f64>, angle: f64, max_length: f64) -> Self {
        let (cx, cy) = grid.cell_of(origin);
        let size = grid.cell_size;

        let Some(dir) = unit_direction(angle) else {
            return Self {
                cx,
                cy,
                step_x: 0,
                step_y: 0,
                t_max_x: f64::INFINITY,
                t_max_y: f64::INFINITY,
                t_delta_x: f64::INFINITY,
                t_delta_y: f64::INFINITY,
                max_length,
                started: false,
                degenerate: true,
                done: false,
            };
        };

        let (step_x, t_max_x, t_delta_x) = axis_setup(origin.x, dir.x, cx, size);
        let (step_y, t_max_y, t_delta_y) = axis_setup(origin.y, dir.y, cy, size);

        Self {
            cx,
            cy,
            step_x,
            step_y,
            t_max_x,
            t_max_y,
            t_delta_x,
            t_delta_y,
            max_length,
            started: false,
            degenerate: false,
            done: false,
        }
    }
}

/// Step direction, distance to the first boundary and distance between boundaries.
fn axis_setup(origin: f64, dir: f64, cell: i32, size: f64) -> (i32, f64, f64) {
    if dir.abs() < super::geometric_utils::DIRECTION_EPSILON {
        (0, f64::INFINITY, f64::INFINITY)
    } else if dir > 0.0 {
        let boundary = (f64::from(cell) + 1.0) * size;
        (1, (boundary - origin) / dir, size / dir)
    } else {
        let boundary = f64::from(cell) * size;
        (-1, (boundary - origin) / dir, -size / dir)
    }
}

impl Iterator for RayCells {
    type Item = (CellKey, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            self.done = self.degenerate;
            return Some((CellKey::pack(self.cx, self.cy), 0.0));
        }

        // Stepping past the i32 cell range ends the walk.
        let (t, cell) = if self.t_max_x < self.t_max_y {
            let t = self.t_max_x;
            self.t_max_x += self.t_delta_x;
            (t, self.cx.checked_add(self.step_x).map(|cx| (cx, self.cy)))
        } else {
            let t = self.t_max_y;
            self.t_max_y += self.t_delta_y;
            (t, self.cy.checked_add(self.step_y).map(|cy| (self.cx, cy)))
        };

        let Some((cx, cy)) = cell.filter(|_| t <= self.max_length) else {
            self.done = true;
            return None;
        };
        self.cx = cx;
        self.cy = cy;
        Some((CellKey::pack(cx, cy), t))
    }
}
