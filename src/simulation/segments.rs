//! Segment store with grid-accelerated ray and box queries.
//!
//! Segments are dense integer ids into parallel coordinate arrays. The store is
//! append-only; once a track is built it can be queried from many threads at
//! once as long as each thread brings its own [`QueryStamps`].

use geo::{Coord, Line};

use super::error::{Error, Result};
use super::geometric_utils::{OrientedBox, ray_segment_distance, unit_direction};
use super::spatial::SpatialGrid;

/// Default maximum ray length in world units.
pub const DEFAULT_RAY_LENGTH: f64 = 1000.0;

/// Per-query deduplication scratch.
///
/// Each query bumps a generation counter; a segment counts as already tested
/// when its last-seen stamp equals the current generation. This avoids clearing
/// the buffer between queries. When the counter would overflow the whole
/// buffer is zeroed and counting restarts at 1.
#[derive(Debug, Clone, Default)]
pub struct QueryStamps {
    seen: Vec<u32>,
    generation: u32,
}

impl QueryStamps {
    /// Empty scratch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty scratch whose counter starts at `generation`.
    pub fn starting_at(generation: u32) -> Self {
        Self {
            seen: Vec::new(),
            generation,
        }
    }

    /// Current generation counter.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Moves the counter without touching the last-seen marks.
    pub fn fast_forward(&mut self, generation: u32) {
        self.generation = generation;
    }

    /// Capacity of the last-seen buffer.
    pub fn capacity(&self) -> usize {
        self.seen.len()
    }

    /// Grows the buffer geometrically so that ids below `len` fit.
    pub fn reserve_for(&mut self, len: usize) {
        if self.seen.len() < len {
            let grown = (self.seen.len() * 2).max(len).max(16);
            self.seen.resize(grown, 0);
        }
    }

    fn begin(&mut self, segment_count: usize) -> u32 {
        self.reserve_for(segment_count);
        if self.generation == u32::MAX {
            self.seen.fill(0);
            self.generation = 1;
        } else {
            self.generation += 1;
        }
        self.generation
    }

    /// Marks `id`; returns `false` if it was already marked in this query.
    #[inline]
    fn mark(&mut self, id: usize) -> bool {
        let slot = &mut self.seen[id];
        if *slot == self.generation {
            false
        } else {
            *slot = self.generation;
            true
        }
    }
}

/// Append-only set of line segments stored as structure of arrays.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    ax: Vec<f64>,
    ay: Vec<f64>,
    bx: Vec<f64>,
    by: Vec<f64>,
    /// Corners of the box enclosing every segment.
    extent: Option<(Coord<f64>, Coord<f64>)>,
    grid: SpatialGrid,
    stamps: QueryStamps,
}

impl SegmentStore {
    /// Creates an empty store backed by a grid of `cell_size` cells.
    pub fn new(cell_size: f64) -> Result<Self> {
        Ok(Self {
            ax: Vec::new(),
            ay: Vec::new(),
            bx: Vec::new(),
            by: Vec::new(),
            extent: None,
            grid: SpatialGrid::new(cell_size)?,
            stamps: QueryStamps::new(),
        })
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.ax.len()
    }

    /// Whether the store holds no segments.
    pub fn is_empty(&self) -> bool {
        self.ax.is_empty()
    }

    /// The underlying grid.
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Appends segment `a`-`b` and returns its id.
    pub fn add_segment(&mut self, a: Coord<f64>, b: Coord<f64>) -> Result<usize> {
        if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
            return Err(Error::NonFiniteSegment {
                ax: a.x,
                ay: a.y,
                bx: b.x,
                by: b.y,
            });
        }

        let id = self.ax.len();
        self.ax.push(a.x);
        self.ay.push(a.y);
        self.bx.push(b.x);
        self.by.push(b.y);
        self.grid.insert(id, a, b);
        self.stamps.reserve_for(id + 1);

        let (lo, hi) = self.extent.unwrap_or((a, a));
        self.extent = Some((
            Coord {
                x: lo.x.min(a.x).min(b.x),
                y: lo.y.min(a.y).min(b.y),
            },
            Coord {
                x: hi.x.max(a.x).max(b.x),
                y: hi.y.max(a.y).max(b.y),
            },
        ));
        Ok(id)
    }

    /// Endpoints of segment `id`.
    pub fn get_segment(&self, id: usize) -> Option<Line<f64>> {
        (id < self.len()).then(|| Line::new(self.start(id), self.end(id)))
    }

    #[inline]
    fn start(&self, id: usize) -> Coord<f64> {
        Coord {
            x: self.ax[id],
            y: self.ay[id],
        }
    }

    #[inline]
    fn end(&self, id: usize) -> Coord<f64> {
        Coord {
            x: self.bx[id],
            y: self.by[id],
        }
    }

    /// Distance to the closest segment along a ray, using the store's own scratch.
    pub fn ray_min_distance(&mut self, origin: Coord<f64>, angle: f64, max_length: f64) -> Option<f64> {
        let mut stamps = std::mem::take(&mut self.stamps);
        let hit = self.ray_min_distance_with(&mut stamps, origin, angle, max_length);
        self.stamps = stamps;
        hit
    }

    /// Distance to the closest segment along a ray.
    ///
    /// Marches grid cells in order and stops as soon as the next cell starts
    /// beyond the best hit so far. Hits farther than `max_length` are ignored.
    /// The march never goes past the farthest corner of the segments' extent,
    /// so an infinite `max_length` is fine.
    ///
    /// # Returns
    ///
    /// `None` for a degenerate direction or when nothing is hit.
    pub fn ray_min_distance_with(
        &self,
        stamps: &mut QueryStamps,
        origin: Coord<f64>,
        angle: f64,
        max_length: f64,
    ) -> Option<f64> {
        let dir = unit_direction(angle)?;
        let (lo, hi) = self.extent?;
        let reach = [lo.x - origin.x, hi.x - origin.x]
            .into_iter()
            .flat_map(|dx| [lo.y - origin.y, hi.y - origin.y].map(|dy| dx.hypot(dy)))
            .fold(0.0, f64::max);
        stamps.begin(self.len());

        let mut best = f64::INFINITY;
        let march_length = max_length.min(reach + self.grid.cell_size());
        for (key, entered_at) in self.grid.ray_cells(origin, angle, march_length) {
            if entered_at > best {
                break;
            }
            for &id in self.grid.cell(key) {
                if !stamps.mark(id) {
                    continue;
                }
                if let Some(t) = ray_segment_distance(origin, dir, self.start(id), self.end(id)) {
                    if t < best && t <= max_length {
                        best = t;
                    }
                }
            }
        }

        best.is_finite().then_some(best)
    }

    /// First segment overlapping the box, using the store's own scratch.
    pub fn is_box_colliding(&mut self, obb: &OrientedBox) -> Option<usize> {
        let mut stamps = std::mem::take(&mut self.stamps);
        let hit = self.is_box_colliding_with(&mut stamps, obb);
        self.stamps = stamps;
        hit
    }

    /// First segment overlapping the box.
    ///
    /// Candidates come from every cell under the box's bounding box and are
    /// tested once each. When several segments overlap, which id is returned
    /// depends on cell iteration order; use [`Self::is_box_colliding_sorted`]
    /// when the lowest id is required.
    pub fn is_box_colliding_with(&self, stamps: &mut QueryStamps, obb: &OrientedBox) -> Option<usize> {
        stamps.begin(self.len());
        let cells = self
            .grid
            .cells_for_box(obb.center, obb.half_width, obb.half_height, obb.angle);

        for key in cells {
            for &id in self.grid.cell(key) {
                if stamps.mark(id) && obb.intersects_segment(self.start(id), self.end(id)) {
                    return Some(id);
                }
            }
        }
        None
    }

    /// Lowest segment id overlapping the box.
    pub fn is_box_colliding_sorted(&self, obb: &OrientedBox) -> Option<usize> {
        let mut candidates: Vec<usize> = self
            .grid
            .cells_for_box(obb.center, obb.half_width, obb.half_height, obb.angle)
            .into_iter()
            .flat_map(|key| self.grid.cell(key).iter().copied())
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        candidates
            .into_iter()
            .find(|&id| obb.intersects_segment(self.start(id), self.end(id)))
    }
}
