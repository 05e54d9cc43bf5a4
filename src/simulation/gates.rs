//! Ordered checkpoint gates.
//!
//! A [`GateSequence`] wraps a [`SegmentStore`] whose insertion order carries
//! meaning: gate `i` is the `i`-th checkpoint an agent has to cross.

use geo::{Coord, Line};

use super::error::{Error, Result};
use super::geometric_utils::{DIRECTION_EPSILON, OrientedBox, dot, midpoint};
use super::segments::{QueryStamps, SegmentStore};

/// Checkpoint gates in crossing order.
#[derive(Debug, Clone)]
pub struct GateSequence {
    store: SegmentStore,
}

impl GateSequence {
    /// Creates an empty sequence backed by a grid of `cell_size` cells.
    pub fn new(cell_size: f64) -> Result<Self> {
        Ok(Self {
            store: SegmentStore::new(cell_size)?,
        })
    }

    /// Appends the next gate. Zero-length gates are rejected.
    pub fn add_gate(&mut self, a: Coord<f64>, b: Coord<f64>) -> Result<usize> {
        let d = b - a;
        if dot(d, d).sqrt() < DIRECTION_EPSILON {
            return Err(Error::DegenerateGate {
                index: self.store.len(),
            });
        }
        self.store.add_segment(a, b)
    }

    /// Number of gates.
    pub fn checkpoint_count(&self) -> usize {
        self.store.len()
    }

    /// The segment engine holding the gates.
    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    /// Endpoints of gate `id`.
    pub fn get_segment(&self, id: usize) -> Option<Line<f64>> {
        self.store.get_segment(id)
    }

    /// See [`SegmentStore::ray_min_distance`].
    pub fn ray_min_distance(&mut self, origin: Coord<f64>, angle: f64, max_length: f64) -> Option<f64> {
        self.store.ray_min_distance(origin, angle, max_length)
    }

    /// See [`SegmentStore::is_box_colliding`].
    pub fn is_box_colliding(&mut self, obb: &OrientedBox) -> Option<usize> {
        self.store.is_box_colliding(obb)
    }

    /// See [`SegmentStore::is_box_colliding_with`].
    pub fn is_box_colliding_with(&self, stamps: &mut QueryStamps, obb: &OrientedBox) -> Option<usize> {
        self.store.is_box_colliding_with(stamps, obb)
    }

    /// How far `point` has travelled from gate `gate_index` towards the next gate.
    ///
    /// Projects the point onto the vector between the two gate midpoints and
    /// clamps the scalar projection to `[0, 1]`.
    ///
    /// # Returns
    ///
    /// `0.0` when `gate_index` has no successor gate.
    pub fn projection_fraction(&self, gate_index: usize, point: Coord<f64>) -> f64 {
        let (Some(from), Some(to)) = (
            self.store.get_segment(gate_index),
            gate_index
                .checked_add(1)
                .and_then(|next| self.store.get_segment(next)),
        ) else {
            return 0.0;
        };

        let m0 = midpoint(from.start, from.end);
        let m1 = midpoint(to.start, to.end);
        let span = m1 - m0;
        let len_sq = dot(span, span);
        if len_sq < DIRECTION_EPSILON {
            return 0.0;
        }

        let fraction = dot(point - m0, span) / len_sq;
        if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        }
    }

    /// Continuous progress: gates crossed plus the fraction towards the next one.
    ///
    /// `last_crossed` is `None` before the first gate has been crossed.
    pub fn progress(&self, last_crossed: Option<usize>, point: Coord<f64>) -> f64 {
        match last_crossed {
            None => 0.0,
            Some(gate) => (gate + 1) as f64 + self.projection_fraction(gate, point),
        }
    }
}
