//! Tracks: wall segments, ordered gates and a start pose.

use std::f64::consts::TAU;
use std::path::Path;

use geo::Coord;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{Error, Result};
use super::gates::GateSequence;
use super::segments::SegmentStore;

/// Position and heading where every agent starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Heading in radians.
    pub heading: f64,
}

impl Pose {
    /// Position as a coordinate.
    pub fn pos(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

/// A chain of wall segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// Vertices in order.
    pub points: Vec<[f64; 2]>,
    /// Whether the last vertex connects back to the first.
    #[serde(default)]
    pub closed: bool,
}

impl Polyline {
    /// Segment endpoint pairs.
    pub fn segments(&self) -> Vec<(Coord<f64>, Coord<f64>)> {
        let coords: Vec<Coord<f64>> = self
            .points
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect();
        let mut segments: Vec<_> = coords.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && coords.len() > 2 {
            segments.push((coords[coords.len() - 1], coords[0]));
        }
        segments
    }
}

/// Serializable description of a track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    /// Wall chains.
    pub walls: Vec<Polyline>,
    /// Gates in crossing order, each as two endpoints.
    pub gates: Vec<[[f64; 2]; 2]>,
    /// Start pose.
    pub start: Pose,
}

impl TrackLayout {
    /// Elliptical ring centered on the origin.
    ///
    /// `radius_x`/`radius_y` describe the centerline, `width` the distance
    /// between the walls. Gates are radial and numbered counter-clockwise; the
    /// start pose sits halfway between the last gate and gate 0, facing along
    /// the track.
    pub fn oval(
        radius_x: f64,
        radius_y: f64,
        width: f64,
        resolution: usize,
        gate_count: usize,
    ) -> Result<Self> {
        let half = width / 2.0;
        if !(half > 0.0 && radius_x > half && radius_y > half) {
            return Err(Error::InvalidConfig("oval radii must exceed half the track width"));
        }
        if resolution < 3 || gate_count < 2 {
            return Err(Error::InvalidConfig("oval needs at least 3 wall vertices and 2 gates"));
        }

        let ring = |offset: f64| Polyline {
            points: (0..resolution)
                .map(|i| {
                    let theta = TAU * i as f64 / resolution as f64;
                    [
                        (radius_x + offset) * theta.cos(),
                        (radius_y + offset) * theta.sin(),
                    ]
                })
                .collect(),
            closed: true,
        };

        let gates = (0..gate_count)
            .map(|i| {
                let theta = TAU * i as f64 / gate_count as f64;
                let (sin, cos) = theta.sin_cos();
                [
                    [(radius_x - half) * cos, (radius_y - half) * sin],
                    [(radius_x + half) * cos, (radius_y + half) * sin],
                ]
            })
            .collect();

        let theta = -TAU / (2.0 * gate_count as f64);
        let (sin, cos) = theta.sin_cos();
        let start = Pose {
            x: radius_x * cos,
            y: radius_y * sin,
            heading: (radius_y * cos).atan2(-radius_x * sin),
        };

        Ok(Self {
            walls: vec![ring(-half), ring(half)],
            gates,
            start,
        })
    }

    /// Loads a layout from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Saves the layout as JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Built track, read-only during a race.
#[derive(Debug, Clone)]
pub struct Track {
    /// Wall segments.
    pub walls: SegmentStore,
    /// Checkpoint gates.
    pub gates: GateSequence,
    /// Start pose.
    pub start: Pose,
}

impl Track {
    /// Builds the segment stores for a layout.
    pub fn from_layout(layout: &TrackLayout, cell_size: f64) -> Result<Self> {
        let mut walls = SegmentStore::new(cell_size)?;
        for polyline in &layout.walls {
            for (a, b) in polyline.segments() {
                walls.add_segment(a, b)?;
            }
        }

        let mut gates = GateSequence::new(cell_size)?;
        for &[[ax, ay], [bx, by]] in &layout.gates {
            gates.add_gate(Coord { x: ax, y: ay }, Coord { x: bx, y: by })?;
        }

        info!(
            walls = walls.len(),
            gates = gates.checkpoint_count(),
            cells = walls.grid().cell_count(),
            "built track"
        );

        Ok(Self {
            walls,
            gates,
            start: layout.start,
        })
    }
}
