//! Sensor normalization: raw radar and vehicle state to bounded controller inputs.
//!
//! The input vector is laid out as
//! `[radar_0 .. radar_{n-1}, time_to_collision, balance, yaw_rate, slip, speed]`.
//! Radar, time to collision and speed lie in `[0, 1]`; balance, yaw rate and
//! slip lie in `[-1, 1]`.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Number of inputs besides the radar rays.
pub const EXTRA_INPUTS: usize = 5;

/// Radar layout and normalization ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Number of radar rays.
    pub ray_count: usize,
    /// Angle covered by the rays, centered on the heading (radians).
    pub field_of_view: f64,
    /// Maximum radar range; misses read as this distance.
    pub ray_length: f64,
    /// Time to collision at or beyond which the input saturates (seconds).
    pub ttc_horizon: f64,
    /// Speed mapped to 1.0.
    pub max_speed: f64,
    /// Yaw rate mapped to +-1.0 (radians per second).
    pub max_yaw_rate: f64,
    /// Slip angle mapped to +-1.0 (radians).
    pub max_slip: f64,
    /// Exponential smoothing factor in `[0, 1)`; 0 disables smoothing.
    pub smoothing: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ray_count: 7,
            field_of_view: std::f64::consts::PI,
            ray_length: 200.0,
            ttc_horizon: 3.0,
            max_speed: 40.0,
            max_yaw_rate: 3.0,
            max_slip: 0.5,
            smoothing: 0.0,
        }
    }
}

impl SensorConfig {
    /// Length of the normalized input vector.
    pub fn input_size(&self) -> usize {
        self.ray_count + EXTRA_INPUTS
    }

    /// Ray angles relative to the heading, from rightmost to leftmost.
    pub fn relative_ray_angles(&self) -> Vec<f64> {
        match self.ray_count {
            0 => Vec::new(),
            1 => vec![0.0],
            n => {
                let step = self.field_of_view / (n - 1) as f64;
                (0..n)
                    .map(|i| -self.field_of_view / 2.0 + step * i as f64)
                    .collect()
            }
        }
    }

    /// Absolute ray angles for a vehicle facing `heading`.
    pub fn ray_angles(&self, heading: f64) -> Vec<f64> {
        self.relative_ray_angles()
            .into_iter()
            .map(|a| heading + a)
            .collect()
    }

    fn validate(&self) -> Result<()> {
        let positive = [
            self.ray_length,
            self.ttc_horizon,
            self.max_speed,
            self.max_yaw_rate,
            self.max_slip,
        ];
        if !positive.iter().all(|v| v.is_finite() && *v > 0.0) {
            return Err(Error::InvalidConfig("sensor ranges must be positive and finite"));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(Error::InvalidConfig("sensor smoothing must lie in [0, 1)"));
        }
        Ok(())
    }
}

/// One tick of raw sensor readings.
#[derive(Debug, Clone, Copy)]
pub struct RawSensors<'a> {
    /// Radar hit distances in ray order; `None` for no hit within range.
    pub ray_distances: &'a [Option<f64>],
    /// Forward speed.
    pub speed: f64,
    /// Yaw rate (radians per second, counter-clockwise positive).
    pub yaw_rate: f64,
    /// Angle between heading and velocity (radians).
    pub slip_angle: f64,
}

/// Stateful normalizer; holds the smoothed previous output.
#[derive(Debug, Clone)]
pub struct SensorNormalizer {
    config: SensorConfig,
    relative_angles: Vec<f64>,
    previous: Option<Array1<f32>>,
}

impl SensorNormalizer {
    /// Creates a normalizer for the given layout.
    pub fn new(config: SensorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            relative_angles: config.relative_ray_angles(),
            config,
            previous: None,
        })
    }

    /// The layout this normalizer was built for.
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Forgets the smoothing state.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Maps raw readings to the bounded input vector.
    pub fn normalize(&mut self, raw: &RawSensors<'_>) -> Result<Array1<f32>> {
        let n = self.config.ray_count;
        if raw.ray_distances.len() != n {
            return Err(Error::SensorArity {
                expected: n,
                found: raw.ray_distances.len(),
            });
        }

        let range = self.config.ray_length;
        let distances: Vec<f64> = raw
            .ray_distances
            .iter()
            .map(|d| d.unwrap_or(range).clamp(0.0, range))
            .collect();

        let mut out = Array1::zeros(self.config.input_size());
        for (i, d) in distances.iter().enumerate() {
            out[i] = (d / range) as f32;
        }
        out[n] = self.time_to_collision(&distances, raw.speed) as f32;
        out[n + 1] = self.balance(&distances) as f32;
        out[n + 2] = (raw.yaw_rate / self.config.max_yaw_rate).clamp(-1.0, 1.0) as f32;
        out[n + 3] = (raw.slip_angle / self.config.max_slip).clamp(-1.0, 1.0) as f32;
        out[n + 4] = (raw.speed / self.config.max_speed).clamp(0.0, 1.0) as f32;

        // NaN readings would poison the smoothing state.
        out.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });

        let s = self.config.smoothing as f32;
        if let Some(prev) = &self.previous {
            if s > 0.0 {
                out = &out * (1.0 - s) + prev * s;
            }
        }
        self.previous = Some(out.clone());
        Ok(out)
    }

    /// Normalized time until the closest ray hit is reached at the current speed.
    fn time_to_collision(&self, distances: &[f64], speed: f64) -> f64 {
        let mut ttc = f64::INFINITY;
        for (d, angle) in distances.iter().zip(&self.relative_angles) {
            let closing = speed * angle.cos();
            if closing > f64::EPSILON {
                ttc = ttc.min(d / closing);
            }
        }
        (ttc / self.config.ttc_horizon).clamp(0.0, 1.0)
    }

    /// Free space on the left minus free space on the right, normalized.
    fn balance(&self, distances: &[f64]) -> f64 {
        let (mut left, mut right) = (0.0, 0.0);
        for (d, angle) in distances.iter().zip(&self.relative_angles) {
            if *angle > 0.0 {
                left += d;
            } else if *angle < 0.0 {
                right += d;
            }
        }
        let total = left + right;
        if total > f64::EPSILON {
            ((left - right) / total).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}
