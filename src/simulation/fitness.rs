//! Per-agent telemetry and the weighted fitness built from it.

use serde::{Deserialize, Serialize};

/// Fitness-relevant aggregates collected for one agent over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Gates crossed in order plus the fraction of the way to the next gate.
    pub progress: f64,
    /// Mean speed over the ticks the agent was alive.
    pub average_speed: f64,
    /// Number of ticks spent above the speed limit.
    pub speeding: f64,
    /// Whether the agent hit a wall.
    pub crashed: bool,
    /// Whether the agent crossed the last gate.
    pub finished: bool,
    /// Total path length driven.
    pub distance: f64,
}

/// Weights of the fitness components. A weight left out of a config file is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Weight of [`Telemetry::progress`].
    pub progress: f64,
    /// Weight of [`Telemetry::average_speed`].
    pub average_speed: f64,
    /// Weight of [`Telemetry::speeding`].
    pub speeding: f64,
    /// Weight applied when [`Telemetry::crashed`] is set.
    pub crashed: f64,
    /// Weight applied when [`Telemetry::finished`] is set.
    pub finished: f64,
    /// Weight of [`Telemetry::distance`].
    pub distance: f64,
}

impl FitnessWeights {
    /// Weighted sum of the telemetry components.
    pub fn score(&self, t: &Telemetry) -> f64 {
        self.progress * t.progress
            + self.average_speed * t.average_speed
            + self.speeding * t.speeding
            + self.crashed * f64::from(u8::from(t.crashed))
            + self.finished * f64::from(u8::from(t.finished))
            + self.distance * t.distance
    }
}
