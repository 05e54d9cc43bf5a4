//! Error type shared by track building, evolution, sensing and persistence.
//!
//! Geometric edge cases (parallel rays, empty candidate sets, out-of-range
//! gate indices) are never errors: queries resolve them to `None` or `0.0`.
//! Everything here is a configuration or programmer error raised at the
//! point of misuse.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors emitted by the simulation core.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration values that cannot be used (e.g. non-positive cell size).
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A segment endpoint is NaN or infinite.
    #[error("segment ({ax}, {ay}) - ({bx}, {by}) has a non-finite endpoint")]
    NonFiniteSegment {
        /// Start x.
        ax: f64,
        /// Start y.
        ay: f64,
        /// End x.
        bx: f64,
        /// End y.
        by: f64,
    },

    /// A gate with both endpoints at the same location.
    #[error("gate {index} has zero length")]
    DegenerateGate {
        /// Index the gate would have received.
        index: usize,
    },

    /// Two vectors that must agree in length do not.
    #[error("length mismatch: expected {expected}, found {found}")]
    LengthMismatch {
        /// Required length.
        expected: usize,
        /// Supplied length.
        found: usize,
    },

    /// Radar input with the wrong number of rays.
    #[error("sensor arity mismatch: expected {expected} rays, found {found}")]
    SensorArity {
        /// Configured ray count.
        expected: usize,
        /// Supplied ray count.
        found: usize,
    },

    /// Telemetry slice not aligned with the population.
    #[error("telemetry arity mismatch: expected {expected} agents, found {found}")]
    TelemetryArity {
        /// Population size.
        expected: usize,
        /// Supplied telemetry entries.
        found: usize,
    },

    /// File system failure while loading or saving.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON while loading or saving.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
