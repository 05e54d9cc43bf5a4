//! # Evo Track - Evolving Neural Drivers
//!
//! Cars with neural network controllers race on a 2D track, sense the walls
//! with raycasts, and are bred with a generational genetic algorithm.
//!
//! ## Features
//!
//! - Uniform spatial hash over wall and gate segments
//! - DDA ray marching with branch-and-bound closest-hit queries
//! - Oriented box collision via the separating axis theorem
//! - Ordered checkpoint gates with continuous progress
//! - Fixed-length genomes with uniform, blend and hybrid crossover
//! - Elitism, tournament selection and periodic culling
//! - Seeded, reproducible runs
//! - Parallel agent updates with rayon
//! - Save/load of generations as JSON
//!
//! ## Core Modules
//!
//! - [`simulation::spatial`] - Grid cells and ray traversal
//! - [`simulation::segments`] - Ray and box queries over segments
//! - [`simulation::gates`] - Ordered checkpoints
//! - [`simulation::genome`] - Genetic operators
//! - [`simulation::population`] - Scoring and evolution

/// Core simulation logic and data structures.
pub mod simulation {
    /// Neural controller decoded from a genome.
    pub mod brain;
    /// Crate error type.
    pub mod error;
    /// Telemetry and weighted fitness.
    pub mod fitness;
    /// Ordered checkpoint gates.
    pub mod gates;
    /// Fixed-length genomes and genetic operators.
    pub mod genome;
    /// Geometric primitives for ray and box tests.
    pub mod geometric_utils;
    /// Run parameters.
    pub mod params;
    /// Populations and the evolution step.
    pub mod population;
    /// Epoch simulation runs.
    pub mod race;
    /// Segment store with ray and collision queries.
    pub mod segments;
    /// Sensor normalization for controller inputs.
    pub mod sensors;
    /// Uniform spatial hash grid.
    pub mod spatial;
    /// Track layouts and built tracks.
    pub mod track;
    /// Kinematic vehicle model.
    pub mod vehicle;
}
