use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::brain;
use super::error::{Error, Result};
use super::fitness::FitnessWeights;
use super::population::EvolutionConfig;
use super::sensors::SensorConfig;
use super::vehicle::VehicleParams;

/// Parameters of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Edge length of the spatial grid cells.
    pub grid_cell_size: f64,
    /// Number of genomes per epoch.
    pub population_size: usize,
    /// Number of epochs to train.
    pub epochs: u32,
    /// Step budget per race.
    pub max_steps: usize,
    /// Simulation time step in seconds.
    pub dt: f64,
    /// Seed of the random number generator.
    pub seed: u64,
    /// Hidden layer sizes of the controller network.
    pub hidden_layers: Vec<usize>,
    /// Track layout file; the built-in oval is used when absent.
    pub track: Option<PathBuf>,
    /// Vehicle physics.
    pub vehicle: VehicleParams,
    /// Radar layout and normalization.
    pub sensors: SensorConfig,
    /// Selection and reproduction.
    pub evolution: EvolutionConfig,
    /// Fitness component weights.
    pub fitness: FitnessWeights,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            grid_cell_size: 16.0,
            population_size: 60,
            epochs: 50,
            max_steps: 3000,
            dt: 0.05,
            seed: 42,
            hidden_layers: vec![10],
            track: None,
            vehicle: VehicleParams::default(),
            sensors: SensorConfig::default(),
            evolution: EvolutionConfig::default(),
            fitness: FitnessWeights {
                progress: 1.0,
                average_speed: 0.05,
                speeding: -0.01,
                crashed: -0.5,
                finished: 5.0,
                distance: 0.0,
            },
        }
    }
}

impl Params {
    /// Controller layer sizes, from sensor inputs to outputs.
    pub fn layer_sizes(&self) -> Vec<usize> {
        brain::layer_sizes(self.sensors.input_size(), &self.hidden_layers)
    }

    /// Genome length needed by the controller.
    pub fn genome_len(&self) -> usize {
        brain::parameter_count(&self.layer_sizes())
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(Error::InvalidConfig("dt must be positive and finite"));
        }
        if self.population_size == 0 {
            return Err(Error::InvalidConfig("population_size must be at least 1"));
        }
        if self.evolution.elite_count > self.population_size {
            return Err(Error::InvalidConfig("elite_count exceeds population_size"));
        }
        if !(0.0..=1.0).contains(&self.evolution.elimination_rate) {
            return Err(Error::InvalidConfig("elimination_rate must lie in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.evolution.mutation_rate) {
            return Err(Error::InvalidConfig("mutation_rate must lie in [0, 1]"));
        }
        if !(self.vehicle.wheelbase > 0.0) {
            return Err(Error::InvalidConfig("wheelbase must be positive"));
        }
        Ok(())
    }

    /// Loads parameters from a JSON file; missing fields take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        info!(path = %path.as_ref().display(), "loaded params");
        Ok(params)
    }

    /// Saves the parameters as JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
