//! Neural controller decoded from a genome.
//!
//! A genome is a flat list of layer parameters; the controller slices it into
//! dense tanh layers and maps the two outputs to steering and throttle.

use ndarray::Array1;

use super::error::{Error, Result};
use super::genome::Genome;

pub mod mlp;

pub use mlp::Mlp;

/// Number of controller outputs (steering, throttle).
pub const OUTPUT_SIZE: usize = 2;

/// Control values for one tick, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    /// Negative steers right, positive steers left.
    pub steer: f32,
    /// Negative brakes, positive accelerates.
    pub throttle: f32,
}

/// Layer sizes for a controller with `input_size` inputs and the given hidden layers.
pub fn layer_sizes(input_size: usize, hidden: &[usize]) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(hidden.len() + 2);
    sizes.push(input_size);
    sizes.extend_from_slice(hidden);
    sizes.push(OUTPUT_SIZE);
    sizes
}

/// Genome length required by a network with these layer sizes.
pub fn parameter_count(layer_sizes: &[usize]) -> usize {
    layer_sizes
        .windows(2)
        .map(|w| Mlp::parameter_count(w[0], w[1]))
        .sum()
}

/// Feed-forward network that drives one vehicle.
#[derive(Debug, Clone)]
pub struct Controller {
    /// Ordered layers from input to output.
    pub layers: Vec<Mlp>,
}

impl Controller {
    /// Decodes a genome into layers of the given sizes.
    pub fn from_genome(genome: &Genome, layer_sizes: &[usize]) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(Error::InvalidConfig("a controller needs at least two layer sizes"));
        }
        let expected = parameter_count(layer_sizes);
        if genome.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                found: genome.len(),
            });
        }

        let mut rest = genome.weights();
        let layers = layer_sizes
            .windows(2)
            .map(|w| {
                let (params, tail) = rest.split_at(Mlp::parameter_count(w[0], w[1]));
                rest = tail;
                Mlp::from_slice(w[0], w[1], params)
            })
            .collect();

        Ok(Self { layers })
    }

    /// Number of inputs the first layer expects.
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.weights.ncols())
    }

    /// Runs a forward pass.
    #[inline]
    pub fn think(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut output = inputs.clone();
        for layer in &self.layers {
            output = layer.forward(&output);
        }
        output
    }

    /// Runs a forward pass and reads steering and throttle.
    pub fn decide(&self, inputs: &Array1<f32>) -> Result<Controls> {
        if inputs.len() != self.input_size() {
            return Err(Error::SensorArity {
                expected: self.input_size(),
                found: inputs.len(),
            });
        }
        let output = self.think(inputs);
        Ok(Controls {
            steer: output.get(0).copied().unwrap_or(0.0),
            throttle: output.get(1).copied().unwrap_or(0.0),
        })
    }
}
