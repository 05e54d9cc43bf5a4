//! Multi-layer perceptron layer.

use ndarray::{Array1, Array2};

/// A single dense layer with tanh activation.
#[derive(Debug, Clone)]
pub struct Mlp {
    /// Weight matrix (`output_size` × `input_size`).
    pub weights: Array2<f32>,
    /// Bias vector (`output_size`).
    pub biases: Array1<f32>,
}

impl Mlp {
    /// Number of parameters of a layer with the given shape.
    pub fn parameter_count(input_size: usize, output_size: usize) -> usize {
        input_size * output_size + output_size
    }

    /// Builds a layer from a flat parameter slice: row-major weights, then biases.
    ///
    /// `params` must hold exactly [`Self::parameter_count`] values.
    pub fn from_slice(input_size: usize, output_size: usize, params: &[f32]) -> Self {
        let (weights, biases) = params.split_at(input_size * output_size);
        Self {
            weights: Array2::from_shape_fn((output_size, input_size), |(r, c)| {
                weights[r * input_size + c]
            }),
            biases: Array1::from(biases.to_vec()),
        }
    }

    /// Performs forward pass with tanh activation.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut output = self.weights.dot(inputs);
        output += &self.biases;
        output.mapv_inplace(f32::tanh);
        output
    }
}
