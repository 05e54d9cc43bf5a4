//! Fixed-length real-valued genomes and their genetic operators.
//!
//! All randomness comes from a caller-supplied RNG so that runs are
//! reproducible under a fixed seed.

use ndarray::ArrayView1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// How two parents are recombined into a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossoverStrategy {
    /// Each gene is copied from one parent chosen with probability 0.5.
    Uniform,
    /// Each gene is `alpha * a + (1 - alpha) * b` with a fresh `alpha` in `[0, 1]`.
    Blend,
    /// Per child, a fair coin picks `Uniform` or `Blend`.
    #[default]
    Hybrid,
}

/// Weight vector of a neural controller.
///
/// Serializes as a plain JSON array of numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    weights: Vec<f32>,
}

impl Genome {
    /// All-zero genome of `len` genes.
    pub fn zeros(len: usize) -> Self {
        Self {
            weights: vec![0.0; len],
        }
    }

    /// Genome with genes drawn uniformly from `[-scale, scale]`.
    pub fn random<R: Rng>(len: usize, scale: f32, rng: &mut R) -> Self {
        let mut genome = Self::zeros(len);
        genome.randomize(scale, rng);
        genome
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the genome has no genes.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Genes as a slice.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Genes as an ndarray view.
    pub fn view(&self) -> ArrayView1<'_, f32> {
        ArrayView1::from(self.weights.as_slice())
    }

    /// Redraws every gene uniformly from `[-scale, scale]`.
    pub fn randomize<R: Rng>(&mut self, scale: f32, rng: &mut R) -> &mut Self {
        let scale = scale.abs();
        for w in &mut self.weights {
            *w = rng.random_range(-scale..=scale);
        }
        self
    }

    /// Adds Gaussian noise with standard deviation `sigma` to each gene with probability `rate`.
    pub fn mutate<R: Rng>(&mut self, rate: f32, sigma: f32, rng: &mut R) -> &mut Self {
        if rate <= 0.0 || sigma == 0.0 {
            return self;
        }
        for w in &mut self.weights {
            if rng.random::<f32>() < rate {
                *w += gaussian(rng) * sigma;
            }
        }
        self
    }

    /// Recombines two parents with the given strategy.
    pub fn crossover<R: Rng>(
        strategy: CrossoverStrategy,
        a: &Genome,
        b: &Genome,
        rng: &mut R,
    ) -> Result<Genome> {
        match strategy {
            CrossoverStrategy::Uniform => Self::crossover_uniform(a, b, rng),
            CrossoverStrategy::Blend => Self::crossover_blend(a, b, rng),
            CrossoverStrategy::Hybrid => {
                if rng.random_bool(0.5) {
                    Self::crossover_uniform(a, b, rng)
                } else {
                    Self::crossover_blend(a, b, rng)
                }
            }
        }
    }

    /// Child whose genes each come from `a` or `b` with equal probability.
    pub fn crossover_uniform<R: Rng>(a: &Genome, b: &Genome, rng: &mut R) -> Result<Genome> {
        check_lengths(a, b)?;
        let weights = a
            .weights
            .iter()
            .zip(&b.weights)
            .map(|(&wa, &wb)| if rng.random_bool(0.5) { wa } else { wb })
            .collect();
        Ok(Genome { weights })
    }

    /// Child whose genes are per-gene random interpolations between `a` and `b`.
    pub fn crossover_blend<R: Rng>(a: &Genome, b: &Genome, rng: &mut R) -> Result<Genome> {
        check_lengths(a, b)?;
        let weights = a
            .weights
            .iter()
            .zip(&b.weights)
            .map(|(&wa, &wb)| {
                let alpha = rng.random::<f32>();
                wa * alpha + wb * (1.0 - alpha)
            })
            .collect();
        Ok(Genome { weights })
    }
}

impl From<Vec<f32>> for Genome {
    fn from(weights: Vec<f32>) -> Self {
        Self { weights }
    }
}

fn check_lengths(a: &Genome, b: &Genome) -> Result<()> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            expected: a.len(),
            found: b.len(),
        })
    }
}

/// Standard normal sample via the Box-Muller transform.
pub fn gaussian<R: Rng>(rng: &mut R) -> f32 {
    // 1 - [0, 1) keeps u1 away from zero so ln stays finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    ((-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()) as f32
}
