//! Populations of genomes and the generational evolution step.
//!
//! A population goes through `seeded -> scored -> evolved` once per epoch.
//! Evolution keeps the best genomes unchanged (elitism), fills most of the
//! remaining slots with mutated offspring of tournament-selected parents,
//! periodically culls part of that offspring quota, and tops the population up
//! with fresh random genomes.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{Error, Result};
use super::fitness::{FitnessWeights, Telemetry};
use super::genome::{CrossoverStrategy, Genome};

/// Parameters of [`Population::evolve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of top genomes copied unchanged. Clamped to the population size.
    pub elite_count: usize,
    /// Culling period in epochs; 0 disables culling.
    pub elimination_epochs: u32,
    /// Fraction of the offspring quota replaced by random genomes on culling epochs.
    pub elimination_rate: f64,
    /// Number of genomes sampled per tournament.
    pub tournament_size: usize,
    /// How often to redraw the second parent when it equals the first.
    pub max_parent_retries: usize,
    /// Per-gene mutation probability.
    pub mutation_rate: f32,
    /// Standard deviation of the mutation noise.
    pub mutation_sigma: f32,
    /// Range `[-init_scale, init_scale]` of freshly randomized genes.
    pub init_scale: f32,
    /// Recombination operator for offspring.
    pub crossover: CrossoverStrategy,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            elite_count: 2,
            elimination_epochs: 10,
            elimination_rate: 0.2,
            tournament_size: 3,
            max_parent_retries: 10,
            mutation_rate: 0.1,
            mutation_sigma: 0.2,
            init_scale: 1.0,
            crossover: CrossoverStrategy::Hybrid,
        }
    }
}

/// Summary of a scored population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    /// Highest score, if any genome is scored.
    pub best: Option<f64>,
    /// Mean over scored genomes.
    pub mean: Option<f64>,
    /// Number of scored genomes.
    pub scored: usize,
}

/// The genomes alive during one epoch and their scores.
///
/// Serializes as `{ "epoch": n, "genomes": [[...], ...], "scores": [x | null, ...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    epoch: u32,
    genomes: Vec<Genome>,
    scores: Vec<Option<f64>>,
}

impl Population {
    /// Wraps existing genomes as an unscored epoch-0 population.
    pub fn new(genomes: Vec<Genome>) -> Result<Self> {
        Self::with_epoch(0, genomes)
    }

    /// Wraps existing genomes as an unscored population of the given epoch.
    pub fn with_epoch(epoch: u32, genomes: Vec<Genome>) -> Result<Self> {
        let population = Self {
            epoch,
            scores: vec![None; genomes.len()],
            genomes,
        };
        population.validate()?;
        Ok(population)
    }

    /// Epoch-0 population of `size` random genomes with `genome_len` genes.
    pub fn initialize<R: Rng>(size: usize, genome_len: usize, scale: f32, rng: &mut R) -> Self {
        let genomes = (0..size)
            .map(|_| Genome::random(genome_len, scale, rng))
            .collect();
        Self {
            epoch: 0,
            scores: vec![None; size],
            genomes,
        }
    }

    /// Epoch number, starting at 0.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Number of genomes.
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Genes per genome (0 for an empty population).
    pub fn genome_len(&self) -> usize {
        self.genomes.first().map_or(0, Genome::len)
    }

    /// All genomes in slot order.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Scores aligned with [`Self::genomes`]; `None` means not scored yet.
    pub fn scores(&self) -> &[Option<f64>] {
        &self.scores
    }

    /// Scores every genome from its agent's telemetry.
    ///
    /// `None` telemetry leaves that genome unscored. Previous scores are replaced.
    pub fn calculate_scores(&mut self, telemetry: &[Option<Telemetry>], weights: &FitnessWeights) -> Result<()> {
        if telemetry.len() != self.genomes.len() {
            return Err(Error::TelemetryArity {
                expected: self.genomes.len(),
                found: telemetry.len(),
            });
        }
        self.scores = telemetry
            .iter()
            .map(|t| t.as_ref().map(|t| weights.score(t)))
            .collect();
        Ok(())
    }

    /// Marks every genome as unscored, e.g. before a rerun on another track.
    pub fn reset_scores(&mut self) {
        self.scores.fill(None);
    }

    /// Slot indices ordered from best to worst score; unscored genomes rank last.
    pub fn ranked(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.genomes.len()).collect();
        order.sort_by(|&a, &b| self.rank_key(b).total_cmp(&self.rank_key(a)));
        order
    }

    /// Best genome and its score.
    pub fn best(&self) -> Option<(&Genome, Option<f64>)> {
        self.ranked()
            .first()
            .map(|&i| (&self.genomes[i], self.scores[i]))
    }

    /// Best and mean score over scored genomes.
    pub fn stats(&self) -> PopulationStats {
        let scored: Vec<f64> = self.scores.iter().flatten().copied().collect();
        let best = scored.iter().copied().reduce(f64::max);
        let mean = (!scored.is_empty()).then(|| scored.iter().sum::<f64>() / scored.len() as f64);
        PopulationStats {
            best,
            mean,
            scored: scored.len(),
        }
    }

    /// Produces the next epoch's population.
    ///
    /// The result always has the same size as `self`. The `elite_count` best
    /// genomes are carried over unchanged.
    pub fn evolve<R: Rng>(&self, config: &EvolutionConfig, rng: &mut R) -> Result<Population> {
        let size = self.genomes.len();
        let elite_count = config.elite_count.min(size);

        let mut next: Vec<Genome> = Vec::with_capacity(size);
        next.extend(
            self.ranked()
                .into_iter()
                .take(elite_count)
                .map(|i| self.genomes[i].clone()),
        );

        let mut remaining = size - elite_count;
        if config.elimination_epochs > 0
            && self.epoch > 0
            && self.epoch % config.elimination_epochs == 0
        {
            let culled = (remaining as f64 * config.elimination_rate.clamp(0.0, 1.0)).floor() as usize;
            debug!(epoch = self.epoch, culled, "culling offspring slots");
            remaining -= culled;
        }

        for _ in 0..remaining {
            let first = self.tournament(config.tournament_size, rng);
            let mut second = self.tournament(config.tournament_size, rng);
            let mut retries = 0;
            while second == first && retries < config.max_parent_retries {
                second = self.tournament(config.tournament_size, rng);
                retries += 1;
            }

            let mut child = Genome::crossover(
                config.crossover,
                &self.genomes[first],
                &self.genomes[second],
                rng,
            )?;
            child.mutate(config.mutation_rate, config.mutation_sigma, rng);
            next.push(child);
        }

        let genome_len = self.genome_len();
        let fresh = size - next.len();
        while next.len() < size {
            next.push(Genome::random(genome_len, config.init_scale, rng));
        }
        debug!(epoch = self.epoch + 1, elite_count, fresh, "evolved population");

        Ok(Population {
            epoch: self.epoch + 1,
            scores: vec![None; size],
            genomes: next,
        })
    }

    /// Best of `k` slots sampled uniformly with replacement.
    ///
    /// Must not be called on an empty population.
    pub fn tournament<R: Rng>(&self, k: usize, rng: &mut R) -> usize {
        let mut winner = rng.random_range(0..self.genomes.len());
        for _ in 1..k.max(1) {
            let candidate = rng.random_range(0..self.genomes.len());
            if self.rank_key(candidate) > self.rank_key(winner) {
                winner = candidate;
            }
        }
        winner
    }

    fn rank_key(&self, i: usize) -> f64 {
        match self.scores[i] {
            Some(s) if !s.is_nan() => s,
            _ => f64::NEG_INFINITY,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scores.len() != self.genomes.len() {
            return Err(Error::LengthMismatch {
                expected: self.genomes.len(),
                found: self.scores.len(),
            });
        }
        let expected = self.genome_len();
        if let Some(bad) = self.genomes.iter().find(|g| g.len() != expected) {
            return Err(Error::LengthMismatch {
                expected,
                found: bad.len(),
            });
        }
        Ok(())
    }

    /// Saves the population as JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        info!(epoch = self.epoch, path = %path.as_ref().display(), "saved population");
        Ok(())
    }

    /// Loads a population saved with [`Self::save_to_file`].
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let population: Self = serde_json::from_str(&json)?;
        population.validate()?;
        Ok(population)
    }
}
