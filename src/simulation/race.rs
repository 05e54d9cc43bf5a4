//! One epoch's simulation run.
//!
//! Every agent pairs a genome-decoded controller with a vehicle. Agents are
//! stepped in parallel with rayon; the track is shared read-only and each
//! agent carries its own query scratch.

use rayon::prelude::*;
use tracing::debug;

use super::brain::Controller;
use super::error::Result;
use super::fitness::Telemetry;
use super::genome::Genome;
use super::params::Params;
use super::segments::QueryStamps;
use super::sensors::{RawSensors, SensorConfig, SensorNormalizer};
use super::track::Track;
use super::vehicle::{Vehicle, VehicleParams};

/// A vehicle driven by a controller.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Physical state.
    pub vehicle: Vehicle,
    /// Last gate crossed in order, `None` before gate 0.
    pub last_gate: Option<usize>,
    /// Set when the vehicle touched a wall.
    pub crashed: bool,
    /// Set when the vehicle crossed the last gate.
    pub finished: bool,
    controller: Controller,
    normalizer: SensorNormalizer,
    stamps: QueryStamps,
    ticks: u32,
    speed_sum: f64,
    speeding: u32,
    distance: f64,
}

impl Agent {
    /// Agent at the track's start pose.
    pub fn new(track: &Track, controller: Controller, sensors: SensorConfig) -> Result<Self> {
        Ok(Self {
            vehicle: Vehicle::new(track.start.pos(), track.start.heading),
            last_gate: None,
            crashed: false,
            finished: false,
            controller,
            normalizer: SensorNormalizer::new(sensors)?,
            stamps: QueryStamps::new(),
            ticks: 0,
            speed_sum: 0.0,
            speeding: 0,
            distance: 0.0,
        })
    }

    /// Whether the agent stopped racing.
    pub fn is_done(&self) -> bool {
        self.crashed || self.finished
    }

    /// Radar distances along the configured rays.
    pub fn radar(&mut self, track: &Track) -> Vec<Option<f64>> {
        let config = *self.normalizer.config();
        config
            .ray_angles(self.vehicle.heading)
            .into_iter()
            .map(|angle| {
                track
                    .walls
                    .ray_min_distance_with(&mut self.stamps, self.vehicle.pos, angle, config.ray_length)
            })
            .collect()
    }

    /// Senses, decides, moves and checks walls and the next gate.
    pub fn step(&mut self, track: &Track, vehicle: &VehicleParams, dt: f64) -> Result<()> {
        if self.is_done() {
            return Ok(());
        }

        let distances = self.radar(track);
        let inputs = self.normalizer.normalize(&RawSensors {
            ray_distances: &distances,
            speed: self.vehicle.speed,
            yaw_rate: self.vehicle.yaw_rate,
            slip_angle: self.vehicle.slip_angle(),
        })?;
        let controls = self.controller.decide(&inputs)?;

        self.distance += self.vehicle.step(controls, dt, vehicle);
        self.ticks += 1;
        self.speed_sum += self.vehicle.speed;
        if self.vehicle.speed > vehicle.speed_limit {
            self.speeding += 1;
        }

        let footprint = self.vehicle.footprint(vehicle);
        if track
            .walls
            .is_box_colliding_with(&mut self.stamps, &footprint)
            .is_some()
        {
            self.crashed = true;
            return Ok(());
        }

        // Only gate `next` matters; other gates may overlap the footprint too.
        let next = self.last_gate.map_or(0, |g| g + 1);
        let touches_next = track
            .gates
            .get_segment(next)
            .is_some_and(|gate| footprint.intersects_segment(gate.start, gate.end));
        if touches_next {
            self.last_gate = Some(next);
            if next + 1 == track.gates.checkpoint_count() {
                self.finished = true;
            }
        }
        Ok(())
    }

    /// Fitness aggregates so far.
    pub fn telemetry(&self, track: &Track) -> Telemetry {
        Telemetry {
            progress: track.gates.progress(self.last_gate, self.vehicle.pos),
            average_speed: if self.ticks == 0 {
                0.0
            } else {
                self.speed_sum / f64::from(self.ticks)
            },
            speeding: f64::from(self.speeding),
            crashed: self.crashed,
            finished: self.finished,
            distance: self.distance,
        }
    }
}

/// All agents of one epoch racing on a shared track.
#[derive(Debug)]
pub struct Race<'t> {
    track: &'t Track,
    vehicle: VehicleParams,
    agents: Vec<Agent>,
    steps: usize,
}

impl<'t> Race<'t> {
    /// One agent per genome, all at the start pose.
    pub fn new(track: &'t Track, genomes: &[Genome], params: &Params) -> Result<Self> {
        let layer_sizes = params.layer_sizes();
        let agents = genomes
            .iter()
            .map(|genome| {
                let controller = Controller::from_genome(genome, &layer_sizes)?;
                Agent::new(track, controller, params.sensors)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            track,
            vehicle: params.vehicle,
            agents,
            steps: 0,
        })
    }

    /// Agents in genome order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Whether every agent crashed or finished.
    pub fn is_over(&self) -> bool {
        self.agents.iter().all(Agent::is_done)
    }

    /// Advances every live agent by `dt`.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        let track = self.track;
        let vehicle = &self.vehicle;
        self.agents
            .par_iter_mut()
            .try_for_each(|agent| agent.step(track, vehicle, dt))?;
        self.steps += 1;
        Ok(())
    }

    /// Steps until all agents are done or `max_steps` is reached.
    pub fn run(&mut self, max_steps: usize, dt: f64) -> Result<usize> {
        while self.steps < max_steps && !self.is_over() {
            self.step(dt)?;
        }
        let crashed = self.agents.iter().filter(|a| a.crashed).count();
        let finished = self.agents.iter().filter(|a| a.finished).count();
        debug!(steps = self.steps, crashed, finished, "race over");
        Ok(self.steps)
    }

    /// Per-agent telemetry, aligned with the genomes the race was built from.
    pub fn telemetry(&self) -> Vec<Option<Telemetry>> {
        self.agents
            .iter()
            .map(|agent| Some(agent.telemetry(self.track)))
            .collect()
    }
}
