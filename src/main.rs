use std::path::PathBuf;

use evo_track::simulation::error::Result;
use evo_track::simulation::params::Params;
use evo_track::simulation::population::Population;
use evo_track::simulation::race::Race;
use evo_track::simulation::track::{Track, TrackLayout};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evo_track=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let params = match args.next() {
        Some(path) => Params::load_from_file(path)?,
        None => Params::default(),
    };
    params.validate()?;
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "generations".to_string()));
    std::fs::create_dir_all(&out_dir)?;

    let layout = match &params.track {
        Some(path) => TrackLayout::load_from_file(path)?,
        None => TrackLayout::oval(150.0, 90.0, 24.0, 96, 24)?,
    };
    let track = Track::from_layout(&layout, params.grid_cell_size)?;

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut population = Population::initialize(
        params.population_size,
        params.genome_len(),
        params.evolution.init_scale,
        &mut rng,
    );

    info!(
        population = params.population_size,
        genome_len = params.genome_len(),
        epochs = params.epochs,
        "starting training"
    );

    for _ in 0..params.epochs {
        let mut race = Race::new(&track, population.genomes(), &params)?;
        let steps = race.run(params.max_steps, params.dt)?;
        population.calculate_scores(&race.telemetry(), &params.fitness)?;

        let stats = population.stats();
        let finished = race.agents().iter().filter(|a| a.finished).count();
        info!(
            epoch = population.epoch(),
            steps,
            finished,
            best = stats.best.unwrap_or(f64::NAN),
            mean = stats.mean.unwrap_or(f64::NAN),
            "epoch scored"
        );

        population.save_to_file(out_dir.join(format!("epoch-{:04}.json", population.epoch())))?;
        population = population.evolve(&params.evolution, &mut rng)?;
    }

    Ok(())
}
