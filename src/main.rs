use boxflock::engine::CommandOutcome;
use boxflock::{Engine, SimParams};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Прогон без окна: применить команды, сделать тики, вывести сводку.
#[derive(Parser, Debug)]
struct Args {
    /// JSON с (частичными) параметрами симуляции
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,
    #[arg(short = 'n', long)]
    particles: Option<usize>,
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long)]
    gravity: bool,
    #[arg(long)]
    restitution: bool,
    /// Добавлять к ускорению базовую силу и отталкивание
    #[arg(long)]
    environment: bool,
    /// Команды по порядку перед прогоном, например more-particles
    #[arg(long, value_delimiter = ',')]
    commands: Vec<String>,
    /// Куда записать итоговые снимки частиц (JSON)
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn load_params(path: &PathBuf) -> Result<SimParams> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let params: SimParams = serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(params)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut params = match &args.config {
        Some(path) => load_params(path)?,
        None => SimParams::default(),
    };
    if let Some(n) = args.particles {
        params.num_particles = n;
    }
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    params.gravity |= args.gravity;
    params.restitution |= args.restitution;
    params.apply_environment |= args.environment;

    let mut engine = Engine::new(params);
    // команды до первого тика, quit завершает прогон сразу
    for cmd in &args.commands {
        match engine.apply_command(cmd).map_err(|e| anyhow!(e))? {
            CommandOutcome::Respawned => {}
            CommandOutcome::Quit => {
                info!("quit before first tick");
                return Ok(());
            }
        }
    }

    info!("running {} ticks with {} particles", args.ticks, engine.len());
    for _ in 0..args.ticks {
        engine.tick();
    }

    let velocities = engine.store().velocities();
    let mean_speed = velocities.iter().map(|v| v.norm()).sum::<f64>() / velocities.len() as f64;
    let max_coord = engine
        .store()
        .positions()
        .iter()
        .flat_map(|p| p.iter().copied())
        .fold(0.0_f64, |m, c| m.max(c.abs()));

    println!("ticks       = {}", engine.ticks());
    println!("particles   = {}", engine.len());
    println!("speed limit = {}", engine.params().speed_limit);
    println!("mean speed  = {:.6}", mean_speed);
    println!("max |coord| = {:.6}", max_coord);

    if let Some(path) = &args.dump {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &engine.store().snapshots())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("snapshots written to {}", path.display());
    }
    Ok(())
}
