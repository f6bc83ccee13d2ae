use anyhow::Context;
use clap::Parser;
use stratsim::application::engine::{ProfileKind, StrategyEngine, run_batch, run_session};
use stratsim::config::{ProfileOverrides, SimulationEnvConfig};
use stratsim::domain::ports::RandomSource;
use stratsim::infrastructure::StdRandom;
use stratsim::infrastructure::simulation::SnapshotGenerator;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Runs simulated trading sessions against synthetic market snapshots.
///
/// Flags override the SIM_* environment variables.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Profile: aggressive, conservative or flip
    #[arg(short, long)]
    profile: Option<String>,

    /// Starting capital
    #[arg(short, long)]
    capital: Option<f64>,

    /// RNG seed (entropy when unset)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulated days
    #[arg(short, long)]
    days: Option<u32>,

    /// Snapshots offered per day
    #[arg(short, long)]
    ticks: Option<u32>,

    /// Quality of synthetic signals in [0, 1]
    #[arg(long)]
    signal_quality: Option<f64>,

    /// TOML file with profile overrides
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Run N independently seeded sessions in parallel and print an aggregate
    #[arg(long)]
    sessions: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = SimulationEnvConfig::from_env().context("Failed to load SIM_* config")?;
    if let Some(profile) = &cli.profile {
        config.profile = ProfileKind::from_str(profile)?;
    }
    if let Some(capital) = cli.capital {
        config.initial_capital = capital;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(days) = cli.days {
        config.days = days;
    }
    if let Some(ticks) = cli.ticks {
        config.ticks_per_day = ticks;
    }
    if let Some(quality) = cli.signal_quality {
        config.signal_quality = quality;
    }
    if cli.overrides.is_some() {
        config.overrides_path = cli.overrides.clone();
    }

    let overrides = match &config.overrides_path {
        Some(path) => ProfileOverrides::load(path)?,
        None => ProfileOverrides::default(),
    };
    let profile = overrides.build_profile(config.profile);
    let session = config.session();

    info!(
        "simulate: profile={} capital=${:.2} days={} ticks/day={} quality={:.2}",
        config.profile,
        config.initial_capital,
        session.days,
        session.ticks_per_day,
        config.signal_quality
    );

    if let Some(sessions) = cli.sessions {
        let base_seed = config.seed.unwrap_or_else(|| {
            (StdRandom::from_entropy().next_unit() * u32::MAX as f64) as u64
        });
        let report = run_batch(
            &profile,
            config.initial_capital,
            base_seed,
            sessions,
            config.signal_quality,
            &session,
        )
        .context("Batch run failed")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (engine_random, mut generator) = match config.seed {
        Some(seed) => (
            StdRandom::seeded(seed),
            SnapshotGenerator::seeded(seed.wrapping_add(1), config.signal_quality),
        ),
        None => (
            StdRandom::from_entropy(),
            SnapshotGenerator::new(Box::new(StdRandom::from_entropy()), config.signal_quality),
        ),
    };
    let mut engine = StrategyEngine::new(profile, config.initial_capital, Box::new(engine_random))
        .context("Failed to build engine")?;

    let report = run_session(&mut engine, &mut generator, &session);
    for day in &report.days {
        println!("{}", serde_json::to_string(day)?);
    }
    println!("{}", serde_json::to_string_pretty(&report.status)?);

    Ok(())
}
