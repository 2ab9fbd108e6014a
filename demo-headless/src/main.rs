use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use smog_sim_core::collector::{aggregate_hourly, parse_samples, write_traffic_table};
use smog_sim_core::roads::LabelCandidate;
use smog_sim_core::simulation::RecordedFrame;
use smog_sim_core::source::{
    CsvTrafficFile, InMemoryTraffic, JsonRoadFile, RoadNetworkSource, SyntheticCity, TrafficSource,
};
use smog_sim_core::traffic::TrafficTableFormat;
use smog_sim_core::{Scenario, SimulationConfig};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Urban smog dispersion simulator
#[derive(Parser, Debug)]
#[command(name = "smog-sim")]
#[command(about = "Traffic-driven PM10 dispersion over a city grid", long_about = None)]
struct Args {
    /// More log output (-v debug, -vv trace); `RUST_LOG` takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a warm-up day plus a recorded day and report the recorded frames
    Run(RunArgs),
    /// Average collected congestion samples into a sensor table
    Aggregate(AggregateArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// JSON configuration; missing fields take defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Road records as JSON; a synthetic city is generated when absent
    #[arg(long)]
    roads: Option<PathBuf>,

    /// Semicolon sensor table; synthetic sensors are used with a synthetic city
    #[arg(long)]
    traffic: Option<PathBuf>,

    /// Seed of the synthetic city
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Override the grid size (cells per side)
    #[arg(short, long)]
    grid_size: Option<usize>,

    /// Override the number of steps per simulated day
    #[arg(short, long)]
    steps_per_day: Option<usize>,

    /// Write recorded frames, labels and summaries as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Hours between printed report rows
    #[arg(short, long, default_value_t = 1)]
    report_interval: usize,
}

#[derive(clap::Args, Debug)]
struct AggregateArgs {
    /// Collected samples (`street;lat,lon;HH:MM;pct` per line)
    #[arg(long)]
    samples: PathBuf,

    /// Sensor table to write
    #[arg(short, long)]
    output: PathBuf,
}

/// What `run --output` writes
#[derive(Serialize)]
struct RunOutput<'a> {
    config: &'a SimulationConfig,
    labels: Vec<(&'a str, &'a LabelCandidate)>,
    max_concentration: f32,
    frames: &'a [RecordedFrame],
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(args: &RunArgs) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimulationConfig::from_json_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(grid_size) = args.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(steps) = args.steps_per_day {
        config.steps_per_day = steps;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;
    let city = SyntheticCity::new(args.seed)?;

    let roads: Box<dyn RoadNetworkSource> = match &args.roads {
        Some(path) => Box::new(JsonRoadFile::new(path)),
        None => {
            info!("No road file given, generating synthetic city (seed {})", args.seed);
            Box::new(city.clone())
        }
    };
    let traffic: Box<dyn TrafficSource> = match (&args.traffic, &args.roads) {
        (Some(path), _) => Box::new(CsvTrafficFile::new(path)),
        (None, None) => Box::new(city),
        (None, Some(_)) => {
            warn!("No traffic table given, congestion will be neutral");
            Box::new(InMemoryTraffic::default())
        }
    };

    let started = Instant::now();
    let scenario = Scenario::prepare(config, roads.as_ref(), traffic.as_ref())?;
    let run = scenario.run()?;
    info!("Simulation finished in {:.2?}", started.elapsed());

    println!("\n=== Recorded day: {} ===\n", scenario.config.days[scenario.config.recorded_day()].name);
    println!(" Time | Wind          | Congestion | Max PM10");
    println!("------|---------------|------------|---------");
    let interval = args.report_interval.max(1);
    let mut last_hour = None;
    for frame in &run.frames {
        let s = &frame.summary;
        if s.hour % interval != 0 || last_hour == Some(s.hour) {
            continue;
        }
        last_hour = Some(s.hour);
        println!(
            "{} | {:>3} {:5.1} km/h | {:9}% | {:8.2}",
            s.clock_label(),
            s.wind_label,
            s.wind_kmh,
            s.mean_road_congestion_pct,
            s.max_concentration
        );
    }
    println!("\nPeak concentration: {:.2}", run.max_concentration);

    let labels = scenario
        .rasterized
        .labels
        .displayable(scenario.config.labels.display_min_length);
    println!("Street labels: {}", labels.len());

    if let Some(path) = &args.output {
        let output = RunOutput {
            config: &scenario.config,
            labels,
            max_concentration: run.max_concentration,
            frames: &run.frames,
        };
        write_json(path, &output)?;
        info!("Wrote {} frames to {}", run.frames.len(), path.display());
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), value)
        .with_context(|| format!("writing {}", path.display()))
}

fn aggregate(args: &AggregateArgs) -> Result<()> {
    let file = File::open(&args.samples)
        .with_context(|| format!("opening samples {}", args.samples.display()))?;
    let samples = parse_samples(BufReader::new(file))
        .with_context(|| format!("parsing samples {}", args.samples.display()))?;
    let points = aggregate_hourly(&samples);

    let out = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    write_traffic_table(BufWriter::new(out), &points, &TrafficTableFormat::default())
        .with_context(|| format!("writing {}", args.output.display()))?;

    info!(
        "Aggregated {} samples into {} sensor profiles",
        samples.len(),
        points.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Command::Run(run_args) => run(run_args),
        Command::Aggregate(aggregate_args) => aggregate(aggregate_args),
    }
}
