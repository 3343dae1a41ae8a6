// src/main.rs

use std::future::Future;
use std::io::{self, BufWriter, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use trackgen::config::{DEFAULT_NUM_POINTS, DEFAULT_SEED, DEFAULT_STEP_LENGTH, LIVE_TICK_MS};
use trackgen::{Track, TrackConfig, TrackGenerator, TrackSeed};

#[derive(Parser, Debug)]
#[command(
    name = "trackgen",
    about = "Generates winding, non-backtracking 2D tracks from a seed",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate the whole track at once and print it
    Full {
        #[command(flatten)]
        run: RunArgs,

        /// Print `{points, turn_indices}` as JSON instead of `x y` lines
        #[arg(long)]
        json: bool,
    },

    /// Emit one point per tick, the way a live view consumes the generator
    Live {
        #[command(flatten)]
        run: RunArgs,

        /// Milliseconds between points
        #[arg(long, default_value_t = LIVE_TICK_MS)]
        tick_ms: u64,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Integer or string seed
    #[arg(long, default_value_t = TrackSeed::Int(DEFAULT_SEED), allow_hyphen_values = true)]
    seed: TrackSeed,

    /// Ignore --seed and pick one at random
    #[arg(long)]
    random_seed: bool,

    /// Number of points after the origin
    #[arg(long, default_value_t = DEFAULT_NUM_POINTS, allow_hyphen_values = true)]
    length: i64,

    /// Distance between consecutive points
    #[arg(long, default_value_t = DEFAULT_STEP_LENGTH)]
    step_length: f64,
}

impl RunArgs {
    fn config(&self) -> TrackConfig {
        let seed = if self.random_seed {
            TrackSeed::random_with(&mut rand::thread_rng())
        } else {
            self.seed.clone()
        };
        TrackConfig {
            seed,
            step_length: self.step_length,
            num_points: self.length,
        }
    }
}

fn build_generator(config: &TrackConfig) -> Result<TrackGenerator> {
    TrackGenerator::from_config(config).with_context(|| {
        format!(
            "cannot build a track for seed {} with length {} and step length {}",
            config.seed, config.num_points, config.step_length
        )
    })
}

fn write_track<W: Write>(out: &mut W, track: &Track, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, track).context("failed to encode track as JSON")?;
        writeln!(out)?;
    } else {
        let mut turns = track.turn_indices.iter().peekable();
        for (i, p) in track.points.iter().enumerate() {
            let is_turn = turns.next_if_eq(&&i).is_some();
            writeln!(out, "{:.6} {:.6}{}", p.x, p.y, if is_turn { " turn" } else { "" })?;
        }
    }
    out.flush().context("failed to write track")?;
    Ok(())
}

/// Steps once per tick until the generator is exhausted or `stop` resolves.
async fn run_live<W, F>(generator: &mut TrackGenerator, tick_ms: u64, out: &mut W, stop: F) -> Result<()>
where
    W: Write,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    tokio::pin!(stop);
    while !generator.is_exhausted() {
        tokio::select! {
            biased;
            _ = &mut stop => {
                info!("stopped after {} points", generator.steps_taken());
                break;
            }
            _ = ticker.tick() => {
                generator.step();
                let snap = generator.snapshot();
                writeln!(
                    out,
                    "{:>6} {:.6} {:.6}{}",
                    snap.steps_taken,
                    snap.position.x,
                    snap.position.y,
                    if snap.last_step_was_turn { " turn" } else { "" }
                )
                .and_then(|_| out.flush())
                .with_context(|| format!("failed to write point {}", snap.steps_taken))?;
            }
        }
    }
    Ok(())
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Full { run, json } => {
            let config = run.config();
            info!("generating {} points with seed {}", config.num_points, config.seed);
            let mut generator = build_generator(&config)?;
            let track = generator
                .generate_full_track(config.num_points)
                .with_context(|| format!("cannot generate {} points for seed {}", config.num_points, config.seed))?;
            let stdout = io::stdout();
            write_track(&mut BufWriter::new(stdout.lock()), &track, json)?;
        }
        Cmd::Live { run, tick_ms } => {
            let config = run.config();
            info!("live generation of {} points with seed {}", config.num_points, config.seed);
            let mut generator = build_generator(&config)?;
            run_live(&mut generator, tick_ms, &mut io::stdout(), ctrl_c()).await?;
        }
    }
    Ok(())
}
