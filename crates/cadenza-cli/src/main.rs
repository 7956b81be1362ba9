use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cadenza_core::{Catalog, ChartRecord, TimingPoint};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Relative tolerance when comparing tempos; beat lengths are stored as
/// doubles and survive at least one float round-trip in the client.
const BPM_REL_TOLERANCE: f64 = 1e-9;

#[derive(Parser)]
#[command(name = "cadenza")]
#[command(about = "Look up charts in the client's local beatmap database", version)]
struct Args {
    /// Path to the beatmap database file
    #[arg(short, long, default_value = "osu!.db")]
    db: PathBuf,

    /// Print matched records as JSON instead of the summary line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("cadenza=info".parse()?)
                .add_directive("cadenza_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let catalog = Catalog::load(&args.db)
        .with_context(|| format!("failed to decode database {}", args.db.display()))?;
    info!(
        version = catalog.header().version,
        "decoded beatmap database"
    );

    println!(
        "{}: {} chart sets, {} charts",
        catalog.header().player_name.green(),
        catalog.set_count(),
        catalog.chart_count()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("chart id> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let chart_id: u32 = match input.parse() {
            Ok(id) => id,
            Err(_) => {
                println!("{}: {input} is not a chart id", "error".red());
                continue;
            }
        };

        match catalog.get(chart_id) {
            Some(record) => report(record, args.json)?,
            None => println!(
                "{}: chart {chart_id} is not in the local database",
                "error".red()
            ),
        }
    }

    Ok(())
}

fn report(record: &ChartRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    let Some(base) = base_tempo(&record.timing_points) else {
        println!(
            "{}: {} has no authoritative timing points",
            "error".red(),
            record.display_name()
        );
        return Ok(());
    };

    if is_variable_bpm(&record.timing_points) {
        println!(
            "{}: variable BPM, starts at {:.2}",
            record.display_name().cyan(),
            base.bpm()
        );
    } else {
        println!(
            "{}: BPM {}",
            record.display_name().cyan(),
            format!("{:.2}", base.bpm()).green()
        );
    }
    Ok(())
}

/// First authoritative timing point, which defines the base tempo.
fn base_tempo(points: &[TimingPoint]) -> Option<&TimingPoint> {
    points.iter().find(|point| point.uninherited)
}

/// True when any authoritative point deviates from the base tempo.
fn is_variable_bpm(points: &[TimingPoint]) -> bool {
    let Some(base) = base_tempo(points) else {
        return false;
    };
    points
        .iter()
        .filter(|point| point.uninherited)
        .any(|point| (point.bpm() - base.bpm()).abs() > base.bpm().abs() * BPM_REL_TOLERANCE)
}
