//! Pulse CLI - Command-line harness for Synheart Pulse
//!
//! Commands:
//! - today: compute the three scores plus readiness from the latest day
//! - series: print a historical score series with summary stats
//! - inspect: dump per-night sleep aggregation for a record file
//!
//! Input is a JSON array of day records (date, metrics map, sleep
//! intervals). Logging honors RUST_LOG.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Duration;
use synheart_pulse::{
    night, readiness, readiness_label, PulseError, ReplaySource, ScoreEngine, ScoreKind,
    ScoreResult, SeriesStats, TimeRange, PULSE_VERSION,
};

/// Pulse - On-device scoring engine for sleep, recovery, and effort
#[derive(Parser)]
#[command(name = "pulse")]
#[command(author = "Synheart AI Inc")]
#[command(version = PULSE_VERSION)]
#[command(about = "Score daily physiology into sleep, recovery, and effort", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the three scores plus readiness from the latest day
    Today {
        /// Day-record JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print a historical score series
    Series {
        /// Day-record JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Score kind to replay
        #[arg(long, value_enum)]
        kind: KindArg,

        /// Lookback range
        #[arg(long, value_enum, default_value = "month")]
        range: RangeArg,
    },

    /// Dump per-night sleep aggregation
    Inspect {
        /// Day-record JSON file
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Sleep,
    Recovery,
    Effort,
}

impl From<KindArg> for ScoreKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Sleep => ScoreKind::Sleep,
            KindArg::Recovery => ScoreKind::Recovery,
            KindArg::Effort => ScoreKind::Effort,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RangeArg {
    Week,
    Month,
    ThreeMonths,
    Year,
}

impl From<RangeArg> for TimeRange {
    fn from(r: RangeArg) -> Self {
        match r {
            RangeArg::Week => TimeRange::Week,
            RangeArg::Month => TimeRange::Month,
            RangeArg::ThreeMonths => TimeRange::ThreeMonths,
            RangeArg::Year => TimeRange::Year,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pulse: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), PulseError> {
    match cli.command {
        Commands::Today { input } => cmd_today(&input).await,
        Commands::Series { input, kind, range } => {
            cmd_series(&input, kind.into(), range.into()).await
        }
        Commands::Inspect { input } => cmd_inspect(&input),
    }
}

fn load_source(input: &PathBuf) -> Result<ReplaySource, PulseError> {
    let json = fs::read_to_string(input)?;
    ReplaySource::from_json(&json)
}

async fn cmd_today(input: &PathBuf) -> Result<(), PulseError> {
    let source = load_source(input)?;
    let Some((first, last)) = source.date_range() else {
        println!("no day records in {}", input.display());
        return Ok(());
    };

    let mut engine = ScoreEngine::new(std::sync::Arc::new(source));

    // Warm the rolling baselines with every prior day before scoring the
    // latest one; baseline mutation order must match calendar order.
    let mut date = first;
    while date < last {
        engine.replay_day(date).await;
        date += Duration::days(1);
    }
    let scores = engine.replay_day(last).await;

    println!("Scores for {last}");
    print_score(scores.sleep.as_ref());
    print_score(scores.recovery.as_ref());
    print_score(scores.effort.as_ref());

    if let (Some(sleep), Some(recovery), Some(effort)) =
        (&scores.sleep, &scores.recovery, &scores.effort)
    {
        let r = readiness(sleep.value, recovery.value, effort.value);
        println!("  Readiness: {r:.0} ({})", readiness_label(r));
    }

    Ok(())
}

fn print_score(result: Option<&ScoreResult>) {
    let Some(result) = result else {
        return;
    };
    let kind = result.kind;
    println!(
        "  {}: {} ({})",
        kind.display_name(),
        kind.format_value(result.value),
        kind.label(result.value)
    );
    for c in &result.components {
        let raw = c.formatted_raw().unwrap_or_else(|| "-".to_string());
        println!(
            "    {:<16} score {:>5.1}  weight {:.2}  raw {}",
            c.name, c.score, c.weight, raw
        );
    }
    if let Some(insight) = &result.insight {
        println!("    {insight}");
    }
}

async fn cmd_series(input: &PathBuf, kind: ScoreKind, range: TimeRange) -> Result<(), PulseError> {
    let source = load_source(input)?;
    let mut engine = ScoreEngine::new(std::sync::Arc::new(source));

    let points = engine.score_time_series(kind, range.start_date()).await;
    if points.is_empty() {
        println!("no {} data in range", kind.display_name().to_lowercase());
        return Ok(());
    }

    for p in &points {
        println!("{}  {}", p.date, kind.format_value(p.value));
    }
    if let Some(stats) = SeriesStats::from_points(&points) {
        println!(
            "avg {}  min {}  max {}",
            kind.format_value(stats.average),
            kind.format_value(stats.min),
            kind.format_value(stats.max)
        );
    }

    Ok(())
}

fn cmd_inspect(input: &PathBuf) -> Result<(), PulseError> {
    let json = fs::read_to_string(input)?;
    let records: Vec<synheart_pulse::DayRecord> = serde_json::from_str(&json)?;

    let intervals: Vec<_> = records.into_iter().flat_map(|r| r.sleep).collect();
    if intervals.is_empty() {
        println!("no sleep intervals in {}", input.display());
        return Ok(());
    }

    for (night_date, hours) in night::nightly_totals(&intervals) {
        let (start, end) = night::query_window(night_date);
        let window: Vec<_> = intervals
            .iter()
            .filter(|i| i.start < end && i.end > start)
            .cloned()
            .collect();
        let data = night::build_sleep_data(&window);
        println!(
            "night {night_date}: asleep {hours:.2}h (core {:.2}h, deep {:.2}h, rem {:.2}h), in bed {:.2}h",
            data.core_hours, data.deep_hours, data.rem_hours, data.in_bed_hours
        );
    }

    Ok(())
}
