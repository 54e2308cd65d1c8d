//! Command-line entry point: assign one category and write the results.

use clap::Parser;
use seatflow::error::Result;
use seatflow::metrics::summarize;
use seatflow::pipeline::{run_category, RunConfig};
use seatflow::table::Table;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Assigns students to presentation classes from ranked sign-up choices.
#[derive(Debug, Parser)]
#[command(name = "seatflow", version, about)]
struct Cli {
    /// Roster CSV (all students).
    #[arg(long)]
    roster: PathBuf,

    /// Presenter names CSV; presenters are excluded from the assignment.
    #[arg(long)]
    presenters: PathBuf,

    /// Audience sign-up CSV with the five ranked-choice columns.
    #[arg(long)]
    signups: PathBuf,

    /// Presentation listing CSV (categories and titles).
    #[arg(long)]
    presentations: PathBuf,

    /// Run configuration TOML (capacities, aliases, cost tables, schema).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Category to assign; overrides the config file.
    #[arg(long)]
    category: Option<String>,

    /// Where to write the per-student assignment table.
    #[arg(long, default_value = "assignments.csv")]
    assignments_out: PathBuf,

    /// Where to write the per-class roster table.
    #[arg(long, default_value = "class_rosters.csv")]
    rosters_out: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_toml_path(path)?,
        None => RunConfig::default(),
    };
    if let Some(category) = cli.category {
        config.category = category;
    }

    let roster = Table::from_csv_path("Roster", &cli.roster)?;
    let presenters = Table::from_csv_path("Presenters", &cli.presenters)?;
    let signups = Table::from_csv_path("Signups", &cli.signups)?;
    let presentations = Table::from_csv_path("Presentations", &cli.presentations)?;

    let outcome = run_category(&roster, &presenters, &signups, &presentations, &config)?;

    write_csv(&cli.assignments_out, &outcome.assignments)?;
    write_csv(&cli.rosters_out, &outcome.rosters)?;

    println!(
        "Solve time: {:.3}s",
        outcome.diagnostics.solve_time_ms as f64 / 1000.0
    );
    println!();
    println!("{}", summarize(&outcome.assignments));
    println!();
    println!("{:<45} {:>8} {:>6} {:>6}  {}", "Class", "Assigned", "Min", "Max", "MeetsMin");
    for row in &outcome.rosters {
        println!(
            "{:<45} {:>8} {:>6} {:>6}  {}",
            row.class, row.assigned_count, row.min_capacity, row.max_capacity, row.meets_minimum
        );
    }

    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
