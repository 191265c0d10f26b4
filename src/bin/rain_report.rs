use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use rain_bulletin_service::analysis::run_length::DEFAULT_WET_THRESHOLD_MM;
use rain_bulletin_service::analysis::dashboard::{
    DEFAULT_HEAVY_THRESHOLD_MM, DEFAULT_RAINY_THRESHOLD_MM,
};
use rain_bulletin_service::catalog::StationCatalog;
use rain_bulletin_service::export::write_report;
use rain_bulletin_service::ingest::ingest_files;
use rain_bulletin_service::services::{ReportBundle, ReportConfig, ReportService};
use rain_bulletin_service::window::WindowSelector;

#[derive(Parser)]
#[command(name = "rain-report")]
#[command(about = "Build the dasarian rainfall report from observation exports", long_about = None)]
struct Cli {
    /// Report year
    #[arg(long)]
    year: i32,

    /// Report month (1-12)
    #[arg(long)]
    month: u32,

    /// Days of the month to report
    #[arg(long, value_enum, default_value_t = WindowSelector::FullMonth)]
    window: WindowSelector,

    /// Observation export (CSV or Excel); repeat for several files, earlier files win duplicates
    #[arg(long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Station catalog JSON (defaults to the built-in catalog)
    #[arg(long, env = "STATION_CATALOG_PATH")]
    catalog: Option<PathBuf>,

    /// Directory for the CSV report tables
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Print the full report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Minimum daily rainfall (mm) that counts as a wet day
    #[arg(long, env = "WET_THRESHOLD_MM", default_value_t = DEFAULT_WET_THRESHOLD_MM)]
    wet_threshold: f64,

    /// Daily rainfall (mm) counted as heavy on the dashboard
    #[arg(long, env = "HEAVY_THRESHOLD_MM", default_value_t = DEFAULT_HEAVY_THRESHOLD_MM)]
    heavy_threshold: f64,

    /// Daily rainfall (mm) counted as a rainy day on the dashboard
    #[arg(long, env = "RAINY_THRESHOLD_MM", default_value_t = DEFAULT_RAINY_THRESHOLD_MM)]
    rainy_threshold: f64,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    warnings: &'a [String],
    dropped_rows: usize,
    report: &'a ReportBundle,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ReportConfig {
        year: cli.year,
        month: cli.month,
        window: cli.window,
        wet_threshold: cli.wet_threshold,
        heavy_threshold: cli.heavy_threshold,
        rainy_threshold: cli.rainy_threshold,
    };
    // Fail on a bad month or threshold before touching any file
    let window = config.validate()?;

    let catalog = StationCatalog::load(cli.catalog.as_deref())?;
    let service = ReportService::new(Arc::new(catalog));

    let outcome = ingest_files(&cli.inputs)?;
    for warning in &outcome.warnings {
        warn!("{}", warning);
    }

    let bundle = service.build_report(&outcome.observations, &config)?;
    let written = write_report(&bundle, &cli.out_dir)?;

    if cli.json {
        let output = JsonOutput {
            warnings: &outcome.warnings,
            dropped_rows: outcome.dropped_rows,
            report: &bundle,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let stations = bundle.stations.len();
    let complete = bundle
        .qc
        .station_completeness
        .iter()
        .filter(|s| s.days_present == s.total_days)
        .count();

    println!("\n{}", "=".repeat(60));
    println!("Rainfall Report {window}");
    println!("{}", "=".repeat(60));
    println!("Rows read:          {}", outcome.rows_read);
    println!("Rows dropped:       {}", outcome.dropped_rows);
    println!("Sources skipped:    {}", outcome.skipped_sources.len());
    println!("Stations:           {stations}");
    println!("Fully reported:     {complete}");
    println!("Unmapped names:     {}", bundle.qc.unmapped_names.len());
    println!("Empty on last day:  {}", bundle.qc.empty_on_last_day.len());
    if let Some(wettest) = &bundle.dashboard.highlights.wettest_station {
        println!(
            "Wettest station:    {} ({:.1} mm)",
            wettest.station, wettest.total_mm
        );
    }
    if let Some(wettest) = &bundle.dashboard.highlights.wettest_day {
        println!(
            "Wettest day:        {} ({:.1} mm)",
            wettest.day, wettest.total_mm
        );
    }
    println!("{}", "-".repeat(60));
    for path in &written {
        println!("  {}", path.display());
    }
    println!("{}", "=".repeat(60));

    info!("Report complete");
    Ok(())
}
