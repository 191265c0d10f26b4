use clap::Parser;
use std::path::PathBuf;

use rain_bulletin_service::catalog::StationCatalog;

#[derive(Parser)]
#[command(name = "check-catalog")]
#[command(about = "Validate a station catalog and show how names resolve", long_about = None)]
struct Cli {
    /// Station names to resolve against the catalog
    names: Vec<String>,

    /// Station catalog JSON (defaults to the built-in catalog)
    #[arg(long, env = "STATION_CATALOG_PATH")]
    catalog: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let catalog = StationCatalog::load(cli.catalog.as_deref())?;

    println!("Canonical stations ({}):", catalog.stations().len());
    for located in catalog.located_stations() {
        match &located.coordinate {
            Some(c) => println!(
                "  {:>2}. {} ({:.4}, {:.4})",
                located.column + 1,
                located.name,
                c.latitude,
                c.longitude
            ),
            None => println!("  {:>2}. {} (no coordinates)", located.column + 1, located.name),
        }
    }

    println!("\nAliases ({}):", catalog.aliases().len());
    for (alias, target) in catalog.aliases().pairs() {
        println!("  {alias} -> {target}");
    }

    if cli.names.is_empty() {
        return Ok(());
    }

    println!("\nResolved names:");
    let mut unmapped = 0;
    for name in &cli.names {
        let canonical = catalog.canonicalize(name);
        match catalog.column_of(&canonical) {
            Some(column) => println!("  {name:?} -> {canonical} (column {})", column + 1),
            None => {
                unmapped += 1;
                println!("  {name:?} -> {canonical} (NOT IN CATALOG)");
            }
        }
    }

    if unmapped > 0 {
        println!("\n{unmapped} name(s) do not map to a canonical station");
    }
    Ok(())
}
