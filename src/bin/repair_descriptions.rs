//! Fills "Description not found" entries of the combined abilities file from
//! the fallback table and reapplies its type overrides.

use dota_scraper::Result;
use dota_scraper::aggregate::COMBINED_FILE;
use dota_scraper::cli::{self, CommonArgs};
use dota_scraper::fallback::FallbackTable;
use dota_scraper::repair;
use std::path::PathBuf;
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Repair missing ability descriptions", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Heroes document to repair in place (default: the combined file)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Fallback table to use instead of the configured one
    #[arg(long)]
    fallbacks: Option<PathBuf>
}

fn run(args: Args) -> Result<()> {
    let config = args.common.load_config()?;
    let file = args.file.unwrap_or_else(|| config.paths.abilities_dir.join(COMBINED_FILE));
    let table = FallbackTable::builtin_or(args.fallbacks.or(config.extraction.fallback_table).as_ref())?;

    let report = repair::repair_file(&file, &table)?;

    for missing in &report.unresolved {
        info!("Still missing: {}", missing);
    }

    println!("{}", report);
    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
