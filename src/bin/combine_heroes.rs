//! Merges every per-hero ability file into `all_heroes_abilities.json`.

use dota_scraper::Result;
use dota_scraper::aggregate::Aggregator;
use dota_scraper::cli::{self, CommonArgs};
use std::path::PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Combine per-hero ability files", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory of *_abilities.json files
    #[arg(long)]
    dir: Option<PathBuf>
}

fn run(args: Args) -> Result<()> {
    let config = args.common.load_config()?;
    let dir = args.dir.unwrap_or(config.paths.abilities_dir);
    let aggregator = Aggregator::new(config.extraction.sentinels);

    let (out, count) = aggregator.combine_dir(&dir)?;
    println!("Combined {} heroes into {}", count, out.display());
    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
