//! Pages through `/proMatches` and writes the listing and its match ids.

use dota_scraper::Result;
use dota_scraper::cli::{self, CommonArgs};
use dota_scraper::http_client::{Downloader, OpenDota};
use dota_scraper::matches::{self, PagingOptions, BATCH_SIZE};
use dota_scraper::patch;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use chrono::Local;
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch recent professional matches from OpenDota", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Matches per request (the API caps this at 100)
    #[arg(long, default_value_t = BATCH_SIZE)]
    limit: usize,

    /// Stop after this many matches
    #[arg(long, default_value_t = 500)]
    max_matches: usize,

    /// Keep only matches starting at or after this unix time
    #[arg(long)]
    min_timestamp: Option<i64>,

    /// Use the release time of the newest patch as --min-timestamp
    #[arg(long)]
    latest_patch: bool,

    /// Only write the match id file
    #[arg(long)]
    ids_only: bool,

    /// Base delay between requests in seconds
    #[arg(long, default_value_t = 1)]
    delay: u64,

    #[arg(long)]
    output_dir: Option<PathBuf>
}

fn run(args: Args) -> Result<()> {
    let config = args.common.load_config()?;
    let dl = Downloader::from_config(&config.http)?;
    let api = OpenDota::new(&dl, config.http.opendota_base.as_str());

    let mut min_timestamp = args.min_timestamp;
    if args.latest_patch && min_timestamp.is_none() {
        match patch::latest_patch(&api.patches()?)? {
            Some(latest) if latest.timestamp > 0 => {
                info!("Using timestamp from patch {}: {}", latest.name, latest.timestamp);
                min_timestamp = Some(latest.timestamp);
            },
            _ => warn!("Could not determine the latest patch, not filtering by time")
        }
    }

    let options = PagingOptions {
        max_matches: args.max_matches,
        min_timestamp,
        delay: Duration::from_secs(args.delay)
    };
    let found = matches::collect_pro_matches(&options,
                                             |cursor| api.pro_matches(args.limit, cursor),
                                             thread::sleep);

    if found.is_empty() {
        warn!("No matches retrieved");
        return Ok(());
    }

    let dir = args.output_dir.unwrap_or(config.paths.matches_dir);
    let stamp = matches::file_stamp(&Local::now());
    matches::save_listing(&dir, &found, args.ids_only, &stamp)?;

    info!("Retrieved {} professional matches", found.len());
    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
