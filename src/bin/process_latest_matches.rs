//! Runs the match detail phase over the newest match id listing.

use dota_scraper::{ErrorKind, Result};
use dota_scraper::cli::{self, CommonArgs};
use dota_scraper::http_client::{Downloader, OpenDota};
use dota_scraper::matches::{self, MatchStore};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use clap::Parser;
use error_chain::bail;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch details for the newest match id listing", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory holding match_ids_*.txt, details/ and drafts/
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Delay after each request in seconds
    #[arg(long, default_value_t = 1)]
    delay: u64,

    /// Skip the run unless the listing has more ids than saved details
    #[arg(long)]
    update_only: bool
}

fn run(args: Args) -> Result<()> {
    let config = args.common.load_config()?;
    let base = args.base_dir.unwrap_or(config.paths.matches_dir.clone());

    let latest = match matches::latest_match_ids_file(&base)? {
        Some(latest) => latest,
        None => bail!(ErrorKind::MissingPrerequisite(
            base.join("match_ids_*.txt").display().to_string(),
            "run fetch_pro_matches first".into()))
    };

    let store = MatchStore::new(&base);
    let (details_before, drafts_before) = store.counts();
    info!("Found {} existing match detail files and {} draft files", details_before, drafts_before);

    let ids = matches::read_match_ids(&latest)?;
    info!("Found {} match ids in {}", ids.len(), latest.display());

    if args.update_only && ids.len() <= details_before {
        info!("No new matches to process");
        return Ok(());
    }

    let dl = Downloader::from_config(&config.http)?;
    let api = OpenDota::new(&dl, config.http.opendota_base.as_str());
    let summary = store.process(&ids,
                                Duration::from_secs(args.delay),
                                |id| api.match_details(id),
                                thread::sleep);

    let (details_after, drafts_after) = store.counts();
    info!("{}", summary);
    info!("After processing: {} match details (+{}) and {} drafts (+{})",
          details_after, details_after.saturating_sub(details_before),
          drafts_after, drafts_after.saturating_sub(drafts_before));
    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
