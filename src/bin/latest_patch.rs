//! Prints the newest game patch and how to fetch matches played on it.

use dota_scraper::Result;
use dota_scraper::cli::{self, CommonArgs};
use dota_scraper::http_client::{Downloader, OpenDota};
use dota_scraper::patch;
use clap::Parser;
use log::warn;

#[derive(Parser, Debug)]
#[command(author, version, about = "Show the newest Dota 2 patch", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs
}

fn run(args: Args) -> Result<()> {
    let config = args.common.load_config()?;
    let dl = Downloader::from_config(&config.http)?;
    let api = OpenDota::new(&dl, config.http.opendota_base.as_str());

    match patch::latest_patch(&api.patches()?)? {
        Some(latest) => {
            println!("Latest patch: {} (ID: {})", latest.name, latest.id);
            println!("Released on: {}", latest.date_str);
            println!("Unix timestamp: {}", latest.timestamp);
            println!();
            println!("To fetch pro matches since this patch:");
            println!("fetch_pro_matches --min-timestamp {} --max-matches 1000", latest.timestamp);
        },
        None => warn!("Could not determine the latest patch")
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
