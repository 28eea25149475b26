//! Fetches `/heroStats`, downloads hero images and icons, and writes
//! `heroes.json` and `hero_mapping.json`.

use dota_scraper::Result;
use dota_scraper::assets::{self, AssetJob};
use dota_scraper::cli::{self, CommonArgs};
use dota_scraper::http_client::{Downloader, OpenDota};
use dota_scraper::store;
use std::path::Path;
use std::time::Duration;
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Download hero data, images and icons", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Worker threads for image downloads (config default 3)
    #[arg(long)]
    workers: Option<usize>,

    /// Write the JSON files without downloading images
    #[arg(long)]
    skip_images: bool
}

fn run(args: Args) -> Result<()> {
    let config = args.common.load_config()?;
    let dl = Downloader::from_config(&config.http)?;
    let api = OpenDota::new(&dl, config.http.opendota_base.as_str());

    info!("Fetching hero data from OpenDota");
    let mut heroes = api.hero_stats()?;
    heroes.sort_by_key(|h| h.id);
    info!("Found {} heroes", heroes.len());

    if !args.skip_images {
        let jobs: Vec<AssetJob> = heroes.iter()
                                        .flat_map(|h| assets::jobs_for(h, &config.paths.images_dir))
                                        .collect();
        let workers = args.workers.unwrap_or(config.assets.workers).max(1);
        let delay = Duration::from_millis(config.assets.request_delay_ms);

        let done = assets::run_pool(&jobs, workers, delay, |url: &str, dest: &Path| dl.download_to(url, dest));
        info!("Downloaded {} of {} images and icons", done, jobs.len());
    }

    for hero in heroes.iter_mut() {
        assets::localize(hero);
    }

    let mapping = assets::hero_mapping(&heroes);
    let missing = assets::missing_ids(&mapping);
    if !missing.is_empty() {
        warn!("Hero ids with no hero: {}",
              missing.iter().map(u32::to_string).collect::<Vec<_>>().join(", "));
    }

    let mapping_file = config.paths.hero_mapping_file();
    store::save(&mapping_file, &mapping)?;
    info!("Created hero mapping at {}", mapping_file.display());

    let heroes_file = config.paths.heroes_file();
    store::save(&heroes_file, &heroes)?;
    info!("Saved hero data to {}", heroes_file.display());

    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
