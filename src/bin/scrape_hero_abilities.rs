//! Builds per-hero ability files from Liquipedia hero pages.
//!
//! Pages are cached as HTML under the html directory; a cached page is reused
//! unless `--download` is given. `--placeholders-only` limits the run to
//! heroes whose files still hold template or placeholder abilities.

use dota_scraper::{Assembler, Result};
use dota_scraper::aggregate::{self, Aggregator};
use dota_scraper::assets;
use dota_scraper::cli::{self, CommonArgs, ExtractionArgs};
use dota_scraper::data_structs::{HeroMapping, HeroMappingEntry, HeroesDocument};
use dota_scraper::http_client::Downloader;
use dota_scraper::repair;
use dota_scraper::scrapers::hero_page::HeroPageScraper;
use dota_scraper::store;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use clap::Parser;
use log::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape hero abilities from Liquipedia", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    extraction: ExtractionArgs,

    /// Only this hero, by internal or display name
    #[arg(long)]
    hero: Option<String>,

    /// Stop after this many heroes
    #[arg(long)]
    limit: Option<usize>,

    /// Fetch pages even when a cached copy exists
    #[arg(long)]
    download: bool,

    /// Only merge the existing per-hero files
    #[arg(long)]
    combine: bool,

    /// Only heroes whose files still have placeholder abilities; always fetches
    #[arg(long, conflicts_with = "hero")]
    placeholders_only: bool,

    #[arg(long)]
    html_dir: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Base delay in seconds between page fetches
    #[arg(long, default_value_t = 3)]
    delay: u64
}

struct Run<'a> {
    assembler: &'a Assembler,
    dl: &'a Downloader,
    liquipedia_base: &'a str,
    html_dir: &'a Path,
    output_dir: &'a Path,
    download: bool
}

impl<'a> Run<'a> {
    fn cache_path(&self, name: &str) -> PathBuf {
        let file = name.to_lowercase().replace(' ', "_").replace('-', "_");
        self.html_dir.join(format!("{}.html", file))
    }

    /// The hero's page, and whether it came over the network.
    fn page(&self, hero: &HeroMappingEntry) -> Result<(HeroPageScraper, bool)> {
        let cached = self.cache_path(&hero.name);

        if self.download || !cached.exists() {
            match self.dl.hero_page(self.liquipedia_base, &hero.localized_name) {
                Ok(page) => {
                    fs::create_dir_all(self.html_dir)?;
                    fs::write(&cached, page.raw())?;
                    return Ok((page, true));
                },
                Err(e) if cached.exists() => {
                    warn!("{}: {}; using the cached page", hero.localized_name, e);
                },
                Err(e) => return Err(e)
            }
        }

        Ok((HeroPageScraper::from(fs::read_to_string(&cached)?), false))
    }

    fn hero(&self, hero: &HeroMappingEntry) -> Result<bool> {
        let (page, fetched) = self.page(hero)?;
        let parsed = page.hero(self.assembler, hero.id, &hero.name, &hero.localized_name)?;

        let out = self.output_dir.join(aggregate::hero_file_name(&hero.name));
        store::save(&out, &HeroesDocument::from(parsed))?;
        info!("Saved {}'s abilities to {}", hero.localized_name, out.display());

        Ok(fetched)
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = args.common.load_config()?;
    args.extraction.apply(&mut config.extraction)?;

    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.paths.abilities_dir.clone());
    let aggregator = Aggregator::new(config.extraction.sentinels.iter().cloned());

    if args.combine {
        aggregator.combine_dir(&output_dir)?;
        return Ok(());
    }

    let mapping_file = config.paths.hero_mapping_file();
    store::require(&mapping_file, "run download_hero_assets first")?;
    let mapping: HeroMapping = store::load(&mapping_file)?;

    let heroes: Vec<&HeroMappingEntry> = match &args.hero {
        Some(name) => vec![assets::find_hero(&mapping, name)?],
        None if args.placeholders_only => {
            let mut pending = vec![];
            for (path, hero) in repair::pending_heroes(&aggregator, &output_dir)? {
                match mapping.get(&hero.id) {
                    Some(entry) => pending.push(entry),
                    None => warn!("{} ({}) is not in the hero mapping", hero.localized_name, path.display())
                }
            }
            pending.truncate(args.limit.unwrap_or(usize::MAX));
            pending
        },
        None => mapping.values().take(args.limit.unwrap_or(usize::MAX)).collect()
    };

    if heroes.is_empty() {
        info!("No heroes to scrape");
        return Ok(());
    }

    let assembler = config.extraction.assembler()?;
    let dl = Downloader::from_config(&config.http)?;
    let html_dir = args.html_dir.clone().unwrap_or_else(|| config.paths.html_dir.clone());
    let run = Run {
        assembler: &assembler,
        dl: &dl,
        liquipedia_base: &config.http.liquipedia_base,
        html_dir: &html_dir,
        output_dir: &output_dir,
        download: args.download || args.placeholders_only
    };

    let mut success = 0;
    for (i, hero) in heroes.iter().enumerate() {
        let processed = i + 1;
        info!("[{}/{}] Processing {}", processed, heroes.len(), hero.localized_name);

        match run.hero(hero) {
            Ok(fetched) => {
                success += 1;

                if fetched && processed < heroes.len() {
                    let wait = args.delay + (processed % 3) as u64;
                    info!("Waiting {} seconds before the next hero", wait);
                    thread::sleep(Duration::from_secs(wait));
                }
            },
            Err(e) => error!("{}: {}", hero.localized_name, e)
        }
    }

    info!("Processed {} of {} heroes", success, heroes.len());

    if args.hero.is_none() {
        aggregator.combine_after_run(&output_dir, success, heroes.len() - success)?;
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
