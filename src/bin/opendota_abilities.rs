//! Builds per-hero ability files from the OpenDota constants instead of wiki
//! pages.

use dota_scraper::{ErrorKind, HeroesDocument, Result};
use dota_scraper::aggregate::{self, Aggregator};
use dota_scraper::cli::{self, CommonArgs, ExtractionArgs};
use dota_scraper::data_structs::HeroStat;
use dota_scraper::http_client::{Downloader, OpenDota};
use dota_scraper::opendota;
use dota_scraper::store;
use std::path::PathBuf;
use clap::Parser;
use error_chain::bail;
use log::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build hero ability files from OpenDota constants", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    extraction: ExtractionArgs,

    /// Only this hero, by internal or display name
    #[arg(long)]
    hero: Option<String>,

    /// heroes.json written by download_hero_assets
    #[arg(long)]
    heroes: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>
}

fn matches_name(stat: &HeroStat, wanted: &str) -> bool {
    let wanted = wanted.trim().to_lowercase();
    stat.short_name().to_lowercase() == wanted || stat.localized_name.to_lowercase() == wanted
}

fn run(args: Args) -> Result<()> {
    let mut config = args.common.load_config()?;
    args.extraction.apply(&mut config.extraction)?;

    let heroes_file = args.heroes.clone().unwrap_or_else(|| config.paths.heroes_file());
    store::require(&heroes_file, "run download_hero_assets first")?;
    let mut stats: Vec<HeroStat> = store::load(&heroes_file)?;
    if let Some(wanted) = &args.hero {
        stats.retain(|s| matches_name(s, wanted));
        if stats.is_empty() {
            bail!(ErrorKind::HeroNotFound(wanted.clone()));
        }
    }

    let dl = Downloader::from_config(&config.http)?;
    let api = OpenDota::new(&dl, config.http.opendota_base.as_str());
    let abilities = api.abilities()?;

    let mut keys = opendota::hero_ability_keys(&api.heroes()?);
    if keys.is_empty() {
        info!("/constants/heroes lists no abilities, using /constants/hero_abilities");
        keys = opendota::hero_ability_keys(&api.hero_abilities()?);
    }

    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.paths.abilities_dir.clone());
    let extraction = &config.extraction;
    let mut saved = 0;

    for stat in &stats {
        let hero_keys = match keys.get(stat.short_name()) {
            Some(hero_keys) => hero_keys,
            None => {
                warn!("no ability list for {}", stat.display_name());
                continue;
            }
        };

        let hero = opendota::hero(stat, hero_keys, &abilities,
                                  extraction.ultimate_policy, extraction.default_damage_type);
        let out = output_dir.join(aggregate::hero_file_name(&hero.name));

        match store::save(&out, &HeroesDocument::from(hero)) {
            Ok(()) => saved += 1,
            Err(e) => error!("{}: {}", stat.display_name(), e)
        }
    }

    info!("Saved {} of {} heroes", saved, stats.len());

    if args.hero.is_none() {
        Aggregator::new(extraction.sentinels.iter().cloned())
            .combine_after_run(&output_dir, saved, stats.len() - saved)?;
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
