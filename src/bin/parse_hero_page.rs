//! Parses a saved hero page into `<hero>_abilities.json` without touching the
//! network.

use dota_scraper::{HeroesDocument, Result};
use dota_scraper::aggregate;
use dota_scraper::assets;
use dota_scraper::cli::{self, CommonArgs, ExtractionArgs};
use dota_scraper::data_structs::HeroMapping;
use dota_scraper::scrapers::hero_page::HeroPageScraper;
use dota_scraper::store;
use std::fs;
use std::path::PathBuf;
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Parse a saved Liquipedia hero page", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    extraction: ExtractionArgs,

    html_file: PathBuf,

    /// Internal hero name; defaults to the file name
    hero_name: Option<String>,

    /// Defaults to the id in the hero mapping, if there is one
    hero_id: Option<u32>,

    #[arg(long)]
    output_dir: Option<PathBuf>
}

/// `faceless_void` -> `Faceless Void`.
fn display_name(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new()
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn run(args: Args) -> Result<()> {
    let mut config = args.common.load_config()?;
    args.extraction.apply(&mut config.extraction)?;

    let name = match &args.hero_name {
        Some(name) => name.clone(),
        None => args.html_file.file_stem()
                              .map(|s| s.to_string_lossy().trim_end_matches("_page").to_string())
                              .unwrap_or_default()
    };

    let mapping_file = config.paths.hero_mapping_file();
    let known = if mapping_file.exists() {
        let mapping: HeroMapping = store::load(&mapping_file)?;
        assets::find_hero(&mapping, &name).ok().cloned()
    } else {
        None
    };

    let (id, localized_name) = match (args.hero_id, known) {
        (Some(id), Some(entry)) => (id, entry.localized_name),
        (None, Some(entry)) => (entry.id, entry.localized_name),
        (Some(id), None) => (id, display_name(&name)),
        (None, None) => {
            warn!("no id known for '{}', using 0", name);
            (0, display_name(&name))
        }
    };

    let page = HeroPageScraper::from(fs::read_to_string(&args.html_file)?);
    let hero = page.hero(&config.extraction.assembler()?, id, &name, &localized_name)?;

    let output_dir = args.output_dir.unwrap_or(config.paths.abilities_dir);
    let out = output_dir.join(aggregate::hero_file_name(&name));
    store::save(&out, &HeroesDocument::from(hero))?;

    info!("Saved {}", out.display());
    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
