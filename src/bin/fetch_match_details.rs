//! Fetches `/matches/{id}` payloads and writes their drafts.

use dota_scraper::{ErrorKind, Result};
use dota_scraper::cli::{self, CommonArgs};
use dota_scraper::http_client::{Downloader, OpenDota};
use dota_scraper::matches::{self, MatchStore};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use clap::{ArgGroup, Parser};
use error_chain::bail;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch match details and drafts from OpenDota", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["match_id", "match_file", "auto"])))]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// A single match
    #[arg(long)]
    match_id: Option<u64>,

    /// A file of match ids, one per line
    #[arg(long)]
    match_file: Option<PathBuf>,

    /// Use the newest match_ids_*.txt in the output directory
    #[arg(long)]
    auto: bool,

    /// Delay after each request in seconds
    #[arg(long, default_value_t = 1)]
    delay: u64,

    #[arg(long)]
    output_dir: Option<PathBuf>
}

fn run(args: Args) -> Result<()> {
    let config = args.common.load_config()?;
    let dir = args.output_dir.unwrap_or(config.paths.matches_dir.clone());

    let ids = match (args.match_id, &args.match_file) {
        (Some(id), _) => vec![id],
        (None, Some(file)) => matches::read_match_ids(file)?,
        (None, None) => match matches::latest_match_ids_file(&dir)? {
            Some(file) => {
                info!("Using {}", file.display());
                matches::read_match_ids(file)?
            },
            None => bail!(ErrorKind::MissingPrerequisite(
                dir.join("match_ids_*.txt").display().to_string(),
                "run fetch_pro_matches first".into()))
        }
    };

    let dl = Downloader::from_config(&config.http)?;
    let api = OpenDota::new(&dl, config.http.opendota_base.as_str());
    let store = MatchStore::new(dir);

    let summary = store.process(&ids,
                                Duration::from_secs(args.delay),
                                |id| api.match_details(id),
                                thread::sleep);

    info!("Processed {} matches: {}", summary.total, summary);
    Ok(())
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.common.verbose);
    cli::exit_on_error(run(args));
}
