//! Pieces shared by the binaries: common flags, logging setup and the
//! error-reporting exit path.

use crate::error::*;
use crate::assembler::UltimatePolicy;
use crate::config::{ExtractionConfig, ScraperConfig};
use crate::data_structs::DamageType;
use std::path::PathBuf;
use std::process;
use clap::Args;
use log::{error, LevelFilter};

/// Flags every binary accepts.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// TOML config file; every setting has a default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8
}

impl CommonArgs {
    pub fn load_config(&self) -> Result<ScraperConfig> {
        ScraperConfig::load_or_default(self.config.as_ref())
    }
}

/// Extraction overrides for the binaries that build ability records.
#[derive(Args, Debug, Clone, Default)]
pub struct ExtractionArgs {
    /// How ultimates are recognised: ordinal, three-values or either
    #[arg(long)]
    pub ultimate_policy: Option<String>,

    /// Damage type when nothing names one: physical, magical, pure or none
    #[arg(long)]
    pub default_damage_type: Option<DamageType>
}

impl ExtractionArgs {
    /// Overrides the matching config values with any flags given.
    pub fn apply(&self, extraction: &mut ExtractionConfig) -> Result<()> {
        if let Some(policy) = &self.ultimate_policy {
            extraction.ultimate_policy = policy.parse::<UltimatePolicy>()?;
        }

        if let Some(damage) = self.default_damage_type {
            extraction.default_damage_type = damage;
        }

        Ok(())
    }
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    }
}

/// Installs the global logger. Safe to call more than once.
pub fn init_logging(verbose: u8) {
    let _ = env_logger::Builder::new()
        .filter_level(level(verbose))
        .format_timestamp_secs()
        .parse_default_env()
        .try_init();
}

/// Runs a binary's body, logging the full error chain and exiting non-zero
/// on failure.
pub fn exit_on_error(result: Result<()>) {
    if let Err(e) = result {
        error!("{}", e);

        for cause in e.iter().skip(1) {
            error!("caused by: {}", cause);
        }

        process::exit(1);
    }
}
