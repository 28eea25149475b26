//! Scrapers that work on fetched or saved HTML pages.

pub mod hero_page;

use crate::error::*;
use scraper::Selector;
use std::collections::HashMap;

/// Parses a TOML table of `name = "css selector"` pairs.
pub(crate) fn load_sels(toml_str: &str) -> Result<HashMap<String, Selector>> {
    let raw: HashMap<String, String> = ::toml::from_str(toml_str)?;
    let mut sels = HashMap::with_capacity(raw.len());

    for (name, css) in raw {
        let sel = Selector::parse(&css).map_err(|e| {
            Error::from(ErrorKind::InvalidConfig(format!("selector '{}' ({}): {:?}", name, css, e)))
        })?;
        sels.insert(name, sel);
    }

    Ok(sels)
}
