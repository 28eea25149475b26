//! Patching finished ability files: placeholder descriptions are filled from
//! the fallback table and exact-title type overrides are applied again.
//!
//! Also finds the per-hero files that still hold template or placeholder
//! abilities, so only those heroes get scraped again.

use crate::error::*;
use crate::aggregate::Aggregator;
use crate::data_structs::{Ability, AbilityType, Hero, HeroesDocument};
use crate::extractors::description::is_placeholder;
use crate::fallback::FallbackTable;
use crate::store;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};

/// Names template files use before a hero has been scraped.
const TEMPLATE_NAMES: &[&str] = &["First Ability", "Second Ability", "Third Ability", "Ultimate"];

pub fn is_template_name(name: &str) -> bool {
    TEMPLATE_NAMES.contains(&name) || name.starts_with("Ability ")
}

/// Whether any of the hero's abilities is a template slot or lacks a real
/// description.
pub fn needs_rescrape(hero: &Hero) -> bool {
    hero.abilities.iter()
        .chain(hero.innate_abilities.iter())
        .any(|a| is_template_name(&a.name) || is_placeholder(&a.description))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub descriptions: usize,
    pub types: usize,
    /// Heroes with at least one change.
    pub heroes: BTreeSet<String>,
    /// `hero: ability` pairs whose description is still missing.
    pub unresolved: Vec<String>
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "updated {} descriptions and {} types across {} heroes, {} still missing",
               self.descriptions,
               self.types,
               self.heroes.len(),
               self.unresolved.len())
    }
}

fn repair_ability(hero: &str, ability: &mut Ability, regular: bool, table: &FallbackTable, report: &mut RepairReport) -> bool {
    let mut changed = false;

    if is_placeholder(&ability.description) {
        match table.description(hero, &ability.name) {
            Some(known) => {
                debug!("{}: description of '{}' from the fallback table", hero, ability.name);
                ability.description = known.to_string();
                report.descriptions += 1;
                changed = true;
            },
            None => {
                warn!("No description available for {} - {}", hero, ability.name);
                report.unresolved.push(format!("{}: {}", hero, ability.name));
            }
        }
    }

    // ultimates and innates keep their slot-derived type
    if regular && ability.ability_type != AbilityType::Ultimate {
        if let Some(forced) = table.type_override(hero, &ability.name) {
            if forced != ability.ability_type && forced != AbilityType::Ultimate {
                debug!("{}: '{}' is {:?} now", hero, ability.name, forced);
                ability.ability_type = forced;
                report.types += 1;
                changed = true;
            }
        }
    }

    changed
}

/// Repairs every hero in `doc` in place.
pub fn repair(doc: &mut HeroesDocument, table: &FallbackTable) -> RepairReport {
    let mut report = RepairReport::default();

    for hero in &mut doc.heroes {
        let mut changed = false;

        for ability in &mut hero.abilities {
            changed |= repair_ability(&hero.name, ability, true, table, &mut report);
        }

        for ability in &mut hero.innate_abilities {
            changed |= repair_ability(&hero.name, ability, false, table, &mut report);
        }

        if changed {
            info!("Updated {}", hero.localized_name);
            report.heroes.insert(hero.name.clone());
        }
    }

    report
}

/// Repairs a heroes document on disk. The file is only rewritten when
/// something changed.
pub fn repair_file<P: AsRef<Path>>(path: P, table: &FallbackTable) -> Result<RepairReport> {
    let path = path.as_ref();
    store::require(path, "combine the per-hero files first")?;

    let mut doc: HeroesDocument = store::load(path)?;
    let report = repair(&mut doc, table);

    if !report.heroes.is_empty() {
        store::save(path, &doc)?;
        info!("Saved {}", path.display());
    }

    Ok(report)
}

/// Per-hero files in `dir` whose hero still needs scraping, with that hero.
pub fn pending_heroes<P: AsRef<Path>>(aggregator: &Aggregator, dir: P) -> Result<Vec<(PathBuf, Hero)>> {
    let mut pending = vec![];

    for path in aggregator.hero_files(dir)? {
        let doc: HeroesDocument = match store::load(&path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if let Some(hero) = doc.heroes.into_iter().next() {
            if needs_rescrape(&hero) {
                pending.push((path, hero));
            }
        }
    }

    info!("Found {} heroes with placeholder abilities", pending.len());
    Ok(pending)
}
