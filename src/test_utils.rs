use crate::assembler::{assemble, AbilityFields, UltimatePolicy};
use crate::data_structs::{Hero, HeroesDocument};
use crate::error::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use serde::Serialize;

/// A hero with four plain abilities, the last one an ultimate.
pub fn hero_fixture(id: u32, name: &str, localized_name: &str) -> Hero {
    let abilities = (1..=4).map(|ordinal| {
        let mut fields = AbilityFields::named(format!("{} Spell {}", localized_name, ordinal));
        fields.cooldown = Some(vec![10.0 * ordinal as f64]);
        assemble(id, ordinal, fields, UltimatePolicy::Ordinal)
    }).collect();

    Hero {
        id,
        name: name.to_string(),
        localized_name: localized_name.to_string(),
        abilities,
        innate_abilities: vec![]
    }
}

/// Writes `<name>_abilities.json` into `dir` the way the scrapers do.
pub fn write_hero_file(dir: &Path, hero: Hero) -> Result<PathBuf> {
    let path = dir.join(format!("{}_abilities.json", hero.name));
    write_non_overwrite(&path, &HeroesDocument::from(hero))?;
    Ok(path)
}

pub fn write_non_overwrite<P, S>(path: P, thing: &S) -> Result<()>
    where P: AsRef<Path>,
          S: Serialize {

    let path = path.as_ref();

    if !path.exists() {
        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string_pretty(thing)?.as_bytes())?;
    }

    Ok(())
}
