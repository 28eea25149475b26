//! The literal lookup data used when a page does not yield a field.
//!
//! The table ships compiled in (`data/fallbacks.toml`) and can be swapped for
//! another file at start-up.

use crate::error::*;
use crate::data_structs::{AbilityType, Affect, Behavior, DamageType};
use crate::text::snake_key;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use serde_derive::Deserialize;
use log::info;

const BUILTIN_FALLBACKS_STR: &str = include_str!("../data/fallbacks.toml");

/// Known values for one hero's ability. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AbilityFallback {
    #[serde(rename = "type")]
    pub ability_type: Option<AbilityType>,
    pub description: Option<String>,
    pub cooldown: Option<Vec<f64>>,
    pub mana_cost: Option<Vec<f64>>,
    pub behavior: Option<Behavior>,
    pub damage_type: Option<DamageType>,
    pub affects: Option<BTreeSet<Affect>>,
    pub pierces_immunity: Option<bool>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FallbackTable {
    #[serde(default)]
    pub skip_keywords: Vec<String>,
    #[serde(default)]
    pub innate_skip_keywords: Vec<String>,
    #[serde(default)]
    pub innate_names: Vec<String>,
    #[serde(default)]
    pub passive_name_keywords: Vec<String>,
    #[serde(default)]
    pub known_passives: Vec<String>,
    #[serde(default)]
    pub type_overrides: BTreeMap<String, AbilityType>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    /// Hero key (see `hero_key`) to ability title to known values.
    #[serde(default)]
    pub heroes: BTreeMap<String, BTreeMap<String, AbilityFallback>>
}

/// The key a hero's entries are filed under: `Faceless Void` and
/// `npc_dota_hero_faceless_void` both become `faceless_void`.
pub fn hero_key(name: &str) -> String {
    snake_key(name.trim_start_matches("npc_dota_hero_"))
}

impl FallbackTable {
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_FALLBACKS_STR)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(::toml::from_str(toml_str)?)
    }

    /// Reads a replacement table from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .chain_err(|| format!("could not read fallback table {}", path.display()))?;

        info!("Using fallback table from {}", path.display());
        Self::from_toml(&contents)
    }

    /// The builtin table, or the file at `path` when one is given.
    pub fn builtin_or<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin()
        }
    }

    pub fn ability(&self, hero: &str, ability: &str) -> Option<&AbilityFallback> {
        self.heroes.get(&hero_key(hero)).and_then(|abilities| abilities.get(ability))
    }

    /// A hero-specific description first, then the shared table.
    pub fn description(&self, hero: &str, ability: &str) -> Option<&str> {
        self.ability(hero, ability)
            .and_then(|f| f.description.as_deref())
            .or_else(|| self.descriptions.get(ability).map(String::as_str))
    }

    /// Exact-title type decisions, checked before anything on the page.
    pub fn type_override(&self, hero: &str, ability: &str) -> Option<AbilityType> {
        if let Some(t) = self.ability(hero, ability).and_then(|f| f.ability_type) {
            return Some(t);
        }

        if let Some(t) = self.type_overrides.get(ability) {
            return Some(*t);
        }

        if self.known_passives.iter().any(|p| p == ability) {
            return Some(AbilityType::Passive);
        }

        None
    }

    pub fn has_passive_name(&self, ability: &str) -> bool {
        let lower = ability.to_lowercase();
        self.passive_name_keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
    }

    pub fn is_skipped(&self, title: &str) -> bool {
        self.skip_keywords.iter().any(|k| title.contains(k.as_str()))
    }

    pub fn is_innate_skipped(&self, title: &str) -> bool {
        self.innate_skip_keywords.iter().any(|k| title.contains(k.as_str()))
    }

    pub fn is_innate_name(&self, title: &str) -> bool {
        self.innate_names.iter().any(|n| n.eq_ignore_ascii_case(title.trim()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_table_loads() {
        let table = FallbackTable::builtin().unwrap();
        let call = table.ability("Axe", "Berserker's Call").unwrap();

        assert_eq!(call.cooldown, Some(vec![16.0, 14.0, 12.0, 10.0]));
        assert_eq!(call.mana_cost, Some(vec![80.0, 90.0, 100.0, 110.0]));
        assert_eq!(call.behavior, Some(Behavior::NoTarget));
        assert_eq!(call.pierces_immunity, Some(true));
    }

    #[test]
    fn hero_keys() {
        assert_eq!(hero_key("Faceless Void"), "faceless_void");
        assert_eq!(hero_key("npc_dota_hero_faceless_void"), "faceless_void");
        assert_eq!(hero_key("axe"), "axe");
    }

    #[test]
    fn description_lookup() {
        let table = FallbackTable::builtin().unwrap();

        assert!(table.description("axe", "Culling Blade").unwrap().starts_with("Axe spots a weakness"));
        assert!(table.description("lion", "Not An Ability").is_none());
    }

    #[test]
    fn type_overrides() {
        let table = FallbackTable::builtin().unwrap();

        assert_eq!(table.type_override("axe", "Counter Helix"), Some(AbilityType::Passive));
        assert_eq!(table.type_override("anyone", "Blur"), Some(AbilityType::Passive));
        assert_eq!(table.type_override("anyone", "Chronosphere"), Some(AbilityType::Active));
        assert_eq!(table.type_override("anyone", "Made Up"), None);
    }

    #[test]
    fn keyword_checks() {
        let table = FallbackTable::builtin().unwrap();

        assert!(table.is_skipped("Aghanim's Scepter"));
        assert!(table.is_skipped("Talents"));
        assert!(!table.is_skipped("Culling Blade"));
        assert!(table.is_innate_name("coat of blood"));
        assert!(table.has_passive_name("Vengeance Aura"));
    }

    #[test]
    fn replacement_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.toml");
        fs::write(&path, "[heroes.axe.\"Culling Blade\"]\ncooldown = [1, 2, 3]\n").unwrap();

        let table = FallbackTable::builtin_or(Some(&path)).unwrap();

        assert_eq!(table.ability("axe", "Culling Blade").unwrap().cooldown, Some(vec![1.0, 2.0, 3.0]));
        assert!(table.descriptions.is_empty());
    }
}
