//! Records produced by the scrapers and written out as JSON.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// Number of levels for a standard ability.
pub const STANDARD_LEVELS: usize = 4;
/// Number of levels for an ultimate.
pub const ULTIMATE_LEVELS: usize = 3;

/// One entry of a per-level value list.
///
/// Most entries are numeric; pieces of a delimited list that are not numbers
/// are kept verbatim rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelValue {
    Number(f64),
    Text(String)
}

impl LevelValue {
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LevelValue::Number(n) => Some(*n),
            LevelValue::Text(_) => None
        }
    }
}

impl From<f64> for LevelValue {
    fn from(n: f64) -> Self {
        LevelValue::Number(n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityType {
    Active,
    Passive,
    Innate,
    Ultimate
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    #[serde(rename = "no target")]
    NoTarget,
    #[serde(rename = "unit target")]
    UnitTarget,
    #[serde(rename = "point target")]
    PointTarget,
    #[serde(rename = "directional")]
    Directional,
    #[serde(rename = "passive")]
    Passive,
    #[serde(rename = "toggle")]
    Toggle,
    #[serde(rename = "auto-cast")]
    AutoCast,
    #[serde(rename = "channeled")]
    Channeled,
    #[serde(rename = "unknown")]
    Unknown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Physical,
    Magical,
    Pure,
    None
}

impl std::str::FromStr for DamageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "physical" => Ok(DamageType::Physical),
            "magical" => Ok(DamageType::Magical),
            "pure" => Ok(DamageType::Pure),
            "none" => Ok(DamageType::None),
            other => Err(format!("unknown damage type '{}'", other))
        }
    }
}

/// Who an ability can land on. Ordered so a set serializes as
/// `["enemies", "allies", "self"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Affect {
    #[serde(rename = "enemies")]
    Enemies,
    #[serde(rename = "allies")]
    Allies,
    #[serde(rename = "self")]
    Caster
}

/// A single hero ability in the fixed output schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    /// `hero_id * 100 + ordinal`, wide enough for any `u32` hero id.
    pub id: u64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub ability_type: AbilityType,
    #[serde(default)]
    pub pierces_immunity: bool,
    pub behavior: Behavior,
    #[serde(default = "no_damage")]
    pub damage_type: DamageType,
    pub affects: BTreeSet<Affect>,
    #[serde(default)]
    pub special_values: BTreeMap<String, Vec<LevelValue>>,
    #[serde(default)]
    pub cooldown: Vec<f64>,
    #[serde(default)]
    pub mana_cost: Vec<f64>,
    #[serde(default)]
    pub notes: String
}

fn no_damage() -> DamageType {
    DamageType::None
}

impl Ability {
    /// The number of levels this ability's per-level arrays must have.
    #[inline]
    pub fn level_count(&self) -> usize {
        if self.ability_type == AbilityType::Ultimate {
            ULTIMATE_LEVELS
        } else {
            STANDARD_LEVELS
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: u32,
    pub name: String,
    pub localized_name: String,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub innate_abilities: Vec<Ability>
}

impl fmt::Display for Hero {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (id {}, {} abilities, {} innate)",
               self.localized_name,
               self.id,
               self.abilities.len(),
               self.innate_abilities.len())
    }
}

/// The `{"heroes": [...]}` wrapper shared by per-hero and combined files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeroesDocument {
    pub heroes: Vec<Hero>
}

impl From<Hero> for HeroesDocument {
    fn from(hero: Hero) -> Self {
        HeroesDocument {
            heroes: vec![hero]
        }
    }
}

/// One row of the OpenDota `/heroStats` response.
///
/// Only the fields the pipeline reads are typed; everything else is carried
/// through untouched so `heroes.json` keeps the full payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroStat {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub localized_name: String,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub primary_attr: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>
}

impl HeroStat {
    /// Internal name without the `npc_dota_hero_` prefix.
    pub fn short_name(&self) -> &str {
        self.name.trim_start_matches("npc_dota_hero_")
    }

    pub fn display_name(&self) -> String {
        if self.localized_name.is_empty() {
            format!("Hero_{}", self.id)
        } else {
            self.localized_name.clone()
        }
    }
}

/// Entry of `hero_mapping.json`, keyed by hero id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroMappingEntry {
    pub id: u32,
    pub name: String,
    pub localized_name: String,
    pub file_name: String,
    pub attributes: String,
    #[serde(default)]
    pub roles: Vec<String>
}

pub type HeroMapping = BTreeMap<u32, HeroMappingEntry>;

/// One row of the OpenDota `/proMatches` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProMatch {
    pub match_id: u64,
    #[serde(default)]
    pub start_time: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>
}

/// One pick or ban of the OpenDota match payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickBan {
    pub is_pick: bool,
    pub hero_id: u32,
    pub team: u8,
    pub order: u32
}

/// The slice of `/matches/{id}` the draft extraction reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub match_id: u64,
    #[serde(default)]
    pub radiant_win: Option<bool>,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub picks_bans: Option<Vec<PickBan>>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Radiant,
    Dire
}

impl Side {
    /// OpenDota encodes radiant as team 0.
    #[inline]
    pub fn from_team(team: u8) -> Side {
        if team == 0 { Side::Radiant } else { Side::Dire }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftAction {
    Pick,
    Ban
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEntry {
    pub hero_id: u32,
    pub order: u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftStep {
    pub team: Side,
    pub action: DraftAction,
    pub hero_id: u32,
    pub order: u32
}

/// Contents of `draft_<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub match_id: u64,
    pub radiant_win: Option<bool>,
    pub start_time: Option<i64>,
    pub duration: Option<u32>,
    pub radiant_picks: Vec<DraftEntry>,
    pub dire_picks: Vec<DraftEntry>,
    pub radiant_bans: Vec<DraftEntry>,
    pub dire_bans: Vec<DraftEntry>,
    pub draft_sequence: Vec<DraftStep>
}

/// One row of `/constants/patch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchEntry {
    pub name: String,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>
}

/// The newest patch, resolved to a unix timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchInfo {
    pub id: i64,
    pub name: String,
    pub raw_date: String,
    pub timestamp: i64,
    pub date_str: String
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn enums_use_schema_spelling() {
        assert_eq!(serde_json::to_string(&Behavior::NoTarget).unwrap(), "\"no target\"");
        assert_eq!(serde_json::to_string(&Behavior::AutoCast).unwrap(), "\"auto-cast\"");
        assert_eq!(serde_json::to_string(&AbilityType::Ultimate).unwrap(), "\"ultimate\"");
        assert_eq!(serde_json::to_string(&DamageType::None).unwrap(), "\"none\"");
        assert_eq!(serde_json::to_string(&Side::Radiant).unwrap(), "\"radiant\"");
    }

    #[test]
    fn affects_serialize_in_fixed_order() {
        let affects: BTreeSet<Affect> =
            vec![Affect::Caster, Affect::Enemies, Affect::Allies].into_iter().collect();

        assert_eq!(serde_json::to_string(&affects).unwrap(), r#"["enemies","allies","self"]"#);
    }

    #[test]
    fn level_values_keep_text() {
        let values: Vec<LevelValue> = serde_json::from_str(r#"[1.5, "special", 3]"#).unwrap();

        assert_eq!(values, vec![
            LevelValue::Number(1.5),
            LevelValue::Text("special".into()),
            LevelValue::Number(3.0)
        ]);
    }

    #[test]
    fn older_innate_records_load_with_defaults() {
        let json = r#"{
            "id": 205,
            "name": "Coat of Blood",
            "description": "Axe gains armor.",
            "type": "innate",
            "behavior": "passive",
            "affects": ["self"]
        }"#;
        let ability: Ability = serde_json::from_str(json).unwrap();

        assert_eq!(ability.damage_type, DamageType::None);
        assert!(ability.cooldown.is_empty());
        assert_eq!(ability.level_count(), STANDARD_LEVELS);
    }

    #[test]
    fn hero_stat_keeps_unknown_fields() {
        let json = r#"{"id": 2, "name": "npc_dota_hero_axe", "localized_name": "Axe",
                       "roles": ["Initiator"], "base_armor": 1}"#;
        let stat: HeroStat = serde_json::from_str(json).unwrap();

        assert_eq!(stat.short_name(), "axe");
        assert_eq!(stat.extra["base_armor"], serde_json::json!(1));
    }
}
