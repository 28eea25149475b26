//! Ability records built from the OpenDota `/constants/abilities` and
//! `/constants/heroes` payloads instead of wiki pages.
//!
//! The constants are loosely typed: most fields arrive as a string, an array
//! of strings, or a bare number depending on the ability, so they are read
//! from `serde_json::Value` rather than a derived struct.

use crate::assembler::{assemble, AbilityFields, UltimatePolicy};
use crate::data_structs::*;
use crate::text::normalize;
use crate::values::{parse_numbers, parse_values};
use std::collections::{BTreeMap, BTreeSet};
use serde_json::Value;
use log::{debug, trace, warn};

/// Ability keys that are slot fillers rather than abilities.
const FILLER_KEYS: &[&str] = &["generic_hidden", "dota_empty_ability"];

/// Upper-cased flag words with the engine prefix removed, so `"Unit Target"`
/// and `DOTA_ABILITY_BEHAVIOR_UNIT_TARGET` compare equal.
fn flags(value: Option<&Value>, prefix: &str) -> Vec<String> {
    let flag = |s: &str| {
        let s = s.trim().to_ascii_uppercase().replace(' ', "_");
        s.trim_start_matches(prefix).to_string()
    };

    match value {
        Some(Value::String(s)) => s.split('|').map(flag).filter(|f| !f.is_empty()).collect(),
        Some(Value::Array(items)) => items.iter()
                                          .filter_map(Value::as_str)
                                          .map(flag)
                                          .filter(|f| !f.is_empty())
                                          .collect(),
        _ => vec![]
    }
}

pub fn behavior(data: &Value) -> Behavior {
    let flags = flags(data.get("behavior"), "DOTA_ABILITY_BEHAVIOR_");
    let has = |name: &str| flags.iter().any(|f| f == name);

    if has("POINT") || has("POINT_TARGET") {
        Behavior::PointTarget
    } else if has("UNIT_TARGET") {
        Behavior::UnitTarget
    } else if has("VECTOR_TARGETING") || has("DIRECTIONAL") {
        Behavior::Directional
    } else if has("CHANNELLED") || has("CHANNELED") {
        Behavior::Channeled
    } else if has("NO_TARGET") {
        Behavior::NoTarget
    } else if has("PASSIVE") {
        Behavior::Passive
    } else if has("TOGGLE") {
        Behavior::Toggle
    } else if has("AUTOCAST") || has("AUTO-CAST") {
        Behavior::AutoCast
    } else {
        Behavior::Unknown
    }
}

pub fn ability_type(data: &Value) -> AbilityType {
    let passive = flags(data.get("behavior"), "DOTA_ABILITY_BEHAVIOR_").iter().any(|f| f == "PASSIVE");

    if passive { AbilityType::Passive } else { AbilityType::Active }
}

pub fn damage_type(data: &Value, default: DamageType) -> DamageType {
    let flags = flags(data.get("dmg_type"), "DAMAGE_TYPE_");

    match flags.first().map(String::as_str) {
        Some("PHYSICAL") => DamageType::Physical,
        Some("MAGICAL") => DamageType::Magical,
        Some("PURE") => DamageType::Pure,
        _ => default
    }
}

/// Target teams of the ability; a passive with no team affects the caster.
pub fn affects(data: &Value, ability_type: AbilityType) -> BTreeSet<Affect> {
    let mut affects = BTreeSet::new();

    for team in flags(data.get("target_team"), "DOTA_UNIT_TARGET_TEAM_") {
        match team.as_str() {
            "ENEMY" => { affects.insert(Affect::Enemies); },
            "FRIENDLY" | "ALLIED" => { affects.insert(Affect::Allies); },
            "BOTH" => {
                affects.insert(Affect::Enemies);
                affects.insert(Affect::Allies);
            },
            "SELF" | "CUSTOM" => { affects.insert(Affect::Caster); },
            other => trace!("ignoring target team {}", other)
        }
    }

    if affects.is_empty() && ability_type == AbilityType::Passive {
        affects.insert(Affect::Caster);
    }

    affects
}

pub fn pierces_immunity(data: &Value) -> bool {
    data.get("bkbpierce")
        .and_then(Value::as_str)
        .map_or(false, |s| s.trim().eq_ignore_ascii_case("yes"))
}

/// A cooldown or mana cost given as a number, a `"a/b/c"` string, or an
/// array of either. `None` when any piece is not numeric.
pub fn cost(value: Option<&Value>) -> Option<Vec<f64>> {
    let piece = |v: &Value| -> Option<Vec<f64>> {
        match v {
            Value::Number(n) => n.as_f64().map(|n| vec![n]),
            Value::String(s) => parse_numbers(s),
            _ => None
        }
    };

    let values = match value? {
        Value::Array(items) => {
            let mut values = vec![];
            for item in items {
                values.extend(piece(item)?);
            }
            values
        },
        other => piece(other)?
    };

    if values.is_empty() { None } else { Some(values) }
}

fn level_values(value: &Value) -> Vec<LevelValue> {
    match value {
        Value::Number(n) => n.as_f64().map(|n| vec![LevelValue::Number(n)]).unwrap_or_default(),
        Value::String(s) => parse_values(s),
        Value::Array(items) => items.iter().flat_map(level_values).collect(),
        _ => vec![]
    }
}

fn special_key(raw: &str) -> String {
    raw.trim()
       .trim_start_matches("special_bonus_")
       .trim_start_matches("special_")
       .to_ascii_lowercase()
}

/// Entries of `attrib` (`{key, header, value}`) and `special_values`
/// (`{name, value}`), keyed by lower-cased name.
pub fn special_values(data: &Value) -> BTreeMap<String, Vec<LevelValue>> {
    let mut values = BTreeMap::new();

    for list in ["attrib", "special_values"].iter().filter_map(|k| data.get(*k)).filter_map(Value::as_array) {
        for entry in list {
            let key = match entry.get("key").or_else(|| entry.get("name")).and_then(Value::as_str) {
                Some(key) => special_key(key),
                None => continue
            };

            let parsed = entry.get("value").map(level_values).unwrap_or_default();
            if !key.is_empty() && !parsed.is_empty() {
                values.entry(key).or_insert(parsed);
            }
        }
    }

    values
}

fn text_field(data: &Value, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => normalize(s.as_str()),
        Some(Value::Array(items)) => normalize(
            items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(" ").as_str()),
        _ => String::new()
    }
}

/// Resolves every field of one constants entry. `None` for filler slots and
/// entries without a display name.
pub fn fields(key: &str, data: &Value, default_damage: DamageType) -> Option<AbilityFields> {
    if FILLER_KEYS.contains(&key) || key.starts_with("special_bonus_") {
        return None;
    }

    let name = data.get("dname").and_then(Value::as_str).map(str::trim).filter(|n| !n.is_empty())?;
    let ability_type = ability_type(data);

    Some(AbilityFields {
        name: name.to_string(),
        description: text_field(data, "desc"),
        ability_type,
        behavior: behavior(data),
        damage_type: damage_type(data, default_damage),
        affects: affects(data, ability_type),
        pierces_immunity: pierces_immunity(data),
        special_values: special_values(data),
        cooldown: cost(data.get("cd")),
        mana_cost: cost(data.get("mc")),
        notes: text_field(data, "notes")
    })
}

/// Hero short name (no `npc_dota_hero_` prefix) to its ability keys, from a
/// payload whose values carry an `abilities` list.
pub fn hero_ability_keys(heroes: &Value) -> BTreeMap<String, Vec<String>> {
    let mut keys = BTreeMap::new();

    if let Some(map) = heroes.as_object() {
        for (key, info) in map {
            let name = info.get("name").and_then(Value::as_str).unwrap_or(key);
            let abilities = match info.get("abilities").and_then(Value::as_array) {
                Some(list) => list.iter().filter_map(Value::as_str).map(str::to_string).collect(),
                None => continue
            };

            keys.insert(name.trim_start_matches("npc_dota_hero_").to_string(), abilities);
        }
    }

    keys
}

/// The attack-derived innate record of a hero, from `attack_type` and
/// `attack_range` in its `/heroStats` row.
pub fn attack_innate(stat: &HeroStat) -> Option<AbilityFields> {
    let attack_type = stat.extra.get("attack_type").and_then(Value::as_str)?;
    let range = stat.extra.get("attack_range").and_then(Value::as_f64);

    let mut fields = match attack_type.to_ascii_lowercase().as_str() {
        "melee" => {
            let mut fields = AbilityFields::named("Melee Attack");
            fields.description = "This hero attacks enemies at close range.".into();
            fields.special_values.insert("attack_range".into(), vec![LevelValue::Number(range.unwrap_or(150.0))]);
            fields
        },
        "ranged" => {
            let mut fields = AbilityFields::named("Ranged Attack");
            fields.description = match range {
                Some(range) => format!("This hero attacks enemies from a distance of {} units.", range),
                None => "This hero attacks enemies from a distance.".into()
            };
            if let Some(range) = range {
                fields.special_values.insert("attack_range".into(), vec![LevelValue::Number(range)]);
            }
            fields
        },
        other => {
            debug!("unknown attack type '{}' for {}", other, stat.display_name());
            return None;
        }
    };

    fields.ability_type = AbilityType::Innate;
    fields.behavior = Behavior::Passive;
    fields.damage_type = DamageType::Physical;
    fields.affects.insert(Affect::Caster);
    Some(fields)
}

/// Builds one hero from its ability keys. Keys missing from `abilities` are
/// logged and skipped; ordinals count only the abilities that resolved, and
/// the innate record takes the next ordinal after them.
pub fn hero(stat: &HeroStat,
            keys: &[String],
            abilities: &Value,
            policy: UltimatePolicy,
            default_damage: DamageType) -> Hero {

    let mut resolved = vec![];

    for key in keys {
        match abilities.get(key) {
            Some(data) => match fields(key, data, default_damage) {
                Some(fields) => resolved.push(fields),
                None => trace!("skipping filler ability {}", key)
            },
            None => warn!("ability {} of {} not in constants", key, stat.display_name())
        }
    }

    let abilities: Vec<Ability> = resolved.into_iter()
                                          .enumerate()
                                          .map(|(idx, fields)| assemble(stat.id, idx as u32 + 1, fields, policy))
                                          .collect();

    let innate_ordinal = abilities.len() as u32 + 1;
    let innate_abilities = attack_innate(stat)
        .map(|fields| assemble(stat.id, innate_ordinal, fields, policy))
        .into_iter()
        .collect();

    Hero {
        id: stat.id,
        name: stat.short_name().to_string(),
        localized_name: stat.display_name(),
        abilities,
        innate_abilities
    }
}
