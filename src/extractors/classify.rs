//! Type, behavior, damage type, affects and immunity classification.
//!
//! Each classifier resolves in the same order: explicit markup in the
//! section, keyword heuristics over the text, the fallback table entry for
//! the ability, then a default.

use super::Patterns;
use crate::data_structs::{AbilityType, Affect, Behavior, DamageType, LevelValue};
use crate::fallback::AbilityFallback;
use crate::fallback::FallbackTable;
use crate::text::normalize;
use crate::values::parse_values;
use std::collections::{BTreeMap, BTreeSet};
use log::trace;

/// Everything the classifiers look at for one ability.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub hero: &'a str,
    pub ability: &'a str,
    /// Raw section markup, if the page had one.
    pub section: Option<&'a str>,
    /// Resolved plain-text description.
    pub description: &'a str,
    pub fallback: Option<&'a AbilityFallback>
}

impl<'a> Subject<'a> {
    pub fn new(fallbacks: &'a FallbackTable,
               hero: &'a str,
               ability: &'a str,
               section: Option<&'a str>,
               description: &'a str) -> Self {

        Subject {
            hero,
            ability,
            section,
            description,
            fallback: fallbacks.ability(hero, ability)
        }
    }

    /// Section plain text followed by the description.
    fn text(&self) -> String {
        match self.section {
            Some(section) => format!("{} {}", normalize(section), self.description),
            None => self.description.to_string()
        }
    }
}

/// Active or passive. Ultimate and innate are decided by the caller.
///
/// `has_costs` is whether both a cooldown and a mana cost were found.
pub fn ability_type(patterns: &Patterns,
                    fallbacks: &FallbackTable,
                    subject: &Subject,
                    has_costs: bool) -> AbilityType {

    if let Some(t) = fallbacks.type_override(subject.hero, subject.ability) {
        trace!("type of '{}' overridden to {:?}", subject.ability, t);
        return t;
    }

    if let Some(section) = subject.section {
        if let Some(t) = patterns.ability_type.first_match(section) {
            return *t;
        }

        if has_costs {
            return AbilityType::Active;
        }
    }

    if fallbacks.has_passive_name(subject.ability) {
        return AbilityType::Passive;
    }

    if let Some(Behavior::Passive) = subject.fallback.and_then(|f| f.behavior) {
        return AbilityType::Passive;
    }

    AbilityType::Active
}

/// Targeting behavior; `Unknown` when nothing says otherwise, `Passive` for
/// passives without markup.
pub fn behavior(patterns: &Patterns, subject: &Subject, ability_type: AbilityType) -> Behavior {
    let from_page = subject.section
                           .and_then(|s| patterns.behavior.first_match(s))
                           .or_else(|| patterns.behavior.first_match(subject.description));

    if let Some(b) = from_page {
        return *b;
    }

    if let Some(b) = subject.fallback.and_then(|f| f.behavior) {
        return b;
    }

    match ability_type {
        AbilityType::Passive | AbilityType::Innate => Behavior::Passive,
        _ => Behavior::Unknown
    }
}

/// First of magical, physical, pure damage mentioned, else the table, else
/// `default`.
pub fn damage_type(patterns: &Patterns, subject: &Subject, default: DamageType) -> DamageType {
    if let Some(d) = patterns.damage_type.first_match(&subject.text()) {
        return *d;
    }

    subject.fallback.and_then(|f| f.damage_type).unwrap_or(default)
}

/// Union of every target group mentioned. Never empty: falls back to the
/// table, then to `{self}`.
pub fn affects(patterns: &Patterns, subject: &Subject) -> BTreeSet<Affect> {
    let text = subject.text();
    let found: BTreeSet<Affect> = patterns.affects.all_matches(&text).cloned().collect();

    if !found.is_empty() {
        return found;
    }

    match subject.fallback.and_then(|f| f.affects.as_ref()) {
        Some(known) if !known.is_empty() => known.clone(),
        _ => {
            let mut only_self = BTreeSet::new();
            only_self.insert(Affect::Caster);
            only_self
        }
    }
}

/// True only when the text says so in one of the known phrasings, or the
/// table says so.
pub fn pierces_immunity(patterns: &Patterns, subject: &Subject) -> bool {
    if patterns.immunity.first_match(&subject.text()).is_some() {
        return true;
    }

    subject.fallback.and_then(|f| f.pierces_immunity).unwrap_or(false)
}

/// Labelled values (radius, range, ...) from the section's plain text.
pub fn special_values(patterns: &Patterns, section: &str) -> BTreeMap<String, Vec<LevelValue>> {
    let text = normalize(section);
    let mut values = BTreeMap::new();

    for rule in patterns.special_values.rules() {
        if values.contains_key(&rule.value) {
            continue;
        }

        if let Some(raw) = rule.regex.captures(&text).and_then(|c| c.get(1)) {
            let parsed = parse_values(&raw.as_str().replace(' ', ""));

            if !parsed.is_empty() {
                values.insert(rule.value.clone(), parsed);
            }
        }
    }

    values
}
