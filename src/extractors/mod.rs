//! Field extractors for ability sections.
//!
//! Each field is resolved by an ordered chain of patterns loaded from
//! `patterns/extractors.toml`; a miss is never an error, it only hands the
//! field to the next step (fallback table, then a schema default).

pub mod costs;
pub mod description;
pub mod classify;

use crate::error::*;
use crate::data_structs::{AbilityType, Affect, Behavior, DamageType};
use regex::Regex;
use serde_derive::Deserialize;
use log::debug;

const BUILTIN_PATTERNS_STR: &str = include_str!("../../patterns/extractors.toml");

/// One compiled pattern and the value it stands for.
#[derive(Debug, Clone)]
pub struct Rule<T> {
    pub name: String,
    pub regex: Regex,
    pub value: T
}

/// An ordered list of rules evaluated first-match-wins.
#[derive(Debug, Clone)]
pub struct RuleChain<T> {
    rules: Vec<Rule<T>>
}

impl<T> RuleChain<T> {
    #[inline]
    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    /// The value of the first rule that matches anywhere in `text`.
    pub fn first_match(&self, text: &str) -> Option<&T> {
        self.rules.iter()
                  .find(|r| r.regex.is_match(text))
                  .map(|r| {
                      debug!("rule '{}' matched", r.name);
                      &r.value
                  })
    }

    /// Values of every rule that matches, in rule order.
    pub fn all_matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a T> + 'a {
        self.rules.iter().filter(move |r| r.regex.is_match(text)).map(|r| &r.value)
    }

    /// The first capture accepted by `accept`, trying rules in order and each
    /// rule's matches left to right.
    ///
    /// Capture group 1 is used when the pattern has one, the whole match
    /// otherwise.
    pub fn first_capture<'t, F>(&self, text: &'t str, mut accept: F) -> Option<(&Rule<T>, &'t str)>
        where F: FnMut(&str) -> bool {

        for rule in &self.rules {
            for caps in rule.regex.captures_iter(text) {
                let found = caps.get(1).or_else(|| caps.get(0));

                if let Some(m) = found {
                    if accept(m.as_str()) {
                        debug!("rule '{}' captured {:?}", rule.name, m.as_str());
                        return Some((rule, m.as_str()));
                    }
                }
            }
        }

        None
    }
}

#[derive(Deserialize)]
struct CaptureRule {
    #[serde(default)]
    name: String,
    pattern: String
}

#[derive(Deserialize)]
struct ValueRule<T> {
    #[serde(default)]
    name: String,
    pattern: String,
    value: T
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).chain_err(|| format!("bad pattern for rule '{}'", name))
}

fn capture_chain(raw: Vec<CaptureRule>) -> Result<RuleChain<()>> {
    let rules = raw.into_iter()
                   .map(|r| Ok(Rule { regex: compile(&r.name, &r.pattern)?, name: r.name, value: () }))
                   .collect::<Result<_>>()?;

    Ok(RuleChain { rules })
}

fn value_chain<T>(raw: Vec<ValueRule<T>>) -> Result<RuleChain<T>> {
    let rules = raw.into_iter()
                   .map(|r| {
                       let name = if r.name.is_empty() { r.pattern.clone() } else { r.name };
                       Ok(Rule { regex: compile(&name, &r.pattern)?, name, value: r.value })
                   })
                   .collect::<Result<_>>()?;

    Ok(RuleChain { rules })
}

#[derive(Deserialize)]
struct PatternsFile {
    cost_numbers: String,
    notes_block: String,
    note_item: String,
    cooldown: Vec<CaptureRule>,
    mana_cost: Vec<CaptureRule>,
    description: Vec<CaptureRule>,
    behavior: Vec<ValueRule<Behavior>>,
    ability_type: Vec<ValueRule<AbilityType>>,
    damage_type: Vec<ValueRule<DamageType>>,
    affects: Vec<ValueRule<Affect>>,
    immunity: Vec<CaptureRule>,
    special_values: Vec<ValueRule<String>>
}

/// Every compiled pattern chain the extractors use.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub cost_numbers: Regex,
    pub notes_block: Regex,
    pub note_item: Regex,
    pub cooldown: RuleChain<()>,
    pub mana_cost: RuleChain<()>,
    pub description: RuleChain<()>,
    pub behavior: RuleChain<Behavior>,
    pub ability_type: RuleChain<AbilityType>,
    pub damage_type: RuleChain<DamageType>,
    pub affects: RuleChain<Affect>,
    pub immunity: RuleChain<()>,
    pub special_values: RuleChain<String>
}

impl Patterns {
    /// The chains compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_PATTERNS_STR)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let raw: PatternsFile = ::toml::from_str(toml_str)?;

        Ok(Patterns {
            cost_numbers: compile("cost_numbers", &raw.cost_numbers)?,
            notes_block: compile("notes_block", &raw.notes_block)?,
            note_item: compile("note_item", &raw.note_item)?,
            cooldown: capture_chain(raw.cooldown)?,
            mana_cost: capture_chain(raw.mana_cost)?,
            description: capture_chain(raw.description)?,
            behavior: value_chain(raw.behavior)?,
            ability_type: value_chain(raw.ability_type)?,
            damage_type: value_chain(raw.damage_type)?,
            affects: value_chain(raw.affects)?,
            immunity: capture_chain(raw.immunity)?,
            special_values: value_chain(raw.special_values)?
        })
    }
}
