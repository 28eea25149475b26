//! Turning extractor output into fixed-schema `Ability` records.

use crate::data_structs::*;
use crate::error::*;
use crate::extractors::{costs, description, classify, Patterns};
use crate::extractors::costs::{CostKind, CostOutcome};
use crate::extractors::classify::Subject;
use crate::fallback::FallbackTable;
use crate::values::fit_levels;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use serde_derive::{Deserialize, Serialize};
use log::{debug, warn};

/// How an ability is recognised as an ultimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UltimatePolicy {
    /// The fourth regular ability of a hero.
    Ordinal,
    /// A cooldown or mana cost listing exactly three levels.
    ThreeValues,
    /// Either of the above.
    #[default]
    Either
}

impl FromStr for UltimatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ordinal" => Ok(UltimatePolicy::Ordinal),
            "three-values" => Ok(UltimatePolicy::ThreeValues),
            "either" => Ok(UltimatePolicy::Either),
            other => bail!(ErrorKind::InvalidConfig(
                format!("unknown ultimate policy '{}' (ordinal, three-values, either)", other)))
        }
    }
}

impl fmt::Display for UltimatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            UltimatePolicy::Ordinal => "ordinal",
            UltimatePolicy::ThreeValues => "three-values",
            UltimatePolicy::Either => "either"
        })
    }
}

impl UltimatePolicy {
    /// `ordinal` is 1-based among the hero's regular abilities; the cost lists
    /// are as extracted, before any padding.
    pub fn is_ultimate(self, ordinal: u32, cooldown: Option<&[f64]>, mana_cost: Option<&[f64]>) -> bool {
        let by_ordinal = ordinal == ULTIMATE_ORDINAL;
        let by_values = [cooldown, mana_cost].iter()
                                             .any(|c| c.map_or(false, |c| c.len() == ULTIMATE_LEVELS));

        match self {
            UltimatePolicy::Ordinal => by_ordinal,
            UltimatePolicy::ThreeValues => by_values,
            UltimatePolicy::Either => by_ordinal || by_values
        }
    }
}

/// Position of the ultimate in a standard four-ability kit.
pub const ULTIMATE_ORDINAL: u32 = 4;

/// The id convention shared by every scraper: `hero_id * 100 + ordinal`.
#[inline]
pub fn ability_id(hero_id: u32, ordinal: u32) -> u64 {
    u64::from(hero_id) * 100 + u64::from(ordinal)
}

/// Resolved fields for one ability, before ids and level counts are fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityFields {
    pub name: String,
    pub description: String,
    pub ability_type: AbilityType,
    pub behavior: Behavior,
    pub damage_type: DamageType,
    pub affects: BTreeSet<Affect>,
    pub pierces_immunity: bool,
    pub special_values: BTreeMap<String, Vec<LevelValue>>,
    /// `None` when neither the page nor the table had one.
    pub cooldown: Option<Vec<f64>>,
    pub mana_cost: Option<Vec<f64>>,
    pub notes: String
}

impl AbilityFields {
    /// Fields with every schema default filled in.
    pub fn named<S: Into<String>>(name: S) -> Self {
        let name = name.into();

        AbilityFields {
            description: description::placeholder(&name),
            name,
            ability_type: AbilityType::Active,
            behavior: Behavior::Unknown,
            damage_type: DamageType::None,
            affects: BTreeSet::new(),
            pierces_immunity: false,
            special_values: BTreeMap::new(),
            cooldown: None,
            mana_cost: None,
            notes: String::new()
        }
    }
}

/// Builds the final record.
///
/// Innate abilities are never ultimates. Every record ends up with a
/// non-empty `affects` and cost lists of 3 levels for ultimates, 4 otherwise
/// (zeros when nothing was known).
pub fn assemble(hero_id: u32, ordinal: u32, fields: AbilityFields, policy: UltimatePolicy) -> Ability {
    let mut ability_type = fields.ability_type;

    if ability_type != AbilityType::Innate
        && policy.is_ultimate(ordinal, fields.cooldown.as_deref(), fields.mana_cost.as_deref()) {
        ability_type = AbilityType::Ultimate;
    }

    let levels = if ability_type == AbilityType::Ultimate { ULTIMATE_LEVELS } else { STANDARD_LEVELS };
    let fit = |values: Option<Vec<f64>>| match values {
        Some(v) if !v.is_empty() => fit_levels(v, levels),
        _ => vec![0.0; levels]
    };

    let mut affects = fields.affects;
    if affects.is_empty() {
        affects.insert(Affect::Caster);
    }

    let description = if fields.description.trim().is_empty() {
        description::placeholder(&fields.name)
    } else {
        fields.description
    };

    Ability {
        id: ability_id(hero_id, ordinal),
        name: fields.name,
        description,
        ability_type,
        pierces_immunity: fields.pierces_immunity,
        behavior: fields.behavior,
        damage_type: fields.damage_type,
        affects,
        special_values: fields.special_values,
        cooldown: fit(fields.cooldown),
        mana_cost: fit(fields.mana_cost),
        notes: fields.notes
    }
}

/// Runs every field extractor over wiki sections and assembles the results.
#[derive(Debug, Clone)]
pub struct Assembler {
    pub patterns: Patterns,
    pub fallbacks: FallbackTable,
    pub policy: UltimatePolicy,
    pub default_damage: DamageType
}

impl Assembler {
    /// An assembler over the compiled-in patterns and fallback table.
    pub fn builtin() -> Result<Self> {
        Ok(Assembler {
            patterns: Patterns::builtin()?,
            fallbacks: FallbackTable::builtin()?,
            policy: UltimatePolicy::default(),
            default_damage: DamageType::None
        })
    }

    /// Resolves every field of one ability. `section` is `None` when the page
    /// has no section for it, in which case only the fallback table and
    /// defaults contribute.
    pub fn fields(&self, hero: &str, name: &str, section: Option<&str>) -> AbilityFields {
        let description = description::resolve(&self.patterns, &self.fallbacks, hero, name, section);
        let subject = Subject::new(&self.fallbacks, hero, name, section, &description);

        let cooldown = self.cost(&subject, CostKind::Cooldown);
        let mana_cost = self.cost(&subject, CostKind::ManaCost);
        let has_costs = cooldown.is_some() && mana_cost.is_some();

        let ability_type = classify::ability_type(&self.patterns, &self.fallbacks, &subject, has_costs);
        let behavior = classify::behavior(&self.patterns, &subject, ability_type);

        let fields = AbilityFields {
            name: name.to_string(),
            ability_type,
            behavior,
            damage_type: classify::damage_type(&self.patterns, &subject, self.default_damage),
            affects: classify::affects(&self.patterns, &subject),
            pierces_immunity: classify::pierces_immunity(&self.patterns, &subject),
            special_values: section.map(|s| classify::special_values(&self.patterns, s))
                                   .unwrap_or_default(),
            cooldown,
            mana_cost,
            notes: section.map(|s| description::notes(&self.patterns, s)).unwrap_or_default(),
            description
        };

        debug!("resolved '{}': {:?} / {:?}", name, fields.ability_type, fields.behavior);
        fields
    }

    /// Page value, then the table's value. Malformed page values are logged
    /// and treated as missing.
    fn cost(&self, subject: &Subject, kind: CostKind) -> Option<Vec<f64>> {
        let outcome = subject.section
                             .map(|s| costs::extract(&self.patterns, kind, s))
                             .unwrap_or(CostOutcome::Missing);

        if let CostOutcome::Found(values) = outcome {
            return Some(values);
        }

        let known = subject.fallback.and_then(|f| match kind {
            CostKind::Cooldown => f.cooldown.clone(),
            CostKind::ManaCost => f.mana_cost.clone()
        });

        if known.is_none() {
            warn!("no {} for '{}', using zeros", kind.label(), subject.ability);
        }

        known
    }

    /// Extracts and assembles in one step.
    pub fn ability(&self, hero: &str, hero_id: u32, ordinal: u32, name: &str, section: Option<&str>) -> Ability {
        assemble(hero_id, ordinal, self.fields(hero, name, section), self.policy)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids_follow_convention() {
        assert_eq!(ability_id(2, 1), 201);
        assert_eq!(ability_id(114, 5), 11405);
        assert_eq!(ability_id(u32::MAX, 7), 429_496_729_507);
    }

    #[test]
    fn policies() {
        let three = [1.0, 2.0, 3.0];
        let four = [1.0, 2.0, 3.0, 4.0];

        assert!(UltimatePolicy::Ordinal.is_ultimate(4, Some(&four), None));
        assert!(!UltimatePolicy::Ordinal.is_ultimate(2, Some(&three), None));
        assert!(UltimatePolicy::ThreeValues.is_ultimate(2, None, Some(&three)));
        assert!(!UltimatePolicy::ThreeValues.is_ultimate(4, Some(&four), Some(&four)));
        assert!(UltimatePolicy::Either.is_ultimate(4, None, None));
        assert!(UltimatePolicy::Either.is_ultimate(1, Some(&three), None));
        assert!(!UltimatePolicy::Either.is_ultimate(1, None, None));
        assert_eq!("three-values".parse::<UltimatePolicy>().unwrap(), UltimatePolicy::ThreeValues);
        assert!("sometimes".parse::<UltimatePolicy>().is_err());
    }

    #[test]
    fn levels_fixed_by_type() {
        let mut fields = AbilityFields::named("Spell");
        fields.cooldown = Some(vec![10.0]);
        fields.mana_cost = Some(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let regular = assemble(1, 1, fields.clone(), UltimatePolicy::Ordinal);
        let ultimate = assemble(1, 4, fields, UltimatePolicy::Ordinal);

        assert_eq!(regular.cooldown, vec![10.0; 4]);
        assert_eq!(regular.mana_cost, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ultimate.ability_type, AbilityType::Ultimate);
        assert_eq!(ultimate.cooldown, vec![10.0; 3]);
        assert_eq!(ultimate.mana_cost, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn defaults_fill_the_schema() {
        let ability = assemble(7, 2, AbilityFields::named("Nothing Known"), UltimatePolicy::Either);

        assert_eq!(ability.id, 702);
        assert_eq!(ability.cooldown, vec![0.0; 4]);
        assert_eq!(ability.mana_cost, vec![0.0; 4]);
        assert_eq!(ability.affects.iter().collect::<Vec<_>>(), vec![&Affect::Caster]);
        assert_eq!(ability.description, "Nothing Known - Description not found");
    }

    #[test]
    fn innate_is_never_ultimate() {
        let mut fields = AbilityFields::named("Coat of Blood");
        fields.ability_type = AbilityType::Innate;
        let ability = assemble(2, 5, fields, UltimatePolicy::Either);

        assert_eq!(ability.ability_type, AbilityType::Innate);
        assert_eq!(ability.cooldown.len(), STANDARD_LEVELS);
    }

    #[test]
    fn missing_section_uses_fallback_table() {
        let assembler = Assembler::builtin().unwrap();
        let ability = assembler.ability("axe", 2, 1, "Berserker's Call", None);

        assert_eq!(ability.cooldown, vec![16.0, 14.0, 12.0, 10.0]);
        assert_eq!(ability.mana_cost, vec![80.0, 90.0, 100.0, 110.0]);
        assert_eq!(ability.behavior, Behavior::NoTarget);
        assert!(ability.pierces_immunity);
        assert_eq!(ability.id, 201);
    }

    #[test]
    fn section_values_beat_the_table() {
        let assembler = Assembler::builtin().unwrap();
        let section = r#"<p>Axe taunts nearby enemies.</p>
            <div>Cooldown</div><div class="spellcost_value">17/15/13/11</div>
            <div>Mana Cost</div><div class="spellcost_value">80/90/100/110</div>"#;
        let ability = assembler.ability("axe", 2, 1, "Berserker's Call", Some(section));

        assert_eq!(ability.cooldown, vec![17.0, 15.0, 13.0, 11.0]);
        assert_eq!(ability.description, "Axe taunts nearby enemies.");
        assert_eq!(ability.ability_type, AbilityType::Active);
    }

    #[test]
    fn malformed_costs_fall_back_to_zeros() {
        let assembler = Assembler::builtin().unwrap();
        let section = r#"<p>Does a thing.</p><div>Cooldown</div><div class="spellcost_value">n/a</div>"#;
        let ability = assembler.ability("nobody", 9, 2, "Odd Spell", Some(section));

        assert_eq!(ability.cooldown, vec![0.0; 4]);
    }

    #[test]
    fn taunt_without_damage_keyword_uses_default() {
        let mut assembler = Assembler::builtin().unwrap();
        let section = "<p>Axe taunts nearby enemies, forcing them to attack him.</p>";

        let ability = assembler.ability("nobody", 2, 1, "Taunt", Some(section));
        assert_eq!(ability.damage_type, DamageType::None);

        assembler.default_damage = DamageType::Physical;
        let ability = assembler.ability("nobody", 2, 1, "Taunt", Some(section));
        assert_eq!(ability.damage_type, DamageType::Physical);
    }

    #[test]
    fn culling_blade_from_table_is_ultimate_by_values() {
        let mut assembler = Assembler::builtin().unwrap();
        assembler.policy = UltimatePolicy::ThreeValues;
        let ability = assembler.ability("axe", 2, 3, "Culling Blade", None);

        assert_eq!(ability.ability_type, AbilityType::Ultimate);
        assert_eq!(ability.cooldown, vec![75.0, 65.0, 55.0]);
    }
}
