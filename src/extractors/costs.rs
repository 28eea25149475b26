//! Cooldown and mana cost extraction.

use super::{Patterns, RuleChain};
use crate::values::parse_numbers;
use log::{debug, warn};

/// What a cost chain found in a section.
#[derive(Debug, Clone, PartialEq)]
pub enum CostOutcome {
    /// Per-level values, exactly as many as the page lists.
    Found(Vec<f64>),
    /// A labelled cost block whose content is not a number list.
    Malformed(String),
    Missing
}

impl CostOutcome {
    #[inline]
    pub fn values(self) -> Option<Vec<f64>> {
        match self {
            CostOutcome::Found(values) => Some(values),
            _ => None
        }
    }
}

/// Which cost to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostKind {
    Cooldown,
    ManaCost
}

impl CostKind {
    fn chain(self, patterns: &Patterns) -> &RuleChain<()> {
        match self {
            CostKind::Cooldown => &patterns.cooldown,
            CostKind::ManaCost => &patterns.mana_cost
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CostKind::Cooldown => "cooldown",
            CostKind::ManaCost => "mana cost"
        }
    }
}

/// Runs the cost chain for `kind` over an ability section.
///
/// The first pattern that matches decides; its capture is narrowed to the
/// first run of digits and slashes before being parsed.
pub fn extract(patterns: &Patterns, kind: CostKind, section: &str) -> CostOutcome {
    let (rule, captured) = match kind.chain(patterns).first_capture(section, |_| true) {
        Some(found) => found,
        None => return CostOutcome::Missing
    };

    let numbers = patterns.cost_numbers.find(captured).map(|m| m.as_str());

    match numbers.and_then(|n| parse_numbers(&n.replace(' ', ""))) {
        Some(values) if !values.is_empty() => {
            debug!("{} {:?} via '{}'", kind.label(), values, rule.name);
            CostOutcome::Found(values)
        },
        _ => {
            let raw = crate::text::normalize(captured);
            warn!("{} block '{}' is not a number list", kind.label(), raw);
            CostOutcome::Malformed(raw)
        }
    }
}
