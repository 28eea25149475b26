//! Description and notes extraction.

use super::Patterns;
use crate::fallback::FallbackTable;
use crate::text::normalize;
use log::{debug, warn};

/// The text used when no description can be found.
pub fn placeholder(ability: &str) -> String {
    format!("{} - Description not found", ability)
}

/// Whether a description is the not-found placeholder.
pub fn is_placeholder(description: &str) -> bool {
    description.ends_with(" - Description not found")
}

/// The first non-empty paragraph-like block of the section, as plain text.
pub fn from_section(patterns: &Patterns, section: &str) -> Option<String> {
    patterns.description
            .first_capture(section, |s| !normalize(s).is_empty())
            .map(|(_, raw)| normalize(raw))
}

/// Resolves a description: section text, then the fallback table, then the
/// placeholder.
pub fn resolve(patterns: &Patterns,
               fallbacks: &FallbackTable,
               hero: &str,
               ability: &str,
               section: Option<&str>) -> String {

    if let Some(found) = section.and_then(|s| from_section(patterns, s)) {
        return found;
    }

    if let Some(known) = fallbacks.description(hero, ability) {
        debug!("description of '{}' from the fallback table", ability);
        return known.to_string();
    }

    warn!("no description for '{}'", ability);
    placeholder(ability)
}

/// `<li>` items under a "Notes" heading, joined with spaces.
pub fn notes(patterns: &Patterns, section: &str) -> String {
    let block = match patterns.notes_block.captures(section).and_then(|c| c.get(1)) {
        Some(block) => block.as_str(),
        None => return String::new()
    };

    patterns.note_item
            .captures_iter(block)
            .filter_map(|c| c.get(1))
            .map(|m| normalize(m.as_str()))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
}
