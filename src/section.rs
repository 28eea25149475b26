//! Cutting one heading's section out of a wiki page.
//!
//! This works on the raw document text rather than a parsed tree: the field
//! extractors run their patterns over the markup, so they need the section
//! as a string slice.

use once_cell::sync::Lazy;
use regex::Regex;
use log::trace;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<h[1-6](?:\s[^>]*)?>.*?</h[1-6]\s*>").unwrap()
});
static SECTION_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<h[23][\s>/]").unwrap());

/// Returns the text between the heading carrying `id="<anchor>"` and the next
/// level 2 or level 3 heading (or the end of the document).
///
/// The first such heading wins and the anchor comparison is case-sensitive.
/// `None` means the page has no such heading.
pub fn locate<'a>(doc: &'a str, anchor: &str) -> Option<&'a str> {
    if anchor.is_empty() {
        return None;
    }

    let needle = format!("id=\"{}\"", anchor);
    let heading = HEADING.find_iter(doc).find(|m| carries_id(m.as_str(), &needle))?;
    let rest = &doc[heading.end()..];
    let end = SECTION_END.find(rest).map_or(rest.len(), |m| m.start());

    trace!("section '{}' spans {} bytes", anchor, end);
    Some(&rest[..end])
}

/// Whether `heading` has an `id` attribute equal to the one in `needle`.
/// Attributes merely ending in `id`, like `data-id`, do not count.
fn carries_id(heading: &str, needle: &str) -> bool {
    heading.match_indices(needle).any(|(at, _)| {
        heading[..at].chars().next_back().map_or(false, char::is_whitespace)
    })
}

/// Tries each anchor spelling in turn, returning the first section found.
pub fn locate_any<'a, I, S>(doc: &'a str, anchors: I) -> Option<&'a str>
    where I: IntoIterator<Item = S>,
          S: AsRef<str> {

    anchors.into_iter().find_map(|a| locate(doc, a.as_ref()))
}

/// The anchor spellings MediaWiki may have generated for a heading title.
///
/// Newer pages keep punctuation (`Berserker's_Call`); older ones escape it
/// the way URL fragments used to be escaped (`Berserker.27s_Call`).
pub fn anchor_candidates(title: &str) -> Vec<String> {
    let plain = title.trim().replace(' ', "_");
    let mut candidates = vec![plain.clone()];

    let legacy: String = plain.chars().map(|c| match c {
        '\'' => ".27".to_string(),
        '(' => ".28".to_string(),
        ')' => ".29".to_string(),
        ',' => ".2C".to_string(),
        '!' => ".21".to_string(),
        ':' => ".3A".to_string(),
        c => c.to_string()
    }).collect();

    if legacy != plain {
        candidates.push(legacy);
    }

    candidates
}

#[cfg(test)]
mod test {
    use super::*;

    const PAGE: &str = r#"<h2><span class="mw-headline" id="Abilities">Abilities</span></h2>
<h3><span class="mw-headline" id="Berserker's_Call">Berserker's Call</span></h3>
<div>Cooldown <div class="spellcost_value">16/14/12/10</div></div>
<h4>Notes</h4><ul><li>Taunt.</li></ul>
<h3><span class="mw-headline" id="Battle_Hunger">Battle Hunger</span></h3>
<p>Enrages an enemy.</p>
<h2 id="Talents">Talents</h2>
<p>tail</p>"#;

    #[test]
    fn section_runs_to_next_heading() {
        let section = locate(PAGE, "Berserker's_Call").unwrap();

        assert!(section.contains("16/14/12/10"));
        assert!(section.contains("<h4>Notes</h4>"));
        assert!(!section.contains("Battle Hunger"));
    }

    #[test]
    fn level_two_heading_ends_section() {
        let section = locate(PAGE, "Battle_Hunger").unwrap();

        assert!(section.contains("Enrages"));
        assert!(!section.contains("tail"));
    }

    #[test]
    fn last_section_runs_to_end() {
        assert_eq!(locate(PAGE, "Talents").unwrap().trim(), "<p>tail</p>");
    }

    #[test]
    fn missing_anchor_is_none() {
        assert!(locate(PAGE, "Culling_Blade").is_none());
        assert!(locate(PAGE, "battle_hunger").is_none());
        assert!(locate(PAGE, "").is_none());
        assert!(locate("", "Battle_Hunger").is_none());
    }

    #[test]
    fn partial_anchor_does_not_match() {
        assert!(locate(PAGE, "Battle").is_none());
    }

    #[test]
    fn only_the_id_attribute_counts() {
        let page = r#"<h3 data-id="Hex">Decoy</h3><p>wrong</p>
<h3><span class="mw-headline"
 id="Hex">Hex</span></h3><p>right</p>"#;

        assert_eq!(locate(page, "Hex"), Some("<p>right</p>"));
        assert!(locate(r#"<h3 data-id="Hex">Hex</h3>body"#, "Hex").is_none());
    }

    #[test]
    fn legacy_anchor_spelling() {
        let page = r#"<h3><span class="mw-headline" id="Berserker.27s_Call">x</span></h3>body"#;

        assert_eq!(anchor_candidates("Berserker's Call"),
                   vec!["Berserker's_Call".to_string(), "Berserker.27s_Call".to_string()]);
        assert_eq!(locate_any(page, anchor_candidates("Berserker's Call")), Some("body"));
        assert_eq!(anchor_candidates("Hex"), vec!["Hex".to_string()]);
    }
}
