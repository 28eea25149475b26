//! Turning raw markup fragments into plain text.

use once_cell::sync::Lazy;
use regex::Regex;

static BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|td|th|tr|h[1-6])\s*>").unwrap()
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// `&amp;` comes last so `&amp;lt;` decodes to the literal `&lt;`.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&#160;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#039;", "'"),
    ("&ndash;", "-"),
    ("&#8211;", "-"),
    ("&amp;", "&")
];

/// Strips tags, decodes the common named entities and collapses whitespace.
///
/// Accepts either a `&str` or an `Option<&str>`; `None` yields an empty string.
pub fn normalize<'a, S: Into<Option<&'a str>>>(raw: S) -> String {
    let raw = match raw.into() {
        Some(raw) if !raw.is_empty() => raw,
        _ => return String::new()
    };

    let text = BREAK.replace_all(raw, " ");
    let mut text = TAG.replace_all(&text, "").into_owned();

    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }

    SPACE.replace_all(text.trim(), " ").into_owned()
}

/// Lowercases a title and joins its words with `_`, e.g. for ability keys.
pub fn snake_key(title: &str) -> String {
    title.split(|c: char| !c.is_alphanumeric())
         .filter(|w| !w.is_empty())
         .map(|w| w.to_lowercase())
         .collect::<Vec<_>>()
         .join("_")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let raw = "<p>Axe&nbsp;taunts <a href=\"/x\">nearby</a> enemies &amp; allies&#160;&lt;3</p>";

        assert_eq!(normalize(raw), "Axe taunts nearby enemies & allies <3");
    }

    #[test]
    fn separates_blocks() {
        assert_eq!(normalize("<p>One</p><p>Two</p>"), "One Two");
        assert_eq!(normalize("line<br/>break"), "line break");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  a \n\t b   "), "a b");
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(Some("<br>")), "");
    }

    #[test]
    fn ampersand_is_decoded_once() {
        assert_eq!(normalize("&amp;lt;"), "&lt;");
        assert_eq!(normalize("A &ndash; B"), "A - B");
    }

    #[test]
    fn snake_keys() {
        assert_eq!(snake_key("Berserker's Call"), "berserker_s_call");
        assert_eq!(snake_key("Cast Range"), "cast_range");
    }
}
