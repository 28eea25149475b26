//! Handles extraction of ability data from a Liquipedia hero page.

use super::load_sels;
use crate::error::*;
use crate::assembler::{assemble, Assembler};
use crate::data_structs::{AbilityType, Behavior, Hero};
use crate::fallback::FallbackTable;
use crate::section;
use crate::text::normalize;
use scraper::{ElementRef, Html};
use log::{debug, info, warn};

const HERO_PAGE_SELECTORS_STR: &str = include_str!("../../selectors/hero_page.toml");

/// A heading on the page: the anchor id it carries and its display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub anchor: String,
    pub title: String
}

/// Which level 2 region of the page a heading sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Other,
    Innate,
    Abilities
}

/// Handles extraction of ability data from a Liquipedia hero page.
///
/// Build one from HTML you already have (see the `From<String>` impl) or use
/// `http_client::Downloader::hero_page`.
pub struct HeroPageScraper {
    raw: String,
    doc: Html
}

impl From<String> for HeroPageScraper {
    fn from(html: String) -> Self {
        HeroPageScraper {
            doc: Html::parse_document(&html),
            raw: html
        }
    }
}

impl HeroPageScraper {
    /// The page as it was fetched.
    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether this looks like a hero page at all.
    #[inline]
    pub fn has_abilities(&self) -> bool {
        self.raw.contains("Abilities")
    }

    /// The ability headings, in page order, with skipped titles removed.
    ///
    /// These are the level 3 headings of the `Abilities` region. Pages without
    /// that heading are read from the table of contents instead.
    pub fn ability_headings(&self, fallbacks: &FallbackTable) -> Result<Vec<Heading>> {
        let (_, regular) = self.regions()?;

        let headings = match regular {
            Some(found) => found,
            None => {
                debug!("no Abilities heading, reading the table of contents");
                self.toc_entries("Abilities")?
            }
        };

        Ok(headings.into_iter().filter(|h| !fallbacks.is_skipped(&h.title)).collect())
    }

    /// The innate ability heading, if the page has an `Innate` region.
    pub fn innate_heading(&self, fallbacks: &FallbackTable) -> Result<Option<Heading>> {
        let (innate, _) = self.regions()?;
        let candidates = match innate {
            Some(found) => found,
            None => self.toc_entries("Innate")?
        };

        Ok(candidates.into_iter().find(|h| !fallbacks.is_innate_skipped(&h.title)))
    }

    /// Walks the level 2 and 3 headings, collecting the level 3 ones under
    /// `Innate` and under `Abilities`. A region that never appears is `None`.
    fn regions(&self) -> Result<(Option<Vec<Heading>>, Option<Vec<Heading>>)> {
        let selectors = load_sels(HERO_PAGE_SELECTORS_STR)?;
        let mut region = Region::Other;
        let mut innate: Option<Vec<Heading>> = None;
        let mut regular: Option<Vec<Heading>> = None;

        for elem in self.doc.select(&selectors["headings"]) {
            let heading = heading_of(elem, &selectors["headline"], &selectors["edit_section"]);

            // every h2 closes the previous region, anchored or not
            if elem.value().name() == "h2" {
                region = match heading.as_ref().map(|h| h.anchor.as_str()) {
                    Some("Innate") => Region::Innate,
                    Some("Abilities") => Region::Abilities,
                    _ => Region::Other
                };

                match region {
                    Region::Innate => { innate.get_or_insert_with(Vec::new); },
                    Region::Abilities => { regular.get_or_insert_with(Vec::new); },
                    Region::Other => {}
                }
                continue;
            }

            let heading = match heading {
                Some(heading) => heading,
                None => continue
            };

            match region {
                Region::Innate => innate.get_or_insert_with(Vec::new).push(heading),
                Region::Abilities => regular.get_or_insert_with(Vec::new).push(heading),
                Region::Other => {}
            }
        }

        Ok((innate, regular))
    }

    /// The second level entries under the table of contents entry `top`.
    fn toc_entries(&self, top: &str) -> Result<Vec<Heading>> {
        let selectors = load_sels(HERO_PAGE_SELECTORS_STR)?;
        let wanted = format!("#{}", top);

        for entry in self.doc.select(&selectors["toc_top"]) {
            let is_wanted = entry.select(&selectors["toc_target"])
                                 .next()
                                 .and_then(toc_target)
                                 .map_or(false, |t| t == wanted);

            if !is_wanted {
                continue;
            }

            let headings = entry.select(&selectors["toc_child"]).filter_map(|child| {
                if_chain! {
                    if let Some(link) = child.select(&selectors["toc_target"]).next();
                    if let Some(target) = toc_target(link);
                    if let Some(text) = child.select(&selectors["toc_text"]).next();
                    let title = normalize(text.inner_html().as_str());
                    if !title.is_empty();

                    then {
                        Some(Heading {
                            anchor: target.trim_start_matches('#').to_string(),
                            title
                        })
                    } else {
                        None
                    }
                }
            }).collect();

            return Ok(headings);
        }

        Ok(vec![])
    }

    /// The raw markup of the section under `heading`.
    pub fn section(&self, heading: &Heading) -> Option<&str> {
        section::locate(&self.raw, &heading.anchor)
            .or_else(|| section::locate_any(&self.raw, section::anchor_candidates(&heading.title)))
    }

    /// Builds the full hero record from this page.
    ///
    /// Regular abilities get ordinals 1.., innate abilities continue after
    /// them. When the page has no innate heading, regular headings named in
    /// the fallback table's innate list are moved over instead.
    pub fn hero(&self, assembler: &Assembler, id: u32, name: &str, localized_name: &str) -> Result<Hero> {
        let fallbacks = &assembler.fallbacks;
        let mut regular = self.ability_headings(fallbacks)?;
        let mut innate: Vec<Heading> = self.innate_heading(fallbacks)?.into_iter().collect();

        if innate.is_empty() {
            let (moved, kept): (Vec<Heading>, Vec<Heading>) =
                regular.into_iter().partition(|h| fallbacks.is_innate_name(&h.title));
            innate = moved;
            regular = kept;
        }

        if regular.is_empty() {
            warn!("{}: no ability headings found", localized_name);
        }

        let mut abilities = Vec::with_capacity(regular.len());
        for (idx, heading) in regular.iter().enumerate() {
            let section = self.section(heading);
            if section.is_none() {
                warn!("{}: no section for '{}'", localized_name, heading.title);
            }

            abilities.push(assembler.ability(name, id, idx as u32 + 1, &heading.title, section));
        }

        let mut innate_abilities = Vec::with_capacity(innate.len());
        for (idx, heading) in innate.iter().enumerate() {
            let ordinal = (regular.len() + idx) as u32 + 1;
            let mut fields = assembler.fields(name, &heading.title, self.section(heading));
            fields.ability_type = AbilityType::Innate;

            if fields.behavior == Behavior::Unknown {
                fields.behavior = Behavior::Passive;
            }

            innate_abilities.push(assemble(id, ordinal, fields, assembler.policy));
        }

        let hero = Hero {
            id,
            name: name.to_string(),
            localized_name: localized_name.to_string(),
            abilities,
            innate_abilities
        };

        info!("Parsed {}", hero);
        Ok(hero)
    }
}

/// Reads the anchor and title off a heading element.
///
/// Older skins put both on a `span.mw-headline` inside the heading, newer
/// ones put the id on the heading itself.
fn heading_of(elem: ElementRef,
              headline: &scraper::Selector,
              edit_section: &scraper::Selector) -> Option<Heading> {

    if let Some(span) = elem.select(headline).next() {
        let anchor = span.value().attr("id")?;
        return Some(Heading {
            anchor: anchor.to_string(),
            title: normalize(span.inner_html().as_str())
        });
    }

    let anchor = elem.value().attr("id")?;
    let mut html = elem.inner_html();

    for edit in elem.select(edit_section) {
        html = html.replace(&edit.html(), "");
    }

    Some(Heading {
        anchor: anchor.to_string(),
        title: normalize(html.as_str())
    })
}

fn toc_target(elem: ElementRef) -> Option<&str> {
    elem.value().attr("data-target").or_else(|| elem.value().attr("href"))
}
