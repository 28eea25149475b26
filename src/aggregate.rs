//! Combining per-hero ability files into one document.

use crate::error::*;
use crate::data_structs::{Hero, HeroesDocument};
use crate::store;
use std::fs;
use std::path::{Path, PathBuf};
use log::{info, warn};

/// Name of the combined file written next to the per-hero files.
pub const COMBINED_FILE: &str = "all_heroes_abilities.json";
/// Suffix of a per-hero file.
pub const HERO_FILE_SUFFIX: &str = "_abilities.json";

/// The per-hero file name for an internal hero name.
pub fn hero_file_name(name: &str) -> String {
    format!("{}{}", name, HERO_FILE_SUFFIX)
}

pub struct Aggregator {
    /// Hero names (and file name prefixes) that mark example data.
    sentinels: Vec<String>
}

impl Aggregator {
    pub fn new<I, S>(sentinels: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String> {

        Aggregator {
            sentinels: sentinels.into_iter().map(Into::into).collect()
        }
    }

    fn is_sentinel_file(&self, file_name: &str) -> bool {
        file_name.starts_with("all_") || self.sentinels.iter().any(|s| file_name.starts_with(s.as_str()))
    }

    fn is_sentinel_hero(&self, hero: &Hero) -> bool {
        self.sentinels.iter().any(|s| s.eq_ignore_ascii_case(&hero.name))
    }

    /// Per-hero files in `dir`, sorted by path.
    pub fn hero_files<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut files = vec![];

        for entry in fs::read_dir(dir).chain_err(|| format!("could not list {}", dir.display()))? {
            let path = entry?.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue
            };

            if name.ends_with(HERO_FILE_SUFFIX) && !self.is_sentinel_file(name) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Merges the heroes of every file, skipping sentinel heroes and files
    /// that cannot be read, sorted by id.
    pub fn combine<P: AsRef<Path>>(&self, files: &[P]) -> HeroesDocument {
        let mut heroes = vec![];

        for path in files {
            let path = path.as_ref();

            match store::load::<_, HeroesDocument>(path) {
                Ok(doc) => {
                    for hero in doc.heroes {
                        if self.is_sentinel_hero(&hero) {
                            warn!("skipping example hero '{}' in {}", hero.name, path.display());
                            continue;
                        }

                        info!("Added {}", hero.localized_name);
                        heroes.push(hero);
                    }
                },
                Err(e) => warn!("skipping {}: {}", path.display(), e)
            }
        }

        heroes.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));
        HeroesDocument { heroes }
    }

    /// Combines every per-hero file in `dir` into `dir/all_heroes_abilities.json`.
    pub fn combine_dir<P: AsRef<Path>>(&self, dir: P) -> Result<(PathBuf, usize)> {
        let dir = dir.as_ref();
        let files = self.hero_files(dir)?;
        info!("Found {} hero files in {}", files.len(), dir.display());

        let combined = self.combine(&files);
        let out = dir.join(COMBINED_FILE);
        store::save(&out, &combined)?;

        info!("Saved {} heroes to {}", combined.heroes.len(), out.display());
        Ok((out, combined.heroes.len()))
    }

    /// Combines `dir` after a run that wrote `succeeded` hero files and gave
    /// up on `failed` heroes. Files from earlier runs are included; nothing
    /// is written when the run produced no file.
    pub fn combine_after_run<P: AsRef<Path>>(&self, dir: P, succeeded: usize, failed: usize)
        -> Result<Option<(PathBuf, usize)>> {

        if failed > 0 {
            warn!("{} heroes failed; combining the {} files written plus any earlier ones", failed, succeeded);
        }

        if succeeded == 0 {
            warn!("no hero files written, not combining");
            return Ok(None);
        }

        self.combine_dir(dir).map(Some)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Aggregator::new(crate::config::DEFAULT_SENTINELS.iter().copied())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{hero_fixture, write_hero_file};

    #[test]
    fn combined_heroes_are_sorted_by_id() {
        let dir = tempfile::tempdir().unwrap();
        write_hero_file(dir.path(), hero_fixture(5, "bane", "Bane")).unwrap();
        write_hero_file(dir.path(), hero_fixture(2, "axe", "Axe")).unwrap();

        let (out, count) = Aggregator::default().combine_dir(dir.path()).unwrap();
        let combined: HeroesDocument = store::load(&out).unwrap();

        assert_eq!(count, 2);
        assert_eq!(combined.heroes.iter().map(|h| h.id).collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn rerunning_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        write_hero_file(dir.path(), hero_fixture(5, "bane", "Bane")).unwrap();
        write_hero_file(dir.path(), hero_fixture(2, "axe", "Axe")).unwrap();
        let aggregator = Aggregator::default();

        let (out, _) = aggregator.combine_dir(dir.path()).unwrap();
        let first = fs::read(&out).unwrap();
        aggregator.combine_dir(dir.path()).unwrap();
        let second = fs::read(&out).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn sentinels_and_combined_file_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_hero_file(dir.path(), hero_fixture(2, "axe", "Axe")).unwrap();
        write_hero_file(dir.path(), hero_fixture(1, "hero_abilities_example", "Example")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut renamed = hero_fixture(3, "example_hero", "Example");
        renamed.name = "example_hero".into();
        store::save(dir.path().join("renamed_abilities.json"), &HeroesDocument::from(renamed)).unwrap();

        let aggregator = Aggregator::default();
        aggregator.combine_dir(dir.path()).unwrap();
        let files = aggregator.hero_files(dir.path()).unwrap();
        let combined = aggregator.combine(&files);

        assert_eq!(files.len(), 2);
        assert_eq!(combined.heroes.len(), 1);
        assert_eq!(combined.heroes[0].name, "axe");
    }

    #[test]
    fn partial_runs_still_combine() {
        let dir = tempfile::tempdir().unwrap();
        write_hero_file(dir.path(), hero_fixture(2, "axe", "Axe")).unwrap();
        write_hero_file(dir.path(), hero_fixture(5, "bane", "Bane")).unwrap();
        let aggregator = Aggregator::default();

        assert!(aggregator.combine_after_run(dir.path(), 0, 3).unwrap().is_none());
        assert!(!dir.path().join(COMBINED_FILE).exists());

        let (out, count) = aggregator.combine_after_run(dir.path(), 1, 3).unwrap().unwrap();
        assert_eq!(count, 2);
        assert!(out.exists());
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_hero_file(dir.path(), hero_fixture(2, "axe", "Axe")).unwrap();
        fs::write(dir.path().join("broken_abilities.json"), "{").unwrap();

        let (_, count) = Aggregator::default().combine_dir(dir.path()).unwrap();

        assert_eq!(count, 1);
    }
}
