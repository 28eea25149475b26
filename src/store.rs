//! Reading and writing the JSON files the pipeline passes between steps.

use crate::error::*;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use serde::Serialize;
use serde::de::DeserializeOwned;
use log::trace;

pub fn load<P, S>(path: P) -> Result<S>
    where P: AsRef<Path>,
          S: DeserializeOwned {

    let path = path.as_ref();
    let file = File::open(path).chain_err(|| format!("could not open {}", path.display()))?;
    let mut buf_reader = BufReader::new(file);
    let mut contents = String::new();
    buf_reader.read_to_string(&mut contents)?;

    serde_json::from_str(&contents).chain_err(|| format!("could not parse {}", path.display()))
}

/// Pretty JSON with a trailing newline, creating parent directories as needed.
/// Overwrites whatever was there.
pub fn save<P, S>(path: P, thing: &S) -> Result<()>
    where P: AsRef<Path>,
          S: Serialize + ?Sized {

    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, thing)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    trace!("wrote {}", path.display());
    Ok(())
}

/// Fails with `MissingPrerequisite` when `path` does not exist.
///
/// `hint` tells the user which step produces the file.
pub fn require<P: AsRef<Path>>(path: P, hint: &str) -> Result<()> {
    let path = path.as_ref();

    if !path.exists() {
        bail!(ErrorKind::MissingPrerequisite(path.display().to_string(), hint.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data_structs::HeroesDocument;
    use crate::test_utils::hero_fixture;

    #[test]
    fn hero_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/axe_abilities.json");
        let doc = HeroesDocument::from(hero_fixture(2, "axe", "Axe"));

        save(&path, &doc).unwrap();
        let loaded: HeroesDocument = load(&path).unwrap();

        assert_eq!(loaded, doc);
        assert_eq!(loaded.heroes[0].abilities[3].cooldown.len(), 3);
        assert!(fs::read_to_string(&path).unwrap().ends_with("}\n"));
    }

    #[test]
    fn missing_file_is_a_prerequisite_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = require(dir.path().join("heroes.json"), "run download_hero_assets first").unwrap_err();

        match err.kind() {
            ErrorKind::MissingPrerequisite(_, hint) => assert!(hint.contains("download_hero_assets")),
            other => panic!("unexpected error {:?}", other)
        }
    }

    #[test]
    fn bad_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        assert!(load::<_, HeroesDocument>(&path).is_err());
    }
}
