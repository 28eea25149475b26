//! Hero images and icons, the cleaned `heroes.json`, and `hero_mapping.json`.

use crate::error::*;
use crate::data_structs::{HeroMapping, HeroMappingEntry, HeroStat};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use log::{debug, error, info, warn};

pub const CDN_BASE: &str = "https://cdn.dota2.com/apps/dota2/images/heroes";
pub const OPENDOTA_ORIGIN: &str = "https://api.opendota.com";

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").unwrap());

/// `Nature's Prophet` -> `natures_prophet`.
pub fn sanitize_file_name(name: &str) -> String {
    let stripped = UNSAFE_CHARS.replace_all(name, "");
    let lowered = stripped.trim().to_lowercase();

    SEPARATORS.replace_all(&lowered, "_").into_owned()
}

/// `<id>_<sanitized localized name>`, shared by image files and the mapping.
pub fn file_stem(stat: &HeroStat) -> String {
    format!("{}_{}", stat.id, sanitize_file_name(&stat.display_name()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Icon
}

impl AssetKind {
    fn cdn_suffix(self) -> &'static str {
        match self {
            AssetKind::Image => "full",
            AssetKind::Icon => "icon"
        }
    }

    /// Directory below the images root.
    fn subdir(self) -> &'static str {
        match self {
            AssetKind::Image => "",
            AssetKind::Icon => "icons"
        }
    }

    fn source(self, stat: &HeroStat) -> Option<&str> {
        match self {
            AssetKind::Image => stat.img.as_deref(),
            AssetKind::Icon => stat.icon.as_deref()
        }
    }

    /// Path the resource is served under once downloaded.
    fn resource_path(self, stem: &str) -> String {
        match self {
            AssetKind::Image => format!("/images/heroes/{}.png", stem),
            AssetKind::Icon => format!("/images/heroes/icons/{}.png", stem)
        }
    }
}

/// One file to fetch: URLs in preference order, where to put it, and the
/// `<id>.png` copy made alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetJob {
    pub hero_id: u32,
    pub kind: AssetKind,
    pub urls: Vec<String>,
    pub dest: PathBuf,
    pub id_copy: PathBuf
}

/// Jobs for whichever of image and icon the hero row lists.
pub fn jobs_for(stat: &HeroStat, images_dir: &Path) -> Vec<AssetJob> {
    let stem = file_stem(stat);

    [AssetKind::Image, AssetKind::Icon].iter().filter_map(|&kind| {
        let source = kind.source(stat)?;
        let dir = images_dir.join(kind.subdir());
        let api_path = source.split('?').next().unwrap_or(source);

        Some(AssetJob {
            hero_id: stat.id,
            kind,
            urls: vec![
                format!("{}/{}_{}.png", CDN_BASE, stat.short_name(), kind.cdn_suffix()),
                format!("{}{}", OPENDOTA_ORIGIN, api_path)
            ],
            dest: dir.join(format!("{}.png", stem)),
            id_copy: dir.join(format!("{}.png", stat.id))
        })
    }).collect()
}

/// Runs one job. Files that already exist are left alone.
pub fn run_job<F>(job: &AssetJob, download: &F) -> Result<()>
    where F: Fn(&str, &Path) -> Result<()> {

    if let Some(parent) = job.dest.parent() {
        fs::create_dir_all(parent)?;
    }

    if job.dest.exists() {
        debug!("{} already present", job.dest.display());
    } else {
        let mut last_err = None;

        for url in &job.urls {
            match download(url, &job.dest) {
                Ok(()) => {
                    info!("Downloaded {} to {}", url, job.dest.display());
                    last_err = None;
                    break;
                },
                Err(e) => {
                    warn!("Failed to download {}: {}", url, e);
                    last_err = Some(e);
                }
            }
        }

        if let Some(e) = last_err {
            return Err(e);
        }
    }

    if !job.id_copy.exists() {
        fs::copy(&job.dest, &job.id_copy)?;
    }

    Ok(())
}

/// Runs every job on `workers` scoped threads pulling from a shared index,
/// sleeping `delay` after each job. Returns how many succeeded.
pub fn run_pool<F>(jobs: &[AssetJob], workers: usize, delay: Duration, download: F) -> usize
    where F: Fn(&str, &Path) -> Result<()> + Sync {

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(u32, Result<()>)>();
    let workers = workers.min(jobs.len()).max(1);

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let download = &download;

            scope.spawn(move || loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                let job = match jobs.get(i) {
                    Some(job) => job,
                    None => break
                };

                // the receiver outlives every worker
                let _ = tx.send((job.hero_id, run_job(job, download)));
                thread::sleep(delay);
            });
        }
        drop(tx);

        rx.iter().filter(|(hero_id, result)| match result {
            Ok(()) => true,
            Err(e) => {
                error!("hero {}: {}", hero_id, e);
                false
            }
        }).count()
    })
}

/// Points `img`/`icon` at the local resource paths and drops the trend
/// series, which change on every fetch.
pub fn localize(stat: &mut HeroStat) {
    let stem = file_stem(stat);

    if stat.img.is_some() {
        stat.img = Some(AssetKind::Image.resource_path(&stem));
    }

    if stat.icon.is_some() {
        stat.icon = Some(AssetKind::Icon.resource_path(&stem));
    }

    stat.extra.retain(|key, _| !key.ends_with("_trend"));
}

pub fn hero_mapping(stats: &[HeroStat]) -> HeroMapping {
    stats.iter().map(|stat| {
        (stat.id, HeroMappingEntry {
            id: stat.id,
            name: stat.short_name().to_string(),
            localized_name: stat.display_name(),
            file_name: file_stem(stat),
            attributes: stat.primary_attr.clone().unwrap_or_else(|| "unknown".into()),
            roles: stat.roles.clone()
        })
    }).collect()
}

/// Ids below the highest one that no hero uses.
pub fn missing_ids(mapping: &HeroMapping) -> Vec<u32> {
    let max = match mapping.keys().next_back() {
        Some(&max) => max,
        None => return vec![]
    };

    (1..max).filter(|id| !mapping.contains_key(id)).collect()
}

/// Looks a hero up by internal or localized name, case-insensitively.
pub fn find_hero<'a>(mapping: &'a HeroMapping, name: &str) -> Result<&'a HeroMappingEntry> {
    let wanted = name.trim().to_lowercase();

    mapping.values()
           .find(|e| e.name.to_lowercase() == wanted || e.localized_name.to_lowercase() == wanted)
           .ok_or_else(|| ErrorKind::HeroNotFound(name.to_string()).into())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Mutex;

    const HERO_STATS: &str = include_str!("../test_data/hero_stats.json");

    fn stats() -> Vec<HeroStat> {
        serde_json::from_str(HERO_STATS).unwrap()
    }

    #[test]
    fn file_names() {
        assert_eq!(sanitize_file_name("Nature's Prophet"), "natures_prophet");
        assert_eq!(sanitize_file_name("Anti-Mage"), "anti_mage");
        assert_eq!(sanitize_file_name("  Queen of Pain "), "queen_of_pain");
        assert_eq!(file_stem(&stats()[0]), "2_axe");
    }

    #[test]
    fn cdn_first_then_opendota() {
        let jobs = jobs_for(&stats()[0], Path::new("img"));

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].urls, vec![
            "https://cdn.dota2.com/apps/dota2/images/heroes/axe_full.png".to_string(),
            "https://api.opendota.com/apps/dota2/images/dota_react/heroes/axe.png".to_string()
        ]);
        assert_eq!(jobs[0].dest, Path::new("img").join("2_axe.png"));
        assert_eq!(jobs[1].dest, Path::new("img").join("icons").join("2_axe.png"));
        assert_eq!(jobs[1].id_copy, Path::new("img").join("icons").join("2.png"));
    }

    #[test]
    fn pool_falls_back_and_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let jobs: Vec<AssetJob> = stats().iter().flat_map(|s| jobs_for(s, dir.path())).collect();
        let requested = Mutex::new(vec![]);

        let download = |url: &str, dest: &Path| -> Result<()> {
            requested.lock().unwrap().push(url.to_string());
            if url.starts_with(CDN_BASE) && url.contains("lion") {
                bail!(ErrorKind::NonSuccessStatus(404, url.to_string()));
            }
            fs::write(dest, b"png")?;
            Ok(())
        };

        assert_eq!(run_pool(&jobs, 3, Duration::from_millis(0), &download), 4);
        assert!(dir.path().join("26_lion.png").exists());
        assert!(dir.path().join("26.png").exists());
        assert_eq!(requested.lock().unwrap().len(), 6);

        // second run downloads nothing
        requested.lock().unwrap().clear();
        assert_eq!(run_pool(&jobs, 3, Duration::from_millis(0), &download), 4);
        assert!(requested.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_downloads_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = jobs_for(&stats()[0], dir.path());
        let download = |url: &str, _: &Path| -> Result<()> {
            bail!(ErrorKind::NonSuccessStatus(500, url.to_string()))
        };

        assert_eq!(run_pool(&jobs, 2, Duration::from_millis(0), download), 0);
        assert!(!dir.path().join("2.png").exists());
    }

    #[test]
    fn localized_rows() {
        let mut axe = stats().remove(0);
        axe.extra.insert("pub_pick_trend".into(), serde_json::json!([1, 2]));
        localize(&mut axe);

        assert_eq!(axe.img.as_deref(), Some("/images/heroes/2_axe.png"));
        assert_eq!(axe.icon.as_deref(), Some("/images/heroes/icons/2_axe.png"));
        assert!(!axe.extra.contains_key("pub_pick_trend"));
        assert!(axe.extra.contains_key("base_armor"));
    }

    #[test]
    fn mapping_and_gaps() {
        let mapping = hero_mapping(&stats());

        assert_eq!(mapping[&26].file_name, "26_lion");
        assert_eq!(mapping[&26].attributes, "int");
        assert_eq!(missing_ids(&mapping).len(), 24);
        assert_eq!(find_hero(&mapping, "lion").unwrap().id, 26);
        assert_eq!(find_hero(&mapping, "Axe").unwrap().id, 2);
        assert!(find_hero(&mapping, "Nobody").is_err());
    }
}
