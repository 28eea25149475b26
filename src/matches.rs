//! Pro match listing and per-match detail/draft files.
//!
//! Network access is passed in as closures so the paging and bookkeeping can
//! run against canned data.

use crate::error::*;
use crate::data_structs::*;
use crate::store;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use chrono::{DateTime, Local};
use serde_json::Value;
use log::{debug, error, info, warn};

/// Page size of `/proMatches`.
pub const BATCH_SIZE: usize = 100;
/// Consecutive empty pages after which the listing is considered exhausted.
const MAX_EMPTY_BATCHES: u32 = 2;

const MATCH_IDS_PREFIX: &str = "match_ids_";

#[derive(Debug, Clone, PartialEq)]
pub struct PagingOptions {
    pub max_matches: usize,
    /// Only matches starting at or after this unix time are kept.
    pub min_timestamp: Option<i64>,
    pub delay: Duration
}

impl Default for PagingOptions {
    fn default() -> Self {
        PagingOptions {
            max_matches: 500,
            min_timestamp: None,
            delay: Duration::from_secs(1)
        }
    }
}

/// Pages backwards through the pro match listing.
///
/// `fetch` gets the `less_than_match_id` cursor and returns one page. A
/// failed page counts as an empty one. Paging stops at `max_matches`, after
/// two empty pages in a row, or at the first page with nothing at or after
/// `min_timestamp`.
pub fn collect_pro_matches<F, S>(options: &PagingOptions, mut fetch: F, mut sleep: S) -> Vec<ProMatch>
    where F: FnMut(Option<u64>) -> Result<Vec<ProMatch>>,
          S: FnMut(Duration) {

    let mut matches: Vec<ProMatch> = vec![];
    let mut cursor = None;
    let mut empty_batches = 0;

    while matches.len() < options.max_matches {
        debug!("fetching batch (total so far: {})", matches.len());

        let batch = fetch(cursor).unwrap_or_else(|e| {
            warn!("batch before {:?} failed: {}", cursor, e);
            vec![]
        });

        if batch.is_empty() {
            empty_batches += 1;
            info!("No matches in this batch ({} in a row)", empty_batches);

            if empty_batches >= MAX_EMPTY_BATCHES {
                break;
            }

            sleep(options.delay * 3);
            continue;
        }
        empty_batches = 0;

        let batch: Vec<ProMatch> = match options.min_timestamp {
            Some(min) => batch.into_iter().filter(|m| m.start_time >= min).collect(),
            None => batch
        };

        let last = match batch.last() {
            Some(last) => last.match_id,
            None => {
                info!("Reached the timestamp boundary");
                break;
            }
        };

        cursor = Some(last);
        matches.extend(batch);
        info!("Collected {} matches", matches.len().min(options.max_matches));

        if matches.len() >= options.max_matches {
            break;
        }

        sleep(options.delay * 2);
    }

    matches.truncate(options.max_matches);
    matches
}

/// `YYYYmmdd_HHMMSS`, the suffix of every listing file.
pub fn file_stamp(now: &DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Writes `pro_matches_<stamp>.json` (unless `ids_only`) and
/// `match_ids_<stamp>.txt` into `dir`. Returns the id file.
pub fn save_listing<P: AsRef<Path>>(dir: P, matches: &[ProMatch], ids_only: bool, stamp: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    if !ids_only {
        let path = dir.join(format!("pro_matches_{}.json", stamp));
        store::save(&path, matches)?;
        info!("Saved {} matches to {}", matches.len(), path.display());
    }

    let ids_path = dir.join(format!("{}{}.txt", MATCH_IDS_PREFIX, stamp));
    let ids: String = matches.iter().map(|m| format!("{}\n", m.match_id)).collect();
    fs::write(&ids_path, ids)?;
    info!("Saved {} match ids to {}", matches.len(), ids_path.display());

    Ok(ids_path)
}

/// Match ids, one per line. Blank lines are skipped; lines that are not ids
/// are logged and skipped.
pub fn read_match_ids<P: AsRef<Path>>(path: P) -> Result<Vec<u64>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).chain_err(|| format!("could not read {}", path.display()))?;

    Ok(contents.lines()
               .map(str::trim)
               .filter(|l| !l.is_empty())
               .filter_map(|l| match l.parse() {
                   Ok(id) => Some(id),
                   Err(_) => {
                       warn!("ignoring '{}' in {}", l, path.display());
                       None
                   }
               })
               .collect())
}

/// The most recently modified `match_ids_*.txt` in `dir`.
pub fn latest_match_ids_file<P: AsRef<Path>>(dir: P) -> Result<Option<PathBuf>> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Ok(None);
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if !(name.starts_with(MATCH_IDS_PREFIX) && name.ends_with(".txt")) {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
            newest = Some((modified, entry.path()));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

/// The draft of a match payload, or `None` when it has no `picks_bans`.
///
/// Every list keeps the payload's order; `order` is carried but not sorted on.
pub fn extract_draft(details: &Value) -> Option<Draft> {
    let details: MatchDetails = match serde_json::from_value(details.clone()) {
        Ok(details) => details,
        Err(e) => {
            debug!("match payload not readable as details: {}", e);
            return None;
        }
    };
    let picks_bans = details.picks_bans?;

    let mut draft = Draft {
        match_id: details.match_id,
        radiant_win: details.radiant_win,
        start_time: details.start_time,
        duration: details.duration,
        radiant_picks: vec![],
        dire_picks: vec![],
        radiant_bans: vec![],
        dire_bans: vec![],
        draft_sequence: Vec::with_capacity(picks_bans.len())
    };

    for pb in &picks_bans {
        let side = Side::from_team(pb.team);
        let entry = DraftEntry { hero_id: pb.hero_id, order: pb.order };

        match (side, pb.is_pick) {
            (Side::Radiant, true) => draft.radiant_picks.push(entry),
            (Side::Dire, true) => draft.dire_picks.push(entry),
            (Side::Radiant, false) => draft.radiant_bans.push(entry),
            (Side::Dire, false) => draft.dire_bans.push(entry)
        }

        draft.draft_sequence.push(DraftStep {
            team: side,
            action: if pb.is_pick { DraftAction::Pick } else { DraftAction::Ban },
            hero_id: pb.hero_id,
            order: pb.order
        });
    }

    Some(draft)
}

/// Outcome of a detail run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub successful: usize,
    pub failed: usize,
    pub total: usize
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} successful, {} failed, {} total", self.successful, self.failed, self.total)
    }
}

/// The `details/` and `drafts/` directories under a matches directory.
pub struct MatchStore {
    base: PathBuf
}

impl MatchStore {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        MatchStore {
            base: base.into()
        }
    }

    #[inline]
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn details_path(&self, match_id: u64) -> PathBuf {
        self.base.join("details").join(format!("match_{}.json", match_id))
    }

    pub fn draft_path(&self, match_id: u64) -> PathBuf {
        self.base.join("drafts").join(format!("draft_{}.json", match_id))
    }

    /// Existing `(details, drafts)` file counts.
    pub fn counts(&self) -> (usize, usize) {
        let count = |dir: &str, prefix: &str| -> usize {
            fs::read_dir(self.base.join(dir))
                .map(|entries| entries.filter_map(|e| e.ok())
                                      .filter(|e| {
                                          let name = e.file_name();
                                          let name = name.to_string_lossy();
                                          name.starts_with(prefix) && name.ends_with(".json")
                                      })
                                      .count())
                .unwrap_or(0)
        };

        (count("details", "match_"), count("drafts", "draft_"))
    }

    /// Saves the raw payload and, when present, its draft. `Ok(false)` when
    /// the payload has no draft.
    pub fn save_match(&self, match_id: u64, details: &Value) -> Result<bool> {
        store::save(self.details_path(match_id), details)?;

        match extract_draft(details) {
            Some(draft) => {
                store::save(self.draft_path(match_id), &draft)?;
                Ok(true)
            },
            None => {
                warn!("No draft information for match {}", match_id);
                Ok(false)
            }
        }
    }

    /// Fetches and saves every id in turn, sleeping `delay` after each fetch.
    /// A failed fetch or a match without a draft counts as failed.
    pub fn process<F, S>(&self, ids: &[u64], delay: Duration, mut fetch: F, mut sleep: S) -> Summary
        where F: FnMut(u64) -> Result<Value>,
              S: FnMut(Duration) {

        let mut summary = Summary { total: ids.len(), ..Summary::default() };

        for (i, &id) in ids.iter().enumerate() {
            info!("Processing match {}/{} (ID: {})", i + 1, ids.len(), id);

            let outcome = fetch(id).and_then(|details| {
                sleep(delay);
                self.save_match(id, &details)
            });

            match outcome {
                Ok(true) => summary.successful += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    error!("match {} failed: {}", id, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;

    const DETAILS: &str = include_str!("../test_data/match_details.json");

    fn pro_match(match_id: u64, start_time: i64) -> ProMatch {
        ProMatch {
            match_id,
            start_time,
            extra: Default::default()
        }
    }

    /// Pages of `size` descending ids below the cursor, down to id 1.
    fn listing(size: u64) -> impl FnMut(Option<u64>) -> Result<Vec<ProMatch>> {
        move |cursor| {
            let top = cursor.unwrap_or(1001);
            Ok((top.saturating_sub(size)..top).rev()
                                              .filter(|&id| id > 0)
                                              .map(|id| pro_match(id, id as i64 * 10))
                                              .collect())
        }
    }

    #[test]
    fn pages_until_max() {
        let sleeps = RefCell::new(vec![]);
        let options = PagingOptions { max_matches: 250, ..PagingOptions::default() };
        let matches = collect_pro_matches(&options, listing(100), |d| sleeps.borrow_mut().push(d));

        assert_eq!(matches.len(), 250);
        assert_eq!(matches[0].match_id, 1000);
        assert_eq!(matches[249].match_id, 751);
        assert_eq!(*sleeps.borrow(), vec![Duration::from_secs(2); 2]);
    }

    #[test]
    fn stops_after_two_empty_batches() {
        let calls = RefCell::new(0);
        let sleeps = RefCell::new(vec![]);
        let fetch = |_: Option<u64>| -> Result<Vec<ProMatch>> {
            *calls.borrow_mut() += 1;
            Ok(vec![])
        };
        let matches = collect_pro_matches(&PagingOptions::default(), fetch, |d| sleeps.borrow_mut().push(d));

        assert!(matches.is_empty());
        assert_eq!(*calls.borrow(), 2);
        assert_eq!(*sleeps.borrow(), vec![Duration::from_secs(3)]);
    }

    #[test]
    fn failed_batch_counts_as_empty() {
        let mut first = true;
        let fetch = |cursor: Option<u64>| -> Result<Vec<ProMatch>> {
            if first {
                first = false;
                bail!(ErrorKind::NonSuccessStatus(503, "proMatches".into()));
            }
            listing(100)(cursor)
        };
        let options = PagingOptions { max_matches: 100, ..PagingOptions::default() };

        assert_eq!(collect_pro_matches(&options, fetch, |_| {}).len(), 100);
    }

    #[test]
    fn stops_at_timestamp_boundary() {
        // ids 1000..=901 start at 10000..=9010; only ids >= 950 pass
        let options = PagingOptions {
            min_timestamp: Some(9500),
            ..PagingOptions::default()
        };
        let matches = collect_pro_matches(&options, listing(100), |_| {});

        assert_eq!(matches.len(), 51);
        assert!(matches.iter().all(|m| m.start_time >= 9500));
    }

    #[test]
    fn listing_files() {
        let dir = tempfile::tempdir().unwrap();
        let matches = vec![pro_match(12, 0), pro_match(11, 0)];

        let ids_file = save_listing(dir.path(), &matches, false, "20250101_120000").unwrap();

        assert_eq!(ids_file, dir.path().join("match_ids_20250101_120000.txt"));
        assert!(dir.path().join("pro_matches_20250101_120000.json").exists());
        assert_eq!(read_match_ids(&ids_file).unwrap(), vec![12, 11]);
        assert_eq!(latest_match_ids_file(dir.path()).unwrap(), Some(ids_file));

        let ids_only = tempfile::tempdir().unwrap();
        save_listing(ids_only.path(), &matches, true, "20250101_120000").unwrap();
        assert!(!ids_only.path().join("pro_matches_20250101_120000.json").exists());
    }

    #[test]
    fn match_ids_skip_junk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match_ids_x.txt");
        fs::write(&path, "1\n\n  2 \nnot-an-id\n3\n").unwrap();

        assert_eq!(read_match_ids(&path).unwrap(), vec![1, 2, 3]);
        assert_eq!(latest_match_ids_file(dir.path().join("missing")).unwrap(), None);
    }

    #[test]
    fn draft_from_payload() {
        let details: Value = serde_json::from_str(DETAILS).unwrap();
        let draft = extract_draft(&details).unwrap();

        assert_eq!(draft.match_id, 7890123456);
        assert_eq!(draft.radiant_win, Some(true));
        assert_eq!(draft.radiant_bans, vec![DraftEntry { hero_id: 14, order: 0 }]);
        assert_eq!(draft.radiant_picks, vec![DraftEntry { hero_id: 26, order: 3 }]);
        assert_eq!(draft.dire_picks.len(), 2);
        assert_eq!(draft.draft_sequence.iter().map(|s| s.order).collect::<Vec<_>>(), vec![0, 1, 3, 2, 4]);
        assert_eq!(draft.draft_sequence[2].team, Side::Radiant);
        assert_eq!(draft.draft_sequence[2].action, DraftAction::Pick);
        assert_eq!(draft.draft_sequence[3].team, Side::Dire);
    }

    #[test]
    fn no_picks_bans_no_draft() {
        let details = serde_json::json!({ "match_id": 5, "radiant_win": false });

        assert!(extract_draft(&details).is_none());
    }

    #[test]
    fn process_counts_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let match_store = MatchStore::new(dir.path());
        let with_draft: Value = serde_json::from_str(DETAILS).unwrap();

        let fetch = |id: u64| -> Result<Value> {
            match id {
                1 => Ok(with_draft.clone()),
                2 => Ok(serde_json::json!({ "match_id": 2 })),
                _ => bail!(ErrorKind::NonSuccessStatus(404, format!("matches/{}", id)))
            }
        };
        let summary = match_store.process(&[1, 2, 3], Duration::from_secs(1), fetch, |_| {});

        assert_eq!(summary, Summary { successful: 1, failed: 2, total: 3 });
        assert!(match_store.details_path(1).exists());
        assert!(match_store.draft_path(1).exists());
        assert!(match_store.details_path(2).exists());
        assert!(!match_store.draft_path(2).exists());
        assert_eq!(match_store.counts(), (2, 1));
    }
}
