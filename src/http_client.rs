//! A quick, built-in way to fetch pages and API responses from the live sites.
//!
//! This module can be disabled by building this crate without default features.

use crate::error::*;
use crate::config::HttpConfig;
use crate::data_structs::{HeroStat, PatchEntry, ProMatch};
use crate::scrapers::hero_page::HeroPageScraper;
use reqwest::blocking::{Client, Response};
use backon::{BlockingRetryable, ExponentialBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use log::{debug, info, warn};

/// Blocking HTTP client with retry on rate limiting and server errors.
pub struct Downloader {
    client: Client,
    backoff: ExponentialBuilder
}

fn backoff_for(config: &HttpConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(config.min_backoff_ms))
        .with_max_delay(Duration::from_millis(config.max_backoff_ms))
        .with_max_times(config.retries)
        .with_jitter()
}

impl Downloader {
    /// A client using the default `[http]` settings.
    #[inline]
    pub fn new() -> Result<Self> {
        Self::from_config(&HttpConfig::default())
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            backoff: backoff_for(config)
        })
    }

    /// Provide your own client for use by this struct.
    ///
    /// This means you can configure the client as you wish while still doing
    /// less work than re-implementing the functionality provided by this struct.
    #[inline]
    pub fn with_client(client: Client, config: &HttpConfig) -> Self {
        Self {
            client,
            backoff: backoff_for(config)
        }
    }

    /// One attempt, failing on any non-success status.
    fn send_once(&self, url: &str) -> Result<Response> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();

        if !status.is_success() {
            bail!(ErrorKind::NonSuccessStatus(status.as_u16(), url.to_string()));
        }

        Ok(resp)
    }

    /// Runs `attempt` with backoff while it fails with a retryable error.
    fn with_retry<T, F>(&self, url: &str, attempt: F) -> Result<T>
        where F: FnMut() -> Result<T> {

        attempt.retry(self.backoff.clone())
               .sleep(std::thread::sleep)
               .when(|e: &Error| e.is_retryable())
               .notify(|e: &Error, delay: Duration| {
                   warn!("{} failed ({}), retrying in {:.1}s", url, e, delay.as_secs_f64());
               })
               .call()
    }

    /// Gets the body of the given URL as text.
    pub fn get_string(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        self.with_retry(url, || Ok(self.send_once(url)?.text()?))
    }

    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_string(url)?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);

        self.with_retry(url, || Ok(self.send_once(url)?.bytes()?.to_vec()))
    }

    /// Saves the body of `url` to `path`. Nothing is written on failure.
    pub fn download_to<P: AsRef<Path>>(&self, url: &str, path: P) -> Result<()> {
        let bytes = self.get_bytes(url)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Fetches a hero's wiki page, trying each URL spelling of the name until
    /// one answers with a page that lists abilities.
    pub fn hero_page(&self, base: &str, localized_name: &str) -> Result<HeroPageScraper> {
        for candidate in liquipedia_candidates(localized_name) {
            let url = format!("{}/{}", base.trim_end_matches('/'), candidate);

            match self.get_string(&url) {
                Ok(html) => {
                    let scraper = HeroPageScraper::from(html);

                    if scraper.has_abilities() {
                        info!("Fetched {}", url);
                        return Ok(scraper);
                    }

                    debug!("{} has no abilities section", url);
                },
                Err(e) => debug!("{} failed: {}", url, e)
            }
        }

        bail!(ErrorKind::NoHeroPage(localized_name.to_string()))
    }
}

/// URL path spellings to try for a hero, most likely first.
pub fn liquipedia_candidates(localized_name: &str) -> Vec<String> {
    let name = localized_name.trim();
    let mut candidates = vec![
        name.replace(' ', "_"),
        name.replace(' ', "-"),
        name.replace(' ', "")
    ];

    let special: &[&str] = match name {
        "Anti-Mage" => &["Anti-Mage", "Anti_Mage", "AntiMage"],
        "Queen of Pain" => &["Queen_of_Pain", "QueenOfPain"],
        "Nature's Prophet" => &["Nature's_Prophet", "Natures_Prophet", "NaturesProphet"],
        _ => &[]
    };
    candidates.extend(special.iter().map(|s| s.to_string()));

    let mut seen = Vec::with_capacity(candidates.len());
    candidates.retain(|c| {
        if seen.contains(c) {
            false
        } else {
            seen.push(c.clone());
            true
        }
    });

    candidates
}

/// The OpenDota REST endpoints the pipeline reads.
pub struct OpenDota<'a> {
    dl: &'a Downloader,
    base: String
}

impl<'a> OpenDota<'a> {
    pub fn new<S: Into<String>>(dl: &'a Downloader, base: S) -> Self {
        OpenDota {
            dl,
            base: base.into().trim_end_matches('/').to_string()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hero_stats(&self) -> Result<Vec<HeroStat>> {
        self.dl.get_json(&self.url("/heroStats"))
    }

    /// One page of pro matches, newest first, older than `less_than_match_id`
    /// when given.
    pub fn pro_matches(&self, limit: usize, less_than_match_id: Option<u64>) -> Result<Vec<ProMatch>> {
        let mut url = format!("{}?limit={}", self.url("/proMatches"), limit);

        if let Some(id) = less_than_match_id {
            url.push_str(&format!("&less_than_match_id={}", id));
        }

        self.dl.get_json(&url)
    }

    /// The raw match payload, kept as-is for `match_<id>.json`.
    pub fn match_details(&self, match_id: u64) -> Result<Value> {
        self.dl.get_json(&self.url(&format!("/matches/{}", match_id)))
    }

    pub fn patches(&self) -> Result<Vec<PatchEntry>> {
        self.dl.get_json(&self.url("/constants/patch"))
    }

    pub fn abilities(&self) -> Result<Value> {
        self.dl.get_json(&self.url("/constants/abilities"))
    }

    pub fn heroes(&self) -> Result<Value> {
        self.dl.get_json(&self.url("/constants/heroes"))
    }

    /// Ability keys per hero, for payloads of `heroes` that lack them.
    pub fn hero_abilities(&self) -> Result<Value> {
        self.dl.get_json(&self.url("/constants/hero_abilities"))
    }
}
