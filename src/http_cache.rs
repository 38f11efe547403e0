use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{
    ETAG, HeaderMap, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use serde::{Deserialize, Serialize};

use crate::player_stats::PlayerSeasonRow;
use crate::stats_fetch::{FetchError, parse_league_dash_json};

const STORE_VERSION: u32 = 2;
const CACHE_DIR: &str = "nba_terminal";
const STORE_FILE: &str = "season_stats.json";

/// Revalidation headers the stats server sent with a season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl Validators {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            etag: read(ETAG),
            last_modified: read(LAST_MODIFIED),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// Parsed rows for one season plus the validators to revalidate them with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSeason {
    pub validators: Validators,
    pub rows: Vec<PlayerSeasonRow>,
    pub fetched_at: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    seasons: BTreeMap<String, StoredSeason>,
}

/// Season-keyed store persisted as one json file. Without a path it only
/// lives in memory.
pub struct SeasonStore {
    path: Option<PathBuf>,
    file: StoreFile,
}

impl SeasonStore {
    pub fn open(path: Option<PathBuf>) -> Self {
        let file = path
            .as_ref()
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|raw| serde_json::from_str::<StoreFile>(&raw).ok())
            .filter(|f| f.version == STORE_VERSION)
            .unwrap_or_default();
        Self { path, file }
    }

    /// Store under `$XDG_CACHE_HOME/nba_terminal` or `~/.cache/nba_terminal`.
    pub fn in_user_cache() -> Self {
        Self::open(user_cache_dir().map(|dir| dir.join(STORE_FILE)))
    }

    pub fn get(&self, season: &str) -> Option<&StoredSeason> {
        self.file.seasons.get(season)
    }

    pub fn len(&self) -> usize {
        self.file.seasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.seasons.is_empty()
    }

    pub fn put(&mut self, season: &str, entry: StoredSeason) {
        self.file.version = STORE_VERSION;
        self.file.seasons.insert(season.to_string(), entry);
        if let Err(err) = self.save() {
            log::warn!("season store not saved: {err:#}");
        }
    }

    fn save(&self) -> anyhow::Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("create cache dir")?;
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(&self.file).context("serialize season store")?;
        fs::write(&tmp, json).context("write season store")?;
        fs::rename(&tmp, path).context("swap season store")?;
        Ok(())
    }
}

/// Rows served for one response, plus the entry to store when the server
/// gave us something to revalidate with.
#[derive(Debug)]
pub struct Resolved {
    pub rows: Vec<PlayerSeasonRow>,
    pub to_store: Option<StoredSeason>,
}

/// A 304 serves the stored rows. A success is parsed; it is only worth
/// storing when it carries an ETag or Last-Modified.
pub fn resolve_response(
    status: StatusCode,
    validators: Validators,
    body: &str,
    stored: Option<&StoredSeason>,
) -> Result<Resolved, FetchError> {
    if status == StatusCode::NOT_MODIFIED {
        let entry = stored
            .ok_or_else(|| FetchError::Http(anyhow!("received 304 without a stored season")))?;
        return Ok(Resolved {
            rows: entry.rows.clone(),
            to_store: None,
        });
    }
    if !status.is_success() {
        return Err(FetchError::Http(anyhow!(
            "http {}: {}",
            status,
            truncate(body, 200)
        )));
    }

    let rows = parse_league_dash_json(body)?;
    let to_store = (!validators.is_empty()).then(|| StoredSeason {
        validators,
        rows: rows.clone(),
        fetched_at: unix_now(),
    });
    Ok(Resolved { rows, to_store })
}

/// GET one season's stats, revalidating against `store`.
pub fn fetch_season_rows(
    client: &Client,
    url: &str,
    season: &str,
    extra_headers: &[(&str, &str)],
    store: &Mutex<SeasonStore>,
) -> Result<Vec<PlayerSeasonRow>, FetchError> {
    let stored = store
        .lock()
        .map_err(|_| FetchError::Http(anyhow!("season store lock poisoned")))?
        .get(season)
        .cloned();

    let mut req = client.get(url);
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }
    if let Some(entry) = stored.as_ref() {
        if let Some(etag) = entry.validators.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.validators.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req
        .send()
        .map_err(|err| FetchError::Http(anyhow::Error::new(err).context("request failed")))?;
    let status = resp.status();
    let validators = Validators::from_headers(resp.headers());
    let body = resp
        .text()
        .map_err(|err| FetchError::Http(anyhow::Error::new(err).context("failed reading body")))?;

    let resolved = resolve_response(status, validators, &body, stored.as_ref())?;
    if status == StatusCode::NOT_MODIFIED {
        log::debug!("season {season} not modified, serving stored rows");
    }
    if let Some(entry) = resolved.to_store {
        match store.lock() {
            Ok(mut guard) => guard.put(season, entry),
            Err(_) => log::warn!("season store lock poisoned; {season} not stored"),
        }
    }
    Ok(resolved.rows)
}

fn user_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn truncate(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}
