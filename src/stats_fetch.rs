use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::anyhow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use thiserror::Error;

use crate::config::{AppConfig, SourceKind};
use crate::http_cache::{SeasonStore, fetch_season_rows};
use crate::http_client::http_client;
use crate::player_stats::{Dataset, PlayerSeasonRow, is_valid_season};

const NBA_STATS_URL: &str = "https://stats.nba.com/stats/leaguedashplayerstats";
const RESULT_SET_NAME: &str = "LeagueDashPlayerStats";

const NBA_STATS_HEADERS: &[(&str, &str)] = &[
    ("Referer", "https://www.nba.com/"),
    ("Origin", "https://www.nba.com"),
    ("x-nba-stats-origin", "stats"),
    ("x-nba-stats-token", "true"),
];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid season id {0:?} (expected e.g. 2025-26)")]
    InvalidSeason(String),
    #[error("request failed: {0:#}")]
    Http(anyhow::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid stats json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unexpected stats payload: {0}")]
    Schema(String),
    #[error("no player rows returned for {season}")]
    NoRows { season: String },
}

/// Anything that can produce a season of player rows.
pub trait DataSource {
    fn fetch_season(&self, season: &str) -> Result<Dataset, FetchError>;

    fn describe(&self) -> String;
}

pub fn source_from_config(config: &AppConfig) -> anyhow::Result<Box<dyn DataSource>> {
    match config.source {
        SourceKind::NbaStats => Ok(Box::new(NbaStatsSource::new(config.http_timeout_secs))),
        SourceKind::File => {
            let path = config
                .data_file
                .clone()
                .ok_or_else(|| anyhow!("file source selected but NBA_DATA_FILE is not set"))?;
            Ok(Box::new(FileSource::new(path)))
        }
        SourceKind::Demo => Ok(Box::new(DemoSource::new(config.demo_seed))),
    }
}

pub struct NbaStatsSource {
    timeout_secs: u64,
    store: Mutex<SeasonStore>,
}

impl NbaStatsSource {
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_store(timeout_secs, SeasonStore::in_user_cache())
    }

    pub fn with_store(timeout_secs: u64, store: SeasonStore) -> Self {
        Self {
            timeout_secs,
            store: Mutex::new(store),
        }
    }
}

impl DataSource for NbaStatsSource {
    fn fetch_season(&self, season: &str) -> Result<Dataset, FetchError> {
        if !is_valid_season(season) {
            return Err(FetchError::InvalidSeason(season.to_string()));
        }
        let client = http_client(self.timeout_secs).map_err(FetchError::Http)?;
        let url = league_dash_url(season);
        log::info!("fetching league player stats for {season}");
        let rows = fetch_season_rows(client, &url, season, NBA_STATS_HEADERS, &self.store)?;
        log::debug!("parsed {} player rows for {season}", rows.len());
        Ok(Dataset::new(season, rows))
    }

    fn describe(&self) -> String {
        "stats.nba.com".to_string()
    }
}

pub fn league_dash_url(season: &str) -> String {
    let params = [
        ("College", ""),
        ("Conference", ""),
        ("Country", ""),
        ("DateFrom", ""),
        ("DateTo", ""),
        ("Division", ""),
        ("DraftPick", ""),
        ("DraftYear", ""),
        ("GameScope", ""),
        ("GameSegment", ""),
        ("Height", ""),
        ("LastNGames", "0"),
        ("LeagueID", "00"),
        ("Location", ""),
        ("MeasureType", "Base"),
        ("Month", "0"),
        ("OpponentTeamID", "0"),
        ("Outcome", ""),
        ("PORound", "0"),
        ("PaceAdjust", "N"),
        ("PerMode", "Totals"),
        ("Period", "0"),
        ("PlayerExperience", ""),
        ("PlayerPosition", ""),
        ("PlusMinus", "N"),
        ("Rank", "N"),
        ("Season", season),
        ("SeasonSegment", ""),
        ("SeasonType", "Regular%20Season"),
        ("ShotClockRange", ""),
        ("StarterBench", ""),
        ("TeamID", "0"),
        ("TwoWay", "0"),
        ("VsConference", ""),
        ("VsDivision", ""),
        ("Weight", ""),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{NBA_STATS_URL}?{query}")
}

/// Reads a saved `leaguedashplayerstats` response from disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn fetch_season(&self, season: &str) -> Result<Dataset, FetchError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;
        let rows = parse_league_dash_json(&raw)?;
        Ok(Dataset::new(season, rows))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Parse the `resultSets` / `headers` / `rowSet` layout the stats endpoint
/// returns. Columns are looked up by header name.
pub fn parse_league_dash_json(raw: &str) -> Result<Vec<PlayerSeasonRow>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::Schema("empty response body".to_string()));
    }

    let root: Value = serde_json::from_str(trimmed)?;
    let set = pick_result_set(&root)
        .ok_or_else(|| FetchError::Schema("no resultSets in response".to_string()))?;

    let headers = set
        .get("headers")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Schema("result set has no headers".to_string()))?
        .iter()
        .map(|h| h.as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    let columns = ColumnIndex::from_headers(&headers)?;

    let row_set = set
        .get("rowSet")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Schema("result set has no rowSet".to_string()))?;

    let mut rows = Vec::with_capacity(row_set.len());
    for (idx, raw_row) in row_set.iter().enumerate() {
        let cells = raw_row
            .as_array()
            .ok_or_else(|| FetchError::Schema(format!("row {idx} is not an array")))?;
        rows.push(columns.build_row(cells));
    }
    if rows.is_empty() {
        return Err(FetchError::Schema("result set has no player rows".to_string()));
    }
    Ok(rows)
}

fn pick_result_set(root: &Value) -> Option<&Value> {
    match root.get("resultSets") {
        Some(Value::Array(sets)) => sets
            .iter()
            .find(|s| s.get("name").and_then(Value::as_str) == Some(RESULT_SET_NAME))
            .or_else(|| sets.first()),
        Some(set @ Value::Object(_)) => Some(set),
        _ => root.get("resultSet"),
    }
}

struct ColumnIndex {
    player_id: Option<usize>,
    player_name: usize,
    team: usize,
    games_played: Option<usize>,
    points: usize,
    rebounds: usize,
    assists: usize,
    steals: usize,
    blocks: usize,
    fg_pct: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Result<Self, FetchError> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let require = |name: &str| {
            find(name).ok_or_else(|| FetchError::Schema(format!("missing column {name}")))
        };
        Ok(Self {
            player_id: find("PLAYER_ID"),
            player_name: require("PLAYER_NAME")?,
            team: require("TEAM_ABBREVIATION")?,
            games_played: find("GP"),
            points: require("PTS")?,
            rebounds: require("REB")?,
            assists: require("AST")?,
            steals: require("STL")?,
            blocks: require("BLK")?,
            fg_pct: find("FG_PCT"),
        })
    }

    fn build_row(&self, cells: &[Value]) -> PlayerSeasonRow {
        let num = |idx: usize| cells.get(idx).and_then(value_as_f64).unwrap_or(0.0);
        let opt_num = |idx: Option<usize>| idx.map(num).unwrap_or(0.0);
        let text = |idx: usize| {
            cells
                .get(idx)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        PlayerSeasonRow {
            player_id: opt_num(self.player_id) as u32,
            player_name: text(self.player_name),
            team_abbreviation: text(self.team),
            games_played: opt_num(self.games_played) as u32,
            points: num(self.points),
            rebounds: num(self.rebounds),
            assists: num(self.assists),
            steals: num(self.steals),
            blocks: num(self.blocks),
            fg_pct: opt_num(self.fg_pct),
        }
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

const DEMO_TEAMS: [&str; 30] = [
    "ATL", "BOS", "BKN", "CHA", "CHI", "CLE", "DAL", "DEN", "DET", "GSW", "HOU", "IND", "LAC",
    "LAL", "MEM", "MIA", "MIL", "MIN", "NOP", "NYK", "OKC", "ORL", "PHI", "PHX", "POR", "SAC",
    "SAS", "TOR", "UTA", "WAS",
];
const DEMO_FIRST: [&str; 12] = [
    "Jalen", "Marcus", "Tyrese", "Devin", "Luka", "Anthony", "Jaylen", "Scottie", "Evan", "Cade",
    "Darius", "Miles",
];
const DEMO_LAST: [&str; 12] = [
    "Carter", "Brooks", "Hayes", "Mitchell", "Porter", "Reed", "Walker", "Barnes", "Coleman",
    "Grant", "Holmes", "Jordan",
];
const DEMO_ROSTER_SIZE: usize = 15;

/// Synthetic league for offline use. The same seed always yields the same
/// dataset.
pub struct DemoSource {
    seed: u64,
}

impl DemoSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl DataSource for DemoSource {
    fn fetch_season(&self, season: &str) -> Result<Dataset, FetchError> {
        if !is_valid_season(season) {
            return Err(FetchError::InvalidSeason(season.to_string()));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut rows = Vec::with_capacity(DEMO_TEAMS.len() * DEMO_ROSTER_SIZE);
        let mut next_id = 1_000u32;

        for team in DEMO_TEAMS {
            for slot in 0..DEMO_ROSTER_SIZE {
                next_id += 1;
                let first = DEMO_FIRST[rng.gen_range(0..DEMO_FIRST.len())];
                let last = DEMO_LAST[rng.gen_range(0..DEMO_LAST.len())];
                // Starters play more and score more.
                let usage = if slot < 5 {
                    rng.gen_range(0.6..1.0)
                } else {
                    rng.gen_range(0.05..0.6)
                };
                let big = rng.gen_bool(0.35);
                let games = rng.gen_range(20..=82u32);
                let gp = f64::from(games);
                let ppg = 3.0 + 27.0 * usage * rng.gen_range(0.7..1.1);
                let base_rpg = if big {
                    rng.gen_range(5.0..13.0)
                } else {
                    rng.gen_range(1.5..6.0)
                };
                let base_apg = if big {
                    rng.gen_range(0.8..4.0)
                } else {
                    rng.gen_range(2.0..9.0)
                };
                let rpg = base_rpg * (0.5 + usage);
                let apg = base_apg * (0.4 + usage);
                let spg = rng.gen_range(0.3..1.8) * (0.5 + usage);
                let bpg = if big {
                    rng.gen_range(0.8..2.8)
                } else {
                    rng.gen_range(0.05..0.7)
                };
                let fg_base: f64 = if big { 0.52 } else { 0.44 };
                rows.push(PlayerSeasonRow {
                    player_id: next_id,
                    player_name: format!("{first} {last}"),
                    team_abbreviation: team.to_string(),
                    games_played: games,
                    points: (ppg * gp).round(),
                    rebounds: (rpg * gp).round(),
                    assists: (apg * gp).round(),
                    steals: (spg * gp).round(),
                    blocks: (bpg * gp).round(),
                    fg_pct: (fg_base + rng.gen_range(-0.08..0.08)).clamp(0.0, 1.0),
                });
            }
        }
        Ok(Dataset::new(season, rows))
    }

    fn describe(&self) -> String {
        format!("demo league (seed {})", self.seed)
    }
}
