use std::env;
use std::path::PathBuf;

use crate::filter::{DEFAULT_MIN_POINTS, FilterCriteria, TeamFilter};
use crate::player_stats::DEFAULT_SEASON;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MIN_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DEMO_SEED: u64 = 2026;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    NbaStats,
    File,
    Demo,
}

impl SourceKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "nba" | "live" | "stats" => Some(SourceKind::NbaStats),
            "file" | "json" => Some(SourceKind::File),
            "demo" | "fake" => Some(SourceKind::Demo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub season: String,
    pub source: SourceKind,
    pub data_file: Option<PathBuf>,
    pub min_points: u32,
    pub team: TeamFilter,
    pub http_timeout_secs: u64,
    pub demo_seed: u64,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            season: DEFAULT_SEASON.to_string(),
            source: SourceKind::NbaStats,
            data_file: None,
            min_points: DEFAULT_MIN_POINTS,
            team: TeamFilter::All,
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            demo_seed: DEFAULT_DEMO_SEED,
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// `.env.local` wins over `.env`; both lose to the real environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_file = non_empty("NBA_DATA_FILE").map(PathBuf::from);
        let source = non_empty("NBA_SOURCE")
            .and_then(|raw| SourceKind::parse(&raw))
            .unwrap_or(if data_file.is_some() {
                SourceKind::File
            } else {
                defaults.source
            });

        Self {
            season: non_empty("NBA_SEASON")
                .map(|s| s.trim().to_string())
                .unwrap_or(defaults.season),
            source,
            data_file,
            min_points: non_empty("NBA_MIN_POINTS")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(defaults.min_points),
            team: TeamFilter::from_option(lookup("NBA_TEAM").as_deref()),
            http_timeout_secs: non_empty("NBA_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(defaults.http_timeout_secs)
                .max(MIN_TIMEOUT_SECS),
            demo_seed: non_empty("NBA_DEMO_SEED")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(defaults.demo_seed),
            export_dir: non_empty("NBA_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
        }
    }

    pub fn initial_criteria(&self) -> FilterCriteria {
        FilterCriteria::new(self.min_points, self.team.clone())
    }
}
