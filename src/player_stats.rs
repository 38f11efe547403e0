use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SEASON: &str = "2025-26";

/// One player's aggregated statistics for one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonRow {
    pub player_id: u32,
    pub player_name: String,
    pub team_abbreviation: String,
    pub games_played: u32,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub fg_pct: f64,
}

impl PlayerSeasonRow {
    pub fn stat(&self, column: StatColumn) -> f64 {
        match column {
            StatColumn::Points => self.points,
            StatColumn::Rebounds => self.rebounds,
            StatColumn::Assists => self.assists,
            StatColumn::Steals => self.steals,
            StatColumn::Blocks => self.blocks,
        }
    }
}

/// The five numeric columns the correlation heatmap is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatColumn {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
}

impl StatColumn {
    pub const ALL: [StatColumn; 5] = [
        StatColumn::Points,
        StatColumn::Rebounds,
        StatColumn::Assists,
        StatColumn::Steals,
        StatColumn::Blocks,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatColumn::Points => "PTS",
            StatColumn::Rebounds => "REB",
            StatColumn::Assists => "AST",
            StatColumn::Steals => "STL",
            StatColumn::Blocks => "BLK",
        }
    }

    pub fn index(self) -> usize {
        match self {
            StatColumn::Points => 0,
            StatColumn::Rebounds => 1,
            StatColumn::Assists => 2,
            StatColumn::Steals => 3,
            StatColumn::Blocks => 4,
        }
    }
}

/// A full season of rows as retrieved from a provider. Never mutated after
/// construction; views are derived by filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    season: String,
    rows: Vec<PlayerSeasonRow>,
    teams: Vec<String>,
}

impl Dataset {
    pub fn new(season: impl Into<String>, rows: Vec<PlayerSeasonRow>) -> Self {
        let teams = rows
            .iter()
            .map(|row| row.team_abbreviation.clone())
            .filter(|team| !team.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            season: season.into(),
            rows,
            teams,
        }
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn rows(&self) -> &[PlayerSeasonRow] {
        &self.rows
    }

    /// Sorted distinct team codes present in the dataset.
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Accepts `YYYY-YY` where the suffix is the following year, e.g. `2025-26`.
pub fn is_valid_season(raw: &str) -> bool {
    let Some((start, end)) = raw.split_once('-') else {
        return false;
    };
    if start.len() != 4 || end.len() != 2 {
        return false;
    }
    let (Ok(start), Ok(end)) = (start.parse::<u32>(), end.parse::<u32>()) else {
        return false;
    };
    (start + 1) % 100 == end
}
