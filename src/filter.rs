use crate::player_stats::PlayerSeasonRow;

pub const MIN_POINTS_FLOOR: u32 = 0;
pub const MIN_POINTS_CEIL: u32 = 2000;
pub const DEFAULT_MIN_POINTS: u32 = 500;
pub const LEADERBOARD_SIZE: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TeamFilter {
    #[default]
    All,
    Team(String),
}

impl TeamFilter {
    pub fn from_option(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(team) if !team.is_empty() && !team.eq_ignore_ascii_case("all") => {
                TeamFilter::Team(team.to_string())
            }
            _ => TeamFilter::All,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TeamFilter::All => "All Teams",
            TeamFilter::Team(team) => team,
        }
    }

    /// Exact, case-sensitive match on the team code.
    pub fn matches(&self, team_abbreviation: &str) -> bool {
        match self {
            TeamFilter::All => true,
            TeamFilter::Team(team) => team == team_abbreviation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    minimum_points: u32,
    pub team: TeamFilter,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            minimum_points: DEFAULT_MIN_POINTS,
            team: TeamFilter::All,
        }
    }
}

impl FilterCriteria {
    pub fn new(minimum_points: u32, team: TeamFilter) -> Self {
        Self {
            minimum_points: minimum_points.clamp(MIN_POINTS_FLOOR, MIN_POINTS_CEIL),
            team,
        }
    }

    pub fn minimum_points(&self) -> u32 {
        self.minimum_points
    }

    pub fn set_minimum_points(&mut self, value: u32) {
        self.minimum_points = value.clamp(MIN_POINTS_FLOOR, MIN_POINTS_CEIL);
    }

    pub fn raise_minimum_points(&mut self, step: u32) {
        self.set_minimum_points(self.minimum_points.saturating_add(step));
    }

    pub fn lower_minimum_points(&mut self, step: u32) {
        self.set_minimum_points(self.minimum_points.saturating_sub(step));
    }

    pub fn accepts(&self, row: &PlayerSeasonRow) -> bool {
        row.points >= f64::from(self.minimum_points) && self.team.matches(&row.team_abbreviation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome<'a> {
    Rows(Vec<&'a PlayerSeasonRow>),
    NoMatch,
}

impl<'a> FilterOutcome<'a> {
    pub fn rows(&self) -> &[&'a PlayerSeasonRow] {
        match self {
            FilterOutcome::Rows(rows) => rows,
            FilterOutcome::NoMatch => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FilterOutcome::NoMatch)
    }
}

/// Rows passing both predicates, in dataset order.
pub fn filter_rows<'a>(rows: &'a [PlayerSeasonRow], criteria: &FilterCriteria) -> FilterOutcome<'a> {
    let kept = rows
        .iter()
        .filter(|row| criteria.accepts(row))
        .collect::<Vec<_>>();
    if kept.is_empty() {
        FilterOutcome::NoMatch
    } else {
        FilterOutcome::Rows(kept)
    }
}

/// Highest scorers first. `sort_by` is stable, so equal points keep
/// dataset order.
pub fn top_by_points<'a>(rows: &[&'a PlayerSeasonRow], limit: usize) -> Vec<&'a PlayerSeasonRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.points.total_cmp(&a.points));
    sorted.truncate(limit);
    sorted
}

/// Cycle `All -> first team -> ... -> last team -> All`.
pub fn next_team(current: &TeamFilter, teams: &[String]) -> TeamFilter {
    match current {
        TeamFilter::All => teams
            .first()
            .map(|t| TeamFilter::Team(t.clone()))
            .unwrap_or_default(),
        TeamFilter::Team(team) => match teams.iter().position(|t| t == team) {
            Some(pos) if pos + 1 < teams.len() => TeamFilter::Team(teams[pos + 1].clone()),
            _ => TeamFilter::All,
        },
    }
}

pub fn prev_team(current: &TeamFilter, teams: &[String]) -> TeamFilter {
    match current {
        TeamFilter::All => teams
            .last()
            .map(|t| TeamFilter::Team(t.clone()))
            .unwrap_or_default(),
        TeamFilter::Team(team) => match teams.iter().position(|t| t == team) {
            Some(0) | None => TeamFilter::All,
            Some(pos) => TeamFilter::Team(teams[pos - 1].clone()),
        },
    }
}
