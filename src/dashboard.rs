use crate::charts::{
    HISTOGRAM_BINS, HistogramBin, LeaderboardBar, ScatterSeries, fg_pct_histogram,
    leaderboard_bars, rebounds_assists_scatter,
};
use crate::correlation::{Correlation, correlation_matrix};
use crate::filter::{FilterCriteria, FilterOutcome, LEADERBOARD_SIZE, filter_rows, top_by_points};
use crate::player_stats::{Dataset, PlayerSeasonRow, StatColumn};

pub const OVERVIEW_COMMENTARY: &str = "The bar chart lists the scoring leaders for the current filters; the histogram shows how field-goal efficiency is spread across the remaining players.";
pub const CORRELATION_COMMENTARY: &str = "Strong positive correlations between box-score columns usually point to all-around player archetypes rather than specialists.";
pub const NO_MATCH_MESSAGE: &str = "No rows match current filters";

/// Everything the dashboard renders for one (dataset, criteria) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub criteria: FilterCriteria,
    pub season: String,
    pub total_rows: usize,
    pub matched_rows: usize,
    pub leaderboard: Vec<LeaderboardBar>,
    pub histogram: Vec<HistogramBin>,
    pub scatter: ScatterSeries,
    pub correlation: Correlation,
    pub averages: [f64; 5],
}

impl DashboardView {
    pub fn is_no_match(&self) -> bool {
        self.matched_rows == 0
    }

    pub fn average(&self, column: StatColumn) -> f64 {
        self.averages[column.index()]
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Season {} | {} of {} players | min PTS {} | team {}",
            self.season,
            self.matched_rows,
            self.total_rows,
            self.criteria.minimum_points(),
            self.criteria.team.label()
        )];
        if self.is_no_match() {
            lines.push(NO_MATCH_MESSAGE.to_string());
            return lines;
        }
        if let Some(leader) = self.leaderboard.first() {
            lines.push(format!(
                "Leader: {} ({}) {:.0} PTS",
                leader.player_name, leader.team_abbreviation, leader.points
            ));
        }
        lines.push(
            StatColumn::ALL
                .iter()
                .map(|c| format!("{} {:.1}", c.label(), self.average(*c)))
                .collect::<Vec<_>>()
                .join(" | "),
        );
        match &self.correlation {
            Correlation::Defined(m) => {
                let (a, b, r) = m.strongest_pair();
                lines.push(format!(
                    "Strongest link: {}/{} r={r:+.2}",
                    a.label(),
                    b.label()
                ));
            }
            Correlation::Undefined(reason) => lines.push(format!("Correlation: {reason}")),
        }
        lines
    }
}

pub fn compute_view(dataset: &Dataset, criteria: &FilterCriteria) -> DashboardView {
    let outcome = filter_rows(dataset.rows(), criteria);
    let rows = outcome.rows();
    let top = top_by_points(rows, LEADERBOARD_SIZE);

    DashboardView {
        criteria: criteria.clone(),
        season: dataset.season().to_string(),
        total_rows: dataset.len(),
        matched_rows: match &outcome {
            FilterOutcome::Rows(rows) => rows.len(),
            FilterOutcome::NoMatch => 0,
        },
        leaderboard: leaderboard_bars(&top),
        histogram: fg_pct_histogram(rows, HISTOGRAM_BINS),
        scatter: rebounds_assists_scatter(rows),
        correlation: correlation_matrix(rows),
        averages: column_averages(rows),
    }
}

fn column_averages(rows: &[&PlayerSeasonRow]) -> [f64; 5] {
    let mut out = [0.0; 5];
    if rows.is_empty() {
        return out;
    }
    for col in StatColumn::ALL {
        out[col.index()] = rows.iter().map(|r| r.stat(col)).sum::<f64>() / rows.len() as f64;
    }
    out
}
