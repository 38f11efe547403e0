use crate::player_stats::PlayerSeasonRow;

pub const HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardBar {
    pub player_name: String,
    pub team_abbreviation: String,
    pub points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeTier {
    Low,
    Mid,
    High,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterSeries {
    pub low: Vec<(f64, f64)>,
    pub mid: Vec<(f64, f64)>,
    pub high: Vec<(f64, f64)>,
    pub max_rebounds: f64,
    pub max_assists: f64,
}

impl ScatterSeries {
    pub fn len(&self) -> usize {
        self.low.len() + self.mid.len() + self.high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn leaderboard_bars(rows: &[&PlayerSeasonRow]) -> Vec<LeaderboardBar> {
    rows.iter()
        .map(|row| LeaderboardBar {
            player_name: row.player_name.clone(),
            team_abbreviation: row.team_abbreviation.clone(),
            points: row.points,
        })
        .collect()
}

/// Equal-width bins over the observed field-goal percentage range.
/// All-equal inputs collapse into one bin.
pub fn fg_pct_histogram(rows: &[&PlayerSeasonRow], bins: usize) -> Vec<HistogramBin> {
    let values = rows
        .iter()
        .map(|row| row.fg_pct)
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>();
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect::<Vec<_>>();
    for v in values {
        // The top edge belongs to the last bin.
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Terminal markers have no size, so points are bucketed into thirds of the
/// filtered maximum instead.
pub fn size_tier(points: f64, max_points: f64) -> SizeTier {
    if max_points <= 0.0 {
        return SizeTier::Low;
    }
    let ratio = points / max_points;
    if ratio >= 2.0 / 3.0 {
        SizeTier::High
    } else if ratio >= 1.0 / 3.0 {
        SizeTier::Mid
    } else {
        SizeTier::Low
    }
}

pub fn rebounds_assists_scatter(rows: &[&PlayerSeasonRow]) -> ScatterSeries {
    let max_points = rows.iter().map(|r| r.points).fold(0.0, f64::max);
    let mut series = ScatterSeries::default();
    for row in rows {
        let point = (row.rebounds, row.assists);
        series.max_rebounds = series.max_rebounds.max(row.rebounds);
        series.max_assists = series.max_assists.max(row.assists);
        match size_tier(row.points, max_points) {
            SizeTier::Low => series.low.push(point),
            SizeTier::Mid => series.mid.push(point),
            SizeTier::High => series.high.push(point),
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::{SizeTier, fg_pct_histogram, rebounds_assists_scatter, size_tier};
    use crate::player_stats::PlayerSeasonRow;

    fn row(points: f64, fg_pct: f64) -> PlayerSeasonRow {
        PlayerSeasonRow {
            player_id: 0,
            player_name: "P".to_string(),
            team_abbreviation: "TST".to_string(),
            games_played: 1,
            points,
            rebounds: points / 4.0,
            assists: points / 8.0,
            steals: 1.0,
            blocks: 1.0,
            fg_pct,
        }
    }

    #[test]
    fn histogram_counts_every_row_once() {
        let rows = (0..50)
            .map(|i| row(100.0, 0.30 + i as f64 * 0.005))
            .collect::<Vec<_>>();
        let refs = rows.iter().collect::<Vec<_>>();
        let bins = fg_pct_histogram(&refs, 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 50);
        assert!(bins[19].count >= 1);
        assert!((bins[0].lower - 0.30).abs() < 1e-12);
    }

    #[test]
    fn histogram_degenerate_inputs() {
        assert!(fg_pct_histogram(&[], 20).is_empty());
        let rows = vec![row(1.0, 0.5), row(2.0, 0.5)];
        let refs = rows.iter().collect::<Vec<_>>();
        let bins = fg_pct_histogram(&refs, 20);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
    }

    #[test]
    fn scatter_tiers_by_points() {
        assert_eq!(size_tier(900.0, 900.0), SizeTier::High);
        assert_eq!(size_tier(400.0, 900.0), SizeTier::Mid);
        assert_eq!(size_tier(10.0, 900.0), SizeTier::Low);
        assert_eq!(size_tier(10.0, 0.0), SizeTier::Low);

        let rows = vec![row(900.0, 0.5), row(400.0, 0.4), row(10.0, 0.3)];
        let refs = rows.iter().collect::<Vec<_>>();
        let s = rebounds_assists_scatter(&refs);
        assert_eq!((s.low.len(), s.mid.len(), s.high.len()), (1, 1, 1));
        assert_eq!(s.max_rebounds, 225.0);
    }
}
