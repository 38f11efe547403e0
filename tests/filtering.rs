use nba_terminal::correlation::{Correlation, UndefinedReason, correlation_matrix};
use nba_terminal::dashboard::compute_view;
use nba_terminal::filter::{
    FilterCriteria, FilterOutcome, LEADERBOARD_SIZE, TeamFilter, filter_rows, top_by_points,
};
use nba_terminal::player_stats::{Dataset, PlayerSeasonRow, StatColumn};
use nba_terminal::stats_fetch::{DataSource, DemoSource};

const POINTS: [f64; 20] = [
    100.0, 250.0, 400.0, 480.0, 499.0, 500.0, 501.0, 650.0, 800.0, 950.0, 1100.0, 1250.0, 1400.0,
    1600.0, 1800.0, 2000.0, 2100.0, 2250.0, 2400.0, 2500.0,
];
const TEAMS: [&str; 4] = ["BOS", "LAL", "NYK", "MIA"];

fn synthetic_rows() -> Vec<PlayerSeasonRow> {
    POINTS
        .iter()
        .enumerate()
        .map(|(i, pts)| PlayerSeasonRow {
            player_id: i as u32 + 1,
            player_name: format!("Player {:02}", i + 1),
            team_abbreviation: TEAMS[i % TEAMS.len()].to_string(),
            games_played: 60,
            points: *pts,
            rebounds: pts / 4.0 + ((i * 37) % 11) as f64 * 10.0,
            assists: pts / 6.0 + ((i * 13) % 7) as f64 * 15.0,
            steals: 20.0 + ((i * 7) % 5) as f64 * 9.0,
            blocks: 5.0 + ((i * 11) % 9) as f64 * 6.0,
            fg_pct: 0.40 + (i as f64) * 0.005,
        })
        .collect()
}

fn names(rows: &[&PlayerSeasonRow]) -> Vec<String> {
    rows.iter().map(|r| r.player_name.clone()).collect()
}

#[test]
fn min_points_500_keeps_exactly_the_hand_computed_rows() {
    let rows = synthetic_rows();
    let criteria = FilterCriteria::new(500, TeamFilter::All);
    let outcome = filter_rows(&rows, &criteria);

    let expected = (6..=20).map(|n| format!("Player {n:02}")).collect::<Vec<_>>();
    assert_eq!(outcome.len(), 15);
    assert_eq!(names(outcome.rows()), expected);
}

#[test]
fn team_and_points_predicates_intersect() {
    let rows = synthetic_rows();
    let criteria = FilterCriteria::new(1000, TeamFilter::Team("BOS".to_string()));
    let outcome = filter_rows(&rows, &criteria);
    // BOS holds indices 0, 4, 8, 12, 16 -> points 100, 499, 800, 1400, 2100.
    assert_eq!(names(outcome.rows()), vec!["Player 13", "Player 17"]);
    assert!(
        outcome
            .rows()
            .iter()
            .all(|r| r.team_abbreviation == "BOS" && r.points >= 1000.0)
    );
}

#[test]
fn absent_team_reports_no_match_not_error() {
    let rows = synthetic_rows();
    let criteria = FilterCriteria::new(2000, TeamFilter::Team("ZZZ".to_string()));
    let outcome = filter_rows(&rows, &criteria);
    assert_eq!(outcome, FilterOutcome::NoMatch);
    assert!(outcome.is_empty());

    let dataset = Dataset::new("2025-26", rows);
    let view = compute_view(&dataset, &criteria);
    assert!(view.is_no_match());
    assert!(view.leaderboard.is_empty());
    assert!(view.histogram.is_empty());
    assert_eq!(
        view.correlation,
        Correlation::Undefined(UndefinedReason::TooFewRows { rows: 0 })
    );
    assert!(
        view.summary_lines()
            .iter()
            .any(|line| line == "No rows match current filters")
    );
}

#[test]
fn single_row_correlation_is_insufficient_data() {
    let rows = synthetic_rows();
    let criteria = FilterCriteria::new(2000, TeamFilter::Team("NYK".to_string()));
    let outcome = filter_rows(&rows, &criteria);
    assert_eq!(outcome.len(), 1);
    assert_eq!(
        correlation_matrix(outcome.rows()),
        Correlation::Undefined(UndefinedReason::TooFewRows { rows: 1 })
    );
}

#[test]
fn top_fifteen_of_ten_rows_returns_all_descending() {
    let rows = synthetic_rows();
    let ten = rows.iter().take(10).collect::<Vec<_>>();
    let top = top_by_points(&ten, LEADERBOARD_SIZE);
    assert_eq!(top.len(), 10);
    assert!(top.windows(2).all(|w| w[0].points >= w[1].points));
    assert_eq!(top[0].points, 950.0);
    assert_eq!(top[9].points, 100.0);
}

#[test]
fn leaderboard_ties_keep_dataset_order() {
    let mut rows = synthetic_rows();
    rows[3].points = 2500.0;
    rows[7].points = 2500.0;
    let refs = rows.iter().collect::<Vec<_>>();
    let top = top_by_points(&refs, 3);
    assert_eq!(names(&top), vec!["Player 04", "Player 08", "Player 20"]);
}

#[test]
fn filtered_set_is_subset_idempotent_and_monotone() {
    let dataset = DemoSource::new(42)
        .fetch_season("2025-26")
        .expect("demo data");
    let mut team_options = vec![TeamFilter::All, TeamFilter::Team("ZZZ".to_string())];
    team_options.extend(dataset.teams().iter().take(5).cloned().map(TeamFilter::Team));

    for team in team_options {
        let mut previous = usize::MAX;
        for min_points in (0..=2000).step_by(100) {
            let criteria = FilterCriteria::new(min_points, team.clone());
            let outcome = filter_rows(dataset.rows(), &criteria);

            assert!(outcome.len() <= dataset.len());
            assert!(outcome.rows().iter().all(|r| dataset.rows().contains(r)));
            assert!(outcome.len() <= previous, "raising min points grew the set");
            previous = outcome.len();

            let owned = outcome.rows().iter().map(|r| (*r).clone()).collect::<Vec<_>>();
            let again = filter_rows(&owned, &criteria);
            assert_eq!(names(again.rows()), names(outcome.rows()));
            assert_eq!(filter_rows(dataset.rows(), &criteria), outcome);
        }
    }
}

#[test]
fn correlation_is_symmetric_with_unit_diagonal() {
    let dataset = DemoSource::new(7).fetch_season("2025-26").expect("demo data");
    for min_points in [0, 500, 1000] {
        let criteria = FilterCriteria::new(min_points, TeamFilter::All);
        let outcome = filter_rows(dataset.rows(), &criteria);
        let Correlation::Defined(matrix) = correlation_matrix(outcome.rows()) else {
            panic!("demo league should produce a defined matrix at {min_points}");
        };
        for a in StatColumn::ALL {
            assert_eq!(matrix.get(a, a), 1.0);
            for b in StatColumn::ALL {
                let r = matrix.get(a, b);
                assert!(r.is_finite());
                assert!((-1.0..=1.0).contains(&r));
                assert_eq!(r, matrix.get(b, a));
            }
        }
    }
}

#[test]
fn synthetic_matrix_matches_known_sign() {
    let rows = synthetic_rows();
    let refs = rows.iter().collect::<Vec<_>>();
    let Correlation::Defined(matrix) = correlation_matrix(&refs) else {
        panic!("twenty varied rows should be defined");
    };
    // Rebounds and assists are both driven by points here.
    assert!(matrix.get(StatColumn::Points, StatColumn::Rebounds) > 0.9);
    assert!(matrix.get(StatColumn::Points, StatColumn::Assists) > 0.9);
    assert_eq!(matrix.samples(), 20);
}
