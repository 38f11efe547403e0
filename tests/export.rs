use std::fs;
use std::path::PathBuf;

use nba_terminal::correlation::Correlation;
use nba_terminal::dashboard::compute_view;
use nba_terminal::export::{default_export_path, export_view};
use nba_terminal::filter::{FilterCriteria, TeamFilter};
use nba_terminal::stats_fetch::{DataSource, DemoSource};

fn export_dir(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("nba_terminal_export_{}", std::process::id()))
        .join(name)
}

#[test]
fn export_matches_filtered_view() {
    let dataset = DemoSource::new(5).fetch_season("2025-26").expect("demo data");
    let criteria = FilterCriteria::new(500, TeamFilter::All);
    let view = compute_view(&dataset, &criteria);
    let path = export_dir("filtered").join("view.xlsx");

    let report = export_view(&path, &dataset, &criteria).expect("export should succeed");
    assert_eq!(report.path, path);
    assert_eq!(report.players, view.matched_rows);
    assert!(report.leaderboard <= 15);
    assert_eq!(report.leaderboard, view.leaderboard.len());
    assert_eq!(report.correlation_defined, view.correlation.matrix().is_some());
    assert!(report.correlation_defined);
    assert!(report.correlation_note.is_none());
    assert!(fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false));
    let _ = fs::remove_file(&path);
}

#[test]
fn no_match_export_records_undefined_reason() {
    let dataset = DemoSource::new(5).fetch_season("2025-26").expect("demo data");
    let criteria = FilterCriteria::new(2000, TeamFilter::Team("ZZZ".to_string()));
    let view = compute_view(&dataset, &criteria);
    assert!(view.is_no_match());
    let path = export_dir("no_match").join("empty.xlsx");

    let report = export_view(&path, &dataset, &criteria).expect("empty export still writes");
    assert_eq!(report.players, 0);
    assert_eq!(report.leaderboard, 0);
    assert!(!report.correlation_defined);
    let Correlation::Undefined(reason) = view.correlation else {
        panic!("no-match view cannot have a matrix");
    };
    assert_eq!(report.correlation_note, Some(reason.to_string()));
    assert!(path.exists());
    let _ = fs::remove_file(&path);
}

#[test]
fn default_path_names_season_and_xlsx() {
    let path = default_export_path(&PathBuf::from("exports"), "2024-25");
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(path.starts_with("exports"));
    assert!(name.starts_with("nba_2024-25_"));
    assert!(name.ends_with(".xlsx"));
}
