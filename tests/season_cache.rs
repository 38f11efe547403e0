use std::cell::Cell;
use std::fs;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::anyhow;

use nba_terminal::player_stats::{Dataset, PlayerSeasonRow};
use nba_terminal::season_cache::SeasonCache;
use nba_terminal::stats_fetch::{DataSource, DemoSource, FetchError, FileSource};

/// Fails the first `failures` calls, then serves a two-row season.
struct FlakySource {
    calls: Rc<Cell<usize>>,
    failures: usize,
}

impl DataSource for FlakySource {
    fn fetch_season(&self, season: &str) -> Result<Dataset, FetchError> {
        let n = self.calls.get() + 1;
        self.calls.set(n);
        if n <= self.failures {
            return Err(FetchError::Http(anyhow!("provider unavailable")));
        }
        let row = |name: &str, points: f64| PlayerSeasonRow {
            player_id: 1,
            player_name: name.to_string(),
            team_abbreviation: "BOS".to_string(),
            games_played: 1,
            points,
            rebounds: 1.0,
            assists: 1.0,
            steals: 1.0,
            blocks: 1.0,
            fg_pct: 0.5,
        };
        Ok(Dataset::new(season, vec![row("A", 10.0), row("B", 20.0)]))
    }

    fn describe(&self) -> String {
        "flaky".to_string()
    }
}

#[test]
fn same_season_is_fetched_once() {
    let calls = Rc::new(Cell::new(0));
    let mut cache = SeasonCache::new(Box::new(FlakySource {
        calls: Rc::clone(&calls),
        failures: 0,
    }));

    let first = cache.get_or_fetch("2025-26").expect("first fetch");
    let second = cache.get_or_fetch("2025-26").expect("cached fetch");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.get(), 1);
    assert_eq!(cache.fetch_count(), 1);

    cache.get_or_fetch("2024-25").expect("other season");
    assert_eq!(calls.get(), 2);
    assert!(cache.cached("2025-26").is_some());
}

#[test]
fn failures_surface_and_are_not_cached() {
    let calls = Rc::new(Cell::new(0));
    let mut cache = SeasonCache::new(Box::new(FlakySource {
        calls: Rc::clone(&calls),
        failures: 1,
    }));

    let err = cache.get_or_fetch("2025-26").expect_err("first call fails");
    assert!(matches!(err, FetchError::Http(_)));
    assert!(err.to_string().contains("provider unavailable"));
    assert!(cache.cached("2025-26").is_none());

    let dataset = cache.get_or_fetch("2025-26").expect("retry succeeds");
    assert_eq!(dataset.len(), 2);
    assert_eq!(calls.get(), 2);
}

#[test]
fn demo_source_through_cache() {
    let mut cache = SeasonCache::new(Box::new(DemoSource::new(3)));
    assert!(cache.source_label().contains("demo"));
    let err = cache.get_or_fetch("bad").expect_err("invalid season");
    assert!(matches!(err, FetchError::InvalidSeason(_)));
    let dataset = cache.get_or_fetch("2023-24").expect("demo season");
    assert_eq!(dataset.season(), "2023-24");
}

struct EmptySource;

impl DataSource for EmptySource {
    fn fetch_season(&self, season: &str) -> Result<Dataset, FetchError> {
        Ok(Dataset::new(season, Vec::new()))
    }

    fn describe(&self) -> String {
        "empty".to_string()
    }
}

#[test]
fn empty_season_is_an_error_and_not_cached() {
    let mut cache = SeasonCache::new(Box::new(EmptySource));
    let err = cache.get_or_fetch("2025-26").expect_err("zero rows is a failure");
    assert!(matches!(err, FetchError::NoRows { ref season } if season == "2025-26"));
    assert!(cache.cached("2025-26").is_none());

    cache.get_or_fetch("2025-26").expect_err("still empty");
    assert_eq!(cache.fetch_count(), 2);
}

#[test]
fn empty_payload_files_fail_and_stay_retryable() {
    let dir = std::env::temp_dir().join(format!("nba_terminal_payloads_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let bodies = [
        ("null.json", "null"),
        ("blank.json", ""),
        (
            "no_rows.json",
            r#"{"resultSets":[{"headers":["PLAYER_NAME","TEAM_ABBREVIATION","PTS","REB","AST","STL","BLK"]}]}"#,
        ),
    ];
    for (name, body) in bodies {
        let path = dir.join(name);
        fs::write(&path, body).expect("write payload");
        let mut cache = SeasonCache::new(Box::new(FileSource::new(&path)));

        let err = cache.get_or_fetch("2025-26").expect_err("empty payload is a failure");
        assert!(matches!(err, FetchError::Schema(_)), "{name}: {err}");
        assert!(cache.cached("2025-26").is_none(), "{name} was cached");
        let _ = fs::remove_file(&path);
    }
}
