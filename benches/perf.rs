use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use nba_terminal::correlation::correlation_matrix;
use nba_terminal::dashboard::compute_view;
use nba_terminal::filter::{FilterCriteria, TeamFilter, filter_rows};
use nba_terminal::player_stats::Dataset;
use nba_terminal::stats_fetch::{DataSource, DemoSource, parse_league_dash_json};

fn demo_dataset() -> Dataset {
    DemoSource::new(2026)
        .fetch_season("2025-26")
        .expect("demo dataset")
}

fn league_dash_json(dataset: &Dataset) -> String {
    let rows = dataset
        .rows()
        .iter()
        .map(|r| {
            serde_json::json!([
                r.player_id,
                r.player_name,
                r.team_abbreviation,
                r.games_played,
                r.fg_pct,
                r.rebounds,
                r.assists,
                r.steals,
                r.blocks,
                r.points
            ])
        })
        .collect::<Vec<_>>();
    serde_json::json!({
        "resultSets": [{
            "name": "LeagueDashPlayerStats",
            "headers": ["PLAYER_ID", "PLAYER_NAME", "TEAM_ABBREVIATION", "GP", "FG_PCT", "REB", "AST", "STL", "BLK", "PTS"],
            "rowSet": rows,
        }]
    })
    .to_string()
}

fn bench_filter(c: &mut Criterion) {
    let dataset = demo_dataset();
    let criteria = FilterCriteria::new(500, TeamFilter::All);
    c.bench_function("filter_rows", |b| {
        b.iter(|| {
            let outcome = filter_rows(black_box(dataset.rows()), black_box(&criteria));
            black_box(outcome.len());
        })
    });
}

fn bench_correlation(c: &mut Criterion) {
    let dataset = demo_dataset();
    let refs = dataset.rows().iter().collect::<Vec<_>>();
    c.bench_function("correlation_matrix", |b| {
        b.iter(|| black_box(correlation_matrix(black_box(&refs))))
    });
}

fn bench_view(c: &mut Criterion) {
    let dataset = demo_dataset();
    let criteria = FilterCriteria::new(250, TeamFilter::All);
    c.bench_function("compute_view", |b| {
        b.iter(|| {
            let view = compute_view(black_box(&dataset), black_box(&criteria));
            black_box(view.matched_rows);
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let raw = league_dash_json(&demo_dataset());
    c.bench_function("league_dash_parse", |b| {
        b.iter(|| {
            let rows = parse_league_dash_json(black_box(&raw)).unwrap();
            black_box(rows.len());
        })
    });
}

criterion_group!(benches, bench_filter, bench_correlation, bench_view, bench_parse);
criterion_main!(benches);
