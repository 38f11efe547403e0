use std::path::PathBuf;

use anyhow::{Result, anyhow};

use nba_terminal::config::{AppConfig, SourceKind};
use nba_terminal::correlation::Correlation;
use nba_terminal::dashboard::compute_view;
use nba_terminal::export;
use nba_terminal::filter::TeamFilter;
use nba_terminal::player_stats::StatColumn;
use nba_terminal::season_cache::SeasonCache;
use nba_terminal::stats_fetch::source_from_config;

fn main() -> Result<()> {
    env_logger::init();

    let mut config = AppConfig::load();
    apply_args(&mut config)?;

    let source = source_from_config(&config)?;
    let mut cache = SeasonCache::new(source);
    let dataset = cache
        .get_or_fetch(&config.season)
        .map_err(|err| anyhow!("data retrieval failed: {err}"))?;

    let criteria = config.initial_criteria();
    let view = compute_view(&dataset, &criteria);

    for line in view.summary_lines() {
        println!("{line}");
    }
    if view.is_no_match() {
        return Ok(());
    }

    println!();
    println!("Top {} by points:", view.leaderboard.len());
    for (idx, bar) in view.leaderboard.iter().enumerate() {
        println!(
            "{:>2}. {:<26} {:<4} {:>6.0}",
            idx + 1,
            bar.player_name,
            bar.team_abbreviation,
            bar.points
        );
    }

    println!();
    println!("Field goal % distribution:");
    for bin in &view.histogram {
        println!(
            "  {:>5.1}-{:<5.1} {:>4} {}",
            bin.lower * 100.0,
            bin.upper * 100.0,
            bin.count,
            "#".repeat(bin.count.min(60))
        );
    }

    println!();
    match &view.correlation {
        Correlation::Defined(matrix) => {
            print!("      ");
            for col in StatColumn::ALL {
                print!("{:>7}", col.label());
            }
            println!();
            for a in StatColumn::ALL {
                print!("{:<6}", a.label());
                for b in StatColumn::ALL {
                    print!("{:>7.2}", matrix.get(a, b));
                }
                println!();
            }
        }
        Correlation::Undefined(reason) => println!("Correlation: {reason}"),
    }

    if let Some(path) = parse_export_arg() {
        let report = export::export_view(&path, &dataset, &criteria)?;
        println!();
        println!(
            "Exported {} players to {}",
            report.players,
            report.path.display()
        );
    }

    Ok(())
}

fn apply_args(config: &mut AppConfig) -> Result<()> {
    if let Some(season) = flag_value("--season") {
        config.season = season;
    }
    if let Some(raw) = flag_value("--min-points") {
        config.min_points = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| anyhow!("--min-points expects a whole number, got {raw:?}"))?;
    }
    if let Some(team) = flag_value("--team") {
        config.team = TeamFilter::from_option(Some(&team));
    }
    if let Some(path) = flag_value("--file") {
        config.data_file = Some(PathBuf::from(path));
        config.source = SourceKind::File;
    }
    if let Some(raw) = flag_value("--source") {
        config.source =
            SourceKind::parse(&raw).ok_or_else(|| anyhow!("unknown --source {raw:?}"))?;
    }
    Ok(())
}

fn parse_export_arg() -> Option<PathBuf> {
    flag_value("--export").map(PathBuf::from)
}

/// Accepts both `--flag=value` and `--flag value`.
fn flag_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
