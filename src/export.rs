use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::correlation::{Correlation, CorrelationMatrix};
use crate::dashboard::compute_view;
use crate::filter::{FilterCriteria, filter_rows};
use crate::player_stats::{Dataset, StatColumn};

pub struct ExportReport {
    pub path: PathBuf,
    pub players: usize,
    pub leaderboard: usize,
    pub correlation_defined: bool,
    /// Text written to the Correlation sheet when no matrix is defined.
    pub correlation_note: Option<String>,
}

enum CellValue {
    Text(String),
    Number(f64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

pub fn default_export_path(dir: &Path, season: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("nba_{season}_{stamp}.xlsx"))
}

/// Write the filtered players, leaderboard, correlation matrix and summary
/// for `criteria` to an xlsx workbook.
pub fn export_view(path: &Path, dataset: &Dataset, criteria: &FilterCriteria) -> Result<ExportReport> {
    let view = compute_view(dataset, criteria);
    let outcome = filter_rows(dataset.rows(), criteria);

    let mut player_rows: Vec<Vec<CellValue>> = vec![
        [
            "Player ID", "Player", "Team", "GP", "PTS", "REB", "AST", "STL", "BLK", "FG%",
        ]
        .into_iter()
        .map(CellValue::from)
        .collect(),
    ];
    for row in outcome.rows() {
        player_rows.push(vec![
            f64::from(row.player_id).into(),
            row.player_name.as_str().into(),
            row.team_abbreviation.as_str().into(),
            f64::from(row.games_played).into(),
            row.points.into(),
            row.rebounds.into(),
            row.assists.into(),
            row.steals.into(),
            row.blocks.into(),
            row.fg_pct.into(),
        ]);
    }

    let mut leader_rows: Vec<Vec<CellValue>> = vec![
        ["Rank", "Player", "Team", "PTS"]
            .into_iter()
            .map(CellValue::from)
            .collect(),
    ];
    for (idx, bar) in view.leaderboard.iter().enumerate() {
        leader_rows.push(vec![
            ((idx + 1) as f64).into(),
            bar.player_name.as_str().into(),
            bar.team_abbreviation.as_str().into(),
            bar.points.into(),
        ]);
    }

    let correlation_note = match &view.correlation {
        Correlation::Defined(_) => None,
        Correlation::Undefined(reason) => Some(reason.to_string()),
    };
    let corr_rows = match view.correlation.matrix() {
        Some(matrix) => correlation_rows(matrix),
        None => vec![vec![CellValue::from(
            correlation_note.clone().unwrap_or_default(),
        )]],
    };
    let summary_rows = view
        .summary_lines()
        .into_iter()
        .map(|line| vec![CellValue::from(line)])
        .collect::<Vec<_>>();

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Players")?;
        write_rows(sheet, &player_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Leaderboard")?;
        write_rows(sheet, &leader_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Correlation")?;
        write_rows(sheet, &corr_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed creating export dir {}", dir.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        path: path.to_path_buf(),
        players: player_rows.len().saturating_sub(1),
        leaderboard: leader_rows.len().saturating_sub(1),
        correlation_defined: view.correlation.matrix().is_some(),
        correlation_note,
    })
}

fn correlation_rows(matrix: &CorrelationMatrix) -> Vec<Vec<CellValue>> {
    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(StatColumn::ALL.len() + 1);
    let mut header = vec![CellValue::from("")];
    header.extend(StatColumn::ALL.iter().map(|c| CellValue::from(c.label())));
    rows.push(header);
    for a in StatColumn::ALL {
        let mut line = vec![CellValue::from(a.label())];
        line.extend(StatColumn::ALL.iter().map(|b| CellValue::from(matrix.get(a, *b))));
        rows.push(line);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<CellValue>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match value {
                CellValue::Text(text) => worksheet.write_string(r, c, text),
                CellValue::Number(num) => worksheet.write_number(r, c, *num),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
