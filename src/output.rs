//! Output projection and CSV persistence
//!
//! Every value that is still missing after normalization is written as the
//! `-1` sentinel. Ranks and points additionally map the `NR` token to `-1`.

use crate::cell::Cell;
use crate::normalize::OddsSource;
use crate::pairing::PairedRecord;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Placeholder for values that could not be resolved
pub const SENTINEL: i64 = -1;

/// Only date format accepted for text date cells
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const OUTPUT_HEADER: [&str; 17] = [
    "Tournament",
    "Date",
    "Series",
    "Court",
    "Surface",
    "Round",
    "Best of",
    "Player_1",
    "Player_2",
    "Winner",
    "Rank_1",
    "Rank_2",
    "Pts_1",
    "Pts_2",
    "Odd_1",
    "Odd_2",
    "Score",
];

/// Extra trailing columns written when odds provenance is requested
pub const PROVENANCE_HEADER: [&str; 2] = ["Odd_1_Source", "Odd_2_Source"];

/// One line of the consolidated dataset
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub tournament: String,
    pub date: String,
    pub series: String,
    pub court: String,
    pub surface: String,
    pub round: String,
    pub best_of: i64,
    pub player_1: String,
    pub player_2: String,
    pub winner: String,
    pub rank_1: i64,
    pub rank_2: i64,
    pub points_1: i64,
    pub points_2: i64,
    pub odd_1: Option<f64>,
    pub odd_2: Option<f64>,
    pub score: String,
    pub odd_1_source: OddsSource,
    pub odd_2_source: OddsSource,
}

impl OutputRow {
    /// CSV fields in header order.
    pub fn to_record(&self, provenance: bool) -> Vec<String> {
        let mut record = vec![
            self.tournament.clone(),
            self.date.clone(),
            self.series.clone(),
            self.court.clone(),
            self.surface.clone(),
            self.round.clone(),
            self.best_of.to_string(),
            self.player_1.clone(),
            self.player_2.clone(),
            self.winner.clone(),
            self.rank_1.to_string(),
            self.rank_2.to_string(),
            self.points_1.to_string(),
            self.points_2.to_string(),
            format_odds(self.odd_1),
            format_odds(self.odd_2),
            self.score.clone(),
        ];
        if provenance {
            record.push(self.odd_1_source.as_str().to_string());
            record.push(self.odd_2_source.as_str().to_string());
        }
        record
    }
}

/// Text value of a cell, or the sentinel when missing.
pub fn text_or_sentinel(cell: &Cell) -> String {
    if cell.is_missing() {
        SENTINEL.to_string()
    } else {
        cell.to_string()
    }
}

/// Calendar date of a cell, or `None` when it is not a date in [`DATE_FORMAT`].
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok(),
        _ => None,
    }
}

/// Integer value for best-of, rank and points columns.
///
/// Missing cells, `NR` and unparseable text all become the sentinel.
pub fn integer_or_sentinel(cell: &Cell) -> i64 {
    if cell.is_not_ranked() {
        return SENTINEL;
    }
    cell.to_number()
        .map(|n| n.trunc() as i64)
        .unwrap_or(SENTINEL)
}

/// Odds as written to the file: integral values keep one decimal place.
pub fn format_odds(value: Option<f64>) -> String {
    let v = value.unwrap_or(SENTINEL as f64);
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Project a paired record onto the output columns.
pub fn project(record: &PairedRecord) -> OutputRow {
    OutputRow {
        tournament: text_or_sentinel(&record.tournament),
        date: parse_date(&record.date)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| SENTINEL.to_string()),
        series: text_or_sentinel(&record.series),
        court: text_or_sentinel(&record.court),
        surface: text_or_sentinel(&record.surface),
        round: text_or_sentinel(&record.round),
        best_of: integer_or_sentinel(&record.best_of),
        player_1: text_or_sentinel(&record.player_1),
        player_2: text_or_sentinel(&record.player_2),
        winner: text_or_sentinel(&record.winner),
        rank_1: integer_or_sentinel(&record.rank_1),
        rank_2: integer_or_sentinel(&record.rank_2),
        points_1: integer_or_sentinel(&record.points_1),
        points_2: integer_or_sentinel(&record.points_2),
        odd_1: record.odds_1.value,
        odd_2: record.odds_2.value,
        score: record.score.clone(),
        odd_1_source: record.odds_1.source,
        odd_2_source: record.odds_2.source,
    }
}

/// Write the header and all rows as CSV to `out`.
pub fn write_rows<W: std::io::Write>(out: W, rows: &[OutputRow], provenance: bool) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    let mut header: Vec<&str> = OUTPUT_HEADER.to_vec();
    if provenance {
        header.extend(PROVENANCE_HEADER);
    }
    writer.write_record(&header)?;

    for row in rows {
        writer.write_record(row.to_record(provenance))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the dataset to `path`.
///
/// Rows go to a temporary sibling file first, which is renamed over `path`
/// only once everything has been written.
pub fn write_csv(path: &Path, rows: &[OutputRow], provenance: bool) -> Result<()> {
    let tmp = temp_path(path);
    let file = std::fs::File::create(&tmp)
        .with_context(|| format!("Failed to create {}", tmp.display()))?;
    write_rows(file, rows, provenance)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} to {}", tmp.display(), path.display()))?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
