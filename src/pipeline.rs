//! Pipeline functions for programmatic use by the CLI and tests.
//!
//! A run fetches every source in catalogue order, concatenates the rows,
//! normalizes them, relabels winner/loser as Player 1/Player 2 and writes the
//! consolidated CSV. Any fetch failure aborts the run before the output file
//! is touched.

use crate::fetch::{RawTable, TableSource};
use crate::normalize::{normalize, NormalizeStats};
use crate::output::{project, write_csv, OutputRow};
use crate::pairing::pair_all;
use crate::record::{merge_tables, MatchRecord};
use crate::sources::{default_sources, Source};
use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "atp_tennis.csv";

/// Configuration for a full dataset build.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Output CSV path
    pub output: PathBuf,
    /// Sources to fetch, in accumulation order
    pub sources: Vec<Source>,
    /// Append the odds provenance columns
    pub odds_provenance: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            sources: default_sources(),
            odds_provenance: false,
        }
    }
}

/// Progress information reported after each source is fetched.
pub struct FetchProgress {
    /// Number of sources fetched so far
    pub completed: usize,
    /// Total number of sources
    pub total: usize,
    /// Season of the source just fetched
    pub year: u16,
    /// Rows accumulated across all sources so far
    pub rows: usize,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub sources: usize,
    pub fetched_rows: usize,
    pub stats: NormalizeStats,
    pub rows_written: usize,
    pub output: PathBuf,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [
            ("Sources fetched", self.sources),
            ("Rows fetched", self.fetched_rows),
            ("Dropped, not completed", self.stats.not_completed),
            ("Dropped, incomplete", self.stats.incomplete),
        ];
        for (label, value) in lines {
            writeln!(f, "{:<25}{}", format!("{}:", label), value)?;
        }
        for (label, counts) in [
            ("Winner odds", &self.stats.winner_odds),
            ("Loser odds", &self.stats.loser_odds),
        ] {
            writeln!(
                f,
                "{:<25}{} primary, {} secondary mean, {} average, {} missing",
                format!("{}:", label),
                counts.primary,
                counts.secondary_mean,
                counts.average,
                counts.missing
            )?;
        }
        write!(
            f,
            "{:<25}{} -> {}",
            "Total matches written:",
            self.rows_written,
            self.output.display()
        )
    }
}

/// Fetch every source in order.
///
/// Calls `on_progress` after each source. The first failure aborts.
pub fn fetch_all(
    table_source: &mut impl TableSource,
    sources: &[Source],
    mut on_progress: impl FnMut(&FetchProgress),
) -> Result<Vec<RawTable>> {
    let mut tables = Vec::with_capacity(sources.len());
    let mut rows = 0usize;

    for (i, source) in sources.iter().enumerate() {
        let table = table_source
            .fetch(source)
            .with_context(|| format!("Failed to fetch {} data", source.year))?;
        rows += table.len();
        log::info!("{}: {} rows ({} total)", source.year, table.len(), rows);
        tables.push(table);

        on_progress(&FetchProgress {
            completed: i + 1,
            total: sources.len(),
            year: source.year,
            rows,
        });
    }

    Ok(tables)
}

/// Normalize, relabel and project the merged table.
pub fn build_dataset(records: Vec<MatchRecord>) -> (Vec<OutputRow>, NormalizeStats) {
    let (normalized, stats) = normalize(records);
    let rows = pair_all(normalized).iter().map(project).collect();
    (rows, stats)
}

/// Run the full pipeline and write the output file.
pub fn run_pipeline(
    config: &PipelineConfig,
    table_source: &mut impl TableSource,
    on_progress: impl FnMut(&FetchProgress),
) -> Result<RunSummary> {
    if config.sources.is_empty() {
        bail!("No sources configured");
    }

    let tables = fetch_all(table_source, &config.sources, on_progress)?;
    let records = merge_tables(&tables);
    let fetched_rows = records.len();
    drop(tables);

    let (rows, stats) = build_dataset(records);
    write_csv(&config.output, &rows, config.odds_provenance)?;

    Ok(RunSummary {
        sources: config.sources.len(),
        fetched_rows,
        stats,
        rows_written: rows.len(),
        output: config.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    struct FailingSource;

    impl TableSource for FailingSource {
        fn fetch(&mut self, source: &Source) -> Result<RawTable> {
            bail!("connection refused for {}", source.year)
        }
    }

    struct EmptySource;

    impl TableSource for EmptySource {
        fn fetch(&mut self, _source: &Source) -> Result<RawTable> {
            Ok(RawTable::new(
                vec!["Winner".to_string(), "Comment".to_string()],
                vec![vec![Cell::text("Safin M."), Cell::text("Retired")]],
            ))
        }
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.output, PathBuf::from("atp_tennis.csv"));
        assert_eq!(config.sources.len(), 26);
        assert!(!config.odds_provenance);
    }

    #[test]
    fn test_fetch_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output: dir.path().join("out.csv"),
            sources: vec![Source::new(2000), Source::new(2001)],
            odds_provenance: false,
        };

        let err = run_pipeline(&config, &mut FailingSource, |_| {}).unwrap_err();
        assert!(format!("{:#}", err).contains("2000"));
        assert!(!config.output.exists());
    }

    #[test]
    fn test_no_sources_is_an_error() {
        let config = PipelineConfig {
            sources: Vec::new(),
            ..Default::default()
        };
        assert!(run_pipeline(&config, &mut EmptySource, |_| {}).is_err());
    }

    #[test]
    fn test_progress_reports_each_source() {
        let sources = vec![Source::new(2000), Source::new(2001), Source::new(2002)];
        let mut seen = Vec::new();
        let tables = fetch_all(&mut EmptySource, &sources, |p| {
            seen.push((p.completed, p.total, p.year, p.rows))
        })
        .unwrap();

        assert_eq!(tables.len(), 3);
        assert_eq!(seen, vec![(1, 3, 2000, 1), (2, 3, 2001, 2), (3, 3, 2002, 3)]);
    }

    #[test]
    fn test_summary_display() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output: dir.path().join("out.csv"),
            sources: vec![Source::new(2005)],
            odds_provenance: false,
        };

        let summary = run_pipeline(&config, &mut EmptySource, |_| {}).unwrap();
        assert_eq!(summary.fetched_rows, 1);
        assert_eq!(summary.stats.not_completed, 1);
        assert_eq!(summary.rows_written, 0);

        let text = summary.to_string();
        assert!(text.contains("Total matches written:   0 -> "));
        assert!(text.contains("Dropped, not completed:  1"));
    }
}
