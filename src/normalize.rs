//! Row normalization
//!
//! Repairs the merged raw table in a fixed sequence of stages. Each stage
//! relies on the cleanup done by the ones before it:
//!
//! 1. missing best-of defaults to 3
//! 2. only completed matches are kept
//! 3. rows without both ranks and readable scores for the first two sets are
//!    dropped
//! 4. unplayed or unreadable sets 3-5 default to 0
//! 5. bookmaker odds are coerced to numbers
//! 6. missing primary odds are imputed (secondary mean, then average)
//! 7. blank set scores become 0 and all set scores become integers

use crate::cell::Cell;
use crate::record::{MatchRecord, OutcomeOdds, MAX_SETS};

/// Best-of value assumed when the source leaves it empty
pub const DEFAULT_BEST_OF: f64 = 3.0;

/// Where a primary odds value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OddsSource {
    /// Quoted by the primary bookmaker
    Primary,
    /// Mean of the secondary bookmakers that quoted the outcome
    SecondaryMean,
    /// Across-bookmaker average column
    Average,
    /// No bookmaker quoted the outcome
    Missing,
}

impl OddsSource {
    pub fn as_str(self) -> &'static str {
        match self {
            OddsSource::Primary => "primary",
            OddsSource::SecondaryMean => "secondary_mean",
            OddsSource::Average => "average",
            OddsSource::Missing => "missing",
        }
    }
}

/// Primary odds for one outcome after imputation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImputedOdds {
    pub value: Option<f64>,
    pub source: OddsSource,
}

/// Games won by each side in one set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetScore {
    pub winner: i64,
    pub loser: i64,
}

impl SetScore {
    pub fn new(winner: i64, loser: i64) -> Self {
        Self { winner, loser }
    }

    pub fn is_unplayed(&self) -> bool {
        self.winner == 0 && self.loser == 0
    }
}

/// A match that passed every normalization stage
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMatch {
    pub tournament: Cell,
    pub date: Cell,
    pub series: Cell,
    pub court: Cell,
    pub surface: Cell,
    pub round: Cell,
    pub best_of: Cell,
    pub winner: Cell,
    pub loser: Cell,
    pub winner_rank: Cell,
    pub loser_rank: Cell,
    pub winner_points: Cell,
    pub loser_points: Cell,
    pub winner_odds: ImputedOdds,
    pub loser_odds: ImputedOdds,
    pub sets: [SetScore; MAX_SETS],
}

/// How many primary odds values came from each source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImputationCounts {
    pub primary: usize,
    pub secondary_mean: usize,
    pub average: usize,
    pub missing: usize,
}

impl ImputationCounts {
    fn record(&mut self, source: OddsSource) {
        match source {
            OddsSource::Primary => self.primary += 1,
            OddsSource::SecondaryMean => self.secondary_mean += 1,
            OddsSource::Average => self.average += 1,
            OddsSource::Missing => self.missing += 1,
        }
    }
}

/// Aggregate row counts for one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub input_rows: usize,
    /// Dropped: completion status other than "Completed"
    pub not_completed: usize,
    /// Dropped: missing rank or unreadable first-two-set scores
    pub incomplete: usize,
    pub output_rows: usize,
    pub winner_odds: ImputationCounts,
    pub loser_odds: ImputationCounts,
}

/// Run every normalization stage over the merged table.
pub fn normalize(mut records: Vec<MatchRecord>) -> (Vec<NormalizedMatch>, NormalizeStats) {
    let mut stats = NormalizeStats {
        input_rows: records.len(),
        ..Default::default()
    };

    fill_best_of(&mut records);
    stats.not_completed = retain_completed(&mut records);
    stats.incomplete = retain_structurally_complete(&mut records);
    fill_unplayed_sets(&mut records);
    coerce_odds(&mut records);

    let mut normalized = Vec::with_capacity(records.len());
    for record in records {
        let winner_odds = impute_primary_odds(&record.winner_odds);
        let loser_odds = impute_primary_odds(&record.loser_odds);
        let sets = integer_set_scores(&record);

        stats.winner_odds.record(winner_odds.source);
        stats.loser_odds.record(loser_odds.source);

        normalized.push(NormalizedMatch {
            tournament: record.tournament,
            date: record.date,
            series: record.series,
            court: record.court,
            surface: record.surface,
            round: record.round,
            best_of: record.best_of,
            winner: record.winner,
            loser: record.loser,
            winner_rank: record.winner_rank,
            loser_rank: record.loser_rank,
            winner_points: record.winner_points,
            loser_points: record.loser_points,
            winner_odds,
            loser_odds,
            sets,
        });
    }

    stats.output_rows = normalized.len();
    log::info!(
        "Normalized {} -> {} rows ({} not completed, {} incomplete)",
        stats.input_rows,
        stats.output_rows,
        stats.not_completed,
        stats.incomplete
    );

    (normalized, stats)
}

/// Stage 1: missing best-of becomes 3.
pub fn fill_best_of(records: &mut [MatchRecord]) {
    for record in records.iter_mut() {
        if record.best_of.is_missing() {
            record.best_of = Cell::Number(DEFAULT_BEST_OF);
        }
    }
}

/// Stage 2: keep completed matches. Returns the number of rows removed.
pub fn retain_completed(records: &mut Vec<MatchRecord>) -> usize {
    let before = records.len();
    records.retain(MatchRecord::is_completed);
    log::debug!("Completed filter: {} -> {}", before, records.len());
    before - records.len()
}

/// A set-score cell is readable when it is blank or parses as a number.
fn is_readable_games(cell: &Cell) -> bool {
    cell.is_blank() || cell.to_number().is_some()
}

/// Stage 3: drop rows missing either rank or any of the first two sets.
/// A first- or second-set score that cannot be read as a number counts as
/// missing. Returns the number of rows removed.
pub fn retain_structurally_complete(records: &mut Vec<MatchRecord>) -> usize {
    let before = records.len();
    records.retain(|r| {
        !r.winner_rank.is_missing()
            && !r.loser_rank.is_missing()
            && r.winner_games[..2].iter().all(is_readable_games)
            && r.loser_games[..2].iter().all(is_readable_games)
    });
    log::debug!("Structural filter: {} -> {}", before, records.len());
    before - records.len()
}

/// Stage 4: sets 3-5 that were not played, or hold unreadable scores, become 0-0.
pub fn fill_unplayed_sets(records: &mut [MatchRecord]) {
    let mut unreadable = 0usize;
    for record in records.iter_mut() {
        for cell in record.winner_games[2..]
            .iter_mut()
            .chain(record.loser_games[2..].iter_mut())
        {
            if cell.is_missing() {
                *cell = Cell::Number(0.0);
            } else if !is_readable_games(cell) {
                unreadable += 1;
                *cell = Cell::Number(0.0);
            }
        }
    }
    if unreadable > 0 {
        log::warn!("Treated {} unreadable set scores as unplayed", unreadable);
    }
}

/// Stage 5: every odds cell becomes a number or empty.
pub fn coerce_odds(records: &mut [MatchRecord]) {
    for record in records.iter_mut() {
        for odds in [&mut record.winner_odds, &mut record.loser_odds] {
            odds.primary = odds.primary.coerce_numeric();
            for cell in odds.secondary.iter_mut() {
                *cell = cell.coerce_numeric();
            }
            odds.average = odds.average.coerce_numeric();
        }
    }
}

/// Stage 6: primary odds, falling back to the secondary mean and then the average.
pub fn impute_primary_odds(odds: &OutcomeOdds) -> ImputedOdds {
    if let Some(value) = odds.primary.to_number() {
        return ImputedOdds {
            value: Some(value),
            source: OddsSource::Primary,
        };
    }

    let quoted: Vec<f64> = odds.secondary.iter().filter_map(Cell::to_number).collect();
    if !quoted.is_empty() {
        return ImputedOdds {
            value: Some(quoted.iter().sum::<f64>() / quoted.len() as f64),
            source: OddsSource::SecondaryMean,
        };
    }

    match odds.average.to_number() {
        Some(value) => ImputedOdds {
            value: Some(value),
            source: OddsSource::Average,
        },
        None => ImputedOdds {
            value: None,
            source: OddsSource::Missing,
        },
    }
}

/// Stage 7: blank scores become 0 and every set score becomes an integer.
///
/// Fractional values truncate toward zero. Stages 3 and 4 leave only blank or
/// numeric set cells, so anything else also reads as 0.
pub fn integer_set_scores(record: &MatchRecord) -> [SetScore; MAX_SETS] {
    let games = |cell: &Cell| -> i64 { cell.to_number().map_or(0, |n| n.trunc() as i64) };

    let mut sets = [SetScore::default(); MAX_SETS];
    for (i, set) in sets.iter_mut().enumerate() {
        *set = SetScore::new(games(&record.winner_games[i]), games(&record.loser_games[i]));
    }
    sets
}
