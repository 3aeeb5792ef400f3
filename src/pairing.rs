//! Winner/loser to Player 1/Player 2 remapping
//!
//! Source rows always list the winner first. Labelling the winner as Player 1
//! on even rows and as Player 2 on odd rows removes that bias while keeping
//! the output reproducible.

use crate::cell::Cell;
use crate::normalize::{ImputedOdds, NormalizedMatch, SetScore};

/// Which side of the match is labelled Player 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Player1IsWinner,
    Player1IsLoser,
}

impl Parity {
    /// Parity of the row at `idx` in the normalized table.
    pub fn from_index(idx: usize) -> Self {
        if idx % 2 == 0 {
            Parity::Player1IsWinner
        } else {
            Parity::Player1IsLoser
        }
    }

    /// Split a winner/loser pair into `(player_1, player_2)`.
    pub fn select<T>(self, winner: T, loser: T) -> (T, T) {
        match self {
            Parity::Player1IsWinner => (winner, loser),
            Parity::Player1IsLoser => (loser, winner),
        }
    }
}

/// A normalized match with sides relabelled as Player 1 and Player 2
#[derive(Debug, Clone, PartialEq)]
pub struct PairedRecord {
    pub tournament: Cell,
    pub date: Cell,
    pub series: Cell,
    pub court: Cell,
    pub surface: Cell,
    pub round: Cell,
    pub best_of: Cell,
    pub player_1: Cell,
    pub player_2: Cell,
    /// Actual winner, independent of labelling
    pub winner: Cell,
    pub rank_1: Cell,
    pub rank_2: Cell,
    pub points_1: Cell,
    pub points_2: Cell,
    pub odds_1: ImputedOdds,
    pub odds_2: ImputedOdds,
    /// Played sets as "P1games-P2games", space separated
    pub score: String,
    pub parity: Parity,
}

/// Format set scores from Player 1's point of view.
///
/// Unplayed (0-0) sets are left out wherever they occur.
pub fn format_score(sets: &[SetScore], parity: Parity) -> String {
    sets.iter()
        .filter(|set| !set.is_unplayed())
        .map(|set| {
            let (p1, p2) = parity.select(set.winner, set.loser);
            format!("{}-{}", p1, p2)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Relabel one normalized match found at position `idx`.
pub fn pair(idx: usize, m: NormalizedMatch) -> PairedRecord {
    let parity = Parity::from_index(idx);

    let (player_1, player_2) = parity.select(m.winner.clone(), m.loser);
    let (rank_1, rank_2) = parity.select(m.winner_rank, m.loser_rank);
    let (points_1, points_2) = parity.select(m.winner_points, m.loser_points);
    let (odds_1, odds_2) = parity.select(m.winner_odds, m.loser_odds);
    let score = format_score(&m.sets, parity);

    PairedRecord {
        tournament: m.tournament,
        date: m.date,
        series: m.series,
        court: m.court,
        surface: m.surface,
        round: m.round,
        best_of: m.best_of,
        player_1,
        player_2,
        winner: m.winner,
        rank_1,
        rank_2,
        points_1,
        points_2,
        odds_1,
        odds_2,
        score,
        parity,
    }
}

/// Relabel every match, using its position in `matches` as the index.
pub fn pair_all(matches: Vec<NormalizedMatch>) -> Vec<PairedRecord> {
    matches
        .into_iter()
        .enumerate()
        .map(|(idx, m)| pair(idx, m))
        .collect()
}
