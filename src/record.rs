//! Raw match records
//!
//! Maps each worksheet row onto [`MatchRecord`] by header name. The yearly
//! files do not share one schema (bookmakers come and go, `B365` only appears
//! from 2002), so a column that a given year lacks simply yields empty cells.

use crate::cell::Cell;
use crate::fetch::RawTable;

/// Bookmaker whose odds are reported in the output
pub const PRIMARY_BOOKMAKER: &str = "B365";

/// Bookmakers used to impute missing primary odds, in column order
pub const SECONDARY_BOOKMAKERS: &[&str] =
    &["CB", "GB", "IW", "SB", "B&W", "EX", "PS", "UB", "LB", "SJ"];

/// Prefix of the across-bookmaker average odds columns
pub const AVERAGE_ODDS: &str = "Avg";

/// Number of set columns per side (`W1..W5`, `L1..L5`)
pub const MAX_SETS: usize = 5;

/// Completion status of a finished match
pub const COMPLETED: &str = "Completed";

/// All odds quoted for one outcome (win or loss) of a match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeOdds {
    pub primary: Cell,
    /// One cell per entry of [`SECONDARY_BOOKMAKERS`]
    pub secondary: Vec<Cell>,
    pub average: Cell,
}

/// One row of the merged raw table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRecord {
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
    /// Games won by the winner in sets 1..5
    pub winner_games: [Cell; MAX_SETS],
    /// Games won by the loser in sets 1..5
    pub loser_games: [Cell; MAX_SETS],
    pub comment: Cell,
    pub winner_odds: OutcomeOdds,
    pub loser_odds: OutcomeOdds,
}

impl MatchRecord {
    pub fn is_completed(&self) -> bool {
        matches!(&self.comment, Cell::Text(s) if s == COMPLETED)
    }
}

/// Primary, secondary and average column indices for one outcome
type OddsColumns = (Option<usize>, Vec<Option<usize>>, Option<usize>);

/// Odds column names for the winner (`W`) or loser (`L`) side.
fn side_columns(side: char) -> (String, Vec<String>, String) {
    (
        format!("{}{}", PRIMARY_BOOKMAKER, side),
        SECONDARY_BOOKMAKERS
            .iter()
            .map(|code| format!("{}{}", code, side))
            .collect(),
        format!("{}{}", AVERAGE_ODDS, side),
    )
}

/// Convert every row of a decoded worksheet into a [`MatchRecord`].
pub fn records_from_table(table: &RawTable) -> Vec<MatchRecord> {
    let find_col = |name: &str| table.column(name);

    let tournament_col = find_col("Tournament");
    let date_col = find_col("Date");
    let series_col = find_col("Series");
    let court_col = find_col("Court");
    let surface_col = find_col("Surface");
    let round_col = find_col("Round");
    let best_of_col = find_col("Best of");
    let winner_col = find_col("Winner");
    let loser_col = find_col("Loser");
    let wrank_col = find_col("WRank");
    let lrank_col = find_col("LRank");
    let wpts_col = find_col("WPts");
    let lpts_col = find_col("LPts");
    let comment_col = find_col("Comment");

    let set_cols = |side: char| -> [Option<usize>; MAX_SETS] {
        std::array::from_fn(|i| find_col(format!("{}{}", side, i + 1).as_str()))
    };
    let w_set_cols = set_cols('W');
    let l_set_cols = set_cols('L');

    let odds_cols = |side: char| -> OddsColumns {
        let (primary, secondary, average) = side_columns(side);
        (
            find_col(primary.as_str()),
            secondary
                .iter()
                .map(|c| find_col(c.as_str()))
                .collect(),
            find_col(average.as_str()),
        )
    };
    let w_odds_cols = odds_cols('W');
    let l_odds_cols = odds_cols('L');

    table
        .rows
        .iter()
        .map(|row| {
            let get =
                |col: Option<usize>| col.and_then(|i| row.get(i)).cloned().unwrap_or_default();
            let odds = |cols: &OddsColumns| OutcomeOdds {
                primary: get(cols.0),
                secondary: cols.1.iter().map(|c| get(*c)).collect(),
                average: get(cols.2),
            };

            MatchRecord {
                tournament: get(tournament_col),
                date: get(date_col),
                series: get(series_col),
                court: get(court_col),
                surface: get(surface_col),
                round: get(round_col),
                best_of: get(best_of_col),
                winner: get(winner_col),
                loser: get(loser_col),
                winner_rank: get(wrank_col),
                loser_rank: get(lrank_col),
                winner_points: get(wpts_col),
                loser_points: get(lpts_col),
                winner_games: w_set_cols.map(get),
                loser_games: l_set_cols.map(get),
                comment: get(comment_col),
                winner_odds: odds(&w_odds_cols),
                loser_odds: odds(&l_odds_cols),
            }
        })
        .collect()
}

/// Concatenate yearly tables in the given order.
///
/// Row order of the result is the accumulation order, which later decides
/// each row's Player 1/Player 2 assignment.
pub fn merge_tables<'a>(tables: impl IntoIterator<Item = &'a RawTable>) -> Vec<MatchRecord> {
    let mut records = Vec::new();
    for table in tables {
        records.extend(records_from_table(table));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    #[test]
    fn test_records_from_table() {
        let t = table(
            &["Winner", "Loser", "W1", "L1", "B365W", "CBW", "SJW", "AvgW", "Comment"],
            vec![vec![
                Cell::text("Federer R."),
                Cell::text("Nadal R."),
                Cell::Number(6.0),
                Cell::Number(4.0),
                Cell::Number(1.5),
                Cell::Number(1.4),
                Cell::text("1.45"),
                Cell::Number(1.47),
                Cell::text("Completed"),
            ]],
        );

        let records = records_from_table(&t);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.winner, Cell::text("Federer R."));
        assert_eq!(r.winner_games[0], Cell::Number(6.0));
        assert_eq!(r.loser_games[0], Cell::Number(4.0));
        assert_eq!(r.winner_games[1], Cell::Empty);
        assert_eq!(r.winner_odds.primary, Cell::Number(1.5));
        assert_eq!(r.winner_odds.secondary.len(), SECONDARY_BOOKMAKERS.len());
        assert_eq!(r.winner_odds.secondary[0], Cell::Number(1.4));
        assert_eq!(r.winner_odds.secondary[9], Cell::text("1.45"));
        assert_eq!(r.winner_odds.average, Cell::Number(1.47));
        assert_eq!(r.loser_odds.primary, Cell::Empty);
        assert!(r.is_completed());
    }

    #[test]
    fn test_short_rows_are_padded() {
        let t = table(&["Winner", "Loser"], vec![vec![Cell::text("Agassi A.")]]);
        let records = records_from_table(&t);
        assert_eq!(records[0].loser, Cell::Empty);
    }

    #[test]
    fn test_merge_preserves_order_across_schemas() {
        let a = table(&["Winner"], vec![vec![Cell::text("A")], vec![Cell::text("B")]]);
        let b = table(
            &["B365W", "Winner"],
            vec![vec![Cell::Number(1.2), Cell::text("C")]],
        );

        let merged = merge_tables([&a, &b]);
        let winners: Vec<String> = merged.iter().map(|r| r.winner.to_string()).collect();
        assert_eq!(winners, vec!["A", "B", "C"]);
        assert_eq!(merged[0].winner_odds.primary, Cell::Empty);
        assert_eq!(merged[2].winner_odds.primary, Cell::Number(1.2));
    }

    #[test]
    fn test_is_completed() {
        let mut r = MatchRecord::default();
        assert!(!r.is_completed());
        r.comment = Cell::text("Retired");
        assert!(!r.is_completed());
        r.comment = Cell::text("Completed");
        assert!(r.is_completed());
    }
}
