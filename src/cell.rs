//! Spreadsheet cell values and missing-value rules
//!
//! The yearly result files mix numbers, text and dates in the same columns
//! (ranks are usually numbers but sometimes `NR`, odds are sometimes typed in
//! as text). Every raw value is held as a [`Cell`] until the normalizer decides
//! what it means.

use chrono::NaiveDate;
use std::fmt;

/// Text values that are read as an empty cell.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Literal used by the sources for players without a ranking.
pub const NOT_RANKED: &str = "NR";

/// A single raw cell from a result spreadsheet
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    /// Build a text cell, mapping NA tokens to [`Cell::Empty`].
    pub fn text(value: &str) -> Self {
        if NA_TOKENS.contains(&value) {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// True for text cells that contain only whitespace (e.g. `" "`).
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric value of the cell, parsing text. `None` when missing or unparseable.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if !n.is_nan() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    /// Coerce to a numeric cell; anything unparseable becomes [`Cell::Empty`].
    pub fn coerce_numeric(&self) -> Cell {
        match self.to_number() {
            Some(n) => Cell::Number(n),
            None => Cell::Empty,
        }
    }

    pub fn is_not_ranked(&self) -> bool {
        matches!(self, Cell::Text(s) if s == NOT_RANKED)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Cell::Text(s) => f.write_str(s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_na_tokens_become_empty() {
        assert_eq!(Cell::text(""), Cell::Empty);
        assert_eq!(Cell::text("N/A"), Cell::Empty);
        assert_eq!(Cell::text("nan"), Cell::Empty);
        assert_eq!(Cell::text("NR"), Cell::Text("NR".to_string()));
        // Whitespace is a value, not a missing marker
        assert_eq!(Cell::text(" "), Cell::Text(" ".to_string()));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Cell::Number(1.85).to_number(), Some(1.85));
        assert_eq!(Cell::text(" 2.10 ").to_number(), Some(2.1));
        assert_eq!(Cell::text("abc").to_number(), None);
        assert_eq!(Cell::Number(f64::NAN).to_number(), None);
        assert_eq!(Cell::Empty.to_number(), None);
        assert_eq!(
            Cell::Date(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap()).to_number(),
            None
        );
    }

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(Cell::text("1.5").coerce_numeric(), Cell::Number(1.5));
        assert_eq!(Cell::text("-").coerce_numeric(), Cell::Empty);
    }

    #[test]
    fn test_blank_and_not_ranked() {
        assert!(Cell::text("   ").is_blank());
        assert!(!Cell::Number(0.0).is_blank());
        assert!(Cell::text("NR").is_not_ranked());
        assert!(!Cell::Number(1.0).is_not_ranked());
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::Number(6.0).to_string(), "6");
        assert_eq!(Cell::Number(1.83).to_string(), "1.83");
        assert_eq!(Cell::Empty.to_string(), "");
        assert_eq!(
            Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 29).unwrap()).to_string(),
            "2024-01-29"
        );
    }
}
