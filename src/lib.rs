//! ATP Tennis Dataset
//!
//! Builds one consolidated ATP match file from the yearly result spreadsheets
//! published by tennis-data.co.uk.
//!
//! This library provides:
//! - `sources` / `fetch`: the yearly source catalogue and workbook decoding
//! - `record`: header-based mapping of worksheet rows onto match records
//! - `normalize`: the ordered row repairs (filters, defaults, odds imputation)
//! - `pairing`: winner/loser to Player 1/Player 2 relabelling and score strings
//! - `output`: final column projection and CSV writing
//! - `pipeline`: end-to-end orchestration used by the CLI
//!
//! Binaries:
//! - `atp-dataset`: fetches every season and writes `atp_tennis.csv`

pub mod cell;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod pairing;
pub mod pipeline;
pub mod record;
pub mod sources;

pub use cell::Cell;
pub use fetch::{DirectorySource, HttpSource, RawTable, TableSource};
pub use pipeline::{run_pipeline, PipelineConfig, RunSummary};
