//! ATP Dataset - Build the consolidated ATP match file
//!
//! Downloads every yearly tennis-data.co.uk workbook (or reads them from a
//! local directory), normalizes the rows and writes one CSV in which the
//! winner is Player 1 on even rows and Player 2 on odd rows.

use anyhow::Result;
use atp_tennis_dataset::pipeline::{run_pipeline, FetchProgress, PipelineConfig};
use atp_tennis_dataset::sources::{sources_for_years, DEFAULT_BASE_URL, FIRST_YEAR, LAST_YEAR};
use atp_tennis_dataset::{DirectorySource, HttpSource, TableSource};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "atp-dataset")]
#[command(about = "Build a consolidated ATP match dataset from tennis-data.co.uk spreadsheets")]
struct Cli {
    /// Output CSV file
    #[arg(short, long, default_value = "atp_tennis.csv")]
    output: PathBuf,

    /// First season to include
    #[arg(long, default_value_t = FIRST_YEAR)]
    first_year: u16,

    /// Last season to include
    #[arg(long, default_value_t = LAST_YEAR)]
    last_year: u16,

    /// Read <year>.<ext> files from this directory instead of downloading
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Base URL of the yearly files
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Append Odd_1_Source/Odd_2_Source columns showing how each odds value was obtained
    #[arg(long)]
    odds_provenance: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = PipelineConfig {
        output: cli.output,
        sources: sources_for_years(cli.first_year, cli.last_year)?,
        odds_provenance: cli.odds_provenance,
    };

    println!(
        "Building ATP dataset {}-{}...",
        cli.first_year, cli.last_year
    );

    let summary = match &cli.source_dir {
        Some(dir) => run(&config, &mut DirectorySource::new(dir))?,
        None => run(&config, &mut HttpSource::new(&cli.base_url)?)?,
    };

    println!();
    println!("{}", summary);
    Ok(())
}

fn run(
    config: &PipelineConfig,
    source: &mut impl TableSource,
) -> Result<atp_tennis_dataset::RunSummary> {
    run_pipeline(config, source, |p: &FetchProgress| {
        println!(
            "  [{:>2}/{}] {} fetched ({} rows so far)",
            p.completed, p.total, p.year, p.rows
        );
    })
}
