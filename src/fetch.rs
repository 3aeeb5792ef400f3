//! Source fetching and workbook decoding
//!
//! Each yearly source resolves to a spreadsheet, optionally packed in a zip
//! archive. The first worksheet is decoded into a [`RawTable`]: the first row
//! supplies the header names, every following row becomes a row of [`Cell`]s.

use crate::cell::Cell;
use crate::sources::{Source, SourceKind};
use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::{Cursor, Read};
use std::path::PathBuf;

/// A decoded worksheet: header names plus rows of cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Index of the column with this header name, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Anything that can produce the raw table for a yearly source.
pub trait TableSource {
    fn fetch(&mut self, source: &Source) -> Result<RawTable>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Downloads sources over HTTP with a blocking client.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("atp-tennis-dataset/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

impl TableSource for HttpSource {
    fn fetch(&mut self, source: &Source) -> Result<RawTable> {
        let url = source.url(&self.base_url);
        log::info!("Downloading {}", url);

        let bytes = self
            .client
            .get(&url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .with_context(|| format!("Failed to download {}", url))?
            .bytes()
            .with_context(|| format!("Failed to read response body from {}", url))?;

        decode_source(source.kind, bytes.to_vec())
            .with_context(|| format!("Failed to decode {} ({})", source.file_name(), url))
    }
}

// ============================================================================
// Local directory
// ============================================================================

/// Reads previously downloaded files named `<year>.<ext>` from a directory.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TableSource for DirectorySource {
    fn fetch(&mut self, source: &Source) -> Result<RawTable> {
        let path = self.dir.join(source.file_name());
        log::info!("Reading {}", path.display());

        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        decode_source(source.kind, bytes)
            .with_context(|| format!("Failed to decode {}", path.display()))
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode the raw bytes of a source into its first worksheet.
pub fn decode_source(kind: SourceKind, bytes: Vec<u8>) -> Result<RawTable> {
    let workbook = match kind {
        SourceKind::Zip => read_first_zip_entry(&bytes)?,
        SourceKind::Xls | SourceKind::Xlsx => bytes,
    };
    read_workbook(workbook)
}

/// Extract the first entry of a zip archive.
pub fn read_first_zip_entry(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("Failed to open zip archive")?;
    if archive.len() == 0 {
        bail!("Zip archive has no entries");
    }

    let mut entry = archive
        .by_index(0)
        .context("Failed to open first zip entry")?;
    log::debug!("Using zip entry '{}'", entry.name());

    let mut out = Vec::with_capacity(capacity_hint(entry.size()));
    entry
        .read_to_end(&mut out)
        .context("Failed to extract zip entry")?;
    Ok(out)
}

/// Largest buffer reserved up front from an archive's declared entry size.
const MAX_CAPACITY_HINT: u64 = 64 * 1024 * 1024;

fn capacity_hint(declared: u64) -> usize {
    declared.min(MAX_CAPACITY_HINT) as usize
}

/// Decode an xls/xlsx workbook held in memory.
pub fn read_workbook(bytes: Vec<u8>) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("Failed to open workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no worksheets"))?
        .context("Failed to read first worksheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| c.to_string().trim().to_string())
            .collect(),
        None => return Ok(RawTable::default()),
    };

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    log::debug!("Decoded worksheet: {} columns, {} rows", headers.len(), rows.len());
    Ok(RawTable::new(headers, rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::String(s) => Cell::text(s),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Cell::Date(ndt.date()),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) => parse_iso_date(s).map_or_else(|| Cell::text(s), Cell::Date),
        Data::DurationIso(s) => Cell::text(s),
    }
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::io::Write;

    fn sample_xlsx() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Tournament").unwrap();
        sheet.write_string(0, 1, "WRank").unwrap();
        sheet.write_string(0, 2, "B365W").unwrap();
        sheet.write_string(1, 0, "Australian Open").unwrap();
        sheet.write_number(1, 1, 4.0).unwrap();
        sheet.write_string(1, 2, "N/A").unwrap();
        sheet.write_string(2, 0, "Doha").unwrap();
        sheet.write_string(2, 1, "NR").unwrap();
        sheet.write_number(2, 2, 1.36).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    fn zipped(name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(bytes).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_workbook() {
        let table = read_workbook(sample_xlsx()).unwrap();
        assert_eq!(table.headers, vec!["Tournament", "WRank", "B365W"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("Australian Open".to_string()));
        assert_eq!(table.rows[0][1], Cell::Number(4.0));
        assert_eq!(table.rows[0][2], Cell::Empty);
        assert_eq!(table.rows[1][1], Cell::Text("NR".to_string()));
        assert_eq!(table.rows[1][2], Cell::Number(1.36));
        assert_eq!(table.column("B365W"), Some(2));
        assert_eq!(table.column("B365L"), None);
    }

    #[test]
    fn test_decode_zip_source() {
        let archive = zipped("2008.xlsx", &sample_xlsx());
        let table = decode_source(SourceKind::Zip, archive).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.headers[0], "Tournament");
    }

    #[test]
    fn test_empty_zip_is_an_error() {
        let zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let archive = zip.finish().unwrap().into_inner();
        assert!(read_first_zip_entry(&archive).is_err());
    }

    #[test]
    fn test_capacity_hint_is_capped() {
        assert_eq!(capacity_hint(4096), 4096);
        assert_eq!(capacity_hint(u64::MAX), 64 * 1024 * 1024);
    }

    #[test]
    fn test_garbage_workbook_is_an_error() {
        assert!(read_workbook(b"not a spreadsheet".to_vec()).is_err());
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2013.xlsx"), sample_xlsx()).unwrap();

        let mut source = DirectorySource::new(dir.path());
        let table = source.fetch(&Source::new(2013)).unwrap();
        assert_eq!(table.len(), 2);

        let missing = source.fetch(&Source::new(2014)).unwrap_err();
        assert!(missing.to_string().contains("2014.xlsx"));
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2019-07-01T00:00:00"),
            NaiveDate::from_ymd_opt(2019, 7, 1)
        );
        assert_eq!(parse_iso_date("2019-07-01"), NaiveDate::from_ymd_opt(2019, 7, 1));
        assert_eq!(parse_iso_date("01/07/2019"), None);
    }
}
