//! Catalogue of yearly result files published by tennis-data.co.uk

use anyhow::{bail, Result};

pub const DEFAULT_BASE_URL: &str = "http://tennis-data.co.uk";
pub const FIRST_YEAR: u16 = 2000;
pub const LAST_YEAR: u16 = 2025;

/// Container format of a yearly file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Legacy Excel workbook
    Xls,
    /// Office Open XML workbook
    Xlsx,
    /// Zip archive whose first entry is a workbook
    Zip,
}

impl SourceKind {
    /// Format used by the publisher for a given season.
    pub fn for_year(year: u16) -> Self {
        match year {
            2008 => SourceKind::Zip,
            y if y <= 2012 => SourceKind::Xls,
            _ => SourceKind::Xlsx,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SourceKind::Xls => "xls",
            SourceKind::Xlsx => "xlsx",
            SourceKind::Zip => "zip",
        }
    }
}

/// One yearly result file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub year: u16,
    pub kind: SourceKind,
}

impl Source {
    pub fn new(year: u16) -> Self {
        Self {
            year,
            kind: SourceKind::for_year(year),
        }
    }

    /// File name as published, e.g. `2008.zip`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.year, self.kind.extension())
    }

    /// Download location under `base_url`, e.g. `http://tennis-data.co.uk/2013/2013.xlsx`
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.year,
            self.file_name()
        )
    }
}

/// Sources for `first..=last`, in chronological order.
///
/// Row order in the merged table follows this order, so the result must stay
/// sorted by year.
pub fn sources_for_years(first: u16, last: u16) -> Result<Vec<Source>> {
    if first > last {
        bail!("First year {} is after last year {}", first, last);
    }
    Ok((first..=last).map(Source::new).collect())
}

/// The full 2000-2025 catalogue.
pub fn default_sources() -> Vec<Source> {
    (FIRST_YEAR..=LAST_YEAR).map(Source::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_year() {
        assert_eq!(SourceKind::for_year(2000), SourceKind::Xls);
        assert_eq!(SourceKind::for_year(2007), SourceKind::Xls);
        assert_eq!(SourceKind::for_year(2008), SourceKind::Zip);
        assert_eq!(SourceKind::for_year(2012), SourceKind::Xls);
        assert_eq!(SourceKind::for_year(2013), SourceKind::Xlsx);
        assert_eq!(SourceKind::for_year(2025), SourceKind::Xlsx);
    }

    #[test]
    fn test_url() {
        assert_eq!(
            Source::new(2008).url(DEFAULT_BASE_URL),
            "http://tennis-data.co.uk/2008/2008.zip"
        );
        assert_eq!(
            Source::new(2013).url("https://mirror.example/"),
            "https://mirror.example/2013/2013.xlsx"
        );
    }

    #[test]
    fn test_default_sources() {
        let sources = default_sources();
        assert_eq!(sources.len(), 26);
        assert_eq!(sources[0].year, 2000);
        assert_eq!(sources[25].year, 2025);
        assert!(sources.windows(2).all(|w| w[0].year < w[1].year));
    }

    #[test]
    fn test_sources_for_years() {
        let sources = sources_for_years(2010, 2012).unwrap();
        let years: Vec<u16> = sources.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![2010, 2011, 2012]);
        assert!(sources_for_years(2012, 2010).is_err());
    }
}
