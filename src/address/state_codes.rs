use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// USPS codes: states, DC, territories and military mail codes.
const BUILTIN_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "AS", "GU", "MP", "PR", "VI", "UM", "AA", "AE", "AP",
];

/// Lookup table of recognized two-letter USA state codes.
///
/// Loaded once before any address resolution and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct StateCodes {
    codes: HashSet<String>,
}

impl StateCodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        BUILTIN_STATE_CODES.iter().copied().collect()
    }

    /// Load codes from a `postcode_usa.csv`-style file (code in the second column).
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open state code table: {}", path.display()))?;
        let codes = Self::from_csv_reader(file)
            .with_context(|| format!("Failed to read state code table: {}", path.display()))?;
        info!("Loaded {} state codes from {}", codes.len(), path.display());
        Ok(codes)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut codes = Self::new();
        for (line_no, line) in BufReader::new(reader).lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
            match line.trim().split(',').nth(1) {
                Some(code) if !code.trim().is_empty() => codes.insert(code.trim()),
                _ => debug!("Skipping state code line {}: {:?}", line_no + 1, line),
            }
        }
        Ok(codes)
    }

    pub fn insert(&mut self, code: &str) {
        self.codes.insert(code.to_string());
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for StateCodes {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().map(String::from).collect(),
        }
    }
}
