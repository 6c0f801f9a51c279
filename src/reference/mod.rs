mod kind;

pub use kind::ReferenceKind;

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // AUTHOR, YYYY, VENUE, V123, P45[, DOI ...]
    // One arbitrary character is allowed after each comma (normally a space).
    pub static ref JOURNAL_PATTERN: Regex = Regex::new(
        r",.\d{4},.*,.V\d+,.P\d+"
    ).unwrap();

    // AUTHOR, YYYY, ... Patent ...
    pub static ref PATENT_PATTERN: Regex = Regex::new(
        r",.\d{4},.*Patent"
    ).unwrap();

    // AUTHOR, YYYY, ...
    pub static ref YEAR_PATTERN: Regex = Regex::new(
        r",.\d{4},"
    ).unwrap();

    // Greedy prefix: the last ", V<digits>, P<digits>" pair in the string wins
    pub static ref VOLUME_PAGE_PATTERN: Regex = Regex::new(
        r"^.*,[ ]*V(\d+),[ ]*P(\d+)"
    ).unwrap();
}

/// A data-quality condition found while decomposing a citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQualityIssue {
    /// Classified as a journal citation but no volume/page pair was found.
    VolumePageNotFound,
}

/// One cited reference, classified and (for journals) decomposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub raw: String,
    pub kind: ReferenceKind,
    pub authors: String,
    pub year: String,
    pub venue: String,
    pub volume: String,
    pub page: String,
    pub doi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<DataQualityIssue>,
}

impl ReferenceRecord {
    fn bare(raw: &str, kind: ReferenceKind) -> Self {
        Self {
            raw: raw.to_string(),
            kind,
            authors: String::new(),
            year: String::new(),
            venue: String::new(),
            volume: String::new(),
            page: String::new(),
            doi: String::new(),
            issue: None,
        }
    }
}

/// Decide the kind of a citation string; the first matching rule wins.
pub fn reference_kind(raw: &str) -> ReferenceKind {
    if JOURNAL_PATTERN.is_match(raw) {
        ReferenceKind::Journal
    } else if PATENT_PATTERN.is_match(raw) {
        ReferenceKind::Patent
    } else if YEAR_PATTERN.is_match(raw) {
        ReferenceKind::Book
    } else {
        ReferenceKind::Invalid
    }
}

/// Classify one citation string and extract journal sub-fields.
pub fn classify_reference(raw: &str) -> ReferenceRecord {
    let kind = reference_kind(raw);
    if kind.is_decomposed() {
        decompose_journal(raw)
    } else {
        ReferenceRecord::bare(raw, kind)
    }
}

fn decompose_journal(raw: &str) -> ReferenceRecord {
    let mut record = ReferenceRecord::bare(raw, ReferenceKind::Journal);
    let segments: Vec<&str> = raw.split(',').collect();

    record.authors = segment(&segments, 0);
    record.year = segment(&segments, 1);
    if segments.len() >= 3 {
        record.venue = segment(&segments, 2);
    }

    match VOLUME_PAGE_PATTERN.captures(raw) {
        Some(caps) => {
            record.volume = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            record.page = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        }
        None => {
            warn!("Journal reference without volume/page: {}", raw);
            record.issue = Some(DataQualityIssue::VolumePageNotFound);
        }
    }

    if raw.contains("DOI ") {
        // The last comma segment is taken as the DOI, wherever the DOI really is.
        let last = segments.last().map(|s| s.trim()).unwrap_or_default();
        record.doi = last.strip_prefix("DOI").unwrap_or(last).trim().to_string();
    }

    record
}

fn segment(segments: &[&str], index: usize) -> String {
    segments
        .get(index)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Split a cited-reference field into trimmed, non-empty citation strings.
pub fn split_citation_list(field: &str) -> impl Iterator<Item = &str> {
    field.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// Classify every citation in a cited-reference field, in source order.
pub fn classify_citation_list(field: &str) -> Vec<ReferenceRecord> {
    split_citation_list(field).map(classify_reference).collect()
}
