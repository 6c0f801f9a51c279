//! Reprint / corresponding-author extraction.
//!
//! The reprint field reads
//! `Surname, G (reprint author), Inst, Dept, City, ST 00000 USA.`, possibly
//! several times over and with `;`-separated co-authors sharing one address.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::address::{split_into_links, AddressResolver, ResolvedAddress};
use crate::author::parse_author_name;

lazy_static! {
    // Shortest span holding one marker, ending at the next ';'
    static ref REPRINT_CHUNK: Regex = Regex::new(r"(.*?\(reprint author\).*?);").unwrap();
    static ref CORRESPONDING_CHUNK: Regex = Regex::new(r"(.*?\(corresponding author\).*?);").unwrap();
}

/// The phrase marking a contact author in the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReprintMarker {
    Reprint,
    Corresponding,
}

impl ReprintMarker {
    /// Markers in the order they are tried.
    pub const ALL: [ReprintMarker; 2] = [ReprintMarker::Reprint, ReprintMarker::Corresponding];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReprintMarker::Reprint => "(reprint author)",
            ReprintMarker::Corresponding => "(corresponding author)",
        }
    }

    fn chunk_pattern(&self) -> &'static Regex {
        match self {
            ReprintMarker::Reprint => &*REPRINT_CHUNK,
            ReprintMarker::Corresponding => &*CORRESPONDING_CHUNK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReprintAuthorRecord {
    pub sequence: usize,
    pub name: String,
    pub surname: String,
    pub given_name: String,
    pub middle_name: String,
    pub address: String,
    pub country: String,
    pub content_hash: String,
    pub marker: ReprintMarker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ResolvedAddress>,
}

/// Extract reprint authors, falling back to corresponding authors.
///
/// The two marker vocabularies are never mixed in one result.
pub fn extract_reprint_authors(raw: &str, resolver: &AddressResolver) -> Vec<ReprintAuthorRecord> {
    for marker in ReprintMarker::ALL {
        let records = extract_with_marker(raw, marker, resolver);
        if !records.is_empty() {
            return records;
        }
    }
    if !raw.trim().is_empty() {
        debug!("No reprint or corresponding author found in {:?}", raw);
    }
    Vec::new()
}

/// Extract entries for one marker; empty when the marker does not occur.
pub fn extract_with_marker(
    raw: &str,
    marker: ReprintMarker,
    resolver: &AddressResolver,
) -> Vec<ReprintAuthorRecord> {
    let chunks: Vec<String> = match raw.matches(marker.as_str()).count() {
        0 => return Vec::new(),
        1 => vec![raw.to_string()],
        _ => {
            let padded = format!("{};", raw);
            marker
                .chunk_pattern()
                .captures_iter(&padded)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .collect()
        }
    };

    let mut records = Vec::new();
    for chunk in &chunks {
        let next_sequence = records.len() + 1;
        records.extend(chunk_records(chunk, marker, next_sequence, resolver));
    }
    records
}

fn chunk_records(
    chunk: &str,
    marker: ReprintMarker,
    first_sequence: usize,
    resolver: &AddressResolver,
) -> Vec<ReprintAuthorRecord> {
    let names = name_list(chunk, marker.as_str());
    let address = chunk_address(chunk, marker.as_str());

    let first_link = split_into_links(&address).into_iter().next();
    let (country, content_hash, location) = match first_link {
        Some(link) => {
            let location = resolver.resolve(&link.country, &link.address);
            (link.country, link.content_hash, location)
        }
        None => {
            debug!("Reprint address did not resolve: {:?}", chunk);
            (String::new(), String::new(), None)
        }
    };

    names
        .split(';')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .enumerate()
        .map(|(i, name)| {
            let parts = parse_author_name(name);
            ReprintAuthorRecord {
                sequence: first_sequence + i,
                name: name.to_string(),
                surname: parts.surname,
                given_name: parts.given_name,
                middle_name: parts.middle_name,
                address: address.clone(),
                country: country.clone(),
                content_hash: content_hash.clone(),
                marker,
                location: location.clone(),
            }
        })
        .collect()
}

/// Text before `<marker>,`, or before the bare marker when no comma follows it.
fn name_list<'a>(chunk: &'a str, marker: &str) -> &'a str {
    let end = chunk
        .find(&format!("{},", marker))
        .or_else(|| chunk.find(marker))
        .unwrap_or(chunk.len());
    chunk[..end].trim()
}

/// Text after the marker (up to any repeated marker), without leading
/// separators or one trailing period.
fn chunk_address(chunk: &str, marker: &str) -> String {
    let Some(start) = chunk.find(marker) else {
        return String::new();
    };
    let after = &chunk[start + marker.len()..];
    let after = after.split(marker).next().unwrap_or_default();
    let address = after
        .trim()
        .trim_start_matches([',', '|', ' ']);
    address.strip_suffix('.').unwrap_or(address).trim_end().to_string()
}
