//! Whole-record decomposition.
//!
//! A [`RawRecord`] is one row of an export file keyed by field tag;
//! [`decompose_record`] runs every field decomposer over it.

mod reader;

pub use reader::{discover_export_files, ExportReader};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::address::{
    country_token, links, split_affiliation_field, AddressGroup, AddressResolver,
    AuthorAddressLink, ResolvedAddress,
};
use crate::author::{parse_author_list, AuthorName};
use crate::grant::{parse_grants, GrantRecord};
use crate::reference::{classify_citation_list, ReferenceRecord};
use crate::reprint::{extract_reprint_authors, ReprintAuthorRecord};

/// Field tags of the export format.
pub mod tags {
    pub const TITLE: &str = "TI";
    pub const ABSTRACT: &str = "AB";
    pub const DOCUMENT_TYPE: &str = "DT";
    pub const PUB_YEAR: &str = "PY";
    pub const VOLUME: &str = "VL";
    pub const ISSUE: &str = "IS";
    pub const BEGIN_PAGE: &str = "BP";
    pub const END_PAGE: &str = "EP";
    pub const PAGE_COUNT: &str = "PG";
    pub const TIMES_CITED: &str = "TC";
    pub const TIMES_CITED_ALL: &str = "Z9";
    pub const LANGUAGE: &str = "LA";
    pub const DOI: &str = "DI";
    pub const CITED_COUNT: &str = "NR";
    pub const ISSN: &str = "SN";
    pub const SOURCE: &str = "SO";
    pub const SOURCE_ABBREV: &str = "J9";
    pub const ISO_ABBREV: &str = "JI";
    pub const AUTHORS: &str = "AU";
    pub const AUTHORS_FULL: &str = "AF";
    pub const AFFILIATIONS: &str = "C1";
    pub const REPRINT: &str = "RP";
    pub const REFERENCES: &str = "CR";
    pub const FUNDING: &str = "FU";
    pub const ACCESSION: &str = "UT";
    pub const KEYWORDS: &str = "DE";
    pub const KEYWORDS_PLUS: &str = "ID";
    pub const RESEARCH_AREAS: &str = "SC";
    pub const CATEGORIES: &str = "WC";
    pub const EMAILS: &str = "EM";
}

/// One export row: field tag to raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: &str, value: &str) {
        self.fields.insert(tag.to_string(), value.to_string());
    }

    /// The raw value of a field; empty when the tag is absent.
    pub fn get(&self, tag: &str) -> &str {
        self.fields.get(tag).map(String::as_str).unwrap_or_default()
    }

    /// Accession number without its source prefix (`WOS:000123` -> `000123`).
    pub fn record_id(&self) -> String {
        let ut = self.get(tags::ACCESSION).trim();
        match ut.split_once(':') {
            Some((_, id)) => id.trim().to_string(),
            None => ut.to_string(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (tag, value) in iter {
            record.insert(tag, value);
        }
        record
    }
}

/// Split a `;`-separated list field into trimmed, non-empty items.
pub fn split_list_field(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// A resolved address and the group it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLocation {
    pub group_sequence: usize,
    pub content_hash: String,
    pub location: ResolvedAddress,
}

/// Counts derived from the decomposed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub num_authors: usize,
    pub num_affiliations: usize,
    pub num_countries: usize,
    pub num_references: usize,
}

/// Bibliographic metadata of the paper, copied from single-valued fields,
/// together with the derived counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_type: String,
    pub pub_year: String,
    pub volume: String,
    pub issue: String,
    pub first_page: String,
    pub last_page: String,
    pub pages: String,
    pub cite_count: String,
    pub cite_count_all: String,
    pub language: String,
    pub doi: String,
    /// Cited-reference count as stated by the export.
    pub ref_count: String,
    pub issn: String,
    #[serde(flatten)]
    pub summary: RecordSummary,
}

/// The source the paper appeared in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub source: String,
    pub source_abbrev: String,
    pub iso_abbrev: String,
    pub issn: String,
    pub pub_year: String,
}

/// Everything derived from one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecomposedRecord {
    pub record_id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub item: ItemRecord,
    pub journal: JournalRecord,
    pub authors: Vec<AuthorName>,
    pub groups: Vec<AddressGroup>,
    pub links: Vec<AuthorAddressLink>,
    pub locations: Vec<GroupLocation>,
    pub references: Vec<ReferenceRecord>,
    pub reprint_authors: Vec<ReprintAuthorRecord>,
    pub grants: Vec<GrantRecord>,
    pub keywords: Vec<String>,
    pub keywords_plus: Vec<String>,
    pub research_areas: Vec<String>,
    pub categories: Vec<String>,
    pub emails: Vec<String>,
}

/// Run every field decomposer over one record.
pub fn decompose_record(raw: &RawRecord, resolver: &AddressResolver) -> DecomposedRecord {
    let mut authors = parse_author_list(raw.get(tags::AUTHORS_FULL));
    if authors.is_empty() {
        authors = parse_author_list(raw.get(tags::AUTHORS));
    }

    let groups = split_affiliation_field(raw.get(tags::AFFILIATIONS));
    let links = links(&groups);
    let locations = locate_groups(&groups, resolver);
    let references = classify_citation_list(raw.get(tags::REFERENCES));

    let summary = RecordSummary {
        num_authors: authors.len(),
        num_affiliations: links
            .iter()
            .map(|link| link.group_sequence)
            .collect::<BTreeSet<_>>()
            .len(),
        num_countries: links
            .iter()
            .map(|link| link.country.as_str())
            .filter(|country| !country.is_empty())
            .collect::<BTreeSet<_>>()
            .len(),
        num_references: references.len(),
    };

    let field = |tag: &str| raw.get(tag).trim().to_string();

    DecomposedRecord {
        record_id: raw.record_id(),
        title: field(tags::TITLE),
        abstract_text: field(tags::ABSTRACT),
        item: ItemRecord {
            item_type: field(tags::DOCUMENT_TYPE),
            pub_year: field(tags::PUB_YEAR),
            volume: field(tags::VOLUME),
            issue: field(tags::ISSUE),
            first_page: field(tags::BEGIN_PAGE),
            last_page: field(tags::END_PAGE),
            pages: field(tags::PAGE_COUNT),
            cite_count: field(tags::TIMES_CITED),
            cite_count_all: field(tags::TIMES_CITED_ALL),
            language: field(tags::LANGUAGE),
            doi: field(tags::DOI),
            ref_count: field(tags::CITED_COUNT),
            issn: field(tags::ISSN),
            summary,
        },
        journal: JournalRecord {
            source: field(tags::SOURCE),
            source_abbrev: field(tags::SOURCE_ABBREV),
            iso_abbrev: field(tags::ISO_ABBREV),
            issn: field(tags::ISSN),
            pub_year: field(tags::PUB_YEAR),
        },
        authors,
        groups,
        links,
        locations,
        references,
        reprint_authors: extract_reprint_authors(raw.get(tags::REPRINT), resolver),
        grants: parse_grants(raw.get(tags::FUNDING)),
        keywords: split_list_field(raw.get(tags::KEYWORDS)),
        keywords_plus: split_list_field(raw.get(tags::KEYWORDS_PLUS)),
        research_areas: split_list_field(raw.get(tags::RESEARCH_AREAS)),
        categories: split_list_field(raw.get(tags::CATEGORIES)),
        emails: split_list_field(raw.get(tags::EMAILS)),
    }
}

/// Resolve every group address whose country has heuristics.
fn locate_groups(groups: &[AddressGroup], resolver: &AddressResolver) -> Vec<GroupLocation> {
    groups
        .iter()
        .flat_map(|group| {
            group.addresses.iter().filter_map(move |address| {
                let location = resolver.resolve(&country_token(address), address)?;
                Some(GroupLocation {
                    group_sequence: group.sequence,
                    content_hash: crate::address::content_hash(address),
                    location,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceKind;

    fn sample() -> RawRecord {
        [
            ("UT", "WOS:000123456700001"),
            ("TI", "A study of things "),
            ("AB", "We study things."),
            ("DT", "Article"),
            ("PY", "2020"),
            ("VL", "12"),
            ("IS", "3"),
            ("BP", "100"),
            ("EP", "110"),
            ("PG", "11"),
            ("TC", "5"),
            ("Z9", "6"),
            ("LA", "English"),
            ("DI", "10.1000/xyz"),
            ("NR", "2"),
            ("SN", "0028-0836"),
            ("SO", "NATURE"),
            ("J9", "NATURE"),
            ("JI", "Nature"),
            ("AF", "Smith, John; Wang, Xiaoming; Lee, Kim"),
            ("AU", "Smith, J; Wang, X; Lee, K"),
            (
                "C1",
                "[Smith, John] Univ Calif Berkeley, Dept Phys, Berkeley, CA 94720 USA; \
                 [Wang, Xiaoming; Lee, Kim] Wuhan Univ, Sch Chem, Wuhan 430072, Hubei, Peoples R China",
            ),
            ("RP", "Smith, J (reprint author), Univ Calif Berkeley, Dept Phys, Berkeley, CA 94720 USA."),
            ("CR", "Smith J, 2020, NATURE, V580, P123; Jones A, 2019, US Patent 123456"),
            ("FU", "NSF [DMR-1]; NSFC [21373001, 21573002]"),
            ("DE", "graphene; catalysis; "),
            ("EM", "smith@berkeley.edu"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_record_id() {
        assert_eq!(sample().record_id(), "000123456700001");
        let bare: RawRecord = [("UT", "000999")].into_iter().collect();
        assert_eq!(bare.record_id(), "000999");
        assert_eq!(RawRecord::new().record_id(), "");
    }

    #[test]
    fn test_split_list_field() {
        assert_eq!(split_list_field("a; b ;; c;"), vec!["a", "b", "c"]);
        assert!(split_list_field("").is_empty());
    }

    #[test]
    fn test_decompose_record() {
        let record = decompose_record(&sample(), &AddressResolver::default());

        assert_eq!(record.record_id, "000123456700001");
        assert_eq!(record.title, "A study of things");
        assert_eq!(record.authors.len(), 3);
        assert_eq!(record.authors[1].surname, "Wang");

        assert_eq!(record.groups.len(), 2);
        assert_eq!(record.links.len(), 3);
        assert_eq!(record.links[2].author, "Lee, Kim");
        assert_eq!(record.links[2].group_sequence, 2);

        assert_eq!(record.locations.len(), 2);
        assert_eq!(record.locations[0].group_sequence, 1);
        assert_eq!(record.locations[0].location.state, "CA");
        assert_eq!(record.locations[1].location.state, "Hubei");
        assert_eq!(record.locations[1].location.zip, "430072");

        assert_eq!(record.references.len(), 2);
        assert_eq!(record.references[1].kind, ReferenceKind::Patent);
        assert_eq!(record.reprint_authors.len(), 1);
        assert_eq!(record.grants.len(), 3);
        assert_eq!(record.keywords, vec!["graphene", "catalysis"]);
        assert_eq!(record.emails, vec!["smith@berkeley.edu"]);

        assert_eq!(record.abstract_text, "We study things.");
        assert_eq!(record.item.item_type, "Article");
        assert_eq!(record.item.first_page, "100");
        assert_eq!(record.item.cite_count_all, "6");
        assert_eq!(record.item.doi, "10.1000/xyz");
        assert_eq!(record.item.issn, "0028-0836");
        assert_eq!(
            record.item.summary,
            RecordSummary {
                num_authors: 3,
                num_affiliations: 2,
                num_countries: 2,
                num_references: 2,
            }
        );
        assert_eq!(
            record.journal,
            JournalRecord {
                source: "NATURE".to_string(),
                source_abbrev: "NATURE".to_string(),
                iso_abbrev: "Nature".to_string(),
                issn: "0028-0836".to_string(),
                pub_year: "2020".to_string(),
            }
        );
    }

    #[test]
    fn test_item_serializes_counts_inline() {
        let record = decompose_record(&sample(), &AddressResolver::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["item"]["num_authors"], 3);
        assert_eq!(json["item"]["pub_year"], "2020");
        assert_eq!(json["abstract"], "We study things.");
    }

    #[test]
    fn test_short_author_fallback() {
        let raw: RawRecord = [("AU", "Smith, J; Doe, A")].into_iter().collect();
        let record = decompose_record(&raw, &AddressResolver::default());
        assert_eq!(record.authors.len(), 2);
        assert_eq!(record.authors[1].given_name, "A");
    }

    #[test]
    fn test_empty_record() {
        let record = decompose_record(&RawRecord::new(), &AddressResolver::default());
        assert!(record.links.is_empty());
        assert!(record.references.is_empty());
        assert!(record.reprint_authors.is_empty());
        assert_eq!(record.item, ItemRecord::default());
        assert_eq!(record.journal, JournalRecord::default());
    }
}
