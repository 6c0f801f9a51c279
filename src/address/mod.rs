//! Affiliation field decomposition.
//!
//! An affiliation field is either bracket-structured
//! (`[Author1; Author2] Addr1; Addr2 [Author3] Addr3`) or a flat
//! `"; "`-separated address list. Splitting yields ordered
//! [`AddressGroup`]s; [`links`] expands them into author/address pairs.

pub mod resolver;
pub mod segments;
pub mod state_codes;

pub use resolver::{AddressResolver, ResolvedAddress};
pub use state_codes::StateCodes;

use lazy_static::lazy_static;
use log::debug;
use md5::{Digest, Md5};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const USA: &str = "USA";
pub const CHINA: &str = "Peoples R China";

lazy_static! {
    /// A bracket group with another complete bracket inside it: `[a [b] c]`
    static ref NESTED_BRACKET: Regex = Regex::new(r"\[[^\[]+?\[[^\[]+?\][^\[]*?\]").unwrap();

    /// The first complete bracket pair inside a nested match
    static ref INNER_BRACKET: Regex = Regex::new(r"\[[^\[]+?\]").unwrap();
}

/// How a group was found in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// One address of a field without brackets; no author side.
    Flat,
    /// A complete `[authors] addresses` segment.
    Bracketed,
    /// A bracket segment with no closing `]`: a bare author name.
    Truncated,
}

/// One bracket-delimited (or implicit) cluster of authors and addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressGroup {
    pub sequence: usize,
    pub authors: Vec<String>,
    pub addresses: Vec<String>,
    pub kind: GroupKind,
}

/// One author paired with one address of the same group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorAddressLink {
    pub author: String,
    pub address: String,
    pub group_sequence: usize,
    pub country: String,
    pub content_hash: String,
}

impl AuthorAddressLink {
    fn new(author: &str, address: &str, group_sequence: usize) -> Self {
        Self {
            author: author.to_string(),
            address: address.to_string(),
            group_sequence,
            country: country_token(address),
            content_hash: content_hash(address),
        }
    }

    fn unaddressed(author: &str, group_sequence: usize) -> Self {
        Self {
            author: author.to_string(),
            address: String::new(),
            group_sequence,
            country: String::new(),
            content_hash: String::new(),
        }
    }
}

/// Map any country token ending in "USA" (e.g. "Washington DC USA") to "USA".
pub fn normalize_country(country: &str) -> String {
    let country = country.trim();
    if country.ends_with(USA) {
        USA.to_string()
    } else {
        country.to_string()
    }
}

/// The text after the final comma of an address, normalized.
pub fn country_token(address: &str) -> String {
    let tail = address.rsplit(',').next().unwrap_or_default();
    normalize_country(tail)
}

/// Lowercase hex MD5 over the cleaned address string.
pub fn content_hash(address: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(address.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Strip stray `;` and `|` characters and surrounding whitespace.
pub fn clean_address(address: &str) -> String {
    address
        .chars()
        .filter(|c| *c != ';' && *c != '|')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Flatten brackets nested inside another bracket group, until none remain.
///
/// `[Wang, X [Liu, Y]] Addr` becomes `[Wang, X Liu, Y] Addr`.
pub fn normalize_nested_brackets(field: &str) -> String {
    let mut field = field.to_string();
    while let Some(outer) = NESTED_BRACKET.find(&field) {
        let range = outer.range();
        let mut flattened = outer.as_str().to_string();
        // The nested match always contains a complete inner pair.
        let Some(inner) = INNER_BRACKET.find(outer.as_str()) else {
            break;
        };
        flattened.replace_range(inner.range(), &inner.as_str().replace(['[', ']'], ""));
        field.replace_range(range, &flattened);
    }
    field
}

/// Split a raw affiliation field into ordered address groups.
pub fn split_affiliation_field(field: &str) -> Vec<AddressGroup> {
    if field.trim().is_empty() {
        return Vec::new();
    }
    let field = normalize_nested_brackets(field);
    if field.contains('[') {
        split_bracketed(&field)
    } else {
        split_flat(&field)
    }
}

fn split_flat(field: &str) -> Vec<AddressGroup> {
    field
        .split("; ")
        .map(clean_address)
        .filter(|address| !address.is_empty())
        .enumerate()
        .map(|(i, address)| AddressGroup {
            sequence: i + 1,
            authors: Vec::new(),
            addresses: vec![address],
            kind: GroupKind::Flat,
        })
        .collect()
}

fn split_bracketed(field: &str) -> Vec<AddressGroup> {
    let mut groups = Vec::new();
    let mut sequence = 1;

    for segment in field.split('[').skip(1) {
        match segment.split_once(']') {
            Some((author_text, address_text)) => {
                let authors = author_text
                    .split(';')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect();
                let addresses = address_text
                    .split(';')
                    .map(clean_address)
                    .filter(|a| !a.is_empty())
                    .collect();
                groups.push(AddressGroup {
                    sequence,
                    authors,
                    addresses,
                    kind: GroupKind::Bracketed,
                });
                sequence += 1;
            }
            None => {
                debug!("Bracket segment without closing ']': {:?}", segment);
                let name = segment.trim();
                groups.push(AddressGroup {
                    sequence,
                    authors: if name.is_empty() { Vec::new() } else { vec![name.to_string()] },
                    addresses: Vec::new(),
                    kind: GroupKind::Truncated,
                });
            }
        }
    }
    groups
}

/// Expand groups into author/address links, in group order, address-major.
pub fn links(groups: &[AddressGroup]) -> Vec<AuthorAddressLink> {
    let mut links = Vec::new();
    for group in groups {
        match group.kind {
            GroupKind::Flat => links.extend(
                group
                    .addresses
                    .iter()
                    .map(|address| AuthorAddressLink::new("", address, group.sequence)),
            ),
            GroupKind::Truncated => links.extend(
                group
                    .authors
                    .iter()
                    .map(|author| AuthorAddressLink::unaddressed(author, group.sequence)),
            ),
            GroupKind::Bracketed => {
                for address in &group.addresses {
                    for author in &group.authors {
                        links.push(AuthorAddressLink::new(author, address, group.sequence));
                    }
                }
            }
        }
    }
    links
}

/// Split a field and expand it into links in one step.
pub fn split_into_links(field: &str) -> Vec<AuthorAddressLink> {
    links(&split_affiliation_field(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_field_numbers_addresses() {
        let groups = split_affiliation_field(
            "Univ A, Dept X, Boston, MA 02115 USA; Univ B, Paris, France",
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].sequence, 1);
        assert_eq!(groups[1].sequence, 2);
        assert!(groups[0].authors.is_empty());
        assert_eq!(groups[0].kind, GroupKind::Flat);
        assert_eq!(groups[1].addresses, vec!["Univ B, Paris, France"]);
    }

    #[test]
    fn test_flat_field_keeps_unattributed_addresses() {
        let links = split_into_links("Univ A, Boston, MA 02115 USA; Univ B, Paris, France");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].author, "");
        assert_eq!(links[0].country, "USA");
        assert_eq!(links[1].country, "France");
        assert_eq!(links[1].group_sequence, 2);
    }

    #[test]
    fn test_flat_field_skips_empty_addresses() {
        let groups = split_affiliation_field("Univ A, France; ; Univ B, Spain");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].sequence, 2);
        assert_eq!(groups[1].addresses, vec!["Univ B, Spain"]);
    }

    #[test]
    fn test_bracketed_groups_cross_product() {
        let field = "[Smith, J; Doe, A] Univ A, Boston, MA 02115 USA; Univ B, Paris, France \
                     [Lee, K] Univ C, Seoul, South Korea";
        let groups = split_affiliation_field(field);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].authors, vec!["Smith, J", "Doe, A"]);
        assert_eq!(groups[0].addresses.len(), 2);
        assert_eq!(groups[1].sequence, 2);

        let links = links(&groups);
        assert_eq!(links.len(), 2 * 2 + 1);
        assert_eq!(links[0].author, "Smith, J");
        assert_eq!(links[0].country, "USA");
        assert_eq!(links[1].author, "Doe, A");
        assert_eq!(links[2].country, "France");
        assert_eq!(links[4].author, "Lee, K");
        assert_eq!(links[4].group_sequence, 2);
        assert_eq!(links[4].country, "South Korea");
    }

    #[test]
    fn test_bracketed_group_with_empty_side_yields_no_links() {
        let groups = split_affiliation_field("[ ] Univ A, Paris, France [Lee, K] ");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].sequence, 2);
        assert!(links(&groups).is_empty());
    }

    #[test]
    fn test_truncated_bracket_keeps_author() {
        let groups = split_affiliation_field("[Smith, J] Univ A, Paris, France [Doe, A");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].kind, GroupKind::Truncated);
        assert_eq!(groups[1].sequence, 2);

        let links = links(&groups);
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].author, "Doe, A");
        assert!(links[1].address.is_empty());
        assert!(links[1].content_hash.is_empty());
    }

    #[test]
    fn test_nested_bracket_is_flattened() {
        let fixed = normalize_nested_brackets("[Wang, X [Liu, Y]] Univ A, Beijing, Peoples R China");
        assert_eq!(fixed, "[Wang, X Liu, Y] Univ A, Beijing, Peoples R China");

        let groups = split_affiliation_field("[Wang, X; [Liu, Y]] Univ A, Beijing, Peoples R China");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].authors, vec!["Wang, X", "Liu, Y"]);
    }

    #[test]
    fn test_repeated_nesting_is_flattened() {
        let fixed = normalize_nested_brackets("[A [B]] X [C [D]] Y");
        assert_eq!(fixed, "[A B] X [C D] Y");
        assert_eq!(normalize_nested_brackets("[A] X"), "[A] X");
    }

    #[test]
    fn test_address_cleaning() {
        assert_eq!(clean_address(" Univ A | Dept, Paris, France "), "Univ A  Dept, Paris, France");
        let groups = split_affiliation_field("[Smith, J] Univ A, Paris, France|");
        assert_eq!(groups[0].addresses, vec!["Univ A, Paris, France"]);
    }

    #[test]
    fn test_country_normalization() {
        assert_eq!(country_token("Howard Univ, Washington DC USA"), "USA");
        assert_eq!(country_token("Univ Tokyo, Tokyo, Japan"), "Japan");
        assert_eq!(country_token("No comma"), "No comma");
        assert_eq!(normalize_country(" Peoples R China "), "Peoples R China");
    }

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash("Univ A, Paris, France");
        assert_eq!(a, content_hash("Univ A, Paris, France"));
        assert_ne!(a, content_hash("Univ A, Paris, Francf"));
        assert_eq!(a.len(), 32);
        assert_eq!(content_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_empty_field() {
        assert!(split_affiliation_field("").is_empty());
        assert!(split_into_links("   ").is_empty());
    }
}
