//! Author name decomposition.
//!
//! Names in export records are written `Surname, Given` or
//! `Surname, Middle, Given`; the same rule applies to the full-author
//! field and to reprint authors.

use serde::{Deserialize, Serialize};

/// The parts of one comma-written author name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameParts {
    pub surname: String,
    pub given_name: String,
    pub middle_name: String,
}

/// One entry of the full-author field, numbered in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorName {
    pub sequence: usize,
    pub name: String,
    pub surname: String,
    pub given_name: String,
    pub middle_name: String,
}

/// Surname before the first comma, given name after the last comma,
/// middle name after the first comma when there are three or more parts.
pub fn parse_author_name(name: &str) -> NameParts {
    let parts: Vec<&str> = name.split(',').map(str::trim).collect();
    let surname = parts.first().copied().unwrap_or_default().to_string();
    let given_name = if parts.len() > 1 {
        parts.last().copied().unwrap_or_default().to_string()
    } else {
        String::new()
    };
    let middle_name = if parts.len() >= 3 {
        parts[1].to_string()
    } else {
        String::new()
    };
    NameParts {
        surname,
        given_name,
        middle_name,
    }
}

/// Split the full-author field on `;` and number the authors from 1.
pub fn parse_author_list(field: &str) -> Vec<AuthorName> {
    field
        .split(';')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .enumerate()
        .map(|(i, name)| {
            let parts = parse_author_name(name);
            AuthorName {
                sequence: i + 1,
                name: name.to_string(),
                surname: parts.surname,
                given_name: parts.given_name,
                middle_name: parts.middle_name,
            }
        })
        .collect()
}
