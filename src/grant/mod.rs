use serde::{Deserialize, Serialize};

/// One funding agency / grant number pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    pub agency: String,
    pub code: String,
}

/// Decompose a funding field: `Agency A [code1, code2]; Agency B`
///
/// Each code of an agency becomes its own record; an agency without
/// codes yields one record with an empty code.
pub fn parse_grants(field: &str) -> Vec<GrantRecord> {
    let mut grants = Vec::new();

    for entry in field.split(';') {
        if entry.trim().is_empty() {
            continue;
        }
        let (agency, codes) = match entry.split_once('[') {
            Some((agency, codes)) => (agency.trim(), codes.replace(']', "")),
            None => (entry.trim(), String::new()),
        };

        let codes: Vec<&str> = codes
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();

        if codes.is_empty() {
            grants.push(GrantRecord {
                agency: agency.to_string(),
                code: String::new(),
            });
            continue;
        }
        grants.extend(codes.into_iter().map(|code| GrantRecord {
            agency: agency.to_string(),
            code: code.to_string(),
        }));
    }

    grants
}
