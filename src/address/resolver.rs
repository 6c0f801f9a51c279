use serde::{Deserialize, Serialize};

use super::segments::{
    collapse_spaces, contains_digit, first_digit_run, whitespace_count, Segments,
};
use super::state_codes::StateCodes;
use super::{normalize_country, CHINA, USA};

/// Province and municipality names, in match order.
const CHINESE_PROVINCES: &[&str] = &[
    "Beijing", "Tianjin", "Shanghai", "Chongqing",
    "Hebei", "Henan", "Yunnan", "Liaoning", "Heilongjiang",
    "Hunan", "Anhui", "Shandong", "Xinjiang", "Jiangsu",
    "Zhejiang", "Jiangxi", "Hubei", "Guangxi", "Gansu",
    "Shanxi", "Inner Mongolia", "Shaanxi", "Jilin", "Fujian",
    "Guizhou", "Guangdong", "Qinghai", "Tibet", "Sichuan",
    "Ningxia", "Hainan", "Hong Kong", "Macao",
];

/// Province-level names that are also the city.
const MUNICIPALITIES: &[&str] = &[
    "Beijing", "Tianjin", "Shanghai", "Chongqing", "Hong Kong", "Macao",
];

/// Structured location fields for one raw address.
///
/// Fields the heuristics could not determine are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub raw: String,
    pub country: String,
    /// State code (USA) or province name (China).
    pub state: String,
    pub city: String,
    pub zip: String,
}

impl ResolvedAddress {
    fn unresolved(raw: &str, country: &str) -> Self {
        Self {
            raw: raw.to_string(),
            country: country.to_string(),
            ..Self::default()
        }
    }

    fn is_settled_china(&self) -> bool {
        !self.city.is_empty() || !self.zip.is_empty() || is_municipality(&self.state)
    }
}

/// Country-specific address heuristics.
///
/// Only USA and "Peoples R China" addresses are resolved; every other
/// country yields `None`.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    state_codes: StateCodes,
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new(StateCodes::builtin())
    }
}

impl AddressResolver {
    pub fn new(state_codes: StateCodes) -> Self {
        Self { state_codes }
    }

    pub fn supports(country: &str) -> bool {
        let country = normalize_country(country);
        country == USA || country == CHINA
    }

    pub fn resolve(&self, country: &str, address: &str) -> Option<ResolvedAddress> {
        match normalize_country(country).as_str() {
            USA => Some(self.resolve_usa(address)),
            CHINA => Some(resolve_china(address)),
            _ => None,
        }
    }

    fn resolve_usa(&self, address: &str) -> ResolvedAddress {
        let mut resolved = ResolvedAddress::unresolved(address, USA);
        if !address.ends_with(USA) {
            return resolved;
        }

        let segments = Segments::split(address, ",");
        let last = segments.trimmed_from_end(1).unwrap_or_default();
        let tokens: Vec<&str> = last.split_whitespace().collect();

        if contains_digit(last) {
            // "<STATE> <ZIP> USA", or "<STATE> <ZIP> <EXT> USA"
            resolved.city = trimmed_owned(segments.trimmed_from_end(2));
            resolved.state = first_token(&tokens);
            resolved.country = last_token(&tokens);
            resolved.zip = match tokens.len() {
                0..=2 => String::new(),
                3 => tokens[1].to_string(),
                _ => format!("{}{}", tokens[1], tokens[2]),
            };
        } else if last != USA {
            resolved.state = first_token(&tokens);
            resolved.country = last_token(&tokens);
            resolved.city = trimmed_owned(segments.trimmed_from_end(2));
        } else {
            let state_segment = segments.trimmed_from_end(2).unwrap_or_default();
            if self.state_codes.contains(state_segment) {
                resolved.state = state_segment.to_string();
            } else {
                let words: Vec<&str> = state_segment.split_whitespace().collect();
                resolved.state = first_token(&words);
                if words.len() >= 2 {
                    resolved.country = last_token(&words);
                }
            }
            resolved.city = trimmed_owned(segments.trimmed_from_end(3));
        }

        resolved.country = normalize_country(&resolved.country);
        resolved
    }
}

fn resolve_china(address: &str) -> ResolvedAddress {
    let mut resolved = ResolvedAddress::unresolved(address, CHINA);
    let segments = Segments::split(address, ", ");

    let Some(segment) = segments.second_to_last() else {
        return resolved;
    };
    if contains_digit(segment) {
        read_zip_and_place(&mut resolved, segment);
    } else {
        read_place(&mut resolved, segment);
    }

    if resolved.is_settled_china() {
        return resolved;
    }

    if let Some(fallback) = segments.third_to_last() {
        if contains_digit(fallback) {
            read_zip_and_place(&mut resolved, fallback);
        } else if whitespace_count(fallback) <= 1 {
            read_place(&mut resolved, fallback);
        }
    }
    resolved
}

/// Pull the first digit run out as the zip and resolve what remains as a place.
fn read_zip_and_place(resolved: &mut ResolvedAddress, segment: &str) {
    let Some(token) = segment.split(' ').find(|t| contains_digit(t)) else {
        return;
    };
    resolved.zip = first_digit_run(token).unwrap_or_default().to_string();
    let rest = collapse_spaces(&segment.replace(token, ""));
    read_place(resolved, rest.trim());
}

fn read_place(resolved: &mut ResolvedAddress, place: &str) {
    let lowered = collapse_spaces(&place.to_lowercase());
    let province = CHINESE_PROVINCES
        .iter()
        .find(|p| lowered.contains(&p.to_lowercase()));

    if let Some(province) = province {
        resolved.state = province.to_string();
    }
    if province.is_none() || is_municipality(&resolved.state) {
        resolved.city = place.trim().replace('\'', "_").replace('\\', "");
    }
}

fn is_municipality(state: &str) -> bool {
    MUNICIPALITIES.contains(&state)
}

fn first_token(tokens: &[&str]) -> String {
    tokens.first().map(|t| t.to_string()).unwrap_or_default()
}

fn last_token(tokens: &[&str]) -> String {
    tokens.last().map(|t| t.to_string()).unwrap_or_default()
}

fn trimmed_owned(segment: Option<&str>) -> String {
    segment.map(|s| s.trim().to_string()).unwrap_or_default()
}
