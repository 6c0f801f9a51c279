use serde::{Deserialize, Serialize};

/// Classification of a cited reference string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// Author, year, venue, volume and page present
    Journal,
    /// Year followed by the word "Patent"
    Patent,
    /// Year present, nothing more recognizable
    Book,
    /// No year in the expected position
    Invalid,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Journal => "journal",
            ReferenceKind::Patent => "patent",
            ReferenceKind::Book => "book",
            ReferenceKind::Invalid => "invalid",
        }
    }

    /// Whether sub-fields beyond the raw string are extracted for this kind
    pub fn is_decomposed(&self) -> bool {
        matches!(self, ReferenceKind::Journal)
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
