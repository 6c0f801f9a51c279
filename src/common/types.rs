use serde::{Deserialize, Serialize};

/// Statistics from the decompose command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecomposeStats {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub records_read: usize,
    pub records_skipped: usize,
    pub records_written: usize,
    pub links: usize,
    pub resolved_addresses: usize,
    pub references: usize,
    pub invalid_references: usize,
    pub reprint_authors: usize,
    pub grants: usize,
}
