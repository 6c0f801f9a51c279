use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Which files and records earlier runs have already decomposed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingHistory {
    /// Input files fully processed
    pub files_completed: BTreeSet<String>,
    /// Record ids already written
    pub records_processed: BTreeSet<String>,
}

impl ProcessingHistory {
    /// Save history to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize history")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write history to {:?}", path))?;
        Ok(())
    }

    /// Load history from file; a missing file is an empty history
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read history from {:?}", path))?;
        serde_json::from_str(&json).context("Failed to deserialize history")
    }

    pub fn is_file_completed(&self, file: &str) -> bool {
        self.files_completed.contains(file)
    }

    pub fn mark_file_completed(&mut self, file: &str) {
        self.files_completed.insert(file.to_string());
    }

    /// Record a written id; returns false if it was already present
    pub fn mark_record_processed(&mut self, record_id: &str) -> bool {
        self.records_processed.insert(record_id.to_string())
    }
}
