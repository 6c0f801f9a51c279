use anyhow::{Context, Result};
use log::debug;

use wos_field_decomposer::common::setup_logging;
use wos_field_decomposer::reference::{classify_citation_list, ReferenceRecord};

use crate::cli::ClassifyArgs;

/// Run the classify command, printing one JSON line per citation
pub fn run_classify(args: ClassifyArgs) -> Result<Vec<ReferenceRecord>> {
    setup_logging(&args.log_level)?;

    let records: Vec<ReferenceRecord> = args
        .citations
        .iter()
        .flat_map(|field| classify_citation_list(field))
        .collect();
    debug!("Classified {} citation(s)", records.len());

    for record in &records {
        let json_line = serde_json::to_string(record).context("Failed to serialize reference")?;
        println!("{}", json_line);
    }
    Ok(records)
}
