use anyhow::{Context, Result};
use log::{info, warn};

use wos_field_decomposer::common::setup_logging;
use wos_field_decomposer::{AddressResolver, ResolvedAddress, StateCodes};

use crate::cli::ResolveArgs;

/// Run the resolve command, printing the resolved address as JSON
pub fn run_resolve(args: ResolveArgs) -> Result<Option<ResolvedAddress>> {
    setup_logging(&args.log_level)?;

    let codes = match args.state_codes.as_deref() {
        Some(path) => StateCodes::from_csv_path(path)?,
        None => StateCodes::builtin(),
    };
    let resolver = AddressResolver::new(codes);

    if !AddressResolver::supports(&args.country) {
        warn!("No address heuristics for country {:?}", args.country);
    }

    let resolved = resolver.resolve(&args.country, &args.address);
    match &resolved {
        Some(address) => {
            let json = serde_json::to_string_pretty(address)
                .context("Failed to serialize resolved address")?;
            println!("{}", json);
        }
        None => {
            info!("Address not resolved");
            println!("null");
        }
    }
    Ok(resolved)
}
