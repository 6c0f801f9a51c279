use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wos-decompose")]
#[command(about = "Decompose Web of Science export fields into author/address, reference, reprint and grant records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decompose every record of one or more tab-delimited export files
    Decompose(DecomposeArgs),

    /// Resolve a single USA or Peoples R China address into state/city/zip
    Resolve(ResolveArgs),

    /// Classify cited-reference strings as journal, patent, book or invalid
    Classify(ClassifyArgs),
}

#[derive(Parser, Clone)]
pub struct DecomposeArgs {
    /// Export file (optionally .gz) or a directory of export files
    #[arg(short, long, required = true)]
    pub input: String,

    /// Output JSONL file with one decomposed record per line
    #[arg(short, long, default_value = "decomposed.jsonl")]
    pub output: String,

    /// Also write one JSONL table per entity next to the output
    #[arg(long, default_value = "false")]
    pub split_tables: bool,

    /// CSV of USA state codes (code in the second column); builtin table if omitted
    #[arg(long)]
    pub state_codes: Option<String>,

    /// Processing history file; already processed files and records are skipped
    #[arg(long)]
    pub history: Option<String>,

    /// Number of worker threads (0 = number of CPU cores)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Records decomposed per parallel batch
    #[arg(long, default_value = "10000")]
    pub batch_size: usize,

    /// Seconds between progress log lines
    #[arg(long, default_value = "60")]
    pub stats_interval: u64,

    /// Logging level (TRACE, DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct ResolveArgs {
    /// Country token of the address (e.g. "USA", "Peoples R China")
    #[arg(short, long, required = true)]
    pub country: String,

    /// Raw address string
    #[arg(short, long, required = true)]
    pub address: String,

    /// CSV of USA state codes (code in the second column); builtin table if omitted
    #[arg(long)]
    pub state_codes: Option<String>,

    /// Logging level (TRACE, DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "WARN")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct ClassifyArgs {
    /// Cited-reference strings; each may itself be a ';'-separated list
    #[arg(required = true)]
    pub citations: Vec<String>,

    /// Logging level (TRACE, DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "WARN")]
    pub log_level: String,
}
