pub mod history;
pub mod logging;
pub mod output;
pub mod progress;
pub mod types;
pub mod utils;

pub use history::ProcessingHistory;
pub use logging::*;
pub use output::{RecordWriter, TableOutputPaths};
pub use progress::create_record_spinner;
pub use types::*;
pub use utils::*;
