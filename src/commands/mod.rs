pub mod classify;
pub mod decompose;
pub mod resolve;

pub use classify::run_classify;
pub use decompose::run_decompose;
pub use resolve::run_resolve;
