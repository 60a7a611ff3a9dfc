//! CLI command implementations.

pub mod search;
pub mod serve;

pub use search::SearchCommand;
pub use serve::ServeCommand;
