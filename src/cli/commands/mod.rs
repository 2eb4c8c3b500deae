//! CLI command implementations.

mod captions;
mod config;
mod search;
mod serve;

pub use captions::run_captions;
pub use config::run_config;
pub use search::run_search;
pub use serve::run_serve;
