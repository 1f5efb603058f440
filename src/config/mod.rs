//! Configuration handling for harvestman
//!
//! The configuration lives in a TOML file with kebab-case keys. Every option
//! has a default, so an empty file (or no file at all) yields a working
//! configuration. Validation runs once at load time.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::CrawlConfig;
pub use validation::validate;
