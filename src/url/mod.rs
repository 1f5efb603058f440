//! URL handling for harvestman
//!
//! This module decides which discovered links are worth following: it
//! resolves hrefs to absolute URLs and applies the scheme, host, domain
//! allow-list, and regex pattern rules.

mod filter;
mod matcher;

pub use filter::LinkFilter;
pub use matcher::matches_wildcard;
