//! Robots.txt handling
//!
//! This module fetches, parses, and caches robots.txt files per origin.
//! Robots handling is strictly advisory for the rest of the crate: a missing
//! or unfetchable robots.txt never blocks crawling, and lookups never fail.

mod cache;
mod rules;

pub use cache::RobotsCache;
pub use rules::RobotsRules;
