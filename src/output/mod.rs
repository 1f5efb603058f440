//! Output handling for crawl results
//!
//! This module accumulates page results during a run, derives the final
//! summary, and renders results for humans (stdout statistics and a markdown
//! report file).

mod report;
pub mod stats;

pub use report::write_markdown_report;
pub use stats::{print_summary, Aggregator, CrawlSummary};
