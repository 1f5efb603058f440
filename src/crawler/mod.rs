//! Crawl engine
//!
//! This module contains the core crawling logic:
//! - HTTP fetching with retry and backoff
//! - Page metadata extraction
//! - Frontier scheduling under a global concurrency bound
//! - Progress notifications

mod events;
mod fetcher;
mod page;
mod scheduler;

pub use events::CrawlEvent;
pub use fetcher::{build_http_client, fetch_page};
pub use page::{extract_page, ExtractContext, ImageRef, LinkRef, PageResult};
pub use scheduler::{FrontierItem, Scheduler};

use crate::config::CrawlConfig;
use crate::output::CrawlSummary;
use crate::HarvestError;

/// Runs a complete crawl from a seed URL
///
/// Convenience wrapper that builds a [`Scheduler`] for one run and awaits it.
///
/// # Arguments
///
/// * `seed` - The URL to start from
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok((results, summary))` - The harvested pages and the run summary
/// * `Err(HarvestError)` - A scheduler-level fault (bad seed, bad config)
pub async fn crawl(
    seed: &str,
    config: CrawlConfig,
) -> Result<(Vec<PageResult>, CrawlSummary), HarvestError> {
    Scheduler::new(config)?.crawl(seed).await
}
