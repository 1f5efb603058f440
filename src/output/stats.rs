//! Result accumulation and run statistics
//!
//! The [`Aggregator`] is the single owner of the results collection during a
//! run; the scheduler feeds it successes and failure counts, and at
//! completion it derives the [`CrawlSummary`].

use crate::crawler::PageResult;
use serde::Serialize;
use std::time::Duration;

/// Derived, read-only snapshot of a completed run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlSummary {
    /// Pages successfully harvested
    pub total_pages: u64,

    /// Pages that permanently failed
    pub failed_pages: u64,

    /// Wall time of the whole run, in milliseconds
    pub total_time_ms: u64,

    /// Mean run time per harvested page; 0 for an empty run
    pub average_time_ms: u64,
}

/// Accumulates results while a crawl runs
#[derive(Debug, Default)]
pub struct Aggregator {
    results: Vec<PageResult>,
    failed_pages: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a harvested page; each page is pushed exactly once
    pub fn push(&mut self, page: PageResult) {
        self.results.push(page);
    }

    /// Counts one permanent failure
    pub fn record_failure(&mut self) {
        self.failed_pages += 1;
    }

    /// Number of pages harvested so far
    pub fn page_count(&self) -> usize {
        self.results.len()
    }

    /// Consumes the aggregator, producing the results and the summary
    pub fn finish(self, elapsed: Duration) -> (Vec<PageResult>, CrawlSummary) {
        let total_pages = self.results.len() as u64;
        let total_time_ms = elapsed.as_millis() as u64;
        let average_time_ms = if total_pages == 0 {
            0
        } else {
            total_time_ms / total_pages
        };

        let summary = CrawlSummary {
            total_pages,
            failed_pages: self.failed_pages,
            total_time_ms,
            average_time_ms,
        };

        (self.results, summary)
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");
    println!("  Pages harvested: {}", summary.total_pages);
    println!("  Pages failed:    {}", summary.failed_pages);
    println!(
        "  Total time:      {}ms ({:.2}s)",
        summary.total_time_ms,
        summary.total_time_ms as f64 / 1000.0
    );
    println!("  Avg per page:    {}ms", summary.average_time_ms);

    let attempted = summary.total_pages + summary.failed_pages;
    if attempted > 0 {
        println!(
            "  Success rate:    {:.1}%",
            summary.total_pages as f64 / attempted as f64 * 100.0
        );
    }
}
