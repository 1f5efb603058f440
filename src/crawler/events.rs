//! Crawl progress notifications
//!
//! The scheduler emits these over an optional unbounded channel so a caller
//! can report progress live. Nothing in the crawl depends on a listener
//! being attached; sends to a dropped receiver are ignored.

use crate::crawler::page::PageResult;
use crate::output::CrawlSummary;

/// A notification emitted by the scheduler at well-defined points
#[derive(Debug)]
pub enum CrawlEvent {
    /// A page was fetched and harvested
    Page(Box<PageResult>),

    /// A page permanently failed after its retries were exhausted
    Error { url: String, cause: String },

    /// The run finished; carries the final summary
    Complete { summary: CrawlSummary },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_events_flow_through_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        tx.send(CrawlEvent::Error {
            url: "https://example.com/broken".to_string(),
            cause: "HTTP status 500".to_string(),
        })
        .unwrap();

        match rx.try_recv().unwrap() {
            CrawlEvent::Error { url, cause } => {
                assert_eq!(url, "https://example.com/broken");
                assert!(cause.contains("500"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_send_without_receiver_is_an_error_not_a_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        // The scheduler discards this result; nobody listening is fine
        let result = tx.send(CrawlEvent::Complete {
            summary: CrawlSummary::default(),
        });
        assert!(result.is_err());
    }
}
