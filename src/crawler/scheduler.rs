//! Crawl scheduler and frontier
//!
//! This module owns the run: the FIFO frontier queue, the visited and failed
//! sets, batch dispatch under a global concurrency limit, link discovery, and
//! pacing between batches.
//!
//! Breadth-first order falls out of the queue discipline: items are only ever
//! appended, and batches drain from the front, so everything queued at depth
//! d is dispatched before anything discovered at depth d + 1.

use crate::config::{validate, CrawlConfig};
use crate::crawler::events::CrawlEvent;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::page::PageResult;
use crate::output::{Aggregator, CrawlSummary};
use crate::robots::RobotsCache;
use crate::url::LinkFilter;
use crate::{HarvestError, UrlError};
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// A unit of pending work: one URL awaiting dispatch
///
/// Created when a discovered link passes the filter, consumed exactly once
/// when its batch is drained from the frontier.
#[derive(Debug, Clone)]
pub struct FrontierItem {
    /// The URL to fetch
    pub url: Url,

    /// Link hops from the seed
    pub depth: u32,

    /// The page this URL was discovered on; None for the seed
    pub parent: Option<Url>,
}

/// Scheduler for one crawl run
///
/// Owns the frontier, the visited and failed sets, and the shared fetch
/// machinery (HTTP client, robots cache, concurrency limiter). A scheduler
/// instance performs a single run; [`Scheduler::crawl`] consumes it, so
/// concurrent runs never share state.
pub struct Scheduler {
    config: Arc<CrawlConfig>,
    filter: LinkFilter,
    client: Client,
    robots: Arc<RobotsCache>,

    /// Bounds in-flight fetches across the whole run, not per batch
    limiter: Arc<Semaphore>,

    /// URLs already dispatched, regardless of outcome
    visited: Arc<Mutex<HashSet<String>>>,

    /// URLs whose fetch permanently failed; never re-enqueued
    failed: Arc<Mutex<HashSet<String>>>,

    frontier: VecDeque<FrontierItem>,
    events: Option<UnboundedSender<CrawlEvent>>,
}

impl Scheduler {
    /// Creates a scheduler, validating the configuration once
    ///
    /// # Errors
    ///
    /// Returns a configuration error for out-of-range values or filter
    /// patterns that fail to compile.
    pub fn new(config: CrawlConfig) -> Result<Self, HarvestError> {
        validate(&config)?;
        let filter = LinkFilter::new(&config)?;
        let client = build_http_client(&config)?;
        let robots = Arc::new(RobotsCache::new(client.clone(), config.user_agent.clone()));
        let limiter = Arc::new(Semaphore::new(config.max_concurrency));

        Ok(Self {
            config: Arc::new(config),
            filter,
            client,
            robots,
            limiter,
            visited: Arc::new(Mutex::new(HashSet::new())),
            failed: Arc::new(Mutex::new(HashSet::new())),
            frontier: VecDeque::new(),
            events: None,
        })
    }

    /// Attaches a notification channel for progress events
    pub fn with_events(mut self, events: UnboundedSender<CrawlEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Runs a breadth-first crawl from the seed URL
    ///
    /// Individual page failures are reported through the error notification
    /// and the failed count in the summary; they never abort the run. The
    /// call itself fails only for scheduler-level faults such as an
    /// unparsable seed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use harvestman::config::CrawlConfig;
    /// use harvestman::crawler::Scheduler;
    ///
    /// # async fn example() -> Result<(), harvestman::HarvestError> {
    /// let scheduler = Scheduler::new(CrawlConfig::default())?;
    /// let (results, summary) = scheduler.crawl("https://example.com/").await?;
    /// println!("{} pages in {}ms", summary.total_pages, summary.total_time_ms);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(
        mut self,
        seed: &str,
    ) -> Result<(Vec<PageResult>, CrawlSummary), HarvestError> {
        let seed_url = parse_seed(seed)?;
        tracing::info!("starting crawl from {}", seed_url);

        let started = Instant::now();
        let mut aggregator = Aggregator::new();

        self.frontier.push_back(FrontierItem {
            url: seed_url,
            depth: 0,
            parent: None,
        });

        while !self.frontier.is_empty() && aggregator.page_count() < self.config.max_pages {
            let batch = self.drain_batch(aggregator.page_count());
            self.run_batch(batch, &mut aggregator).await;

            if !self.frontier.is_empty()
                && aggregator.page_count() < self.config.max_pages
                && self.config.delay_ms > 0
            {
                tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
            }
        }

        let (results, summary) = aggregator.finish(started.elapsed());
        tracing::info!(
            "crawl complete: {} pages, {} failed, {}ms",
            summary.total_pages,
            summary.failed_pages,
            summary.total_time_ms
        );

        self.emit(CrawlEvent::Complete {
            summary: summary.clone(),
        });

        Ok((results, summary))
    }

    /// Removes the next batch from the front of the frontier
    ///
    /// Capped at the remaining page budget so the run can never harvest more
    /// than `max-pages` results.
    fn drain_batch(&mut self, pages_so_far: usize) -> Vec<FrontierItem> {
        let budget = self.config.max_pages - pages_so_far;
        let size = self.config.max_concurrency.min(budget).min(self.frontier.len());
        self.frontier.drain(..size).collect()
    }

    /// Dispatches a batch and folds every outcome into the run state
    ///
    /// Each task acquires a permit from the run-wide limiter before fetching,
    /// and sibling outcomes are independent: one page failing does not stop
    /// the others.
    async fn run_batch(&mut self, batch: Vec<FrontierItem>, aggregator: &mut Aggregator) {
        let mut tasks = JoinSet::new();

        for item in batch {
            let limiter = Arc::clone(&self.limiter);
            let client = self.client.clone();
            let config = Arc::clone(&self.config);
            let robots = Arc::clone(&self.robots);
            let visited = Arc::clone(&self.visited);

            tasks.spawn(async move {
                let _permit = match limiter.acquire_owned().await {
                    Ok(permit) => permit,
                    // The semaphore lives as long as the run; treat closure
                    // as a skip rather than panicking
                    Err(_) => return (item, Ok(None)),
                };
                let outcome = fetch_page(&client, &config, &robots, &visited, &item).await;
                (item, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (item, outcome) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!("fetch task panicked: {}", e);
                    continue;
                }
            };

            match outcome {
                Ok(Some(page)) => {
                    tracing::debug!("harvested {} at depth {}", page.url, page.depth);
                    self.emit(CrawlEvent::Page(Box::new(page.clone())));
                    if item.depth < self.config.max_depth {
                        self.enqueue_links(&page, item.depth + 1);
                    }
                    aggregator.push(page);
                }
                // Policy skip: counts toward neither success nor failure
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("giving up on {}: {}", item.url, e);
                    self.failed.lock().unwrap().insert(item.url.to_string());
                    aggregator.record_failure();
                    self.emit(CrawlEvent::Error {
                        url: item.url.to_string(),
                        cause: e.to_string(),
                    });
                }
            }
        }
    }

    /// Filters a page's links and appends the survivors to the frontier
    ///
    /// URLs already visited or known-failed are not re-enqueued. Appending
    /// (never prepending) keeps the queue in breadth-first order.
    fn enqueue_links(&mut self, page: &PageResult, depth: u32) {
        let base = match Url::parse(&page.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("cannot resolve links against {}: {}", page.url, e);
                return;
            }
        };

        let discovered = self.filter.filter_links(&page.links, &base);

        let visited = self.visited.lock().unwrap();
        let failed = self.failed.lock().unwrap();
        for url in discovered {
            if visited.contains(url.as_str()) || failed.contains(url.as_str()) {
                continue;
            }
            self.frontier.push_back(FrontierItem {
                url,
                depth,
                parent: Some(base.clone()),
            });
        }
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver must not affect the crawl
            let _ = events.send(event);
        }
    }
}

/// Parses and sanity-checks the seed URL
fn parse_seed(seed: &str) -> Result<Url, HarvestError> {
    let url = Url::parse(seed)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()).into());
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(seed.to_string()).into());
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> CrawlConfig {
        CrawlConfig {
            delay_ms: 0,
            respect_robots_txt: false,
            max_retries: 0,
            ..CrawlConfig::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = CrawlConfig {
            max_concurrency: 0,
            ..CrawlConfig::default()
        };
        assert!(matches!(
            Scheduler::new(config),
            Err(HarvestError::Config(_))
        ));
    }

    #[test]
    fn test_bad_pattern_rejected_at_construction() {
        let config = CrawlConfig {
            include_patterns: vec!["(".to_string()],
            ..CrawlConfig::default()
        };
        assert!(Scheduler::new(config).is_err());
    }

    #[test]
    fn test_parse_seed() {
        assert!(parse_seed("https://example.com/").is_ok());
        assert!(parse_seed("http://example.com/deep/path?q=1").is_ok());

        assert!(matches!(
            parse_seed("ftp://example.com/"),
            Err(HarvestError::UrlError(UrlError::UnsupportedScheme(_)))
        ));
        assert!(matches!(
            parse_seed("not a url"),
            Err(HarvestError::UrlParse(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_error_is_a_scheduler_fault() {
        let scheduler = Scheduler::new(fast_config()).unwrap();
        assert!(scheduler.crawl("mailto:nobody@example.com").await.is_err());
    }

    #[tokio::test]
    async fn test_single_page_crawl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    r#"<html><head><title>Root</title></head><body></body></html>"#.as_bytes(),
                    "text/html",
                ),
            )
            .mount(&server)
            .await;

        let scheduler = Scheduler::new(fast_config()).unwrap();
        let (results, summary) = scheduler
            .crawl(&format!("{}/", server.uri()))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, Some("Root".to_string()));
        assert_eq!(results[0].depth, 0);
        assert_eq!(results[0].parent, None);
        assert_eq!(summary.total_pages, 1);
        assert_eq!(summary.failed_pages, 0);
    }

    #[tokio::test]
    async fn test_failed_page_recorded_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let scheduler = Scheduler::new(fast_config()).unwrap();
        let (results, summary) = scheduler
            .crawl(&format!("{}/", server.uri()))
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(summary.total_pages, 0);
        assert_eq!(summary.failed_pages, 1);
    }

    #[tokio::test]
    async fn test_events_emitted_for_pages_and_completion() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    "<html><head><title>Hi</title></head></html>".as_bytes(),
                    "text/html",
                ),
            )
            .mount(&server)
            .await;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let scheduler = Scheduler::new(fast_config()).unwrap().with_events(tx);
        scheduler.crawl(&format!("{}/", server.uri())).await.unwrap();

        let mut saw_page = false;
        let mut saw_complete = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                CrawlEvent::Page(page) => {
                    assert_eq!(page.title, Some("Hi".to_string()));
                    saw_page = true;
                }
                CrawlEvent::Complete { summary } => {
                    assert_eq!(summary.total_pages, 1);
                    saw_complete = true;
                }
                CrawlEvent::Error { url, cause } => panic!("unexpected error {}: {}", url, cause),
            }
        }
        assert!(saw_page);
        assert!(saw_complete);
    }
}
