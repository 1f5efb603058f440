//! HTTP fetching with retry
//!
//! This module owns the life of a single frontier item: the visited guard,
//! the robots.txt gate, the retry loop with backoff, the HTML content-type
//! gate, and finally metadata extraction.

use crate::config::CrawlConfig;
use crate::crawler::page::{extract_page, ExtractContext, PageResult};
use crate::crawler::scheduler::FrontierItem;
use crate::robots::RobotsCache;
use crate::HarvestError;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use url::Url;

/// Base backoff unit between retry attempts; attempt n waits n times this
const RETRY_BACKOFF: Duration = Duration::from_millis(1000);

/// Builds the HTTP client shared by page and robots fetches
///
/// Redirects are left to the client's default policy; the post-redirect URL
/// is read back from each response.
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// One successful HTTP exchange, before the HTML gate
struct FetchedBody {
    final_url: String,
    status_code: u16,
    content_type: String,
    body: String,
}

/// Fetches a frontier item and extracts its page metadata
///
/// Outcomes:
/// * `Ok(Some(page))` - fetched and extracted
/// * `Ok(None)` - policy skip: already visited, disallowed by robots.txt,
///   or not an HTML response; counts as neither success nor failure
/// * `Err(..)` - transient failures exhausted their retries, or the response
///   body could not be read
///
/// The URL is added to the visited set before the first attempt, so a
/// duplicate of this item elsewhere in the frontier becomes a no-op.
pub async fn fetch_page(
    client: &Client,
    config: &CrawlConfig,
    robots: &RobotsCache,
    visited: &Mutex<HashSet<String>>,
    item: &FrontierItem,
) -> Result<Option<PageResult>, HarvestError> {
    {
        let mut visited = visited.lock().unwrap();
        if !visited.insert(item.url.to_string()) {
            tracing::debug!("skipping {}: already visited", item.url);
            return Ok(None);
        }
    }

    if config.respect_robots_txt && !robots.is_allowed(&item.url).await {
        tracing::info!("skipping {}: disallowed by robots.txt", item.url);
        return Ok(None);
    }

    let mut attempt: u32 = 0;
    let (fetched, elapsed) = loop {
        attempt += 1;
        let started = Instant::now();

        match fetch_once(client, item.url.as_str()).await {
            Ok(fetched) => break (fetched, started.elapsed()),
            Err(e) if attempt <= config.max_retries => {
                let backoff = RETRY_BACKOFF * attempt;
                tracing::warn!(
                    "fetch {} failed (attempt {}/{}): {}; retrying in {:?}",
                    item.url,
                    attempt,
                    config.max_retries + 1,
                    e,
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    };

    if !is_html(&fetched.content_type) {
        tracing::debug!(
            "skipping {}: content type '{}' is not HTML",
            item.url,
            fetched.content_type
        );
        return Ok(None);
    }

    // Fall back to the queued URL if the transport reports something unparsable
    let final_url = Url::parse(&fetched.final_url).unwrap_or_else(|_| item.url.clone());

    let page = extract_page(
        &fetched.body,
        ExtractContext {
            final_url: &final_url,
            original_url: &item.url,
            status_code: fetched.status_code,
            content_type: &fetched.content_type,
            content_length: fetched.body.len(),
            crawl_time_ms: elapsed.as_millis() as u64,
            depth: item.depth,
            parent: item.parent.as_ref(),
        },
    );

    Ok(Some(page))
}

/// Performs one GET and classifies the outcome
///
/// Network errors and non-success statuses come back as errors so the retry
/// loop can decide whether another attempt remains.
async fn fetch_once(client: &Client, url: &str) -> Result<FetchedBody, HarvestError> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            HarvestError::Timeout {
                url: url.to_string(),
            }
        } else {
            HarvestError::Http {
                url: url.to_string(),
                source: e,
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response.text().await.map_err(|e| HarvestError::Http {
        url: url.to_string(),
        source: e,
    })?;

    Ok(FetchedBody {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}

/// Whether a Content-Type header value indicates an HTML document
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}
