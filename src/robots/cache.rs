use crate::robots::RobotsRules;
use reqwest::Client;
use std::collections::HashMap;
use tokio::sync::Mutex;
use url::Url;

/// Per-origin robots.txt cache for one crawl run
///
/// The first lookup for an origin fetches and parses `<origin>/robots.txt`;
/// every later lookup is a pure read. Any fetch failure (network error, HTTP
/// error status, unreadable body) caches the allow-all sentinel, so robots
/// handling can slow a crawl down but never break it.
///
/// The entries map is guarded by an async mutex held across the first fetch,
/// which guarantees the robots file is requested at most once per origin even
/// when concurrent fetch tasks race on the first lookup.
pub struct RobotsCache {
    client: Client,
    user_agent: String,
    entries: Mutex<HashMap<String, RobotsRules>>,
}

impl RobotsCache {
    /// Creates an empty cache that fetches with the given client
    pub fn new(client: Client, user_agent: String) -> Self {
        Self {
            client,
            user_agent,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether a URL may be fetched, never fails
    ///
    /// Returns `true` for URLs without a host and on any internal error
    /// during the check itself.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        if url.host_str().is_none() {
            return true;
        }

        // scheme://host[:port], so origins on non-default ports resolve
        // their own robots.txt
        let origin = url.origin().ascii_serialization();

        let mut entries = self.entries.lock().await;
        if !entries.contains_key(&origin) {
            let rules = self.fetch_rules(&origin).await;
            entries.insert(origin.clone(), rules);
        }

        entries
            .get(&origin)
            .map(|rules| rules.is_allowed(url.as_str(), &self.user_agent))
            .unwrap_or(true)
    }

    /// Fetches and parses robots.txt for an origin
    async fn fetch_rules(&self, origin: &str) -> RobotsRules {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::debug!("fetching {}", robots_url);

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => RobotsRules::from_content(&body),
                Err(e) => {
                    tracing::debug!("failed to read {}: {}", robots_url, e);
                    RobotsRules::allow_all()
                }
            },
            Ok(response) => {
                tracing::debug!("{} returned {}", robots_url, response.status());
                RobotsRules::allow_all()
            }
            Err(e) => {
                tracing::debug!("failed to fetch {}: {}", robots_url, e);
                RobotsRules::allow_all()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cache() -> RobotsCache {
        RobotsCache::new(Client::new(), "HarvestBot/1.0".to_string())
    }

    #[tokio::test]
    async fn test_fetch_failure_allows_all() {
        // Nothing is listening on this port
        let cache = cache();
        let url = Url::parse("http://127.0.0.1:1/page").unwrap();
        assert!(cache.is_allowed(&url).await);
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        assert!(cache().is_allowed(&url).await);
    }

    #[tokio::test]
    async fn test_disallowed_path_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"),
            )
            .mount(&server)
            .await;

        let cache = cache();
        let allowed = Url::parse(&format!("{}/public", server.uri())).unwrap();
        let blocked = Url::parse(&format!("{}/admin/panel", server.uri())).unwrap();

        assert!(cache.is_allowed(&allowed).await);
        assert!(!cache.is_allowed(&blocked).await);
    }

    #[tokio::test]
    async fn test_robots_fetched_once_per_origin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(1)
            .mount(&server)
            .await;

        let cache = cache();
        for path in ["/a", "/b", "/c"] {
            let url = Url::parse(&format!("{}{}", server.uri(), path)).unwrap();
            assert!(cache.is_allowed(&url).await);
        }
        // expect(1) is verified when the mock server drops
    }
}
