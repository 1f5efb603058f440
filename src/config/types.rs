use serde::Deserialize;

/// Crawl behavior configuration
///
/// All fields are optional in the TOML file; missing fields take the defaults
/// below. Field names use kebab-case in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    /// Maximum link depth from the seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages to harvest before stopping
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum number of fetches in flight at any moment
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Pause between dispatch batches (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether to follow links pointing at other hosts
    #[serde(rename = "follow-external-links", default)]
    pub follow_external_links: bool,

    /// Whether to consult robots.txt before fetching
    #[serde(rename = "respect-robots-txt", default = "default_true")]
    pub respect_robots_txt: bool,

    /// User agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// If non-empty, only hosts matching one of these patterns are followed.
    /// Patterns may be exact ("example.com") or wildcard ("*.example.com").
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,

    /// Regex patterns; a URL matching any of them is never followed
    #[serde(rename = "exclude-patterns", default)]
    pub exclude_patterns: Vec<String>,

    /// Regex patterns; if non-empty, a URL must match at least one
    #[serde(rename = "include-patterns", default)]
    pub include_patterns: Vec<String>,

    /// Retries after a transient fetch failure before giving up
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_pages() -> usize {
    100
}

fn default_max_concurrency() -> usize {
    5
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    format!("harvestman/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            max_concurrency: default_max_concurrency(),
            delay_ms: default_delay_ms(),
            timeout_ms: default_timeout_ms(),
            follow_external_links: false,
            respect_robots_txt: true,
            user_agent: default_user_agent(),
            allowed_domains: Vec::new(),
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
            max_retries: default_max_retries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.timeout_ms, 30_000);
        assert!(!config.follow_external_links);
        assert!(config.respect_robots_txt);
        assert_eq!(config.max_retries, 3);
        assert!(config.allowed_domains.is_empty());
        assert!(config.exclude_patterns.is_empty());
        assert!(config.include_patterns.is_empty());
    }

    #[test]
    fn test_default_user_agent_carries_version() {
        let config = CrawlConfig::default();
        assert!(config.user_agent.starts_with("harvestman/"));
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: CrawlConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_depth, 3);
        assert!(config.respect_robots_txt);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: CrawlConfig = toml::from_str(
            r#"
            max-depth = 1
            follow-external-links = true
            exclude-patterns = ["/admin"]
            "#,
        )
        .unwrap();

        assert_eq!(config.max_depth, 1);
        assert!(config.follow_external_links);
        assert_eq!(config.exclude_patterns, vec!["/admin".to_string()]);
        // Untouched fields keep their defaults
        assert_eq!(config.max_pages, 100);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: std::result::Result<CrawlConfig, _> = toml::from_str("max-dept = 1");
        assert!(result.is_err());
    }
}
