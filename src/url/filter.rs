use crate::config::CrawlConfig;
use crate::crawler::LinkRef;
use crate::url::matcher::matches_wildcard;
use crate::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Compiled link filter
///
/// Built once from a [`CrawlConfig`] so the regex patterns compile exactly
/// once per run. Deciding whether a link is followed applies, in order:
///
/// 1. resolve the href against the page URL; unparsable links are dropped
/// 2. only `http` and `https` schemes survive
/// 3. with `follow-external-links` off, the host must equal the page host
/// 4. with a non-empty allow-list, the host must match one of its patterns
/// 5. a URL matching any exclude pattern is dropped
/// 6. with non-empty include patterns, at least one must match
///
/// Survivors are deduplicated into a set.
#[derive(Debug)]
pub struct LinkFilter {
    follow_external_links: bool,
    allowed_domains: Vec<String>,
    exclude_patterns: Vec<Regex>,
    include_patterns: Vec<Regex>,
}

impl LinkFilter {
    /// Compiles the filter from a configuration
    ///
    /// Fails if any include or exclude pattern is not a valid regex.
    pub fn new(config: &CrawlConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            follow_external_links: config.follow_external_links,
            allowed_domains: config.allowed_domains.clone(),
            exclude_patterns: compile_patterns(&config.exclude_patterns)?,
            include_patterns: compile_patterns(&config.include_patterns)?,
        })
    }

    /// Filters a page's discovered links down to the set worth following
    ///
    /// `base` is the URL of the page the links came from; relative hrefs are
    /// resolved against it and the same-host rule compares against its host.
    pub fn filter_links(&self, links: &[LinkRef], base: &Url) -> HashSet<Url> {
        links
            .iter()
            .filter_map(|link| self.accept(&link.url, base))
            .collect()
    }

    /// Applies the filter rules to a single href
    ///
    /// Returns the resolved URL if the link should be followed.
    fn accept(&self, href: &str, base: &Url) -> Option<Url> {
        let mut url = match Url::options().base_url(Some(base)).parse(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("dropping unparsable link '{}': {}", href, e);
                return None;
            }
        };

        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }

        let host = url.host_str()?.to_string();

        if !self.follow_external_links && base.host_str() != Some(host.as_str()) {
            return None;
        }

        if !self.allowed_domains.is_empty()
            && !self
                .allowed_domains
                .iter()
                .any(|pattern| matches_wildcard(pattern, &host))
        {
            return None;
        }

        // Fragments address a position within the page, not a distinct page
        url.set_fragment(None);

        if self
            .exclude_patterns
            .iter()
            .any(|re| re.is_match(url.as_str()))
        {
            return None;
        }

        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|re| re.is_match(url.as_str()))
        {
            return None;
        }

        Some(url)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", p, e))))
        .collect()
}
