use robotstxt::DefaultMatcher;

/// Parsed robots.txt rules for one origin
///
/// Wraps the robotstxt crate behind a small interface: the raw file content
/// is kept and matched on demand, and an allow-all sentinel stands in for
/// origins whose robots.txt could not be fetched.
#[derive(Debug, Clone)]
pub struct RobotsRules {
    /// Raw robots.txt content
    content: String,
    /// When true, every URL is allowed regardless of content
    allow_all: bool,
}

impl RobotsRules {
    /// Creates rules from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates the permissive sentinel used when robots.txt is unavailable
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Checks whether a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all_sentinel() {
        let rules = RobotsRules::allow_all();
        assert!(rules.is_allowed("https://example.com/", "HarvestBot"));
        assert!(rules.is_allowed("https://example.com/admin", "HarvestBot"));
    }

    #[test]
    fn test_empty_content_allows_everything() {
        let rules = RobotsRules::from_content("");
        assert!(rules.is_allowed("https://example.com/anything", "HarvestBot"));
    }

    #[test]
    fn test_disallow_all() {
        let rules = RobotsRules::from_content("User-agent: *\nDisallow: /");
        assert!(!rules.is_allowed("https://example.com/", "HarvestBot"));
        assert!(!rules.is_allowed("https://example.com/page", "HarvestBot"));
    }

    #[test]
    fn test_disallow_prefix() {
        let rules = RobotsRules::from_content("User-agent: *\nDisallow: /admin");
        assert!(rules.is_allowed("https://example.com/", "HarvestBot"));
        assert!(rules.is_allowed("https://example.com/page", "HarvestBot"));
        assert!(!rules.is_allowed("https://example.com/admin", "HarvestBot"));
        assert!(!rules.is_allowed("https://example.com/admin/users", "HarvestBot"));
    }

    #[test]
    fn test_agent_specific_rules() {
        let rules =
            RobotsRules::from_content("User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /");
        assert!(rules.is_allowed("https://example.com/page", "HarvestBot"));
        assert!(!rules.is_allowed("https://example.com/page", "BadBot"));
    }

    #[test]
    fn test_garbage_content_allows() {
        let rules = RobotsRules::from_content("not a robots file {{{");
        assert!(rules.is_allowed("https://example.com/page", "HarvestBot"));
    }
}
