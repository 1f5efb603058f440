/// Checks whether a host matches a domain pattern
///
/// Two pattern forms are supported:
/// - exact: "example.com" matches only "example.com"
/// - wildcard: "*.example.com" matches "example.com" and every subdomain
///   ("blog.example.com", "api.v2.example.com", ...)
///
/// # Examples
///
/// ```
/// use harvestman::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "blog.example.com"));
///
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "blog.example.com"));
/// assert!(!matches_wildcard("*.example.com", "notexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => host == pattern,
    }
}
