//! Allow-list policy for the configured status-API host.

use crate::error::HostError;

/// The configured build-status API host, validated once and then used both
/// as the base of every POST and as the allow-list for remote hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusHost {
    base_url: String,
    host: String,
}

impl StatusHost {
    /// Validate the configured host string.
    ///
    /// Must be a full URL with an explicit http/https scheme; a single
    /// trailing slash is tolerated and removed.
    pub fn parse(configured: &str) -> Result<Self, HostError> {
        let trimmed = configured.trim();
        if !trimmed.starts_with("http") {
            return Err(HostError::MissingScheme(configured.to_string()));
        }

        let base_url = trimmed.strip_suffix('/').unwrap_or(trimmed).to_string();
        let rest = base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&base_url);
        let host = rest
            .split('/')
            .next()
            .unwrap_or_default()
            .rsplit('@')
            .next()
            .unwrap_or_default()
            .split(':')
            .next()
            .unwrap_or_default()
            .to_string();
        if host.is_empty() {
            return Err(HostError::NoHost(configured.to_string()));
        }

        Ok(Self { base_url, host })
    }

    /// Base URL the status endpoint is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a remote's host is covered by this status host: either an
    /// exact match or a dot-suffix match (`repo.example.com` is allowed
    /// against a configured `example.com`).
    pub fn allows(&self, remote_host: &str) -> bool {
        remote_host == self.host || remote_host.ends_with(&format!(".{}", self.host))
    }

    /// Skip message written to the build log when a remote is not covered.
    pub fn render_skip(&self, remote_host: &str) -> String {
        format!(
            "Repository host {remote_host} is not covered by the configured status host {}; skipping",
            self.host
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_http_scheme() {
        assert!(matches!(
            StatusHost::parse("bitbucket.example.com"),
            Err(HostError::MissingScheme(_))
        ));
        assert!(StatusHost::parse("https://bitbucket.example.com").is_ok());
        assert!(StatusHost::parse("http://bitbucket.example.com").is_ok());
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let host = StatusHost::parse("https://bitbucket.example.com/").unwrap();
        assert_eq!(host.base_url(), "https://bitbucket.example.com");
    }

    #[test]
    fn exact_host_match_is_allowed() {
        let host = StatusHost::parse("https://bitbucket.example.com").unwrap();
        assert!(host.allows("bitbucket.example.com"));
    }

    #[test]
    fn suffix_match_is_allowed() {
        let host = StatusHost::parse("https://example.com").unwrap();
        assert!(host.allows("bitbucket.example.com"));
    }

    #[test]
    fn unrelated_host_is_rejected() {
        let host = StatusHost::parse("https://bitbucket.example.com").unwrap();
        assert!(!host.allows("github.com"));
        // no bare substring matching
        assert!(!host.allows("evil-bitbucket.example.com.attacker.net"));
    }

    #[test]
    fn port_in_configured_host_is_ignored_for_matching() {
        let host = StatusHost::parse("https://bitbucket.example.com:7990").unwrap();
        assert!(host.allows("bitbucket.example.com"));
        assert_eq!(host.base_url(), "https://bitbucket.example.com:7990");
    }
}
