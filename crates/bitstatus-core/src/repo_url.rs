//! Remote repository URL parsing and owner/slug extraction.
//!
//! Git remotes come in two shapes: regular URLs
//! (`scheme://[user@]host[:port]/path`) and scp-like short forms
//! (`user@host:path`). Both are reduced to a host plus a path; the
//! repository identity is then read from the last two path segments.

use std::collections::HashMap;

use regex::Regex;

use crate::error::RepoUrlError;

/// A parsed remote URL: the host used for allow-list checks and the path the
/// repository identity is extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    raw: String,
    host: String,
    path: String,
}

impl RemoteUrl {
    /// Split a remote string into host and path.
    ///
    /// Accepts `scheme://host/path` (userinfo and port are stripped from the
    /// host) and scp-like `user@host:path` forms.
    pub fn parse(raw: &str) -> Result<Self, RepoUrlError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RepoUrlError::Unparseable(raw.to_string()));
        }

        if let Some((_, rest)) = trimmed.split_once("://") {
            let (authority, path) = match rest.split_once('/') {
                Some((authority, path)) => (authority, format!("/{path}")),
                None => (rest, String::new()),
            };
            let host = host_of_authority(authority);
            if host.is_empty() {
                return Err(RepoUrlError::Unparseable(raw.to_string()));
            }
            return Ok(Self {
                raw: trimmed.to_string(),
                host,
                path,
            });
        }

        // scp-like: git@bitbucket.example.com:acme/widgets.git
        if let Some((authority, path)) = trimmed.split_once(':') {
            let host = host_of_authority(authority);
            if host.is_empty() || path.is_empty() {
                return Err(RepoUrlError::Unparseable(raw.to_string()));
            }
            return Ok(Self {
                raw: trimmed.to_string(),
                host,
                path: format!("/{path}"),
            });
        }

        Err(RepoUrlError::Unparseable(raw.to_string()))
    }

    /// The original remote string, for log lines.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The same remote with a rewritten path (after expansion/normalization).
    pub fn with_path(&self, path: String) -> Self {
        Self {
            raw: self.raw.clone(),
            host: self.host.clone(),
            path,
        }
    }

    /// Extract the repository identity from this remote's path.
    pub fn identity(&self) -> Result<RepoIdentity, RepoUrlError> {
        RepoIdentity::from_path(&self.path)
    }
}

fn host_of_authority(authority: &str) -> String {
    // strip userinfo, then port
    let host = authority.rsplit('@').next().unwrap_or(authority);
    host.split(':').next().unwrap_or(host).to_string()
}

/// Owner and repository slug extracted from a remote path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    pub owner: String,
    pub slug: String,
}

impl RepoIdentity {
    /// Extract (owner, slug) from a repository path.
    ///
    /// The slug is the last path segment with a trailing `.git` removed; the
    /// owner is the segment immediately left of the slug. Deeper prefixes
    /// (nested project groups) are dropped, keeping only the two segments
    /// next to the repository.
    pub fn from_path(path: &str) -> Result<Self, RepoUrlError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let slug = segments
            .last()
            .map(|last| last.strip_suffix(".git").unwrap_or(last))
            .unwrap_or_default()
            .to_string();
        if slug.is_empty() {
            return Err(RepoUrlError::EmptySlug(path.to_string()));
        }

        let owner = segments
            .len()
            .checked_sub(2)
            .and_then(|i| segments.get(i))
            .copied()
            .unwrap_or_default()
            .to_string();
        if owner.is_empty() {
            return Err(RepoUrlError::EmptyOwner {
                url: path.to_string(),
                slug,
            });
        }

        Ok(Self { owner, slug })
    }
}

/// Expand `${VAR}` and `$VAR` placeholders from the build environment.
///
/// Unknown variables are left untouched so a misconfigured placeholder stays
/// visible in log lines instead of silently vanishing.
pub fn expand_env(input: &str, env: &HashMap<String, String>) -> String {
    let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("placeholder pattern is valid");
    pattern
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match env.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Remove a single trailing slash from a repository path.
pub fn strip_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_https_remote() {
        let url = RemoteUrl::parse("https://bitbucket.example.com/acme/widgets.git").unwrap();
        assert_eq!(url.host(), "bitbucket.example.com");
        assert_eq!(url.path(), "/acme/widgets.git");
    }

    #[test]
    fn parses_remote_with_userinfo_and_port() {
        let url = RemoteUrl::parse("ssh://git@bitbucket.example.com:7999/acme/widgets.git").unwrap();
        assert_eq!(url.host(), "bitbucket.example.com");
        assert_eq!(url.path(), "/acme/widgets.git");
    }

    #[test]
    fn parses_scp_like_remote() {
        let url = RemoteUrl::parse("git@bitbucket.example.com:acme/widgets.git").unwrap();
        assert_eq!(url.host(), "bitbucket.example.com");
        assert_eq!(url.path(), "/acme/widgets.git");
    }

    #[test]
    fn rejects_bare_words() {
        assert!(RemoteUrl::parse("not-a-remote").is_err());
        assert!(RemoteUrl::parse("").is_err());
    }

    #[test]
    fn identity_from_two_segment_path() {
        let id = RepoIdentity::from_path("/org/repo.git").unwrap();
        assert_eq!(id.owner, "org");
        assert_eq!(id.slug, "repo");
    }

    #[test]
    fn identity_without_git_suffix() {
        let id = RepoIdentity::from_path("/org/repo").unwrap();
        assert_eq!(id.owner, "org");
        assert_eq!(id.slug, "repo");
    }

    #[test]
    fn identity_drops_nested_group_prefix() {
        // only the component directly left of the slug becomes the owner
        let id = RepoIdentity::from_path("/group/org/repo.git").unwrap();
        assert_eq!(id.owner, "org");
        assert_eq!(id.slug, "repo");
    }

    #[test]
    fn identity_fails_on_empty_path() {
        assert!(matches!(
            RepoIdentity::from_path(""),
            Err(RepoUrlError::EmptySlug(_))
        ));
    }

    #[test]
    fn identity_fails_without_owner_segment() {
        assert!(matches!(
            RepoIdentity::from_path("/repo.git"),
            Err(RepoUrlError::EmptyOwner { .. })
        ));
    }

    #[test]
    fn expands_braced_and_bare_placeholders() {
        let mut env = HashMap::new();
        env.insert("TEAM".to_string(), "acme".to_string());
        env.insert("REPO".to_string(), "widgets".to_string());
        assert_eq!(expand_env("/${TEAM}/$REPO.git", &env), "/acme/widgets.git");
    }

    #[test]
    fn unknown_placeholder_is_left_in_place() {
        let env = HashMap::new();
        assert_eq!(expand_env("/${TEAM}/repo.git", &env), "/${TEAM}/repo.git");
    }

    #[test]
    fn strips_exactly_one_trailing_slash() {
        assert_eq!(strip_trailing_slash("/org/repo/"), "/org/repo");
        assert_eq!(strip_trailing_slash("/org/repo//"), "/org/repo/");
        assert_eq!(strip_trailing_slash("/org/repo"), "/org/repo");
    }

    #[test]
    fn trailing_slash_then_identity() {
        let path = strip_trailing_slash("/org/repo/");
        let id = RepoIdentity::from_path(path).unwrap();
        assert_eq!(id.owner, "org");
        assert_eq!(id.slug, "repo");
    }
}
