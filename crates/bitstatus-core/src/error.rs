//! Error types for the bitstatus domain.

use thiserror::Error;

/// Errors raised while extracting a repository identity from a remote URL.
///
/// These are recoverable at the notification level: the offending remote is
/// logged and skipped, the rest of the repositories are still notified.
#[derive(Debug, Error)]
pub enum RepoUrlError {
    /// The remote string could not be split into host and path.
    #[error("unparseable remote url: {0}")]
    Unparseable(String),

    /// No repository slug after the last path separator.
    #[error("could not extract the repository name from the repository URL: {0}")]
    EmptySlug(String),

    /// No owner segment left of the slug.
    #[error("could not extract the owner from the repository URL: {url} with repository name: {slug}")]
    EmptyOwner { url: String, slug: String },
}

/// Errors raised validating the configured status-API host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The configured host must carry an explicit http/https scheme.
    #[error("status host must be a full url starting with http: {0}")]
    MissingScheme(String),

    /// The configured host has no host component at all.
    #[error("status host has no host component: {0}")]
    NoHost(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_url_error_display_names_the_url() {
        let err = RepoUrlError::EmptySlug("https://example.com/".to_string());
        assert!(err.to_string().contains("https://example.com/"));

        let err = RepoUrlError::EmptyOwner {
            url: "https://example.com/repo.git".to_string(),
            slug: "repo".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("repo"));
        assert!(msg.contains("https://example.com/repo.git"));
    }

    #[test]
    fn host_error_display() {
        let err = HostError::MissingScheme("bitbucket.example.com".to_string());
        assert!(err.to_string().contains("starting with http"));
    }
}
