//! The remote endpoint a single status report is addressed to.

use crate::repo_url::RepoIdentity;

/// Binds (host, owner, repo slug, commit) to the concrete REST endpoint for
/// posting a build status.
///
/// Constructed per notification attempt from a parsed remote URL, never
/// persisted. Owner and slug are guaranteed non-empty because the only
/// constructors take an already-validated [`RepoIdentity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResource {
    host: String,
    owner: String,
    repo_slug: String,
    commit_id: String,
}

impl StatusResource {
    pub fn new(host: &str, identity: RepoIdentity, commit_id: String) -> Self {
        Self {
            host: host.to_string(),
            owner: identity.owner,
            repo_slug: identity.slug,
            commit_id,
        }
    }

    /// The same resource re-addressed to an explicitly supplied repository
    /// slug and commit id, keeping the derived owner. Used by the scripted
    /// notification entry point.
    pub fn with_target(&self, repo_slug: String, commit_id: String) -> Self {
        Self {
            host: self.host.clone(),
            owner: self.owner.clone(),
            repo_slug,
            commit_id,
        }
    }

    /// URL of the build-status POST endpoint for this commit.
    pub fn post_url(&self) -> String {
        format!(
            "{}/rest/build-status/1.0/commits/{}",
            self.host, self.commit_id
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo_slug(&self) -> &str {
        &self.repo_slug
    }

    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }
}
