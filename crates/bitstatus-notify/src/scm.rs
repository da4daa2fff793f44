//! Commit locator: resolving a build's SCM binding into a commit→repository
//! map, filtered to the allow-listed status host.

use std::collections::HashMap;

use tracing::{debug, warn};

use bitstatus_core::build::{BuildSnapshot, GitSource, JobScm, SourceRef};
use bitstatus_core::repo_url::{expand_env, strip_trailing_slash, RemoteUrl};
use bitstatus_core::StatusHost;

use crate::error::ScmError;
use crate::log::BuildLog;

/// One resolvable repository of a build: the built commit and the parsed
/// remote (path already expanded and normalized).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRepoEntry {
    pub commit_id: String,
    pub remote: RemoteUrl,
}

/// Commit→repository mapping of one build, one entry per remote.
///
/// Two remotes carrying the same commit id both stay in the map; the
/// notifier reports once per repository, not once per commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRepoMap {
    entries: Vec<CommitRepoEntry>,
}

impl CommitRepoMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: CommitRepoEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, other: CommitRepoMap) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommitRepoEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any entry resolved to the given commit.
    pub fn contains_commit(&self, commit_id: &str) -> bool {
        self.entries.iter().any(|e| e.commit_id == commit_id)
    }
}

/// Capability seam for source-control systems: everything the notifier needs
/// from an SCM is the commit→repository map of one build.
pub trait ScmAdapter {
    fn commit_repo_map(
        &self,
        env: &HashMap<String, String>,
        host: &StatusHost,
        log: &mut dyn BuildLog,
    ) -> Result<CommitRepoMap, ScmError>;
}

/// Adapter over a git checkout.
pub struct GitScmAdapter<'a> {
    source: &'a GitSource,
}

impl<'a> GitScmAdapter<'a> {
    pub fn new(source: &'a GitSource) -> Self {
        Self { source }
    }
}

impl ScmAdapter for GitScmAdapter<'_> {
    fn commit_repo_map(
        &self,
        env: &HashMap<String, String>,
        host: &StatusHost,
        log: &mut dyn BuildLog,
    ) -> Result<CommitRepoMap, ScmError> {
        let mut map = CommitRepoMap::new();

        for raw in &self.source.remotes {
            let remote = match RemoteUrl::parse(raw) {
                Ok(remote) => remote,
                Err(err) => {
                    warn!(remote = %raw, error = %err, "skipping unparseable remote");
                    log.line(&format!("Skipping remote {raw}: {err}"));
                    continue;
                }
            };

            if !host.allows(remote.host()) {
                debug!(remote_host = %remote.host(), "remote host not allow-listed");
                log.line(&host.render_skip(remote.host()));
                continue;
            }

            let path = expand_env(remote.path(), env);
            let path = strip_trailing_slash(&path).to_string();
            let remote = remote.with_path(path);

            let Some(commit_id) = self.source.revision.clone() else {
                warn!(remote = %remote.raw(), "no commit id resolved for remote");
                log.line(&format!(
                    "Commit ID could not be found for remote {}; skipping",
                    remote.raw()
                ));
                continue;
            };

            debug!(commit = %commit_id, remote = %remote.raw(), "resolved commit/repository pair");
            map.push(CommitRepoEntry { commit_id, remote });
        }

        Ok(map)
    }
}

/// Resolve the commit→repository map of a build from its job's SCM binding.
///
/// Direct bindings must exist and be a supported system. Pipeline bindings
/// collect remotes from the branch's own source and from an explicit
/// load-script-from-SCM definition; when neither is present the problem is
/// reported to the build log and an empty map is returned so the build goes
/// on unnotified.
pub fn resolve_commit_repo_map(
    build: &BuildSnapshot,
    host: &StatusHost,
    log: &mut dyn BuildLog,
) -> Result<CommitRepoMap, ScmError> {
    match &build.scm {
        JobScm::Direct { source: None } => Err(ScmError::Missing),
        JobScm::Direct {
            source: Some(source),
        } => source_map(source, build, host, log),
        JobScm::Pipeline { branch, script } => {
            let sources: Vec<&SourceRef> = branch.iter().chain(script.iter()).collect();
            if sources.is_empty() {
                log.line(&format!(
                    "No source-control definition found on pipeline job {}; skipping status notification",
                    build.job_full_name
                ));
                return Ok(CommitRepoMap::new());
            }

            let mut map = CommitRepoMap::new();
            for source in sources {
                map.extend(source_map(source, build, host, log)?);
            }
            Ok(map)
        }
    }
}

fn source_map(
    source: &SourceRef,
    build: &BuildSnapshot,
    host: &StatusHost,
    log: &mut dyn BuildLog,
) -> Result<CommitRepoMap, ScmError> {
    match source {
        SourceRef::Unsupported { system } => Err(ScmError::Unsupported(system.clone())),
        SourceRef::Git(git) => GitScmAdapter::new(git).commit_repo_map(&build.env, host, log),
    }
}
