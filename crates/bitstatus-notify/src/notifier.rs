//! Notification orchestration.
//!
//! Resolves credentials and the commit→repository map, derives the outgoing
//! status (applying continuation across an aborted predecessor), and issues
//! one POST per resolved repository. Failures on one repository never stop
//! the others; nothing here ever alters the build's own result.

use tracing::{info, warn};

use bitstatus_core::{
    build_key, build_name, BuildSnapshot, BuildState, BuildStatus, KeyMode, NotifierConfig,
    StatusHost, StatusResource,
};

use crate::credentials::{resolve_credentials, CredentialStore, Credentials};
use crate::error::NotifyError;
use crate::log::BuildLog;
use crate::scm::{resolve_commit_repo_map, CommitRepoMap};
use crate::transport::{self, StatusDelivery};

/// One repository that could not be notified.
#[derive(Debug)]
pub struct NotifyFailure {
    pub resource: StatusResource,
    pub error: NotifyError,
}

/// Result of one notification invocation.
#[derive(Debug, Default)]
pub struct NotifyOutcome {
    /// Accepted deliveries, in notification order.
    pub delivered: Vec<StatusDelivery>,

    /// Repositories excluded before any request was made (unparseable
    /// identity).
    pub skipped: usize,

    /// Per-repository delivery failures.
    pub failures: Vec<NotifyFailure>,
}

impl NotifyOutcome {
    pub fn fully_delivered(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parameters of the scripted notification entry point.
///
/// Only the state is required; everything else falls back to values derived
/// from the build snapshot.
#[derive(Debug, Clone)]
pub struct StepParams {
    pub build_state: BuildState,
    pub credentials_id: Option<String>,
    pub build_key: Option<String>,
    pub build_name: Option<String>,
    pub build_description: Option<String>,
    pub repo_slug: Option<String>,
    pub commit_id: Option<String>,
}

impl StepParams {
    pub fn new(build_state: BuildState) -> Self {
        Self {
            build_state,
            credentials_id: None,
            build_key: None,
            build_name: None,
            build_description: None,
            repo_slug: None,
            commit_id: None,
        }
    }
}

/// Derive the outgoing status of a build under the given addressing mode.
pub fn status_from_build(build: &BuildSnapshot, mode: KeyMode) -> BuildStatus {
    BuildStatus::new(
        BuildState::from_result(build.result),
        build_key(&build.job_full_name, build.number, mode),
        build.url.clone(),
        build_name(&build.job_full_name, build.number, mode),
        build.default_description(),
    )
}

/// The notifier bound to a credential store and one configuration bundle.
pub struct BuildStatusNotifier<'a> {
    store: &'a dyn CredentialStore,
    config: NotifierConfig,
}

impl<'a> BuildStatusNotifier<'a> {
    pub fn new(store: &'a dyn CredentialStore, config: NotifierConfig) -> Self {
        Self { store, config }
    }

    /// Report an in-progress status before the build runs.
    ///
    /// No-op unless `notify_start` is configured. Every failure is written
    /// to the build log and swallowed.
    pub async fn notify_start(&self, build: &BuildSnapshot, log: &mut dyn BuildLog) {
        if !self.config.notify_start {
            return;
        }
        info!(job = %build.job_full_name, build = build.number, "notifying build start");
        if let Err(err) = self.notify(build, log).await {
            log.line(&format!("Build status notify on start failed: {err}"));
        }
    }

    /// Report the final status after the build finished.
    ///
    /// No-op unless `notify_finish` is configured. Every failure is written
    /// to the build log and swallowed.
    pub async fn notify_finish(&self, build: &BuildSnapshot, log: &mut dyn BuildLog) {
        if !self.config.notify_finish {
            return;
        }
        info!(job = %build.job_full_name, build = build.number, "notifying build finish");
        if let Err(err) = self.notify(build, log).await {
            log.line(&format!("Build status notify on finish failed: {err}"));
        }
    }

    /// Notify the status derived from the build snapshot itself.
    pub async fn notify(
        &self,
        build: &BuildSnapshot,
        log: &mut dyn BuildLog,
    ) -> Result<NotifyOutcome, NotifyError> {
        let credentials = resolve_credentials(
            self.store,
            self.config.credentials_id.as_deref(),
            self.config.global_credentials_id.as_deref(),
        )
        .await;
        self.notify_with(
            credentials,
            self.config.override_latest_build,
            build,
            log,
            None,
            None,
            None,
        )
        .await
    }

    /// Scripted entry point: an explicit state with optional overrides.
    ///
    /// Defaults mirror the derived values: unique key, per-build display
    /// name, test-count description. The target repository is only
    /// re-addressed when *both* `repo_slug` and `commit_id` are supplied.
    pub async fn run_step(
        &self,
        build: &BuildSnapshot,
        log: &mut dyn BuildLog,
        params: StepParams,
    ) -> Result<NotifyOutcome, NotifyError> {
        let key = params
            .build_key
            .unwrap_or_else(|| build_key(&build.job_full_name, build.number, KeyMode::Unique));
        let name = params
            .build_name
            .unwrap_or_else(|| build_name(&build.job_full_name, build.number, KeyMode::PerBuild));
        let description = params
            .build_description
            .unwrap_or_else(|| build.default_description());
        let status = BuildStatus::new(
            Some(params.build_state),
            key,
            build.url.clone(),
            name,
            description,
        );

        let credentials = resolve_credentials(
            self.store,
            params.credentials_id.as_deref(),
            self.config.global_credentials_id.as_deref(),
        )
        .await;

        self.notify_with(
            credentials,
            true,
            build,
            log,
            Some(status),
            params.repo_slug.as_deref(),
            params.commit_id.as_deref(),
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn notify_with(
        &self,
        credentials: Option<Credentials>,
        override_latest_build: bool,
        build: &BuildSnapshot,
        log: &mut dyn BuildLog,
        status_override: Option<BuildStatus>,
        repo_slug: Option<&str>,
        commit_id: Option<&str>,
    ) -> Result<NotifyOutcome, NotifyError> {
        let host = StatusHost::parse(&self.config.status_host)?;
        let mode = KeyMode::from_override(override_latest_build);

        let map = resolve_commit_repo_map(build, &host, log)?;

        // The aborted-predecessor map is a refinement, never a requirement:
        // resolution failures here are logged and ignored.
        let prev = build.previous.as_deref().filter(|p| p.is_aborted());
        let prev_map = match prev {
            Some(prev_build) => {
                resolve_commit_repo_map(prev_build, &host, log).unwrap_or_else(|err| {
                    warn!(error = %err, "could not resolve previous build's repositories");
                    log.line(&format!(
                        "Could not resolve the aborted previous build's repositories: {err}"
                    ));
                    CommitRepoMap::new()
                })
            }
            None => CommitRepoMap::new(),
        };
        let prev_key = prev.map(|p| build_key(&p.job_full_name, p.number, mode));

        let status = status_override.unwrap_or_else(|| status_from_build(build, mode));

        let credentials = credentials.ok_or(NotifyError::CredentialsMissing)?;
        let client = transport::build_client()?;

        let mut outcome = NotifyOutcome::default();
        for entry in map.iter() {
            let identity = match entry.remote.identity() {
                Ok(identity) => identity,
                Err(err) => {
                    warn!(remote = %entry.remote.raw(), error = %err, "skipping remote");
                    log.line(&format!("Skipping remote {}: {err}", entry.remote.raw()));
                    outcome.skipped += 1;
                    continue;
                }
            };

            let mut resource =
                StatusResource::new(host.base_url(), identity, entry.commit_id.clone());

            // Continuation: a superseded abort on the same commit keeps its
            // key, so the stale remote entry is revised instead of joined by
            // a duplicate.
            let mut outgoing = status.clone();
            if prev_map.contains_commit(&entry.commit_id) {
                if let Some(key) = &prev_key {
                    outgoing = outgoing.with_key(key.clone());
                }
            }

            if let (Some(slug), Some(commit)) = (repo_slug, commit_id) {
                resource = resource.with_target(slug.to_string(), commit.to_string());
            }

            match transport::send(&client, &credentials, &resource, &outgoing, log).await {
                Ok(delivery) => outcome.delivered.push(delivery),
                Err(error) => outcome.failures.push(NotifyFailure { resource, error }),
            }
        }

        info!(
            job = %build.job_full_name,
            build = build.number,
            delivered = outcome.delivered.len(),
            skipped = outcome.skipped,
            failed = outcome.failures.len(),
            "build status notification finished"
        );

        Ok(outcome)
    }
}
