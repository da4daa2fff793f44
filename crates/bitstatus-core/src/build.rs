//! The build snapshot handed to the notifier by the job engine.
//!
//! The notification core never talks to the job engine directly; it receives
//! one plain value describing the build being reported, including the SCM
//! binding the commit/repository mapping is resolved from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::BuildResult;

/// A git checkout: the configured remotes and the revision that was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    /// Remote repository URLs configured on the checkout.
    pub remotes: Vec<String>,

    /// Commit id that was built; absent when the checkout never resolved
    /// a revision (e.g. the build failed before checkout).
    #[serde(default)]
    pub revision: Option<String>,
}

/// A source-control reference attached to a job or branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRef {
    /// A supported git checkout.
    Git(GitSource),

    /// Present but not a system this notifier can resolve; the name is kept
    /// for diagnostics.
    Unsupported { system: String },
}

/// How a job is bound to source control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobScm {
    /// Freestyle-like job with a single SCM binding; `None` when the job has
    /// no source control configured at all.
    Direct { source: Option<SourceRef> },

    /// Pipeline-like job: an optional per-branch binding plus an optional
    /// "load pipeline script from SCM" definition.
    Pipeline {
        #[serde(default)]
        branch: Option<SourceRef>,
        #[serde(default)]
        script: Option<SourceRef>,
    },
}

/// Test totals reported by the job engine, used for the default status
/// description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTotals {
    pub total: u64,
    pub failed: u64,
}

/// One build, as seen by the notification core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSnapshot {
    /// Full job name, unique across the engine (e.g. `folder/job`).
    pub job_full_name: String,

    /// Build number within the job.
    pub number: u64,

    /// Terminal result; `None` while the build is still running.
    #[serde(default)]
    pub result: Option<BuildResult>,

    /// Absolute URL of the build's page, reported in the status payload.
    pub url: String,

    /// Build environment, used to expand placeholders in remote URLs.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Source-control binding of the job this build belongs to.
    pub scm: JobScm,

    /// The immediately preceding build of the same job, if any. Only its
    /// result and commit mapping are consulted (continuation handling).
    #[serde(default)]
    pub previous: Option<Box<BuildSnapshot>>,

    /// Test totals, when the engine ran any.
    #[serde(default)]
    pub tests: Option<TestTotals>,
}

impl BuildSnapshot {
    /// Default status description: test counts when available, empty
    /// otherwise.
    pub fn default_description(&self) -> String {
        match self.tests {
            Some(tests) => {
                let passed = tests.total.saturating_sub(tests.failed);
                format!("{passed} of {} tests passed", tests.total)
            }
            None => String::new(),
        }
    }

    /// Whether this build ended aborted.
    pub fn is_aborted(&self) -> bool {
        self.result == Some(BuildResult::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(tests: Option<TestTotals>) -> BuildSnapshot {
        BuildSnapshot {
            job_full_name: "acme/widgets".to_string(),
            number: 7,
            result: Some(BuildResult::Success),
            url: "https://ci.example.com/job/widgets/7/".to_string(),
            env: HashMap::new(),
            scm: JobScm::Direct {
                source: Some(SourceRef::Git(GitSource {
                    remotes: vec!["https://bitbucket.example.com/acme/widgets.git".to_string()],
                    revision: Some("deadbeef".to_string()),
                })),
            },
            previous: None,
            tests,
        }
    }

    #[test]
    fn description_from_test_totals() {
        let build = snapshot(Some(TestTotals {
            total: 10,
            failed: 2,
        }));
        assert_eq!(build.default_description(), "8 of 10 tests passed");
    }

    #[test]
    fn description_empty_without_tests() {
        assert_eq!(snapshot(None).default_description(), "");
    }

    #[test]
    fn aborted_detection() {
        let mut build = snapshot(None);
        assert!(!build.is_aborted());
        build.result = Some(BuildResult::Aborted);
        assert!(build.is_aborted());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let build = snapshot(Some(TestTotals { total: 3, failed: 0 }));
        let json = serde_json::to_string(&build).unwrap();
        let back: BuildSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, build);
    }

    #[test]
    fn pipeline_scm_deserializes_with_missing_sources() {
        let json = r#"{"type": "pipeline"}"#;
        let scm: JobScm = serde_json::from_str(json).unwrap();
        assert_eq!(
            scm,
            JobScm::Pipeline {
                branch: None,
                script: None
            }
        );
    }
}
