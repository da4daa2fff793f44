//! bitstatus - report a CI build's status to a Bitbucket-style API.
//!
//! The job engine invokes this binary around a build:
//!
//! - `bitstatus notify --at start|finish`: derive the status from a build
//!   snapshot and report it (honoring the configured notify flags)
//! - `bitstatus step --state <STATE>`: explicit scripted report with
//!   optional key/name/description/repository overrides
//!
//! Configuration is a TOML file carrying the notifier settings plus a
//! credentials table; secrets can be indirected through environment
//! variables so they stay out of the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing::Level;

use bitstatus_core::{BuildSnapshot, BuildState, NotifierConfig};
use bitstatus_notify::{
    BuildStatusNotifier, Credentials, MemoryCredentialStore, StepParams, WriterLog,
};

#[derive(Parser)]
#[command(name = "bitstatus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Report CI build status to a Bitbucket-style build-status API", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Phase {
    /// Before the build runs: report in-progress
    Start,
    /// After the build finished: report the terminal state
    Finish,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the status derived from a build snapshot
    Notify {
        /// Notifier configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Build snapshot (JSON), as exported by the job engine
        #[arg(short, long)]
        build: PathBuf,

        /// Which notification point this is
        #[arg(long, value_enum, default_value = "finish")]
        at: Phase,
    },

    /// Report an explicit status (scripted-pipeline style)
    Step {
        /// Notifier configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Build snapshot (JSON), as exported by the job engine
        #[arg(short, long)]
        build: PathBuf,

        /// Status to report: INPROGRESS, SUCCESSFUL or FAILED
        #[arg(long)]
        state: BuildState,

        /// Credential identifier, overriding the configured ones
        #[arg(long)]
        credentials_id: Option<String>,

        /// Explicit status key (defaults to the job's unique key)
        #[arg(long)]
        build_key: Option<String>,

        /// Explicit display name
        #[arg(long)]
        build_name: Option<String>,

        /// Explicit description
        #[arg(long)]
        description: Option<String>,

        /// Report against this repository slug (requires --commit-id)
        #[arg(long, requires = "commit_id")]
        repo_slug: Option<String>,

        /// Report against this commit (requires --repo-slug)
        #[arg(long, requires = "repo_slug")]
        commit_id: Option<String>,
    },
}

/// One named credential in the configuration file. The secret is either
/// inline or read from an environment variable at startup.
#[derive(Debug, Deserialize)]
struct CredentialEntry {
    username: String,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    secret_env: Option<String>,
}

/// Full CLI configuration: notifier settings plus the credential table.
#[derive(Debug, Deserialize)]
struct CliConfig {
    #[serde(flatten)]
    notifier: NotifierConfig,

    #[serde(default)]
    credentials: HashMap<String, CredentialEntry>,
}

fn load_config(path: &Path) -> Result<CliConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse configuration from {}", path.display()))
}

fn load_build(path: &Path) -> Result<BuildSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read build snapshot from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse build snapshot from {}", path.display()))
}

fn credential_store(config: &CliConfig) -> Result<MemoryCredentialStore> {
    let store = MemoryCredentialStore::new();
    for (id, entry) in &config.credentials {
        let secret = match (&entry.secret, &entry.secret_env) {
            (Some(secret), _) => secret.clone(),
            (None, Some(var)) => std::env::var(var)
                .with_context(|| format!("credential {id}: environment variable {var} not set"))?,
            (None, None) => bail!("credential {id}: needs either secret or secret_env"),
        };
        store.insert(id.clone(), Credentials::new(entry.username.clone(), secret));
    }
    Ok(store)
}

/// Set up the global subscriber. `RUST_LOG` wins over the verbosity flag.
fn init_tracing(json: bool, level: Level) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().try_init().ok();
    } else {
        builder.try_init().ok();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Notify { config, build, at } => cmd_notify(&config, &build, at).await,
        Commands::Step {
            config,
            build,
            state,
            credentials_id,
            build_key,
            build_name,
            description,
            repo_slug,
            commit_id,
        } => {
            let params = StepParams {
                build_state: state,
                credentials_id,
                build_key,
                build_name,
                build_description: description,
                repo_slug,
                commit_id,
            };
            cmd_step(&config, &build, params).await
        }
    }
}

async fn cmd_notify(config_path: &Path, build_path: &Path, at: Phase) -> Result<()> {
    let config = load_config(config_path)?;
    let build = load_build(build_path)?;
    let store = credential_store(&config)?;

    let notifier = BuildStatusNotifier::new(&store, config.notifier);
    let mut log = WriterLog::new(std::io::stdout());

    match at {
        Phase::Start => notifier.notify_start(&build, &mut log).await,
        Phase::Finish => notifier.notify_finish(&build, &mut log).await,
    }

    Ok(())
}

async fn cmd_step(config_path: &Path, build_path: &Path, params: StepParams) -> Result<()> {
    let config = load_config(config_path)?;
    let build = load_build(build_path)?;
    let store = credential_store(&config)?;

    let notifier = BuildStatusNotifier::new(&store, config.notifier);
    let mut log = WriterLog::new(std::io::stdout());

    let outcome = notifier.run_step(&build, &mut log, params).await?;
    if !outcome.fully_delivered() {
        bail!(
            "{} of {} status reports failed",
            outcome.failures.len(),
            outcome.failures.len() + outcome.delivered.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_notifier_settings_and_credentials() {
        let config: CliConfig = toml::from_str(
            r#"
            status_host = "https://bitbucket.example.com"
            global_credentials_id = "bitbucket-bot"
            notify_start = true
            override_latest_build = true

            [credentials.bitbucket-bot]
            username = "bot"
            secret = "hunter2"
            "#,
        )
        .unwrap();

        assert_eq!(config.notifier.status_host, "https://bitbucket.example.com");
        assert!(config.notifier.notify_start);
        assert!(config.notifier.override_latest_build);
        let entry = &config.credentials["bitbucket-bot"];
        assert_eq!(entry.username, "bot");
        assert_eq!(entry.secret.as_deref(), Some("hunter2"));
    }

    #[test]
    fn credential_store_rejects_entry_without_secret() {
        let config: CliConfig = toml::from_str(
            r#"
            status_host = "https://bitbucket.example.com"

            [credentials.broken]
            username = "bot"
            "#,
        )
        .unwrap();

        let err = credential_store(&config).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn build_snapshot_loads_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.json");
        std::fs::write(
            &path,
            r#"{
                "job_full_name": "acme/widgets",
                "number": 7,
                "result": "SUCCESS",
                "url": "https://ci.example.com/job/widgets/7/",
                "scm": {
                    "type": "direct",
                    "source": {
                        "kind": "git",
                        "remotes": ["https://bitbucket.example.com/acme/widgets.git"],
                        "revision": "deadbeef"
                    }
                }
            }"#,
        )
        .unwrap();

        let build = load_build(&path).unwrap();
        assert_eq!(build.job_full_name, "acme/widgets");
        assert_eq!(build.number, 7);
    }
}
