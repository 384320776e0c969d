//! Command-line surface and shared command helpers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use wave_core::Config;
use wave_core::config::DEFAULT_CONFIG_FILE;
use wave_gitea::{Auth, GiteaClient, SecretString};

pub mod completions;
pub mod init;
pub mod pull;
pub mod push;
pub mod validate;

/// Wave - propagate repository settings across Gitea repositories.
#[derive(Debug, Parser)]
#[command(name = "wave", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Show what would change without touching the remote.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors and essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Snapshot a repository's configuration into the output directory.
    Pull {
        /// Source repository (owner/repo).
        repo: String,
    },

    /// Propagate the local configuration to target repositories.
    Push {
        /// Target repositories (owner/repo). Defaults to the configured targets.
        repos: Vec<String>,

        /// Continue with the next kind and repository after a failure.
        #[arg(long)]
        keep_going: bool,
    },

    /// Check the configuration and local files without contacting Gitea.
    Validate,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Load the configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Build the Gitea client from the configuration and environment.
pub fn build_client(config: &Config) -> Result<GiteaClient> {
    let lookup = |key: &str| std::env::var(key).ok();
    let url = config.gitea_url(lookup)?;
    let token = config.gitea_token(lookup)?;

    GiteaClient::new(&Auth::Token(SecretString::from(token)), &url)
        .with_context(|| format!("Failed to create client for {url}"))
}

/// Runtime driving the async client. Everything runs on the calling thread.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}
