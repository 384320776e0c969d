//! `wave pull` command - Snapshot a repository into the local files.

use std::path::Path;

use anyhow::{Context, Result};
use wave_core::RepoRef;

use super::{build_client, load_config, runtime};
use crate::output;
use crate::services::PullService;

/// Run the pull command.
pub fn run(config_path: &Path, repo: &str, dry_run: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let repo = RepoRef::parse(repo)?;
    let client = build_client(&config)?;
    let dry_run = dry_run || config.dry_run;

    output::info(&format!("Pulling configuration from {repo}"));

    let written = runtime()?
        .block_on(
            PullService::new(&client, &config)
                .with_dry_run(dry_run)
                .pull(&repo),
        )
        .with_context(|| format!("Failed to pull {repo}"))?;

    for (kind, path) in &written {
        output::detail(&format!("  {kind:<20} {}", path.display()));
    }

    if dry_run {
        output::info(&format!(
            "Would write {} file(s) to {}",
            written.len(),
            config.output_dir().display()
        ));
        output::info("Dry run - no changes were made");
    } else {
        output::success(&format!(
            "Wrote {} file(s) to {}",
            written.len(),
            config.output_dir().display()
        ));
    }

    Ok(())
}
