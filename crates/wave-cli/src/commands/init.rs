//! `wave init` command - Write a default configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use wave_core::Config;

use crate::output;

/// Run the init command.
pub fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        output::warn(&format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }

    let config = Config::default();
    config
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    output::success(&format!("Wrote {}", path.display()));
    output::info(&format!(
        "Resource files live in: {}",
        config.output_dir().display()
    ));
    output::detail("  Set gitea_url and GITEA_TOKEN, then run `wave pull <owner/repo>`");

    Ok(())
}
