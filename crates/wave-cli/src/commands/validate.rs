//! `wave validate` command - Check configuration and local files offline.

use std::path::Path;

use anyhow::{Result, bail};

use super::load_config;
use crate::output;
use crate::services::{CheckOutcome, ValidateService};

/// Run the validate command.
pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let service = ValidateService::new(&config);
    let mut problems = 0;

    for problem in service.check_config() {
        output::error(&problem.to_string());
        problems += 1;
    }

    for check in service.check_files() {
        match check.outcome {
            CheckOutcome::Valid { items } => {
                output::success(&format!("{}: {items} item(s)", check.kind));
            }
            CheckOutcome::Missing => {
                output::info(&format!(
                    "{}: no local file ({})",
                    check.kind,
                    config.file_path(check.kind).display()
                ));
            }
            CheckOutcome::Invalid(e) => {
                output::error(&format!("{}: {e}", check.kind));
                problems += 1;
            }
        }
    }

    if problems > 0 {
        bail!("{problems} problem(s) found");
    }
    output::success("Configuration is valid");
    Ok(())
}
