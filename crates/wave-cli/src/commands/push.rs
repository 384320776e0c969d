//! `wave push` command - Propagate the local configuration to target repositories.

use std::path::Path;

use anyhow::{Result, bail};
use colored::Colorize;

use super::{build_client, load_config, runtime};
use crate::output;
use crate::services::push::RepoReport;
use crate::services::{KindReport, PushOptions, PushService, PushSummary};

/// Run the push command.
pub fn run(config_path: &Path, repos: &[String], dry_run: bool, keep_going: bool) -> Result<()> {
    let config = load_config(config_path)?;

    let options = PushOptions {
        dry_run: dry_run || config.dry_run,
        keep_going,
    };
    let client = build_client(&config)?;
    let service = PushService::new(&client, &config, options);

    let summary = runtime()?.block_on(async {
        let targets = service.resolve_targets(repos).await?;
        output::info(&format!(
            "{} {} repositor{}",
            if options.dry_run { "Planning" } else { "Pushing to" },
            targets.len(),
            if targets.len() == 1 { "y" } else { "ies" }
        ));
        Ok::<_, wave_core::Error>(service.push_all(&targets).await)
    })?;

    print_summary(&summary, options.dry_run);

    if !summary.is_success() {
        bail!("{} failure(s) during push", summary.failures.len());
    }
    if options.dry_run {
        output::info("Dry run - no changes were made");
    } else {
        output::success("Push complete");
    }
    Ok(())
}

fn print_summary(summary: &PushSummary, dry_run: bool) {
    for repo in &summary.repos {
        print_repo(repo, dry_run);
    }

    if summary.failures.is_empty() {
        return;
    }
    output::hr();
    for failure in &summary.failures {
        output::error(&format!("{} {}: {}", failure.repo, failure.kind, failure.error));
    }
}

fn print_repo(report: &RepoReport, dry_run: bool) {
    output::info(&report.repo.to_string().bold().to_string());
    for kind in &report.kinds {
        print_kind(kind, dry_run);
    }
}

fn print_kind(report: &KindReport, dry_run: bool) {
    let label = match report.strategy {
        Some(strategy) => format!("{} ({strategy})", report.kind),
        None => report.kind.to_string(),
    };

    if let Some(reason) = &report.skipped {
        output::detail(&format!("  {label}: skipped, {reason}").dimmed().to_string());
        return;
    }
    if report.is_noop() && report.ambiguous.is_empty() {
        output::detail(&format!("  {label}: up to date"));
        return;
    }

    output::detail(&format!("  {label}:"));
    for change in &report.planned {
        output::planned(change.operation, &change.description);
    }
    for identity in &report.ambiguous {
        output::warn(&format!(
            "{}: skipped '{identity}', several remote items share it",
            report.kind
        ));
    }

    if !dry_run && !report.is_noop() {
        let applied = report.applied;
        output::detail(&format!(
            "    {} created, {} updated, {} deleted",
            applied.created, applied.updated, applied.deleted
        ));
    }
    if let Some(link) = &report.link {
        output::essential(link);
    }
}
