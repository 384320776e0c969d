//! Wave CLI - propagate repository settings across Gitea repositories.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;
mod services;

use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet);
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init { force } => commands::init::run(&cli.config, force),
        Commands::Pull { repo } => commands::pull::run(&cli.config, &repo, cli.dry_run),
        Commands::Push { repos, keep_going } => {
            commands::push::run(&cli.config, &repos, cli.dry_run, keep_going)
        }
        Commands::Validate => commands::validate::run(&cli.config),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "wave_cli=debug,wave_core=debug,wave_gitea=debug",
        _ => "wave_cli=trace,wave_core=trace,wave_gitea=trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
