//! clipwatch CLI entry point

use std::process::ExitCode;

use clap::Parser;

use clipwatch::cli::{
    app::{init_tracing, load_merged_config, run_probe, run_snapshot, run_watch, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use clipwatch::domain::config::AppConfig;
use clipwatch::domain::environment::BackendPreference;
use clipwatch::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    let command = match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        other => other,
    };

    // Build CLI config from args
    let cli_config = AppConfig {
        backend: cli
            .backend
            .map(|b| BackendPreference::from(b).to_string()),
        poll_interval_ms: cli.interval,
        json: if cli.json { Some(true) } else { None },
        ..Default::default()
    };

    let config = load_merged_config(cli_config).await;
    let options = config.monitor_options();
    let json = config.json_or_default();

    match command {
        Some(Commands::Snapshot) => run_snapshot(options, json).await,
        Some(Commands::Probe) => run_probe(options, json).await,
        Some(Commands::Config { .. }) | None => run_watch(options, json).await,
    }
}
