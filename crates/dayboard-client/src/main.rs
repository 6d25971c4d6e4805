//! dayboard CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use dayboard_client::cli::{Cli, Command, ConfigAction};
use dayboard_client::commands;
use dayboard_client::config::ClientConfig;
use dayboard_client::error::ClientResult;
use dayboard_core::CollectionKind;
use dayboard_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(cli.tracing_config(&config)) {
        eprintln!("warning: {}", e);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };
    if let Some(ref relay) = cli.relay {
        config.relay.url = relay.clone();
        config.validate()?;
    }
    Ok(config)
}

async fn run(cli: Cli, config: ClientConfig) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let json = cli.json;

    let Some(command) = cli.command else {
        return commands::calendar::events(&config, json).await;
    };

    match command {
        Command::Serve(args) => commands::serve::run(&config, &args).await,
        Command::Login { token } => commands::calendar::login(&config, &token).await,
        Command::Logout => commands::calendar::logout(&config),
        Command::Events => commands::calendar::events(&config, json).await,
        Command::Refresh => commands::calendar::refresh(&config, json).await,
        Command::Status => commands::calendar::status(&config, json).await,
        Command::Watch { interval } => commands::calendar::watch(&config, interval, json).await,
        Command::Tasks { action } => {
            commands::board::checklist(&config, CollectionKind::Tasks, &action, json)
        }
        Command::Weekly { action } => {
            commands::board::checklist(&config, CollectionKind::WeeklyGoals, &action, json)
        }
        Command::Monthly { action } => {
            commands::board::checklist(&config, CollectionKind::MonthlyGoals, &action, json)
        }
        Command::Links { action } => commands::board::links(&config, &action, json),
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        },
    }
}
