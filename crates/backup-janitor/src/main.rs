//! # backup-janitor
//! Lists and deletes the backups taken of an editor's device identity files.
//!

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::{fs, process::ExitCode, sync::Arc};

use backup_janitor::{BackupLocator, Config, LoadConfigError};
use clap::{CommandFactory, Parser};
use commands::{Cli, Commands};
use mimalloc::MiMalloc;
use shared::{Failure, LoggerSettings, init_logger};
use tracing::warn;

mod commands;

fn main() -> ExitCode {
    let args = Cli::parse();

    let loaded = Config::load_toml(&args.config);
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(|_| LoggerSettings::default());
    let _logger = init_logger(&logging).or_log_and_panic("Could not initialise logging");

    run(args, loaded).unwrap_or_else(|code| code)
}

fn run(args: Cli, loaded: Result<Config, LoadConfigError>) -> Result<ExitCode, ExitCode> {
    // Initialize config if asked to.
    if let Some(Commands::Init) = args.command {
        let contents = toml::to_string_pretty(&Config::default())
            .or_log_exit("Could not serialize config file")?;
        fs::write(&args.config, contents).or_log_exit("Could not create config file")?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = match loaded {
        Err(LoadConfigError::NoFile) => {
            warn!(
                "No config at {:?}, using the default editor locations. Run `init` to create one.",
                args.config
            );
            Config::default()
        }
        loaded => loaded.or_log_exit("Could not load config")?,
    };
    let locator = BackupLocator::new(Arc::new(config.artifacts.clone()));

    let code = match args.command {
        Some(Commands::Paths) => commands::paths(&config.artifacts),
        Some(Commands::List { json }) => commands::list(&locator, json),
        Some(Commands::Delete { paths }) => commands::delete(paths),
        Some(Commands::Purge { yes }) => commands::purge(locator, yes),
        Some(Commands::Init) => ExitCode::SUCCESS,
        None => {
            Cli::command()
                .print_long_help()
                .or_log_exit("Could not print help")?;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
