use core::{convert::Infallible, fmt::Display};
use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use backup_janitor::{
    ArtifactPaths, BackupCategory, BackupLocator, ChannelSink, DeletionOutcome, Operation,
    OperationError, PathResolver, Progress, PurgeSummary, delete_files, inspect, locator,
    purge_all_known_backups, recv_outcome,
};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "backup-janitor")]
#[command(
    about = "Find, inspect and delete the backups of an editor's device identity files",
    long_about = None
)]
pub struct Cli {
    /// The config file to use.
    #[arg(long, global = true, default_value = "./config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default config file
    Init,
    /// Show where each managed artifact is and whether it exists
    Paths,
    /// List every backup with its size and creation time
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete the given backup files
    Delete {
        /// The files to delete
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete every backup of every managed artifact
    Purge {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

type Locator = BackupLocator<Arc<ArtifactPaths>>;

pub fn paths(artifacts: &ArtifactPaths) -> ExitCode {
    for category in BackupCategory::MANAGED {
        match artifacts.resolve(category) {
            Ok(path) => {
                let status = if path.exists() { "found" } else { "missing" };
                println!("{category:<24} {status:<8} {}", path.display());
            }
            Err(error) => println!("{category:<24} {error}"),
        }
    }

    ExitCode::SUCCESS
}

pub fn list(locator: &Locator, json: bool) -> ExitCode {
    let backups = locator.find_backups();
    let infos: Vec<_> = locator::flatten(&backups)
        .iter()
        .map(|backup| inspect(&backup.path))
        .collect();

    if json {
        return match serde_json::to_string_pretty(&infos) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                error!("Could not serialize backups: {error}");
                ExitCode::FAILURE
            }
        };
    }

    println!("Found {} backups", infos.len());
    for (category, paths) in &backups {
        if paths.is_empty() {
            continue;
        }

        println!("\n{category} ({})", paths.len());
        for info in infos
            .iter()
            .filter(|info| paths.contains(&info.path))
        {
            println!(
                "  {:>10}  {:<19}  {}",
                info.size_display(),
                info.created_display(),
                info.path.display()
            );
        }
    }

    ExitCode::SUCCESS
}

pub fn delete(paths: Vec<PathBuf>) -> ExitCode {
    let work = |paths: Vec<PathBuf>, progress: &Progress<'_>| {
        progress.report(0.5, &format!("deleting {} files", paths.len()));
        Ok::<_, Infallible>(delete_files(&paths))
    };

    match run_operation("delete", work, paths) {
        Some(Ok(outcome)) => report_outcome(&outcome),
        Some(Err(error)) => {
            error!("Delete failed: {error}");
            ExitCode::FAILURE
        }
        None => ExitCode::FAILURE,
    }
}

pub fn purge(locator: Locator, yes: bool) -> ExitCode {
    let backups = locator.find_backups();
    let total = locator::count(&backups);

    if total == 0 {
        println!("No backups found");
        return ExitCode::SUCCESS;
    }

    println!("Found {total} backups:");
    for (category, paths) in &backups {
        println!("  {category}: {}", paths.len());
    }

    if !yes {
        match prompt_confirm("Delete all of them? This cannot be undone.", Some(false)) {
            Ok(true) => {}
            Ok(false) => return ExitCode::SUCCESS,
            Err(error) => {
                error!("Could not read confirmation: {error}");
                return ExitCode::FAILURE;
            }
        }
    }

    let work = move |(), progress: &Progress<'_>| {
        progress.report(0.3, "deleting backups");
        Ok::<_, Infallible>(purge_all_known_backups(&locator))
    };

    match run_operation("purge", work, ()) {
        Some(Ok(summary)) => report_summary(&summary),
        Some(Err(error)) => {
            error!("Purge failed: {error}");
            ExitCode::FAILURE
        }
        None => ExitCode::FAILURE,
    }
}

/// Run `work` on a background operation and handle its events on this thread
/// until it finishes.
fn run_operation<A, T, E, F>(
    name: &'static str,
    work: F,
    args: A,
) -> Option<Result<T, OperationError<E>>>
where
    A: Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(A, &Progress<'_>) -> Result<T, E> + Send + Sync + 'static,
{
    let (sink, events) = ChannelSink::new();
    let operation = Operation::new(name, work, sink);

    if !operation.start(args) {
        warn!("[{name}] An operation is already running");
        return None;
    }

    let outcome = recv_outcome(&events, |value, status| {
        info!("[{name}] {:>3.0}% {status}", value * 100.0);
    });
    if outcome.is_none() {
        error!("[{name}] The worker stopped without reporting an outcome");
    }

    if operation.is_running() {
        info!("[{name}] Waiting for the worker to finish");
    }
    operation.join();

    outcome
}

fn report_outcome(outcome: &DeletionOutcome) -> ExitCode {
    println!(
        "Deleted {} files, freed {:.2} MB",
        outcome.deleted_count,
        outcome.megabytes_freed()
    );

    if outcome.failed.is_empty() {
        return ExitCode::SUCCESS;
    }

    println!("{} files could not be deleted:", outcome.failed.len());
    for failed in &outcome.failed {
        println!("  {}: {}", failed.path.display(), failed.error);
    }

    ExitCode::FAILURE
}

fn report_summary(summary: &PurgeSummary) -> ExitCode {
    if let Some(message) = summary.message {
        println!("Nothing deleted: {message}");
        return ExitCode::SUCCESS;
    }

    for (category, attempted) in &summary.attempted {
        let removed = summary.removed.get(category).copied().unwrap_or(0);
        if *attempted > 0 {
            println!("  {category}: {removed}/{attempted}");
        }
    }

    report_outcome(&summary.outcome)
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{prompt} (Y/n): "),
            Some(false) | None => print!("{prompt} (y/N): "),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
