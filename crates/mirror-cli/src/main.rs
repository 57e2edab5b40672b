//! Folder Mirror CLI
//!
//! Keeps a replica folder identical to a source folder, either once or on a
//! fixed interval until the user stops it.

mod cli;
mod error;
mod settings;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use mirror_core::{ConfigFile, FileLogger, Scheduler, SyncReport, TreeSynchronizer};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::Result;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the session ended successfully.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = cli.config.as_deref().map(ConfigFile::load).transpose()?;
    let settings = settings::resolve(&cli, file, &settings::executable_dir()?)?;
    for notice in &settings.notices {
        // Keep stdout parseable in JSON mode
        if cli.json {
            eprintln!("{}", notice);
        } else {
            println!("{}", notice);
        }
    }

    let config = settings.config.validate()?;

    let logger = FileLogger::create(config.log_dir())?;
    tracing::debug!(path = %logger.path().display(), "Session log opened");
    let logger = if cli.json { logger.quiet() } else { logger };

    let synchronizer = TreeSynchronizer::from_config(&config, logger).with_dry_run(cli.dry_run);

    if cli.once {
        let report = synchronizer.run();
        if cli.json {
            print_json(&report)?;
        }
        return Ok(report.success);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let scheduler = Scheduler::new(config.interval());

    println!("Synchronization started. Press Enter or Ctrl+C to stop.");
    let runs = runtime.block_on(scheduler.run_until(Arc::new(synchronizer), wait_for_stop()));
    tracing::debug!(runs, "Synchronization stopped");

    Ok(true)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

fn print_json(report: &SyncReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Resolves on the first line (or end of input) on stdin, or on Ctrl+C.
async fn wait_for_stop() {
    let (tx, mut rx) = oneshot::channel();

    // Blocking stdin reads would hold up runtime shutdown, so read on a
    // detached thread
    std::thread::spawn(move || {
        let mut line = String::new();
        if let Err(e) = std::io::stdin().read_line(&mut line) {
            tracing::warn!("Failed to read stdin: {}", e);
        }
        let _ = tx.send(());
    });

    let stopped = tokio::select! {
        _ = &mut rx => true,
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                false
            }
        },
    };

    if !stopped {
        let _ = rx.await;
    }
    tracing::debug!("Stop requested");
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn test_core_error_passes_through() {
        let error: crate::error::CliError = mirror_core::Error::InvalidSource {
            path: "/missing".into(),
        }
        .into();
        assert_eq!(error.to_string(), "Invalid path to source folder: /missing");
    }
}
