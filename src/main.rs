use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod normalize;
mod parser;
mod report;
mod session;
mod tally;
mod ui;

use cli::Cli;
use config::{Config, OutputFormat};
use report::{JsonSink, ResultSink, TableSink, deliver};
use session::run_session;
use tally::count_games;

/// Route log output to stderr, keeping it off a raw-mode editor screen
fn init_logging(cli: &Cli) {
    let filter = if cli.wants_session() && io::stderr().is_terminal() {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Read the whole input block from a file, or stdin for `-`/no path
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            debug!(path = %p.display(), "reading input file");
            fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))
        }
        _ => {
            if io::stdin().is_terminal() {
                eprintln!("Enter game results, one per line (Ctrl+D to finish):");
            }
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn results_sink(format: OutputFormat) -> Box<dyn ResultSink> {
    match format {
        OutputFormat::Table => Box::new(TableSink::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonSink::new(io::stdout())),
    }
}

fn error_sink(format: OutputFormat) -> Box<dyn ResultSink> {
    match format {
        OutputFormat::Table => Box::new(TableSink::new(io::stderr())),
        OutputFormat::Json => Box::new(JsonSink::new(io::stdout())),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config_path = Config::locate(cli.config.as_deref());
    let mut config = Config::load_from(config_path.as_deref())?;
    cli.apply(&mut config);

    if cli.save_config {
        let config_path = config_path
            .context("Could not determine config directory; pass --config <PATH>")?;
        config.save(&config_path)?;
        eprintln!("✓ Configuration saved to: {}", config_path.display());
    }

    let outcome = if cli.wants_session() {
        match run_session(&config)? {
            Some(outcome) => outcome,
            None => return Ok(ExitCode::SUCCESS),
        }
    } else {
        let input = read_input(cli.input.as_deref())?;
        count_games(&input, &config.parse, config.max_input_bytes)
    };

    if let Err(e) = &outcome {
        debug!(error = %e, "count failed");
    }

    let shown = deliver(
        outcome,
        &mut *results_sink(config.output),
        &mut *error_sink(config.output),
    )?;
    Ok(if shown {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
