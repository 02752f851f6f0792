use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use spdlog::{error, warn};

use metadate::config::Config;
use metadate::errors::MetadateError;
use metadate::logger::configure_logger;
use metadate::traversal::{run, RunOptions, DEFAULT_EXTENSION};

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "metadate.toml";

/// Saves the mtime of entry files in a #published metadata line, or puts
/// the mtime back from it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Entry files or directories containing entries
    #[arg(required = true)]
    targets: Vec<PathBuf>,

    /// Descend recursively into directories
    #[arg(short, long)]
    recursive: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Do not change the mtimes or contents of any files, only report what would change
    #[arg(short, long)]
    dry_run: bool,

    /// Filename extension to look for, including the dot [default: .txt]
    #[arg(short, long)]
    extension: Option<String>,

    /// Reset the mtimes of files to the ones stored in their #published lines
    #[arg(short = 'R', long)]
    reset_mtimes: bool,

    /// Config path
    #[arg(short, long)]
    config_path: Option<PathBuf>,
}

fn run_options(args: &Args, config: &Config) -> RunOptions {
    let extension = args.extension.clone()
        .or_else(|| config.defaults.extension.clone())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    RunOptions {
        recursive: args.recursive || config.defaults.recursive,
        verbose: args.verbose,
        dry_run: args.dry_run,
        reset_mtimes: args.reset_mtimes,
        extension,
    }
}

// Failed writes are reported after the whole run, through the exit code
fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = match open_config(args.config_path.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run metadate --help");
            return Ok(ExitCode::from(2));
        }
    };

    if let Err(err) = configure_logger(&config, args.verbose) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    let options = run_options(&args, &config);
    let res = run(&args.targets, &options);
    spdlog::default_logger().flush();

    match res {
        Ok(summary) if summary.failed > 0 => {
            error!("{} files could not be updated", summary.failed);
            spdlog::default_logger().flush();
            Ok(ExitCode::FAILURE)
        }
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e @ MetadateError::MissingTarget(_)) => {
            Args::command().error(ErrorKind::ValueValidation, e.to_string()).exit()
        }
        Err(e) => Err(e.into()),
    }
}
