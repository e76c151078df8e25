// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use stackcheck::{check, config};

/// Stacked-chip terminal consistency checker.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Stacked-chip configuration file (TOML).
    config: PathBuf,
    /// Report file; standard output when omitted.
    output: Option<PathBuf>,
}

fn run(args: &Args) -> stackcheck::Result<()> {
    let config = config::reader::load(&args.config)?;
    match &args.output {
        Some(path) => {
            log::info!("Writing results to {}", path.display());
            let file = File::create(path).map_err(|e| stackcheck::Error::Io {
                file: path.clone(),
                source: e,
            })?;
            check::run(&config, file)
        }
        None => {
            let stdout = io::stdout();
            check::run(&config, stdout.lock())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
