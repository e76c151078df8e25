// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that abort a check run.
///
/// Recoverable mismatches (ambiguous text, missing connections, winding or
/// size disagreements) are never errors: they are logged and surface as data
/// in the report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not find subckt {subckt} in {}", .file.display())]
    SubcktNotFound { subckt: String, file: PathBuf },

    #[error("instance {instance} is not placed in subckt {subckt} of {}", .file.display())]
    InstanceNotFound {
        instance: String,
        subckt: String,
        file: PathBuf,
    },

    #[error(
        "subckt {subckt} in {} declares {pins} pins but its caller supplies {nets} nets",
        .file.display()
    )]
    PinCountMismatch {
        subckt: String,
        file: PathBuf,
        pins: usize,
        nets: usize,
    },

    #[error("could not find structure {structure} in {}", .file.display())]
    StructureNotFound { structure: String, file: PathBuf },

    #[error("invalid placement transform for {structure} in {}: {detail}", .file.display())]
    InvalidOrientation {
        structure: String,
        file: PathBuf,
        detail: String,
    },

    #[error("structure {structure} is declared as both {existing} and {requested}")]
    ConflictingPortType {
        structure: String,
        existing: String,
        requested: String,
    },

    #[error("conflicting text layers declared for structure {structure}: {existing} and {requested}")]
    ConflictingTextLayer {
        structure: String,
        existing: String,
        requested: String,
    },

    #[error("could not read {}: {source}", .file.display())]
    Io {
        file: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse configuration {}: {message}", .file.display())]
    Config { file: PathBuf, message: String },

    #[error("could not load layout {}: {message}", .file.display())]
    Layout { file: PathBuf, message: String },

    #[error("could not use terminal cache {}: {message}", .file.display())]
    Cache { file: PathBuf, message: String },

    #[error("could not write report: {0}")]
    Report(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
