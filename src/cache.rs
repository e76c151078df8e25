// SPDX-License-Identifier: MIT

//! Optional per-chip terminal cache.
//!
//! A CSV file of [`GlobalTerminal`] records, blank terminals included. The
//! cache is a pure performance feature: a parseable file is trusted as-is
//! with no staleness check against the layout, and an unreadable one just
//! triggers recomputation.

use std::path::Path;

use crate::check::GlobalTerminal;
use crate::error::{Error, Result};

fn cache_error(path: &Path) -> impl Fn(csv::Error) -> Error + '_ {
    move |e| Error::Cache {
        file: path.to_path_buf(),
        message: e.to_string(),
    }
}

pub fn read(path: &Path) -> Result<Vec<GlobalTerminal>> {
    let mut reader = csv::Reader::from_path(path).map_err(cache_error(path))?;
    let mut terminals = Vec::new();
    for record in reader.deserialize() {
        terminals.push(record.map_err(cache_error(path))?);
    }
    Ok(terminals)
}

pub fn write(path: &Path, terminals: &[GlobalTerminal]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(cache_error(path))?;
    for terminal in terminals {
        writer.serialize(terminal).map_err(cache_error(path))?;
    }
    writer.flush().map_err(|e| Error::Io {
        file: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
