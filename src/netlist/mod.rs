// SPDX-License-Identifier: MIT

//! Schematic netlist resolution.
//!
//! The netlist is line-oriented subcircuit text: `.SUBCKT name pin...`
//! headers, `X...` instance lines, `*` comments, and `+` continuations.
//! [`preprocessor`] joins raw lines into logical lines; [`parser`] scans
//! them for the top assembly's instances and for per-chip pin maps.

use std::collections::{HashMap, HashSet};

pub mod parser;
pub mod preprocessor;

/// One placed instance of the top assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopInstance {
    /// Master subcircuit name (last token of the instance line).
    pub master: String,
    /// Actual nets in declaration order, including `/` unconnected markers.
    pub nets: Vec<String>,
}

/// The top assembly's instances and the nets shared between them.
#[derive(Debug, Clone, Default)]
pub struct NetListing {
    pub instances: HashMap<String, TopInstance>,
    /// Nets referenced by two or more distinct instances. A net used exactly
    /// once is dangling and is deliberately excluded from the report.
    pub connections: HashSet<String>,
}

/// Per-chip pin resolution: formal pin name → top-level net name.
pub type PinMap = HashMap<String, String>;
