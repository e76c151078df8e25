// SPDX-License-Identifier: MIT

//! Stacked-chip check configuration.
//!
//! The configuration is a TOML document naming the top assembly netlist and
//! one entry per stacked chip instance: where its netlist and layout live,
//! how it is placed in the stack, and which layers carry terminals.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::Orientation;

pub mod reader;

/// Output coordinate unit system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Um,
    Nm,
}

impl Units {
    /// Size of one user unit in meters.
    pub fn meters(&self) -> f64 {
        match self {
            Units::Um => 1e-6,
            Units::Nm => 1e-9,
        }
    }
}

/// A text layer/type pair, used both for terminal shapes' expected labels
/// and for the text elements themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextLayer {
    pub layer: i16,
    pub texttype: i16,
}

/// One terminal-layer declaration: boundaries on (`layer`, `datatype`) in
/// any of `structures` are terminals of `port_type`. A missing `text` table
/// means the terminal requires no label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortLayerRule {
    pub layer: i16,
    pub datatype: i16,
    #[serde(rename = "type")]
    pub port_type: String,
    pub structures: Vec<String>,
    #[serde(default)]
    pub text: Option<TextLayer>,
}

/// Stack placement offset in user units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

/// One chip instance of the stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipConfig {
    /// Instance name inside the top assembly subckt.
    pub instance: String,
    /// This chip's own netlist file.
    pub netlist: PathBuf,
    /// Subcircuit name; looked up from the top netlist when absent.
    #[serde(default)]
    pub subckt: Option<String>,
    /// Layout file.
    pub layout: PathBuf,
    /// Top structure name inside the layout.
    pub top_structure: String,
    pub orientation: Orientation,
    #[serde(default)]
    pub offset: Offset,
    #[serde(default = "default_shrink")]
    pub shrink: f64,
    /// Optional terminal cache file; see [`crate::cache`].
    #[serde(default)]
    pub port_cache: Option<PathBuf>,
    #[serde(rename = "port")]
    pub ports: Vec<PortLayerRule>,
}

fn default_shrink() -> f64 {
    1.0
}

/// The whole stacked-chip specification. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    pub top_cell: String,
    pub top_netlist: PathBuf,
    pub units: Units,
    pub tolerance: f64,
    #[serde(rename = "chip")]
    pub chips: Vec<ChipConfig>,
}
