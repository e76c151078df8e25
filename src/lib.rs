// SPDX-License-Identifier: MIT

//! Stacked-chip terminal consistency checker.
//!
//! Verifies that the terminals of several physically stacked chip layouts
//! are electrically and geometrically consistent with the netlist that
//! wires them together: flattens each chip's layout hierarchy into one
//! terminal list per chip, binds text labels, resolves pin names to
//! top-level nets, and cross-checks position, type, size and winding
//! across all chips.

pub mod cache;
pub mod check;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod netlist;

// Re-export commonly used types
pub use check::{run, GlobalTerminal, PortData, PortKey};
pub use config::{ChipConfig, StackConfig};
pub use error::{Error, Result};
pub use geometry::{Orientation, Point, Transform, Winding};
