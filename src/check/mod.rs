// SPDX-License-Identifier: MIT

//! Cross-chip port index and the end-to-end check pipeline.
//!
//! Per chip: resolve its pin map against the top assembly, obtain its
//! global-coordinate terminals (from the optional cache file or by
//! flattening its layout), and fold everything into one [`PortData`] index.
//! The report writer is the only consumer of the merged view.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::cache;
use crate::config::{ChipConfig, StackConfig, Units};
use crate::error::{Error, Result};
use crate::geometry::{Orientation, Point, Transform, Winding};
use crate::input;
use crate::layout::assign::{assign, NamedTerminal};
use crate::layout::flatten::{Flattener, PortRules};
use crate::layout::reader::LayoutReader;
use crate::layout::Layout;
use crate::netlist::{parser, PinMap};

pub mod report;
pub mod sortkey;
pub mod tolerance;

pub use report::{ChipReport, Source};

/// A terminal in chip-global user-unit coordinates, after orientation,
/// offset and shrink. Doubles as the cache file record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalTerminal {
    /// Label string; empty for blank terminals.
    pub label: String,
    #[serde(rename = "type")]
    pub port_type: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub winding: Winding,
}

/// The canonical cross-chip lookup key. Blank terminals use an empty net;
/// schematic-only entries use an empty position and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortKey {
    pub instance: String,
    pub xy: String,
    pub port_type: String,
    pub net: String,
}

/// What one chip instance contributes at a key.
#[derive(Debug, Clone, PartialEq)]
pub struct PortInfo {
    pub label: String,
    /// `WxH` display string; empty when the terminal has no geometry.
    pub size: String,
    pub winding: Winding,
    pub pos: Option<(f64, f64)>,
}

/// Merged index over every chip instance. Uniqueness is structural: a
/// duplicate key overwrites, it is never a rejection.
pub type PortData = HashMap<PortKey, PortInfo>;

/// Snap a user-unit coordinate to the 6-decimal reporting grid.
pub fn round_coord(v: f64) -> f64 {
    let r = (v * 1e6).round() / 1e6;
    if r == 0.0 {
        0.0 // normalize -0
    } else {
        r
    }
}

/// Render a user-unit coordinate: rounded to 6 decimals, shortest form.
pub fn fmt_coord(v: f64) -> String {
    format!("{}", round_coord(v))
}

/// The canonical `"(x, y)"` position key.
pub fn pos_key(x: f64, y: f64) -> String {
    format!("({}, {})", fmt_coord(x), fmt_coord(y))
}

/// Apply the chip-level orientation, offset and shrink, converting from
/// database units to user units in one final step. The offset is given in
/// user units and participates in the shrink, matching the layout's own
/// scaling.
pub fn translate(
    named: &[NamedTerminal],
    chip: &ChipConfig,
    layout: &Layout,
    units: Units,
) -> Vec<GlobalTerminal> {
    let dbu_per_uu = layout.dbu_per_user_unit(units);
    let scale = chip.shrink / dbu_per_uu;
    let offset = Point::new(
        (chip.offset.x * dbu_per_uu).round() as i64,
        (chip.offset.y * dbu_per_uu).round() as i64,
    );
    let transform = Transform::new(chip.orientation, offset);
    named
        .iter()
        .map(|t| {
            let p = transform.apply(t.xy);
            let (w, h) = if chip.orientation.swaps_axes() {
                (t.size.1, t.size.0)
            } else {
                t.size
            };
            GlobalTerminal {
                label: t.label.clone(),
                port_type: t.port_type.clone(),
                x: p.x as f64 * scale,
                y: p.y as f64 * scale,
                width: w as f64 * scale,
                height: h as f64 * scale,
                winding: t.winding.placed(chip.orientation),
            }
        })
        .collect()
}

fn size_string(width: f64, height: f64) -> String {
    format!("{}x{}", fmt_coord(width), fmt_coord(height))
}

/// Fold one chip's terminals into the merged index.
///
/// Labeled terminals resolve their label through the pin map to a top net;
/// a label that is no formal pin is logged and skipped. Blank terminals are
/// keyed with an empty net. Every pin with no matching layout terminal is
/// synthesized as a zero-geometry entry so multiply-used schematic-only
/// nets still surface in the report.
pub fn collect_chip(
    instance: &str,
    terminals: &[GlobalTerminal],
    pins: &PinMap,
    data: &mut PortData,
) {
    let mut matched_pins: Vec<&str> = Vec::new();
    for terminal in terminals {
        let xy = pos_key(terminal.x, terminal.y);
        let info = PortInfo {
            label: terminal.label.clone(),
            size: size_string(terminal.width, terminal.height),
            winding: terminal.winding,
            pos: Some((terminal.x, terminal.y)),
        };
        if terminal.label.is_empty() {
            data.insert(
                PortKey {
                    instance: instance.to_string(),
                    xy,
                    port_type: terminal.port_type.clone(),
                    net: String::new(),
                },
                info,
            );
        } else if let Some(net) = pins.get(&terminal.label) {
            matched_pins.push(terminal.label.as_str());
            data.insert(
                PortKey {
                    instance: instance.to_string(),
                    xy,
                    port_type: terminal.port_type.clone(),
                    net: net.clone(),
                },
                info,
            );
        } else {
            log::warn!(
                "Layout port {} at {} of {} is not a pin of its subcircuit",
                terminal.label,
                xy,
                instance
            );
        }
    }
    for (pin, net) in pins {
        if matched_pins.iter().any(|m| *m == pin.as_str()) {
            continue;
        }
        log::warn!("Pin {} of {} has no layout terminal", pin, instance);
        data.insert(
            PortKey {
                instance: instance.to_string(),
                xy: String::new(),
                port_type: String::new(),
                net: net.clone(),
            },
            PortInfo {
                label: pin.clone(),
                size: String::new(),
                winding: Winding::R,
                pos: None,
            },
        );
    }
}

/// Obtain one chip's global terminals, read-through against its optional
/// cache file. A parseable cache is trusted as-is; anything else triggers a
/// fresh computation and a cache rewrite.
fn load_or_compute(chip: &ChipConfig, units: Units) -> Result<(Vec<GlobalTerminal>, Source)> {
    if let Some(cache_path) = &chip.port_cache {
        match cache::read(cache_path) {
            Ok(terminals) => {
                log::info!(
                    "Loaded {} terminals for {} from {}",
                    terminals.len(),
                    chip.instance,
                    cache_path.display()
                );
                return Ok((terminals, Source::File));
            }
            Err(e) => {
                log::warn!(
                    "Cache {} unreadable ({}), recomputing",
                    cache_path.display(),
                    e
                );
            }
        }
    }
    let layout = LayoutReader::new().read(&chip.layout)?;
    let rules = PortRules::new(chip)?;
    let mut flattener = Flattener::new(&layout, rules);
    let raw = flattener.promote(&chip.top_structure, Orientation::R0, Point::ZERO)?;
    log::info!(
        "Flattened {}: {} terminals from {} structures",
        chip.top_structure,
        raw.len(),
        flattener.stats.structures_processed
    );
    let top = layout
        .structure(&chip.top_structure)
        .ok_or_else(|| Error::StructureNotFound {
            structure: chip.top_structure.clone(),
            file: chip.layout.clone(),
        })?;
    let (named, stats) = assign(top, &raw, flattener.rules());
    if stats != Default::default() {
        log::warn!(
            "{}: {} ambiguous, {} mismatched-layer, {} unmatched texts, {} unlabeled terminals",
            chip.instance,
            stats.ambiguous,
            stats.layer_mismatch,
            stats.unmatched_text,
            stats.missing_text
        );
    }
    let terminals = translate(&named, chip, &layout, units);
    if let Some(cache_path) = &chip.port_cache {
        cache::write(cache_path, &terminals)?;
        log::info!("Wrote terminal cache {}", cache_path.display());
    }
    Ok((terminals, Source::Computed))
}

/// Run the whole check, writing the CSV report to `out`.
pub fn run<W: Write>(config: &StackConfig, out: W) -> Result<()> {
    let top_content = input::read_text(&config.top_netlist)?;
    let listing = parser::top_instances(&top_content, &config.top_cell, &config.top_netlist)?;
    let mut data = PortData::new();
    let mut chips: Vec<ChipReport> = Vec::new();
    for chip in &config.chips {
        let top_instance =
            listing
                .instances
                .get(&chip.instance)
                .ok_or_else(|| Error::InstanceNotFound {
                    instance: chip.instance.clone(),
                    subckt: config.top_cell.clone(),
                    file: config.top_netlist.clone(),
                })?;
        let master = chip
            .subckt
            .clone()
            .unwrap_or_else(|| top_instance.master.clone());
        let chip_content = input::read_text(&chip.netlist)?;
        let pins = parser::pin_map(&chip_content, &master, &top_instance.nets, &chip.netlist)?;
        let (terminals, source) = load_or_compute(chip, config.units)?;
        collect_chip(&chip.instance, &terminals, &pins, &mut data);
        chips.push(ChipReport {
            instance: chip.instance.clone(),
            master,
            source,
        });
    }
    report::write_report(out, &chips, &data, &listing.connections, config.tolerance)
}

impl fmt::Display for GlobalTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {} size {} winding {}",
            self.port_type,
            self.label,
            pos_key(self.x, self.y),
            size_string(self.width, self.height),
            self.winding
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_round_to_six_decimals() {
        assert_eq!(fmt_coord(1.0000004), "1");
        assert_eq!(fmt_coord(1.25), "1.25");
        assert_eq!(fmt_coord(-0.0000001), "0");
        assert_eq!(fmt_coord(-12.5), "-12.5");
    }

    #[test]
    fn position_key_format() {
        assert_eq!(pos_key(1.5, -2.0), "(1.5, -2)");
    }
}
