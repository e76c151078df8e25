// SPDX-License-Identifier: MIT

//! Consistency checker and CSV report writer.
//!
//! One row per canonical net/terminal, in sort-key order, with one cell per
//! chip instance. ERROR verdicts are data, not exceptions: a row flagged
//! `X` never aborts the run.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Write;

use crate::error::Result;

use super::{fmt_coord, round_coord, sortkey, tolerance, PortData, PortInfo, PortKey};

/// Where a chip's terminals came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Loaded from the terminal cache file.
    File,
    /// Computed by flattening the layout.
    Computed,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::File => "file",
            Source::Computed => "computed",
        })
    }
}

/// One chip's report-header identity, in declaration order.
#[derive(Debug, Clone)]
pub struct ChipReport {
    pub instance: String,
    pub master: String,
    pub source: Source,
}

/// One candidate report row before tolerance grouping.
#[derive(Debug, Clone)]
struct CanonicalPort {
    net: String,
    port_type: String,
    xy: String,
    pos: Option<(f64, f64)>,
}

/// Blank terminals indexed by (type, tolerance grid cell); values carry the
/// actual position and its exact index key.
type BlankIndex = HashMap<(String, String), Vec<((f64, f64), String)>>;

/// Split the merged index into the sorted canonical row list and the blank
/// terminal index.
fn canonical_ports(data: &PortData, tolerance: f64) -> (Vec<CanonicalPort>, BlankIndex) {
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut ports: Vec<CanonicalPort> = Vec::new();
    let mut blanks: BlankIndex = BlankIndex::new();
    for (key, info) in data {
        if key.net.is_empty() {
            if let Some(pos) = info.pos {
                for cell in tolerance::search_cells(pos, tolerance) {
                    blanks
                        .entry((key.port_type.clone(), cell))
                        .or_default()
                        .push((pos, key.xy.clone()));
                }
            }
            continue;
        }
        if seen.insert((key.net.clone(), key.port_type.clone(), key.xy.clone())) {
            ports.push(CanonicalPort {
                net: key.net.clone(),
                port_type: key.port_type.clone(),
                xy: key.xy.clone(),
                // Snap to the reporting grid so records sharing one index
                // key carry one position, whichever entry was seen first.
                pos: info.pos.map(|(x, y)| (round_coord(x), round_coord(y))),
            });
        }
    }
    ports.sort_by(|a, b| {
        sortkey::sort_key(&a.net, a.pos).cmp(&sortkey::sort_key(&b.net, b.pos))
    });
    (ports, blanks)
}

/// Position keys of the run of rows starting at `index` that share the
/// first row's net and type and sit within tolerance of it. The scan stops
/// at the first x break; y breaks only exclude the one position.
fn position_group(index: usize, sorted: &[CanonicalPort], tol: f64) -> Vec<String> {
    let first = &sorted[index];
    let mut group = vec![first.xy.clone()];
    let Some(pos) = first.pos else {
        return group;
    };
    for next in &sorted[index + 1..] {
        if next.net != first.net || next.port_type != first.port_type {
            break;
        }
        let Some(next_pos) = next.pos else { break };
        if !tolerance::within((pos.0, 0.0), (next_pos.0, 0.0), tol) {
            break;
        }
        if tolerance::within((0.0, pos.1), (0.0, next_pos.1), tol) {
            group.push(next.xy.clone());
        }
    }
    group
}

/// True when the instance has a blank terminal of the type within tolerance.
fn has_blank(
    instance: &str,
    port_type: &str,
    pos: (f64, f64),
    tol: f64,
    blanks: &BlankIndex,
    data: &PortData,
) -> bool {
    for cell in tolerance::search_cells(pos, tol) {
        let Some(candidates) = blanks.get(&(port_type.to_string(), cell)) else {
            continue;
        };
        for (blank_pos, blank_xy) in candidates {
            if !tolerance::within(pos, *blank_pos, tol) {
                continue;
            }
            let key = PortKey {
                instance: instance.to_string(),
                xy: blank_xy.clone(),
                port_type: port_type.to_string(),
                net: String::new(),
            };
            if data.contains_key(&key) {
                return true;
            }
        }
    }
    false
}

/// Look-ahead for a second, not-yet-printed geometric port with this net.
fn duplicate_label(
    index: usize,
    sorted: &[CanonicalPort],
    printed: &HashSet<(String, String)>,
) -> bool {
    let first = &sorted[index];
    for next in &sorted[index + 1..] {
        if next.net != first.net {
            break;
        }
        if printed.contains(&(next.net.clone(), next.xy.clone())) {
            continue;
        }
        if next.xy.is_empty() {
            continue;
        }
        return true;
    }
    false
}

/// The instance's contribution at any of the grouped positions.
fn slice_port<'a>(
    instance: &str,
    group: &[String],
    port_type: &str,
    net: &str,
    data: &'a PortData,
) -> Option<&'a PortInfo> {
    for xy in group {
        let key = PortKey {
            instance: instance.to_string(),
            xy: xy.clone(),
            port_type: port_type.to_string(),
            net: net.to_string(),
        };
        if let Some(info) = data.get(&key) {
            return Some(info);
        }
    }
    None
}

/// Write the full consistency report as CSV.
pub fn write_report<W: Write>(
    out: W,
    chips: &[ChipReport],
    data: &PortData,
    connections: &HashSet<String>,
    tol: f64,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec![
        "Check".to_string(),
        "Port".to_string(),
        "Type".to_string(),
        "X".to_string(),
        "Y".to_string(),
    ];
    for chip in chips {
        header.push(format!("{}({})({})", chip.instance, chip.master, chip.source));
    }
    writer.write_record(&header)?;

    let (sorted, blanks) = canonical_ports(data, tol);
    let mut printed: HashSet<(String, String)> = HashSet::new();
    let mut used_coils: HashSet<String> = HashSet::new();
    let mut last_net = String::new();
    for index in 0..sorted.len() {
        let port = &sorted[index];
        if printed.contains(&(port.net.clone(), port.xy.clone())) {
            continue;
        }
        let mut flag = "O";
        let mut row = Vec::with_capacity(5 + chips.len());
        let group;
        if port.xy.is_empty() {
            // Schematic-only net: report only multiply-used nets, once.
            if port.net == last_net || !connections.contains(&port.net) {
                continue;
            }
            flag = "X";
            group = vec![String::new()];
            row.extend([
                String::new(), // flag placeholder, filled below
                port.net.clone(),
                String::new(),
                String::new(),
                String::new(),
            ]);
        } else {
            group = position_group(index, &sorted, tol);
            for xy in &group {
                printed.insert((port.net.clone(), xy.clone()));
            }
            let (x, y) = port.pos.unwrap_or_default();
            row.extend([
                String::new(),
                port.net.clone(),
                port.port_type.clone(),
                fmt_coord(x),
                fmt_coord(y),
            ]);
        }
        let mut connection_count = 0usize;
        let mut reference_winding = None;
        let mut reference_size: Option<&str> = None;
        for chip in chips {
            match slice_port(&chip.instance, &group, &port.port_type, &port.net, data) {
                Some(info) => {
                    let cell = if port.port_type.starts_with("COIL") {
                        match reference_winding {
                            None => reference_winding = Some(info.winding),
                            Some(reference) if reference != info.winding => flag = "X",
                            Some(_) => {}
                        }
                        format!("{}@{}", info.label, info.winding)
                    } else if port.port_type.starts_with("TSV") {
                        match reference_size {
                            None => reference_size = Some(&info.size),
                            Some(reference) if reference != info.size => flag = "X",
                            Some(_) => {}
                        }
                        format!("{}@{}", info.label, info.size)
                    } else {
                        info.label.clone()
                    };
                    row.push(cell);
                    connection_count += 1;
                }
                None if port.port_type.starts_with("COIL") => {
                    // Coils need not appear on every chip.
                    row.push(" ".to_string());
                }
                None if port.port_type.starts_with("TSV") => {
                    let covered = port.pos.is_some_and(|pos| {
                        has_blank(&chip.instance, &port.port_type, pos, tol, &blanks, data)
                    });
                    if covered {
                        row.push(" ".to_string());
                    } else {
                        row.push("?".to_string());
                        flag = "X";
                    }
                }
                None => {
                    row.push(" ".to_string());
                }
            }
        }
        if connection_count < 2 {
            flag = "X";
        }
        if port.port_type.starts_with("COIL") {
            if used_coils.contains(&port.net) || duplicate_label(index, &sorted, &printed) {
                flag = "X";
            }
            used_coils.insert(port.net.clone());
        }
        last_net = port.net.clone();
        row[0] = flag.to_string();
        writer.write_record(&row)?;
    }
    writer.flush().map_err(|e| crate::error::Error::Io {
        file: std::path::PathBuf::from("<report>"),
        source: e,
    })?;
    Ok(())
}
