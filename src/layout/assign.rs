// SPDX-License-Identifier: MIT

//! Text-to-terminal binding.
//!
//! After flattening, every terminal shape sits in top-structure coordinates
//! but carries no name. Text elements on the configured text layers supply
//! the names: a text names the terminal whose rectangle contains its anchor
//! point. Terminals declared without a text layer become blank (unnamed)
//! terminals instead.

use crate::geometry::{Point, Winding};

use super::flatten::{PortRules, RawTerminal};
use super::{Element, Structure, TextElement};

/// A named (or deliberately blank) terminal in top-structure database units.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTerminal {
    /// Label string; empty for blank terminals.
    pub label: String,
    pub port_type: String,
    /// Placement point of the owning instance.
    pub xy: Point,
    /// Shape extent (width, height) in database units.
    pub size: (i64, i64),
    pub winding: Winding,
}

/// Non-fatal conditions encountered while binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignStats {
    /// Texts landing on terminals at more than one placement point.
    pub ambiguous: usize,
    /// Texts landing on terminals expecting a different text layer.
    pub layer_mismatch: usize,
    /// Texts on an expected layer that land on no terminal.
    pub unmatched_text: usize,
    /// Terminals that require a label but received none.
    pub missing_text: usize,
}

/// Bind the top structure's texts to the flattened terminals.
pub fn assign(
    top: &Structure,
    terminals: &[RawTerminal],
    rules: &PortRules,
) -> (Vec<NamedTerminal>, AssignStats) {
    let text_layers = rules.text_layers();
    let texts: Vec<&TextElement> = top
        .elements
        .iter()
        .filter_map(|e| match e {
            Element::Text(t) if text_layers.contains(&t.layer) => Some(t),
            _ => None,
        })
        .collect();

    let mut named: Vec<NamedTerminal> = Vec::new();
    let mut stats = AssignStats::default();
    let mut labeled = vec![false; terminals.len()];

    for text in &texts {
        let containing: Vec<usize> = terminals
            .iter()
            .enumerate()
            .filter(|(_, t)| t.bbox.contains(text.origin))
            .map(|(i, _)| i)
            .collect();
        if containing.is_empty() {
            log::warn!(
                "Text {} at ({}, {}) is on no terminal",
                text.string,
                text.origin.x,
                text.origin.y
            );
            stats.unmatched_text += 1;
            continue;
        }
        let matching: Vec<usize> = containing
            .iter()
            .copied()
            .filter(|&i| terminals[i].text == Some(text.layer))
            .collect();
        if matching.is_empty() {
            log::warn!(
                "Text {} on layer {} does not match the terminal's text layer",
                text.string,
                text.layer
            );
            stats.layer_mismatch += 1;
            continue;
        }
        let mut origins: Vec<Point> = matching.iter().map(|&i| terminals[i].origin).collect();
        origins.sort_by_key(|p| (p.x, p.y));
        origins.dedup();
        if origins.len() > 1 {
            log::warn!(
                "Text {} is ambiguous: terminals at {} placement points contain it",
                text.string,
                origins.len()
            );
            stats.ambiguous += 1;
            continue;
        }
        let first = matching[0];
        let t = &terminals[first];
        named.push(NamedTerminal {
            label: text.string.clone(),
            port_type: t.port_type.clone(),
            xy: t.origin,
            size: (t.bbox.width(), t.bbox.height()),
            winding: t.winding,
        });
        for i in matching {
            labeled[i] = true;
        }
    }

    for (i, t) in terminals.iter().enumerate() {
        if labeled[i] {
            continue;
        }
        if t.text.is_none() {
            named.push(NamedTerminal {
                label: String::new(),
                port_type: t.port_type.clone(),
                xy: t.origin,
                size: (t.bbox.width(), t.bbox.height()),
                winding: t.winding,
            });
        } else {
            log::warn!(
                "{} terminal at ({}, {}) has no label text",
                t.port_type,
                t.origin.x,
                t.origin.y
            );
            stats.missing_text += 1;
        }
    }

    (named, stats)
}
