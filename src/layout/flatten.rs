// SPDX-License-Identifier: MIT

//! Hierarchy flattener / port promoter.
//!
//! Promotes terminal shapes found deep in the placement hierarchy up to
//! top-structure-local coordinates. Each structure's own terminal list is
//! extracted exactly once and memoized by name; every call site then
//! transforms that same list by its placement, so the cost is proportional
//! to the number of unique structures, not instantiations.

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::{ChipConfig, TextLayer};
use crate::error::{Error, Result};
use crate::geometry::{BBox, Orientation, Point, Transform, Winding};

use super::{Element, LayerKey, Layout, Structure};

/// Terminal classification rules for one chip, derived from its port-layer
/// declarations.
#[derive(Debug, Clone)]
pub struct PortRules {
    /// Terminal layers and the structures allowed to own them.
    port_layers: HashMap<LayerKey, Vec<String>>,
    /// Owning structure → (terminal type, expected text layer).
    by_structure: HashMap<String, (String, Option<TextLayer>)>,
}

impl PortRules {
    /// Build rules from a chip configuration. Conflicting terminal-type or
    /// text-layer declarations for one structure are fatal.
    pub fn new(chip: &ChipConfig) -> Result<Self> {
        let mut port_layers: HashMap<LayerKey, Vec<String>> = HashMap::new();
        let mut by_structure: HashMap<String, (String, Option<TextLayer>)> = HashMap::new();
        for rule in &chip.ports {
            let key = LayerKey::new(rule.layer, rule.datatype);
            let owners = port_layers.entry(key).or_default();
            for structure in &rule.structures {
                owners.push(structure.clone());
                match by_structure.get(structure) {
                    None => {
                        by_structure
                            .insert(structure.clone(), (rule.port_type.clone(), rule.text));
                    }
                    Some((existing_type, _)) if *existing_type != rule.port_type => {
                        return Err(Error::ConflictingPortType {
                            structure: structure.clone(),
                            existing: existing_type.clone(),
                            requested: rule.port_type.clone(),
                        });
                    }
                    Some((_, existing_text)) if *existing_text != rule.text => {
                        return Err(Error::ConflictingTextLayer {
                            structure: structure.clone(),
                            existing: text_name(existing_text),
                            requested: text_name(&rule.text),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(Self {
            port_layers,
            by_structure,
        })
    }

    pub fn is_port_layer(&self, key: LayerKey) -> bool {
        self.port_layers.contains_key(&key)
    }

    fn owners(&self, key: LayerKey) -> &[String] {
        self.port_layers
            .get(&key)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All expected text layers across the chip's rules.
    pub fn text_layers(&self) -> Vec<LayerKey> {
        let mut layers: Vec<LayerKey> = self
            .by_structure
            .values()
            .filter_map(|(_, text)| text.map(|t| LayerKey::new(t.layer, t.texttype)))
            .collect();
        layers.sort_by_key(|k| (k.layer, k.dtype));
        layers.dedup();
        layers
    }
}

fn text_name(text: &Option<TextLayer>) -> String {
    match text {
        Some(t) => format!("{}-{}", t.layer, t.texttype),
        None => "no text".to_string(),
    }
}

/// A structure-local terminal. The origin placeholder is the structure's
/// own origin; the position reported later is the placement point of the
/// instance that owns the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTerminal {
    pub port_type: String,
    pub origin: Point,
    pub bbox: BBox,
    pub winding: Winding,
    /// Expected text layer; `None` means no label is required.
    pub text: Option<LayerKey>,
}

impl RawTerminal {
    fn placed(&self, transform: &Transform, orientation: Orientation) -> Self {
        Self {
            port_type: self.port_type.clone(),
            origin: transform.apply(self.origin),
            bbox: self.bbox.transformed(transform),
            winding: self.winding.placed(orientation),
            text: self.text,
        }
    }
}

/// Non-fatal conditions encountered while flattening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    /// Structures whose element lists were actually classified (cache misses).
    pub structures_processed: usize,
    /// Terminal-layer boundaries that failed the rectangle test.
    pub non_rectangular: usize,
    /// Terminal-layer boundaries in structures that do not own the layer.
    pub unexpected_structure: usize,
    /// Terminal layers found on unsupported element kinds.
    pub unexpected_element: usize,
}

/// One flattening pass over one chip's layout. The memoization cache lives
/// and dies with this value; it must never be reused across chips since the
/// cached geometry carries no placement transform.
pub struct Flattener<'a> {
    layout: &'a Layout,
    index: HashMap<&'a str, &'a Structure>,
    rules: PortRules,
    cache: HashMap<String, Rc<Vec<RawTerminal>>>,
    pub stats: FlattenStats,
}

impl<'a> Flattener<'a> {
    pub fn new(layout: &'a Layout, rules: PortRules) -> Self {
        Self {
            layout,
            index: layout.index(),
            rules,
            cache: HashMap::new(),
            stats: FlattenStats::default(),
        }
    }

    pub fn rules(&self) -> &PortRules {
        &self.rules
    }

    /// Promote every terminal under `name` into the caller's coordinates.
    pub fn promote(
        &mut self,
        name: &str,
        orientation: Orientation,
        origin: Point,
    ) -> Result<Vec<RawTerminal>> {
        let local = self.structure_terminals(name)?;
        let transform = Transform::new(orientation, origin);
        Ok(local
            .iter()
            .map(|t| t.placed(&transform, orientation))
            .collect())
    }

    /// The memoized structure-local terminal list for `name`, including
    /// terminals promoted out of its descendants.
    fn structure_terminals(&mut self, name: &str) -> Result<Rc<Vec<RawTerminal>>> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(Rc::clone(cached));
        }
        let structure = *self.index.get(name).ok_or_else(|| Error::StructureNotFound {
            structure: name.to_string(),
            file: self.layout.path.clone(),
        })?;
        self.stats.structures_processed += 1;
        let mut terminals: Vec<RawTerminal> = Vec::new();
        // Clone the element list so recursion may borrow self mutably; the
        // clone is per unique structure, not per instantiation.
        let elements = structure.elements.clone();
        for element in &elements {
            match element {
                Element::Reference(r) => {
                    terminals.extend(self.promote(&r.structure, r.orientation, r.origin)?);
                }
                Element::Array(a) => {
                    let x_step = (a.col_ref.x - a.origin.x) / a.cols.max(1) as i64;
                    let y_step = (a.row_ref.y - a.origin.y) / a.rows.max(1) as i64;
                    for row in 0..a.rows {
                        for col in 0..a.cols {
                            let cell = Point::new(
                                a.origin.x + x_step * col as i64,
                                a.origin.y + y_step * row as i64,
                            );
                            terminals.extend(self.promote(&a.structure, a.orientation, cell)?);
                        }
                    }
                }
                Element::Boundary(b) if self.rules.is_port_layer(b.layer) => {
                    if !self.rules.owners(b.layer).iter().any(|o| o == name) {
                        log::warn!(
                            "Layer {} in unexpected structure {} ignored",
                            b.layer,
                            name
                        );
                        self.stats.unexpected_structure += 1;
                    } else if !is_box(&b.points) {
                        log::warn!(
                            "Layer {} shape in {} is not rectangular, skipped",
                            b.layer,
                            name
                        );
                        self.stats.non_rectangular += 1;
                    } else if let Some(bbox) = BBox::of(&b.points) {
                        let (port_type, text) = self.rules.by_structure[name].clone();
                        terminals.push(RawTerminal {
                            port_type,
                            origin: Point::ZERO,
                            bbox,
                            winding: Winding::R,
                            text: text.map(|t| LayerKey::new(t.layer, t.texttype)),
                        });
                    }
                }
                Element::Boundary(_) => {}
                Element::Other(Some(key)) if self.rules.is_port_layer(*key) => {
                    log::warn!(
                        "Terminal layer {} on unsupported element kind in {}",
                        key,
                        name
                    );
                    self.stats.unexpected_element += 1;
                }
                Element::Other(_) | Element::Text(_) => {}
            }
        }
        let terminals = Rc::new(terminals);
        self.cache.insert(name.to_string(), Rc::clone(&terminals));
        Ok(terminals)
    }
}

/// Rectangle test: exactly 5 points, closed, edges strictly alternating
/// axis-parallel starting from either axis.
pub fn is_box(points: &[Point]) -> bool {
    if points.len() != 5 || points[0] != points[4] {
        return false;
    }
    let mut vertical = points[0].y != points[1].y;
    for i in 0..4 {
        let (a, b) = (points[i], points[i + 1]);
        if vertical {
            if a.x != b.x || a.y == b.y {
                return false;
            }
        } else if a.y != b.y || a.x == b.x {
            return false;
        }
        vertical = !vertical;
    }
    true
}
