// SPDX-License-Identifier: MIT

//! Ingested layout object model.
//!
//! The external GDSII library's element classes are converted exactly once,
//! at ingestion, into the closed [`Element`] variants below; everything past
//! the reader dispatches exhaustively on them. Coordinates are integer
//! database units.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::geometry::{Orientation, Point};

pub mod assign;
pub mod flatten;
pub mod reader;

/// A layer/datatype (or layer/texttype) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerKey {
    pub layer: i16,
    pub dtype: i16,
}

impl LayerKey {
    pub fn new(layer: i16, dtype: i16) -> Self {
        Self { layer, dtype }
    }
}

impl std::fmt::Display for LayerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.layer, self.dtype)
    }
}

/// A single placement of another structure.
#[derive(Debug, Clone)]
pub struct Reference {
    pub structure: String,
    pub origin: Point,
    pub orientation: Orientation,
}

/// A regular grid of placements. `col_ref` and `row_ref` are the array's
/// second and third control points: origin plus columns·col-step and origin
/// plus rows·row-step respectively.
#[derive(Debug, Clone)]
pub struct ArrayReference {
    pub structure: String,
    pub origin: Point,
    pub col_ref: Point,
    pub row_ref: Point,
    pub cols: usize,
    pub rows: usize,
    pub orientation: Orientation,
}

/// A closed polygon. Points include the closing repetition of the first
/// point, as stored in the layout file.
#[derive(Debug, Clone)]
pub struct Boundary {
    pub layer: LayerKey,
    pub points: Vec<Point>,
}

/// A text label anchored at a point.
#[derive(Debug, Clone)]
pub struct TextElement {
    pub layer: LayerKey,
    pub origin: Point,
    pub string: String,
}

/// One element of a structure.
#[derive(Debug, Clone)]
pub enum Element {
    Reference(Reference),
    Array(ArrayReference),
    Boundary(Boundary),
    Text(TextElement),
    /// Any other element kind; carries its layer/datatype when it has one so
    /// terminal layers on unsupported geometry can be warned about.
    Other(Option<LayerKey>),
}

/// A named hierarchical cell.
#[derive(Debug, Clone)]
pub struct Structure {
    pub name: String,
    pub elements: Vec<Element>,
}

/// A whole layout library.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Source file, for error reporting.
    pub path: PathBuf,
    /// Size of one database unit in meters.
    pub db_unit: f64,
    pub structures: Vec<Structure>,
}

impl Layout {
    /// Index structures by name.
    pub fn index(&self) -> HashMap<&str, &Structure> {
        self.structures
            .iter()
            .map(|s| (s.name.as_str(), s))
            .collect()
    }

    pub fn structure(&self, name: &str) -> Option<&Structure> {
        self.structures.iter().find(|s| s.name == name)
    }

    /// Database units per user unit for a given unit system.
    pub fn dbu_per_user_unit(&self, units: crate::config::Units) -> f64 {
        units.meters() / self.db_unit
    }
}
