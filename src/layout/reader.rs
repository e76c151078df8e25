// SPDX-License-Identifier: MIT

//! GDSII ingestion.
//!
//! Byte-level decoding belongs to the external `gds21` library; this reader
//! only converts its element classes into the crate's closed [`Element`]
//! variants and derives symbolic orientations from raw transform records.

use std::path::Path;

use gds21::{GdsElement, GdsLibrary, GdsPoint, GdsStrans};

use crate::error::{Error, Result};
use crate::geometry::{Orientation, Point};

use super::{ArrayReference, Boundary, Element, LayerKey, Layout, Reference, Structure, TextElement};

pub struct LayoutReader;

impl LayoutReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> Result<Layout> {
        log::info!("Reading layout {}", path.display());
        let layout_error = |e: gds21::GdsError| Error::Layout {
            file: path.to_path_buf(),
            message: format!("{e:?}"),
        };
        // Compressed layouts are decoded from memory; plain files stream.
        let lib = if path.extension().is_some_and(|ext| ext == "gz") {
            let bytes = crate::input::read_bytes(path)?;
            GdsLibrary::from_bytes(&bytes).map_err(layout_error)?
        } else {
            GdsLibrary::load(path).map_err(layout_error)?
        };
        let db_unit = lib.units.db_unit();
        let structures = lib
            .structs
            .iter()
            .map(|s| convert_structure(s, path))
            .collect::<Result<Vec<_>>>()?;
        log::info!(
            "Layout {}: {} structures, 1 dbu = {:.3e} m",
            lib.name,
            structures.len(),
            db_unit
        );
        Ok(Layout {
            path: path.to_path_buf(),
            db_unit,
            structures,
        })
    }
}

impl Default for LayoutReader {
    fn default() -> Self {
        Self::new()
    }
}

fn point(p: &GdsPoint) -> Point {
    Point::new(p.x as i64, p.y as i64)
}

/// Derive the symbolic orientation of a placement. Magnification,
/// absolute-flag placements and non-quadrant angles are fatal.
fn orientation(
    strans: &Option<GdsStrans>,
    structure: &str,
    path: &Path,
) -> Result<Orientation> {
    let (reflected, angle, mag) = match strans {
        Some(s) => (s.reflected, s.angle, s.mag),
        None => (false, None, None),
    };
    if let Some(s) = strans {
        if s.abs_mag || s.abs_angle {
            return Err(Error::InvalidOrientation {
                structure: structure.to_string(),
                file: path.to_path_buf(),
                detail: "absolute magnification/angle placement is unsupported".to_string(),
            });
        }
    }
    if let Some(mag) = mag {
        return Err(Error::InvalidOrientation {
            structure: structure.to_string(),
            file: path.to_path_buf(),
            detail: format!("magnification {mag} is unsupported"),
        });
    }
    Orientation::from_reflection_angle(reflected, angle).ok_or_else(|| Error::InvalidOrientation {
        structure: structure.to_string(),
        file: path.to_path_buf(),
        detail: format!(
            "reflected={reflected}, angle={}",
            angle.unwrap_or(0.0)
        ),
    })
}

fn convert_structure(strukt: &gds21::GdsStruct, path: &Path) -> Result<Structure> {
    let mut elements = Vec::with_capacity(strukt.elems.len());
    for elem in &strukt.elems {
        let converted = match elem {
            GdsElement::GdsBoundary(b) => Element::Boundary(Boundary {
                layer: LayerKey::new(b.layer, b.datatype),
                points: b.xy.iter().map(point).collect(),
            }),
            GdsElement::GdsStructRef(sref) => Element::Reference(Reference {
                structure: sref.name.clone(),
                origin: point(&sref.xy),
                orientation: orientation(&sref.strans, &strukt.name, path)?,
            }),
            GdsElement::GdsArrayRef(aref) => Element::Array(ArrayReference {
                structure: aref.name.clone(),
                origin: point(&aref.xy[0]),
                col_ref: point(&aref.xy[1]),
                row_ref: point(&aref.xy[2]),
                cols: aref.cols as usize,
                rows: aref.rows as usize,
                orientation: orientation(&aref.strans, &strukt.name, path)?,
            }),
            GdsElement::GdsTextElem(text) => Element::Text(TextElement {
                layer: LayerKey::new(text.layer, text.texttype),
                origin: point(&text.xy),
                string: text.string.clone(),
            }),
            GdsElement::GdsPath(p) => Element::Other(Some(LayerKey::new(p.layer, p.datatype))),
            GdsElement::GdsBox(b) => Element::Other(Some(LayerKey::new(b.layer, b.boxtype))),
            GdsElement::GdsNode(n) => Element::Other(Some(LayerKey::new(n.layer, n.nodetype))),
        };
        elements.push(converted);
    }
    Ok(Structure {
        name: strukt.name.clone(),
        elements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("test.gds")
    }

    #[test]
    fn missing_strans_is_r0() {
        assert_eq!(orientation(&None, "S", &path()).unwrap(), Orientation::R0);
    }

    #[test]
    fn reflection_and_angle_map_to_symbolic_orientations() {
        let strans = GdsStrans {
            reflected: true,
            angle: Some(90.0),
            ..Default::default()
        };
        assert_eq!(
            orientation(&Some(strans), "S", &path()).unwrap(),
            Orientation::MXR90
        );
    }

    #[test]
    fn magnification_is_fatal() {
        let strans = GdsStrans {
            mag: Some(2.0),
            ..Default::default()
        };
        let err = orientation(&Some(strans), "S", &path());
        assert!(matches!(err, Err(Error::InvalidOrientation { .. })));
    }

    #[test]
    fn absolute_placement_flags_are_fatal() {
        for strans in [
            GdsStrans {
                abs_mag: true,
                ..Default::default()
            },
            GdsStrans {
                abs_angle: true,
                ..Default::default()
            },
        ] {
            let err = orientation(&Some(strans), "S", &path());
            assert!(matches!(err, Err(Error::InvalidOrientation { .. })));
        }
    }

    #[test]
    fn fractional_angle_is_fatal() {
        let strans = GdsStrans {
            angle: Some(90.5),
            ..Default::default()
        };
        let err = orientation(&Some(strans), "S", &path());
        assert!(matches!(err, Err(Error::InvalidOrientation { .. })));
    }
}
