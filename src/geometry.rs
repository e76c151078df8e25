// SPDX-License-Identifier: MIT

//! Orientations, affine transforms, and box algebra in integer database
//! units. All structural composition stays in database units; conversion to
//! user units happens exactly once, after the chip-level placement.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in database units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box, normalized so `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    /// Bounding box of a point list. Returns `None` for an empty list.
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let mut min = first;
        let mut max = first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }

    /// Inclusive containment on both boundaries.
    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    pub fn width(&self) -> i64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i64 {
        self.max.y - self.min.y
    }

    /// Transform both corners and re-normalize.
    pub fn transformed(&self, t: &Transform) -> Self {
        let a = t.apply(self.min);
        let b = t.apply(self.max);
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }
}

/// Combined reflection/rotation placement orientation.
///
/// `R*` are pure rotations; `M*` reflect about the x axis first, then rotate.
/// Magnification is not modeled and is rejected at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    R0,
    R90,
    R180,
    R270,
    MX,
    MXR90,
    MY,
    MYR90,
}

impl Orientation {
    /// Derive an orientation from a placement's reflection bit and rotation
    /// angle. Angles other than exactly 0/90/180/270 are unsupported.
    pub fn from_reflection_angle(reflected: bool, angle: Option<f64>) -> Option<Self> {
        let angle = angle.unwrap_or(0.0);
        if angle.fract() != 0.0 {
            return None;
        }
        match (reflected, angle as i64) {
            (false, 0) => Some(Orientation::R0),
            (false, 90) => Some(Orientation::R90),
            (false, 180) => Some(Orientation::R180),
            (false, 270) => Some(Orientation::R270),
            (true, 0) => Some(Orientation::MX),
            (true, 90) => Some(Orientation::MXR90),
            (true, 180) => Some(Orientation::MY),
            (true, 270) => Some(Orientation::MYR90),
            _ => None,
        }
    }

    /// The 2×2 linear part, column-vector convention: `p' = M·p`.
    pub fn linear(&self) -> [[i64; 2]; 2] {
        match self {
            Orientation::R0 => [[1, 0], [0, 1]],
            Orientation::R90 => [[0, -1], [1, 0]],
            Orientation::R180 => [[-1, 0], [0, -1]],
            Orientation::R270 => [[0, 1], [-1, 0]],
            Orientation::MX => [[1, 0], [0, -1]],
            Orientation::MXR90 => [[0, 1], [1, 0]],
            Orientation::MY => [[-1, 0], [0, 1]],
            Orientation::MYR90 => [[0, -1], [-1, 0]],
        }
    }

    /// Reflections flip winding; pure rotations never do.
    pub fn reflects(&self) -> bool {
        matches!(
            self,
            Orientation::MX | Orientation::MXR90 | Orientation::MY | Orientation::MYR90
        )
    }

    /// True when the orientation exchanges the x and y extents of a box.
    pub fn swaps_axes(&self) -> bool {
        matches!(
            self,
            Orientation::R90 | Orientation::R270 | Orientation::MXR90 | Orientation::MYR90
        )
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::R0 => "R0",
            Orientation::R90 => "R90",
            Orientation::R180 => "R180",
            Orientation::R270 => "R270",
            Orientation::MX => "MX",
            Orientation::MXR90 => "MXR90",
            Orientation::MY => "MY",
            Orientation::MYR90 => "MYR90",
        };
        f.write_str(s)
    }
}

/// An affine transform `p' = A·p + t` over database units.
///
/// A placement hierarchy is walked innermost-first: each level applies its
/// own transform to the child's already-transformed points, which is the
/// same as composing the matrices outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    a: [[i64; 2]; 2],
    t: [i64; 2],
}

impl Transform {
    pub fn new(orientation: Orientation, translation: Point) -> Self {
        Self {
            a: orientation.linear(),
            t: [translation.x, translation.y],
        }
    }

    pub fn identity() -> Self {
        Self::new(Orientation::R0, Point::ZERO)
    }

    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: self.a[0][0] * p.x + self.a[0][1] * p.y + self.t[0],
            y: self.a[1][0] * p.x + self.a[1][1] * p.y + self.t[1],
        }
    }

    /// Compose with an enclosing transform: `(outer ∘ self)(p) = outer(self(p))`.
    pub fn then(&self, outer: &Transform) -> Transform {
        let o = &outer.a;
        let s = &self.a;
        Transform {
            a: [
                [
                    o[0][0] * s[0][0] + o[0][1] * s[1][0],
                    o[0][0] * s[0][1] + o[0][1] * s[1][1],
                ],
                [
                    o[1][0] * s[0][0] + o[1][1] * s[1][0],
                    o[1][0] * s[0][1] + o[1][1] * s[1][1],
                ],
            ],
            t: [
                o[0][0] * self.t[0] + o[0][1] * self.t[1] + outer.t[0],
                o[1][0] * self.t[0] + o[1][1] * self.t[1] + outer.t[1],
            ],
        }
    }
}

/// Clockwise (`R`) or counter-clockwise (`L`) winding sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winding {
    R,
    L,
}

impl Winding {
    pub fn flipped(&self) -> Self {
        match self {
            Winding::R => Winding::L,
            Winding::L => Winding::R,
        }
    }

    /// Winding after placing under `orientation`.
    pub fn placed(&self, orientation: Orientation) -> Self {
        if orientation.reflects() {
            self.flipped()
        } else {
            *self
        }
    }
}

impl fmt::Display for Winding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Winding::R => "R",
            Winding::L => "L",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> Vec<Point> {
        vec![
            Point::new(0, 0),
            Point::new(7, 0),
            Point::new(7, 3),
            Point::new(-2, 5),
        ]
    }

    fn apply_all(t: &Transform, pts: &[Point]) -> Vec<Point> {
        pts.iter().map(|p| t.apply(*p)).collect()
    }

    #[test]
    fn r90_twice_is_r180() {
        let r90 = Transform::new(Orientation::R90, Point::ZERO);
        let r180 = Transform::new(Orientation::R180, Point::ZERO);
        let composed = r90.then(&r90);
        assert_eq!(apply_all(&composed, &probe()), apply_all(&r180, &probe()));
    }

    #[test]
    fn reflection_composed_with_rotation() {
        // Placing an MXR90 child under an R180 parent lands on MYR90.
        let child = Transform::new(Orientation::MXR90, Point::ZERO);
        let parent = Transform::new(Orientation::R180, Point::ZERO);
        let myr90 = Transform::new(Orientation::MYR90, Point::ZERO);
        assert_eq!(
            apply_all(&child.then(&parent), &probe()),
            apply_all(&myr90, &probe())
        );
    }

    #[test]
    fn r0_zero_translation_is_identity() {
        let id = Transform::identity();
        assert_eq!(apply_all(&id, &probe()), probe());
    }

    #[test]
    fn translation_applies_after_rotation() {
        let t = Transform::new(Orientation::R90, Point::new(10, 20));
        assert_eq!(t.apply(Point::new(1, 0)), Point::new(10, 21));
    }

    #[test]
    fn reflections_flip_winding_rotations_do_not() {
        for o in [
            Orientation::MX,
            Orientation::MXR90,
            Orientation::MY,
            Orientation::MYR90,
        ] {
            assert_eq!(Winding::R.placed(o), Winding::L, "{o} must flip");
        }
        for o in [
            Orientation::R0,
            Orientation::R90,
            Orientation::R180,
            Orientation::R270,
        ] {
            assert_eq!(Winding::R.placed(o), Winding::R, "{o} must not flip");
        }
    }

    #[test]
    fn bbox_transform_renormalizes() {
        let b = BBox {
            min: Point::new(0, 0),
            max: Point::new(4, 2),
        };
        let t = Transform::new(Orientation::R90, Point::ZERO);
        let r = b.transformed(&t);
        assert_eq!(r.min, Point::new(-2, 0));
        assert_eq!(r.max, Point::new(0, 4));
        assert_eq!(r.width(), 2);
        assert_eq!(r.height(), 4);
    }

    #[test]
    fn orientation_from_reflection_angle() {
        assert_eq!(
            Orientation::from_reflection_angle(false, None),
            Some(Orientation::R0)
        );
        assert_eq!(
            Orientation::from_reflection_angle(true, Some(270.0)),
            Some(Orientation::MYR90)
        );
        assert_eq!(Orientation::from_reflection_angle(false, Some(45.0)), None);
        // Fractional angles must not truncate to the nearest quadrant.
        assert_eq!(Orientation::from_reflection_angle(false, Some(90.5)), None);
        assert_eq!(Orientation::from_reflection_angle(true, Some(0.25)), None);
    }
}
