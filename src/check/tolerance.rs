// SPDX-License-Identifier: MIT

//! Tolerance-aware position equality and grid neighbor search.
//!
//! Tolerances below 1e-6 user units degrade to exact comparison. Above
//! that, two coordinates match when each axis difference divided by the
//! tolerance, rounded to 5 decimal digits, is at most 1.

use super::fmt_coord;

/// Exact-comparison cutoff in user units.
const EXACT_CUTOFF: f64 = 1e-6;

fn axis_within(a: f64, b: f64, tolerance: f64) -> bool {
    ((a - b).abs() / tolerance * 1e5).round() <= 1e5
}

/// True when both axes of two points are within the tolerance.
pub fn within(a: (f64, f64), b: (f64, f64), tolerance: f64) -> bool {
    if tolerance <= EXACT_CUTOFF {
        return a == b;
    }
    axis_within(a.0, b.0, tolerance) && axis_within(a.1, b.1, tolerance)
}

/// Grid cell keys to probe when searching for neighbors of `pos`.
///
/// A match within tolerance can sit on the far side of a grid rounding
/// boundary, so the point's own cell and the three cells one step up in x
/// and/or y are all probed (2×2 block). With an effectively zero tolerance
/// the point's exact key is the only cell.
pub fn search_cells(pos: (f64, f64), tolerance: f64) -> Vec<String> {
    if tolerance <= EXACT_CUTOFF {
        return vec![cell_key(pos.0, pos.1)];
    }
    let x0 = (pos.0 / tolerance).round() * tolerance;
    let y0 = (pos.1 / tolerance).round() * tolerance;
    let mut cells = Vec::with_capacity(4);
    for dx in 0..2 {
        for dy in 0..2 {
            cells.push(cell_key(
                x0 + tolerance * dx as f64,
                y0 + tolerance * dy as f64,
            ));
        }
    }
    cells
}

fn cell_key(x: f64, y: f64) -> String {
    format!("({}, {})", fmt_coord(x), fmt_coord(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_tolerance_degrades_to_equality() {
        assert!(within((1.0, 2.0), (1.0, 2.0), 0.0));
        assert!(!within((1.0, 2.0), (1.0000001, 2.0), 0.0));
    }

    #[test]
    fn difference_of_exactly_tolerance_matches() {
        assert!(within((0.0, 0.0), (0.5, 0.0), 0.5));
        assert!(!within((0.0, 0.0), (0.51, 0.0), 0.5));
    }

    #[test]
    fn both_axes_must_match() {
        assert!(!within((0.0, 0.0), (0.1, 10.0), 0.5));
    }

    #[test]
    fn search_covers_two_by_two_block() {
        let cells = search_cells((1.0, 1.0), 0.5);
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&"(1, 1)".to_string()));
        assert!(cells.contains(&"(1.5, 1.5)".to_string()));
    }

    #[test]
    fn zero_tolerance_search_is_the_point_itself() {
        assert_eq!(search_cells((2.5, -3.0), 0.0), vec!["(2.5, -3)".to_string()]);
    }
}
