// SPDX-License-Identifier: MIT

//! Canonical report-row ordering.
//!
//! Bus indices in any of the `name[n]`, `name<n>`, `name(n)`, `name{n}`
//! conventions are zero-padded to 10 digits so lexical order equals numeric
//! order. Coordinates are shifted by 1e6 user units and rendered as signed
//! zero-padded fixed-point for the same reason. Records without a position
//! use a 2e6 sentinel and sort after every geometric record of their name.

use std::sync::LazyLock;

use regex::Regex;

static BRACKETS: LazyLock<[(char, Regex); 4]> = LazyLock::new(|| {
    [
        (']', Regex::new(r"^(.*)\[([0-9]+)\]$").expect("valid pattern")),
        ('>', Regex::new(r"^(.*)<([0-9]+)>$").expect("valid pattern")),
        (')', Regex::new(r"^(.*)\(([0-9]+)\)$").expect("valid pattern")),
        ('}', Regex::new(r"^(.*)\{([0-9]+)\}$").expect("valid pattern")),
    ]
});

/// Rewrite a trailing bus index to fixed width, preserving its brackets.
fn pad_bus_index(label: &str) -> Option<String> {
    let last = label.chars().last()?;
    let (close, pattern) = BRACKETS.iter().find(|(c, _)| *c == last)?;
    let captures = pattern.captures(label)?;
    let index: u64 = captures[2].parse().ok()?;
    let open = match close {
        ']' => '[',
        '>' => '<',
        ')' => '(',
        _ => '{',
    };
    Some(format!("{}{}{:010}{}", &captures[1], open, index, close))
}

/// The composite sort key for one report row.
pub fn sort_key(label: &str, pos: Option<(f64, f64)>) -> String {
    let name = pad_bus_index(label).unwrap_or_else(|| label.to_string());
    let (x, y) = pos.unwrap_or((2e6, 2e6));
    format!("{} {:+020.5} {:+020.5}", name, 1e6 + x, 1e6 + y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_indices_sort_numerically() {
        let mut labels = vec!["A[2]", "A[1]", "A[10]"];
        labels.sort_by_key(|l| sort_key(l, Some((0.0, 0.0))));
        assert_eq!(labels, vec!["A[1]", "A[2]", "A[10]"]);
    }

    #[test]
    fn all_bracket_conventions_pad() {
        assert_eq!(pad_bus_index("D<7>").as_deref(), Some("D<0000000007>"));
        assert_eq!(pad_bus_index("D(7)").as_deref(), Some("D(0000000007)"));
        assert_eq!(pad_bus_index("D{7}").as_deref(), Some("D{0000000007}"));
        assert_eq!(pad_bus_index("D[7]").as_deref(), Some("D[0000000007]"));
        assert_eq!(pad_bus_index("PLAIN"), None);
        assert_eq!(pad_bus_index("ODD]"), None);
    }

    #[test]
    fn negative_coordinates_sort_before_positive() {
        let a = sort_key("N", Some((-40.0, 0.0)));
        let b = sort_key("N", Some((-10.0, 0.0)));
        let c = sort_key("N", Some((10.0, 0.0)));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn missing_position_sorts_last() {
        let geometric = sort_key("N", Some((999999.0, 999999.0)));
        let schematic = sort_key("N", None);
        assert!(geometric < schematic);
    }
}
