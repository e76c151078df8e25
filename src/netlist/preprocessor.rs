// SPDX-License-Identifier: MIT

//! Netlist preprocessor: joins `+` continuation lines into logical lines,
//! dropping `*` comment lines and blank lines along the way.

/// Preprocess raw netlist content into logical lines.
///
/// A `+` line extends the most recent logical line (the marker is replaced
/// by a single space). Comments and blank lines may appear between a line
/// and its continuations.
pub fn preprocess(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in content.lines() {
        if raw.starts_with('*') {
            continue;
        }
        if raw.trim().is_empty() {
            continue;
        }
        if let Some(rest) = raw.strip_prefix('+') {
            if let Some(last) = lines.last_mut() {
                last.push(' ');
                last.push_str(rest);
            }
            continue;
        }
        lines.push(raw.to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let lines = preprocess(".SUBCKT TOP A B\n");
        assert_eq!(lines, vec![".SUBCKT TOP A B"]);
    }

    #[test]
    fn continuation_joined_with_space() {
        let lines = preprocess("XCHIP1 VDD VSS\n+ CLK D0\n+ D1 CHIP1\n");
        assert_eq!(lines, vec!["XCHIP1 VDD VSS  CLK D0  D1 CHIP1"]);
    }

    #[test]
    fn comments_and_blanks_skipped() {
        let lines = preprocess("* header\n\n.SUBCKT TOP A\n* mid comment\n+ B\n\nXI A B SUB\n");
        assert_eq!(lines.len(), 2);
        // The marker is replaced by a space; the continuation keeps its own
        // leading whitespace.
        assert_eq!(lines[0], ".SUBCKT TOP A  B");
        assert_eq!(lines[1], "XI A B SUB");
    }

    #[test]
    fn star_only_comments_at_line_start() {
        // An asterisk later in a line is ordinary content.
        let lines = preprocess("XI A*B SUB\n");
        assert_eq!(lines, vec!["XI A*B SUB"]);
    }

    #[test]
    fn dangling_continuation_ignored() {
        let lines = preprocess("+ orphan\nXI A SUB\n");
        assert_eq!(lines, vec!["XI A SUB"]);
    }
}
