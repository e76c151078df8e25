// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::path::Path;

use nom::bytes::complete::{tag_no_case, take_while1};
use nom::character::complete::space1;
use nom::sequence::preceded;
use nom::{IResult, Parser};

use crate::error::{Error, Result};

use super::{preprocessor::preprocess, NetListing, PinMap, TopInstance};

/// Token separator for unconnected pins; never participates in connectivity.
const UNCONNECTED: &str = "/";

fn token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace()).parse(input)
}

/// The subcircuit name of a `.SUBCKT name pin...` header line, if this is one.
fn subckt_header(line: &str) -> Option<&str> {
    let result: IResult<&str, &str> =
        preceded((tag_no_case::<_, _, nom::error::Error<&str>>(".subckt"), space1), token)
            .parse(line);
    result.ok().map(|(_, name)| name)
}

/// Scan a top assembly netlist for the instances of `top_cell`.
///
/// Collects each instance line's first token (instance name), last token
/// (master subcircuit) and middle tokens (actual nets), and tracks which
/// nets appear on two or more distinct instances. Scanning stops once the
/// target block has ended and instances were collected.
pub fn top_instances(content: &str, top_cell: &str, file: &Path) -> Result<NetListing> {
    let mut listing = NetListing::default();
    let mut used_nets: HashSet<String> = HashSet::new();
    let mut saving = false;
    for line in preprocess(content) {
        if line.starts_with('.') {
            saving = subckt_header(&line) == Some(top_cell);
        }
        if saving && line.starts_with('X') {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.len() < 2 {
                continue;
            }
            let nets: Vec<String> = words[1..words.len() - 1]
                .iter()
                .map(|s| s.to_string())
                .collect();
            let unique: HashSet<&String> = nets.iter().filter(|n| *n != UNCONNECTED).collect();
            for net in unique {
                if !used_nets.insert(net.clone()) {
                    listing.connections.insert(net.clone());
                }
            }
            listing.instances.insert(
                words[0].to_string(),
                TopInstance {
                    master: words[words.len() - 1].to_string(),
                    nets,
                },
            );
        } else if !saving && !listing.instances.is_empty() {
            break;
        }
    }
    if listing.instances.is_empty() {
        return Err(Error::SubcktNotFound {
            subckt: top_cell.to_string(),
            file: file.to_path_buf(),
        });
    }
    Ok(listing)
}

/// Map the formal pins of `subckt` to the nets its caller supplies.
///
/// The chip's own netlist declares `.SUBCKT subckt pin...`; the pins are
/// bound positionally to `parent_nets`, the actual net list of the calling
/// instance in the top assembly.
pub fn pin_map(
    content: &str,
    subckt: &str,
    parent_nets: &[String],
    file: &Path,
) -> Result<PinMap> {
    for line in preprocess(content) {
        if !line.starts_with('.') {
            continue;
        }
        if subckt_header(&line) != Some(subckt) {
            continue;
        }
        let pins: Vec<&str> = line.split_whitespace().skip(2).collect();
        if pins.len() > parent_nets.len() {
            return Err(Error::PinCountMismatch {
                subckt: subckt.to_string(),
                file: file.to_path_buf(),
                pins: pins.len(),
                nets: parent_nets.len(),
            });
        }
        return Ok(pins
            .iter()
            .zip(parent_nets)
            .map(|(pin, net)| (pin.to_string(), net.clone()))
            .collect());
    }
    Err(Error::SubcktNotFound {
        subckt: subckt.to_string(),
        file: file.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("test.cdl")
    }

    #[test]
    fn subckt_header_is_case_insensitive() {
        assert_eq!(subckt_header(".SUBCKT TOP A B"), Some("TOP"));
        assert_eq!(subckt_header(".subckt low a"), Some("low"));
        assert_eq!(subckt_header(".ENDS"), None);
        assert_eq!(subckt_header("XI A B SUB"), None);
    }

    #[test]
    fn missing_subckt_is_fatal() {
        let err = top_instances(".SUBCKT OTHER A\nXI A SUB\n.ENDS\n", "STACK", &path());
        assert!(matches!(err, Err(Error::SubcktNotFound { .. })));
    }

    #[test]
    fn pin_count_mismatch_is_fatal() {
        let nets = vec!["N1".to_string()];
        let err = pin_map(".SUBCKT CHIP A B C\n.ENDS\n", "CHIP", &nets, &path());
        assert!(matches!(err, Err(Error::PinCountMismatch { .. })));
    }
}
