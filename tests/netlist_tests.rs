// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use stackcheck::netlist::parser::{pin_map, top_instances};

const TOP_CDL: &str = "\
* Stack assembly
.SUBCKT STACK VDD VSS CLK D[0] D[1]
XCHIP1 VDD VSS CLK
+ D[0] D[1] CHIP1
XCHIP2 VDD VSS CLK / D[1] CHIP2
XCHIP3 VDD VSS / / / CHIP3
.ENDS

.SUBCKT OTHER A B
XDUMMY A B CELL
.ENDS
";

fn top_path() -> PathBuf {
    PathBuf::from("stack.cdl")
}

#[test]
fn collects_instances_of_the_target_subckt_only() {
    let listing = top_instances(TOP_CDL, "STACK", &top_path()).unwrap();
    assert_eq!(listing.instances.len(), 3);
    assert!(!listing.instances.contains_key("XDUMMY"));
    let chip1 = &listing.instances["XCHIP1"];
    assert_eq!(chip1.master, "CHIP1");
    assert_eq!(chip1.nets, vec!["VDD", "VSS", "CLK", "D[0]", "D[1]"]);
}

#[test]
fn continuation_lines_join_into_one_instance() {
    // XCHIP1's net list spans a `+` continuation.
    let listing = top_instances(TOP_CDL, "STACK", &top_path()).unwrap();
    assert_eq!(listing.instances["XCHIP1"].nets.len(), 5);
}

#[test]
fn nets_on_two_or_more_instances_are_connections() {
    let listing = top_instances(TOP_CDL, "STACK", &top_path()).unwrap();
    assert!(listing.connections.contains("VDD"));
    assert!(listing.connections.contains("VSS"));
    assert!(listing.connections.contains("CLK"));
    assert!(listing.connections.contains("D[1]"));
    // D[0] is only on XCHIP1: dangling.
    assert!(!listing.connections.contains("D[0]"));
}

#[test]
fn unconnected_marker_never_counts_as_a_net() {
    // `/` appears on all three instances but is a placeholder, not a net.
    let listing = top_instances(TOP_CDL, "STACK", &top_path()).unwrap();
    assert!(!listing.connections.contains("/"));
}

#[test]
fn net_used_twice_on_one_instance_is_not_a_connection() {
    let cdl = "\
.SUBCKT STACK A B
XONLY A A B SELF
XSECOND B B OTHER
.ENDS
";
    let listing = top_instances(cdl, "STACK", &top_path()).unwrap();
    // A is on one instance only, twice; B is on two instances.
    assert!(!listing.connections.contains("A"));
    assert!(listing.connections.contains("B"));
}

#[test]
fn pin_map_is_positional() {
    let chip_cdl = "\
* CHIP1 netlist
.SUBCKT CHIP1 PVDD PVSS PCLK PD0
+ PD1
M1 PVDD PCLK PVSS PVSS NMOS
.ENDS
";
    let parent = vec![
        "VDD".to_string(),
        "VSS".to_string(),
        "CLK".to_string(),
        "D[0]".to_string(),
        "D[1]".to_string(),
    ];
    let pins = pin_map(chip_cdl, "CHIP1", &parent, &PathBuf::from("chip1.cdl")).unwrap();
    assert_eq!(pins.len(), 5);
    assert_eq!(pins["PVDD"], "VDD");
    assert_eq!(pins["PD1"], "D[1]");
}

#[test]
fn extra_parent_nets_are_ignored() {
    let chip_cdl = ".SUBCKT CHIP A B\n.ENDS\n";
    let parent = vec!["N1".to_string(), "N2".to_string(), "N3".to_string()];
    let pins = pin_map(chip_cdl, "CHIP", &parent, &PathBuf::from("chip.cdl")).unwrap();
    assert_eq!(pins.len(), 2);
    assert_eq!(pins["B"], "N2");
}
