// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

use super::StackConfig;

/// Load and validate a stack configuration file.
pub fn load(path: &Path) -> Result<StackConfig> {
    log::info!("Reading configuration {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        file: path.to_path_buf(),
        source,
    })?;
    let config: StackConfig = toml::from_str(&content).map_err(|e| Error::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    log::info!(
        "Top netlist {}, top subckt {}, tolerance {}",
        config.top_netlist.display(),
        config.top_cell,
        config.tolerance
    );
    for chip in &config.chips {
        log::info!(
            "Chip {}: netlist {}, layout {} (top {}), orientation {}, offset ({}, {}), shrink {}",
            chip.instance,
            chip.netlist.display(),
            chip.layout.display(),
            chip.top_structure,
            chip.orientation,
            chip.offset.x,
            chip.offset.y,
            chip.shrink
        );
        // Surfaces conflicting terminal-type or text-layer declarations
        // before any file is read.
        crate::layout::flatten::PortRules::new(chip)?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use crate::config::StackConfig;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
top_cell = "STACK"
top_netlist = "stack.cdl"
units = "um"
tolerance = 0.5

[[chip]]
instance = "X1"
netlist = "chip1.cdl"
layout = "chip1.gds"
top_structure = "CHIP1"
orientation = "R0"
offset = { x = 0.0, y = 0.0 }

[[chip.port]]
layer = 81
datatype = 0
type = "TSV"
structures = ["TSV_CELL"]
text = { layer = 63, texttype = 0 }

[[chip.port]]
layer = 82
datatype = 0
type = "COIL"
structures = ["COIL_CW", "COIL_CCW"]
text = { layer = 63, texttype = 1 }
"#;
        let config: StackConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.top_cell, "STACK");
        assert_eq!(config.chips.len(), 1);
        let chip = &config.chips[0];
        assert_eq!(chip.instance, "X1");
        assert_eq!(chip.shrink, 1.0);
        assert!(chip.subckt.is_none());
        assert!(chip.port_cache.is_none());
        assert_eq!(chip.ports.len(), 2);
        assert_eq!(chip.ports[0].port_type, "TSV");
        assert_eq!(chip.ports[1].structures.len(), 2);
        assert_eq!(chip.ports[1].text.unwrap().texttype, 1);
    }

    #[test]
    fn parse_chip_with_cache_and_shrink() {
        let toml = r#"
top_cell = "STACK"
top_netlist = "stack.cdl"
units = "nm"
tolerance = 100.0

[[chip]]
instance = "X2"
netlist = "chip2.cdl"
subckt = "CHIP2_TOP"
layout = "chip2.gds"
top_structure = "CHIP2"
orientation = "MX"
offset = { x = 10.0, y = -20.0 }
shrink = 0.99
port_cache = "chip2.ports"

[[chip.port]]
layer = 81
datatype = 0
type = "TSV"
structures = ["TSV_CELL"]
"#;
        let config: StackConfig = toml::from_str(toml).unwrap();
        let chip = &config.chips[0];
        assert_eq!(chip.subckt.as_deref(), Some("CHIP2_TOP"));
        assert_eq!(chip.shrink, 0.99);
        assert!(chip.port_cache.is_some());
        // No text table: label not required.
        assert!(chip.ports[0].text.is_none());
    }
}
