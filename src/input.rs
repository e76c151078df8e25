// SPDX-License-Identifier: MIT

//! Gzip-transparent input reading.
//!
//! Netlist and layout files may be stored compressed; a `.gz` extension
//! selects on-the-fly decompression, anything else is read directly.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::{Error, Result};

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        file: path.to_path_buf(),
        source,
    }
}

/// Read a text file, decompressing when the path ends in `.gz`.
pub fn read_text(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut content = String::new();
    if is_gzip(path) {
        GzDecoder::new(file)
            .read_to_string(&mut content)
            .map_err(io_error(path))?;
    } else {
        let mut file = file;
        file.read_to_string(&mut content).map_err(io_error(path))?;
    }
    Ok(content)
}

/// Read a binary file, decompressing when the path ends in `.gz`.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut content = Vec::new();
    if is_gzip(path) {
        GzDecoder::new(file)
            .read_to_end(&mut content)
            .map_err(io_error(path))?;
    } else {
        let mut file = file;
        file.read_to_end(&mut content).map_err(io_error(path))?;
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("stackcheck_{}_{}", std::process::id(), name))
    }

    #[test]
    fn plain_files_read_directly() {
        let path = temp_path("plain.cdl");
        std::fs::write(&path, ".SUBCKT TOP A\n.ENDS\n").unwrap();
        let content = read_text(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(content, ".SUBCKT TOP A\n.ENDS\n");
    }

    #[test]
    fn gz_extension_selects_decompression() {
        let path = temp_path("packed.cdl.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b".SUBCKT TOP A B\nXI A B SUB\n.ENDS\n").unwrap();
        encoder.finish().unwrap();
        let content = read_text(&path).unwrap();
        let bytes = read_bytes(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(content, ".SUBCKT TOP A B\nXI A B SUB\n.ENDS\n");
        assert_eq!(bytes, content.as_bytes());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_text(&temp_path("missing.cdl"));
        assert!(matches!(err, Err(Error::Io { .. })));
    }
}
