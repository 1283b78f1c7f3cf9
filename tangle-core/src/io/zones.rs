//! Snowball zone-file reading.
//!
//! One non-negative wave index per line, no header, one line per node in
//! node order. Waves must be contiguous from zero: a populated wave z
//! with an empty wave below it means the file does not describe a
//! snowball sample.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::GraphError;

/// Reads and validates a zone file.
///
/// # Errors
/// Returns [`GraphError`] on I/O failure, non-integer lines, or a
/// non-contiguous wave structure.
pub fn read_zones(path: &Path) -> Result<Vec<u32>, GraphError> {
    let file = File::open(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut zones = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let zone: u32 = token.parse().map_err(|_| GraphError::Malformed {
            path: path.to_path_buf(),
            line: line_no,
            reason: format!("expected a non-negative wave index, found `{token}`"),
        })?;
        zones.push(zone);
    }

    let max_zone = zones.iter().copied().max().unwrap_or(0);
    for wave in 0..=max_zone {
        if !zones.contains(&wave) {
            return Err(GraphError::NonContiguousZones {
                path: path.to_path_buf(),
                zone: max_zone,
                missing: wave,
            });
        }
    }
    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphErrorCode;

    use std::fs;

    use tempfile::TempDir;

    fn read(contents: &str) -> Result<Vec<u32>, GraphError> {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("temp dir failed: {err}"));
        let path = dir.path().join("zones.txt");
        fs::write(&path, contents).unwrap_or_else(|err| panic!("temp write failed: {err}"));
        read_zones(&path)
    }

    #[test]
    fn plain_wave_indices_parse_in_order() {
        let zones = read("0\n1\n1\n2\n").unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(zones, [0, 1, 1, 2]);
    }

    #[test]
    fn gapped_waves_are_rejected() {
        let err = read("0\n2\n2\n").expect_err("gap must fail");
        assert_eq!(err.code(), GraphErrorCode::NonContiguousZones);
    }

    #[test]
    fn non_numeric_lines_are_rejected() {
        let err = read("0\nouter\n").expect_err("text must fail");
        assert_eq!(err.code(), GraphErrorCode::Malformed);
    }
}
