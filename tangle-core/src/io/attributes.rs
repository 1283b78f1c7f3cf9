//! Attribute-table readers.
//!
//! Each file is whitespace-delimited with a header row naming its
//! columns and one data row per node in node order. The missing-value
//! conventions differ by type: `NA` for binary, continuous, and set
//! columns; `NA` or any negative id for categorical ones. Set cells are
//! comma-separated element ids (`0,3,5`) with `none` for the empty set.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::GraphError;
use crate::graph::{BinaryColumn, CategoricalColumn, ContinuousColumn, SetColumn};

/// Largest set element id a set column can hold.
const SET_CAPACITY: u32 = 64;

fn read_table<T>(
    path: &Path,
    mut parse: impl FnMut(&str) -> Result<T, String>,
) -> Result<Vec<(String, Vec<T>)>, GraphError> {
    let file = File::open(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut columns: Option<Vec<(String, Vec<T>)>> = None;
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let Some(columns) = columns.as_mut() else {
            columns = Some(
                tokens
                    .into_iter()
                    .map(|name| (name.to_owned(), Vec::new()))
                    .collect(),
            );
            continue;
        };

        if tokens.len() != columns.len() {
            return Err(GraphError::Malformed {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!(
                    "row has {} fields but the header names {} columns",
                    tokens.len(),
                    columns.len()
                ),
            });
        }
        for (token, (name, values)) in tokens.iter().zip(columns.iter_mut()) {
            let value = parse(token).map_err(|reason| GraphError::Malformed {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("column `{name}`: {reason}"),
            })?;
            values.push(value);
        }
    }

    columns.ok_or_else(|| GraphError::Malformed {
        path: path.to_path_buf(),
        line: 1,
        reason: "empty file, expected a header row".to_owned(),
    })
}

/// Reads a binary attribute file.
///
/// # Errors
/// Returns [`GraphError`] on I/O failure or any cell that is not `0`,
/// `1`, or `NA`.
pub fn read_binary_columns(path: &Path) -> Result<Vec<BinaryColumn>, GraphError> {
    let columns = read_table(path, |token| match token {
        "0" => Ok(Some(false)),
        "1" => Ok(Some(true)),
        "NA" => Ok(None),
        other => Err(format!("expected 0, 1, or NA, found `{other}`")),
    })?;
    Ok(columns
        .into_iter()
        .map(|(name, values)| BinaryColumn::new(name, values))
        .collect())
}

/// Reads a categorical attribute file; negative ids read as missing.
///
/// # Errors
/// Returns [`GraphError`] on I/O failure or non-integer cells.
pub fn read_categorical_columns(path: &Path) -> Result<Vec<CategoricalColumn>, GraphError> {
    let columns = read_table(path, |token| {
        if token == "NA" {
            return Ok(None);
        }
        let id: i64 = token
            .parse()
            .map_err(|_| format!("expected an integer or NA, found `{token}`"))?;
        if id < 0 {
            Ok(None)
        } else {
            u32::try_from(id)
                .map(Some)
                .map_err(|_| format!("category id `{token}` is out of range"))
        }
    })?;
    Ok(columns
        .into_iter()
        .map(|(name, values)| CategoricalColumn::new(name, values))
        .collect())
}

/// Reads a continuous attribute file; `NA` reads as NaN.
///
/// # Errors
/// Returns [`GraphError`] on I/O failure or non-numeric cells.
pub fn read_continuous_columns(path: &Path) -> Result<Vec<ContinuousColumn>, GraphError> {
    let columns = read_table(path, |token| {
        if token == "NA" {
            return Ok(f64::NAN);
        }
        token
            .parse()
            .map_err(|_| format!("expected a number or NA, found `{token}`"))
    })?;
    Ok(columns
        .into_iter()
        .map(|(name, values)| ContinuousColumn::new(name, values))
        .collect())
}

/// Reads a set attribute file into bitsets.
///
/// # Errors
/// Returns [`GraphError`] on I/O failure, malformed element lists, or
/// element ids at or above the bitset capacity.
pub fn read_set_columns(path: &Path) -> Result<Vec<SetColumn>, GraphError> {
    let columns = read_table(path, |token| {
        if token == "NA" {
            return Ok(None);
        }
        if token.eq_ignore_ascii_case("none") {
            return Ok(Some(0));
        }
        let mut bits = 0u64;
        for element in token.split(',') {
            let id: u32 = element
                .parse()
                .map_err(|_| format!("invalid set element `{element}`"))?;
            if id >= SET_CAPACITY {
                return Err(format!("set element {id} exceeds capacity {SET_CAPACITY}"));
            }
            bits |= 1 << id;
        }
        Ok(Some(bits))
    })?;
    Ok(columns
        .into_iter()
        .map(|(name, values)| SetColumn::new(name, values))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphErrorCode;

    use std::fs;

    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap_or_else(|err| panic!("temp write failed: {err}"));
        path
    }

    fn temp_dir() -> TempDir {
        TempDir::new().unwrap_or_else(|err| panic!("temp dir failed: {err}"))
    }

    #[test]
    fn binary_columns_carry_names_and_missing_cells() {
        let dir = temp_dir();
        let path = write_file(&dir, "bin.txt", "smoker employed\n1 0\nNA 1\n0 0\n");
        let columns = read_binary_columns(&path).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name(), "smoker");
        assert_eq!(columns[0].get(0), Some(true));
        assert_eq!(columns[0].get(1), None);
        assert_eq!(columns[1].get(2), Some(false));
    }

    #[test]
    fn categorical_negatives_read_as_missing() {
        let dir = temp_dir();
        let path = write_file(&dir, "cat.txt", "region\n2\n-1\nNA\n0\n");
        let columns = read_categorical_columns(&path).unwrap_or_else(|err| panic!("parse: {err}"));
        let region = &columns[0];
        assert_eq!(region.get(0), Some(2));
        assert_eq!(region.get(1), None);
        assert_eq!(region.get(2), None);
        assert_eq!(region.get(3), Some(0));
    }

    #[test]
    fn continuous_na_reads_as_nan() {
        let dir = temp_dir();
        let path = write_file(&dir, "cont.txt", "age income\n31.5 1e4\nNA -2.5\n");
        let columns = read_continuous_columns(&path).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(columns[0].get(0), 31.5);
        assert!(columns[0].get(1).is_nan());
        assert_eq!(columns[1].get(1), -2.5);
    }

    #[test]
    fn set_cells_parse_into_bitsets() {
        let dir = temp_dir();
        let path = write_file(&dir, "set.txt", "skills\n0,2,5\nnone\nNA\n");
        let columns = read_set_columns(&path).unwrap_or_else(|err| panic!("parse: {err}"));
        let skills = &columns[0];
        assert_eq!(skills.get(0), Some(0b100101));
        assert_eq!(skills.get(1), Some(0));
        assert_eq!(skills.get(2), None);
    }

    #[test]
    fn ragged_rows_are_rejected_with_the_line() {
        let dir = temp_dir();
        let path = write_file(&dir, "bin.txt", "a b\n1 0\n1\n");
        let err = read_binary_columns(&path).expect_err("ragged row must fail");
        assert_eq!(err.code(), GraphErrorCode::Malformed);
        assert!(matches!(err, GraphError::Malformed { line: 3, .. }));
    }

    #[test]
    fn out_of_range_set_elements_are_rejected() {
        let dir = temp_dir();
        let path = write_file(&dir, "set.txt", "s\n64\n");
        let err = read_set_columns(&path).expect_err("large element must fail");
        assert_eq!(err.code(), GraphErrorCode::Malformed);
    }
}
