//! Pajek arc-list reading and writing.
//!
//! The accepted subset is `*Vertices N`, optional vertex-label lines,
//! `*Arcs`, then one `i j` pair per line, all 1-based. Tokens after the
//! first two on an arc line (weights) are ignored. Section markers match
//! case-insensitively.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::GraphError;
use crate::graph::Digraph;

/// Reads a directed graph from a Pajek arc-list file.
///
/// # Errors
/// Returns [`GraphError`] on I/O failures, malformed headers, vertex ids
/// outside `1..=n`, self-loops, or duplicate arcs.
pub fn read_pajek(path: &Path) -> Result<Digraph, GraphError> {
    let file = File::open(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut graph: Option<Digraph> = None;
    let mut in_arcs = false;
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(g) = graph.as_mut() else {
            graph = Some(parse_vertices_header(path, line_no, trimmed)?);
            continue;
        };

        if trimmed.starts_with('*') {
            if trimmed.to_ascii_lowercase().starts_with("*arcs") {
                in_arcs = true;
                continue;
            }
            return Err(GraphError::Malformed {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("unsupported section `{trimmed}`"),
            });
        }
        if !in_arcs {
            // Vertex label definitions between the header and *Arcs.
            continue;
        }
        parse_arc_line(path, line_no, trimmed, g)?;
    }

    graph.ok_or_else(|| GraphError::Malformed {
        path: path.to_path_buf(),
        line: 1,
        reason: "empty file, expected `*Vertices N`".to_owned(),
    })
}

fn parse_vertices_header(path: &Path, line_no: usize, line: &str) -> Result<Digraph, GraphError> {
    let malformed = |reason: String| GraphError::Malformed {
        path: path.to_path_buf(),
        line: line_no,
        reason,
    };
    let mut tokens = line.split_whitespace();
    let marker = tokens.next().unwrap_or_default();
    if !marker.eq_ignore_ascii_case("*vertices") {
        return Err(malformed(format!("expected `*Vertices N`, found `{line}`")));
    }
    let count = tokens
        .next()
        .ok_or_else(|| malformed("missing vertex count".to_owned()))?;
    let n: u32 = count
        .parse()
        .map_err(|_| malformed(format!("invalid vertex count `{count}`")))?;
    Ok(Digraph::new(n))
}

fn parse_arc_line(
    path: &Path,
    line_no: usize,
    line: &str,
    g: &mut Digraph,
) -> Result<(), GraphError> {
    let mut tokens = line.split_whitespace();
    let mut endpoint = |label: &str| -> Result<i64, GraphError> {
        let token = tokens.next().ok_or_else(|| GraphError::Malformed {
            path: path.to_path_buf(),
            line: line_no,
            reason: format!("missing {label} vertex"),
        })?;
        token.parse().map_err(|_| GraphError::Malformed {
            path: path.to_path_buf(),
            line: line_no,
            reason: format!("invalid vertex id `{token}`"),
        })
    };
    let from = endpoint("source")?;
    let to = endpoint("target")?;
    for id in [from, to] {
        if id < 1 || id > i64::from(g.n()) {
            return Err(GraphError::VertexOutOfRange {
                path: path.to_path_buf(),
                line: line_no,
                vertex: id,
                n: g.n(),
            });
        }
    }
    if from == to {
        return Err(GraphError::SelfLoop {
            path: path.to_path_buf(),
            line: line_no,
            vertex: from as u32,
        });
    }
    let (i, j) = (from as u32 - 1, to as u32 - 1);
    if g.is_arc(i, j) {
        return Err(GraphError::DuplicateArc {
            path: path.to_path_buf(),
            line: line_no,
            from: from as u32,
            to: to as u32,
        });
    }
    g.insert_arc(i, j);
    Ok(())
}

/// Writes a graph as a Pajek arc list, arcs in sorted order so repeated
/// runs of the same task produce identical files.
///
/// # Errors
/// Returns [`GraphError::Io`] on any write failure.
pub fn write_pajek(g: &Digraph, path: &Path) -> Result<(), GraphError> {
    let io_err = |source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let mut arcs = g.arcs().to_vec();
    arcs.sort_unstable();
    writeln!(writer, "*Vertices {}", g.n()).map_err(io_err)?;
    writeln!(writer, "*Arcs").map_err(io_err)?;
    for (i, j) in arcs {
        writeln!(writer, "{} {}", i + 1, j + 1).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}
