use std::io::BufRead;
use std::path::Path;

use tracing::info;
use vcgraph_core::VertexId;

use crate::error::GraphError;
use crate::store::{GraphStore, DEFAULT_MAX_VERTICES, DEFAULT_PROBABILITY, DEFAULT_WEIGHT};

/// Load an edge list from disk.
///
/// One edge per line: `source target [probability [weight]]`, separated by
/// whitespace or commas. Lines starting with `#` or `%` are comments.
pub fn load_edge_list(path: impl AsRef<Path>) -> Result<GraphStore, GraphError> {
    load_edge_list_with_limit(path, DEFAULT_MAX_VERTICES)
}

/// Like [`load_edge_list`], rejecting vertex ids `>= max_vertices`.
pub fn load_edge_list_with_limit(
    path: impl AsRef<Path>,
    max_vertices: usize,
) -> Result<GraphStore, GraphError> {
    let path = path.as_ref();
    let start = std::time::Instant::now();
    let file = std::fs::File::open(path)?;
    let graph = parse_edge_list_with_limit(std::io::BufReader::new(file), max_vertices)?;
    info!(
        "Loaded {} ({} vertices, {} edges) in {:.2}s",
        path.display(),
        graph.num_vertices(),
        graph.num_edges(),
        start.elapsed().as_secs_f64()
    );
    Ok(graph)
}

/// Parse an edge list from any buffered reader.
pub fn parse_edge_list<R: BufRead>(reader: R) -> Result<GraphStore, GraphError> {
    parse_edge_list_with_limit(reader, DEFAULT_MAX_VERTICES)
}

pub fn parse_edge_list_with_limit<R: BufRead>(
    reader: R,
    max_vertices: usize,
) -> Result<GraphStore, GraphError> {
    let mut graph = GraphStore::new().with_max_vertices(max_vertices);

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }

        let fields: Vec<&str> = trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty())
            .collect();

        if fields.len() < 2 || fields.len() > 4 {
            return Err(GraphError::Malformed {
                line: line_no,
                reason: format!("expected 2 to 4 fields, found {}", fields.len()),
            });
        }

        let source: VertexId = parse_field(fields[0], "source", line_no)?;
        let target: VertexId = parse_field(fields[1], "target", line_no)?;
        let probability = match fields.get(2) {
            Some(raw) => parse_field(raw, "probability", line_no)?,
            None => DEFAULT_PROBABILITY,
        };
        let weight = match fields.get(3) {
            Some(raw) => parse_field(raw, "weight", line_no)?,
            None => DEFAULT_WEIGHT,
        };

        graph
            .add_edge(source, target, probability, weight)
            .map_err(|e| match e {
                GraphError::VertexLimit { id, max_vertices } => GraphError::Malformed {
                    line: line_no,
                    reason: format!("vertex {} exceeds the limit of {} vertices", id, max_vertices),
                },
                other => other,
            })?;
    }

    Ok(graph)
}

fn parse_field<T: std::str::FromStr>(raw: &str, what: &str, line: usize) -> Result<T, GraphError> {
    raw.parse().map_err(|_| GraphError::Malformed {
        line,
        reason: format!("invalid {}: {:?}", what, raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_probabilistic_edges() {
        let input = "\
# comment
1 2
2\t3 0.5
3,4,0.25,2.0

% another comment
";
        let g = parse_edge_list(input.as_bytes()).unwrap();
        assert_eq!(g.num_vertices(), 5);
        assert_eq!(g.num_edges(), 3);

        let e0 = g.edge(0);
        assert_eq!((e0.source, e0.target), (1, 2));
        assert_eq!(e0.probability, 1.0);
        assert_eq!(e0.weight, 1.0);

        assert_eq!(g.edge(1).probability, 0.5);
        assert_eq!(g.edge(2).probability, 0.25);
        assert_eq!(g.edge(2).weight, 2.0);
    }

    #[test]
    fn rejects_probability_on_load() {
        let err = parse_edge_list("0 1 1.2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidProbability { .. }));
    }

    #[test]
    fn reports_line_of_malformed_input() {
        let err = parse_edge_list("0 1\n1 x\n".as_bytes()).unwrap_err();
        match err {
            GraphError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }

        let err = parse_edge_list("0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::Malformed { line: 1, .. }));
    }

    #[test]
    fn huge_vertex_id_rejected_without_allocating() {
        let err = parse_edge_list("0 1\n0 4000000000\n".as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::Malformed { line: 2, .. }));

        let err = parse_edge_list_with_limit("0 1\n2 8\n".as_bytes(), 8).unwrap_err();
        match err {
            GraphError::Malformed { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("limit of 8"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_edge_list_with_limit("0 7\n".as_bytes(), 8).is_ok());
    }

    #[test]
    fn empty_input_is_empty_graph() {
        let g = parse_edge_list("".as_bytes()).unwrap();
        assert_eq!(g.num_vertices(), 0);
        assert_eq!(g.num_edges(), 0);
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "vcgraph-loader-{}-{}.txt",
            std::process::id(),
            line!()
        ));
        std::fs::write(&path, "0 1\n1 2 0.5\n").unwrap();
        let g = load_edge_list(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(g.num_edges(), 2);

        assert!(matches!(
            load_edge_list("/definitely/not/here.txt"),
            Err(GraphError::Io(_))
        ));
    }
}
