use vcgraph_core::VertexId;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Edge {source_id} -> {target}: probability {probability} outside [0, 1]")]
    InvalidProbability {
        source_id: VertexId,
        target: VertexId,
        probability: f32,
    },

    #[error("Edge {source_id} -> {target}: weight {weight} must be finite and positive")]
    InvalidWeight {
        source_id: VertexId,
        target: VertexId,
        weight: f32,
    },

    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Vertex {id} not in graph ({num_vertices} vertices)")]
    UnknownVertex { id: VertexId, num_vertices: usize },

    #[error("Vertex {id} exceeds the limit of {max_vertices} vertices")]
    VertexLimit { id: VertexId, max_vertices: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
