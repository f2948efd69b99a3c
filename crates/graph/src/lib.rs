//! vcgraph-graph: in-memory directed topology for the vertex-centric engine.
//!
//! Vertices are dense ids `0..num_vertices`. Each edge carries its immutable
//! sampling parameters (existence probability and weight); algorithm state
//! for vertices and edges lives in the compute engine, not here.

pub mod error;
pub mod loader;
pub mod store;

pub use error::GraphError;
pub use loader::{
    load_edge_list, load_edge_list_with_limit, parse_edge_list, parse_edge_list_with_limit,
};
pub use store::{
    EdgeRecord, GraphStats, GraphStore, DEFAULT_MAX_VERTICES, DEFAULT_PROBABILITY, DEFAULT_WEIGHT,
};
