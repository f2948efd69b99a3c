//! Iteration driver -- runs a [`VertexProgram`](super::VertexProgram) over a graph.
//!
//! Split into focused submodules:
//! - `core`: Engine struct, constructor, and accessor methods
//! - `execution`: the iteration loop and parallel interval processing

mod core;
mod execution;

pub use self::core::Engine;
