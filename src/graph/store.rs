//! The [`GraphStore`] trait - the storage contract for package graphs
//!
//! Synchronous: every call blocks until the
//! backend has applied it. Implemented by [`super::TigerGraphClient`] for the
//! hosted database and [`super::MemoryGraph`] for dry runs and tests.

use serde_json::Value;

use super::{EdgeType, GraphEdge, Vertex, VertexType};
use crate::Result;

/// Equality filter on a vertex attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    pub attribute: String,
    pub value: String,
}

impl AttributeFilter {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

pub trait GraphStore {
    /// Delete vertices of a type (and their edges). `None` deletes all of them.
    /// Returns the number of deleted vertices.
    fn delete_vertices(
        &mut self,
        vertex_type: VertexType,
        filter: Option<&AttributeFilter>,
    ) -> Result<usize>;

    /// Insert or update vertices. Returns the number accepted.
    fn upsert_vertices(&mut self, vertex_type: VertexType, vertices: &[Vertex]) -> Result<usize>;

    /// Insert or update edges, creating missing endpoint vertices.
    /// Returns the number accepted.
    fn upsert_edges(&mut self, edge_type: EdgeType, edges: &[GraphEdge]) -> Result<usize>;

    /// Run a pre-installed query by name and return its result array
    fn run_installed_query(&mut self, name: &str, params: &[(String, String)]) -> Result<Vec<Value>>;
}
