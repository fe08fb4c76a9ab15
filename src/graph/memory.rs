//! In-memory package graph
//!
//! Mirrors the remote store's upsert/delete semantics without a network:
//! upserting an existing vertex id merges attributes, edges create missing
//! endpoints, deleting a vertex drops its edges. Installed queries are either
//! canned result arrays or the built-in graph summary.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{json, Value};

use super::batch::SEARCH_META;
use super::store::{AttributeFilter, GraphStore};
use super::{EdgeType, GraphEdge, Vertex, VertexType};
use crate::{Error, Result};

type VertexKey = (VertexType, String);

#[derive(Debug, Clone)]
enum InstalledQuery {
    Canned(Vec<Value>),
    Summary,
}

/// In-memory graph store for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    /// Vertex attributes by type and id
    vertices: HashMap<VertexType, HashMap<String, BTreeMap<String, String>>>,
    /// Outgoing edges per source vertex
    edges_from: HashMap<VertexKey, HashSet<(EdgeType, String)>>,
    /// Installed queries by name
    queries: HashMap<String, InstalledQuery>,
    /// Log of calls, in order, for inspection
    calls: Vec<String>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a query that returns fixed results
    pub fn install_query(&mut self, name: &str, results: Vec<Value>) {
        self.queries.insert(name.to_string(), InstalledQuery::Canned(results));
    }

    /// Install a query that returns one element summarizing the graph
    pub fn install_summary_query(&mut self, name: &str) {
        self.queries.insert(name.to_string(), InstalledQuery::Summary);
    }

    pub fn get_vertex(&self, vertex_type: VertexType, id: &str) -> Option<&BTreeMap<String, String>> {
        self.vertices.get(&vertex_type).and_then(|m| m.get(id))
    }

    pub fn vertex_count(&self, vertex_type: VertexType) -> usize {
        self.vertices.get(&vertex_type).map(HashMap::len).unwrap_or(0)
    }

    /// Targets of outgoing edges of a kind from a Package vertex
    pub fn targets(&self, package_id: &str, edge_type: EdgeType) -> Vec<&str> {
        let key = (VertexType::Package, package_id.to_string());
        let mut targets: Vec<&str> = self
            .edges_from
            .get(&key)
            .map(|edges| {
                edges
                    .iter()
                    .filter(|(kind, _)| *kind == edge_type)
                    .map(|(_, to)| to.as_str())
                    .collect()
            })
            .unwrap_or_default();
        targets.sort_unstable();
        targets
    }

    pub fn edge_count(&self, edge_type: EdgeType) -> usize {
        self.edges_from
            .values()
            .flat_map(|edges| edges.iter())
            .filter(|(kind, _)| *kind == edge_type)
            .count()
    }

    /// Calls received so far, e.g. `upsert_edges:has_license`
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Vertex and edge counts per type. With a run tag, only Package vertices
    /// carrying that `search_meta` and the edges leaving them are counted.
    pub fn summary(&self, search_meta: Option<&str>) -> Value {
        let scoped: Vec<(EdgeType, &str)> = self
            .edges_from
            .iter()
            .filter(|((_, from), _)| self.in_scope(from, search_meta))
            .flat_map(|(_, edges)| edges.iter().map(|(kind, to)| (*kind, to.as_str())))
            .collect();

        let vertices: serde_json::Map<String, Value> = VertexType::all()
            .iter()
            .map(|vt| {
                let count = match (vt, search_meta) {
                    (_, None) => self.vertex_count(*vt),
                    (VertexType::Package, Some(_)) => self
                        .vertices
                        .get(vt)
                        .map(|of_type| of_type.keys().filter(|id| self.in_scope(id, search_meta)).count())
                        .unwrap_or(0),
                    (_, Some(_)) => scoped
                        .iter()
                        .filter(|(kind, _)| kind.target() == *vt)
                        .map(|(_, to)| *to)
                        .collect::<HashSet<_>>()
                        .len(),
                };
                (vt.as_str().to_string(), json!(count))
            })
            .collect();
        let edges: serde_json::Map<String, Value> = EdgeType::all()
            .iter()
            .map(|et| {
                let count = scoped.iter().filter(|(kind, _)| kind == et).count();
                (et.as_str().to_string(), json!(count))
            })
            .collect();
        json!({ "vertices": vertices, "edges": edges })
    }

    fn in_scope(&self, package_id: &str, search_meta: Option<&str>) -> bool {
        let Some(tag) = search_meta else {
            return true;
        };
        self.get_vertex(VertexType::Package, package_id)
            .and_then(|attrs| attrs.get(SEARCH_META))
            .is_some_and(|value| value == tag)
    }

    fn ensure_vertex(&mut self, vertex_type: VertexType, id: &str) {
        self.vertices
            .entry(vertex_type)
            .or_default()
            .entry(id.to_string())
            .or_default();
    }
}

impl GraphStore for MemoryGraph {
    fn delete_vertices(
        &mut self,
        vertex_type: VertexType,
        filter: Option<&AttributeFilter>,
    ) -> Result<usize> {
        self.calls.push(format!("delete_vertices:{}", vertex_type));
        let Some(of_type) = self.vertices.get_mut(&vertex_type) else {
            return Ok(0);
        };

        let doomed: Vec<String> = of_type
            .iter()
            .filter(|(_, attrs)| match filter {
                Some(f) => attrs.get(&f.attribute) == Some(&f.value),
                None => true,
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &doomed {
            of_type.remove(id);
            self.edges_from.remove(&(vertex_type, id.clone()));
        }
        // Incoming edges to deleted value vertices
        let removed: HashSet<&String> = doomed.iter().collect();
        for edges in self.edges_from.values_mut() {
            edges.retain(|(kind, to)| !(kind.target() == vertex_type && removed.contains(to)));
        }

        Ok(doomed.len())
    }

    fn upsert_vertices(&mut self, vertex_type: VertexType, vertices: &[Vertex]) -> Result<usize> {
        self.calls.push(format!("upsert_vertices:{}", vertex_type));
        let of_type = self.vertices.entry(vertex_type).or_default();
        for vertex in vertices {
            let attrs = of_type.entry(vertex.id.clone()).or_default();
            attrs.extend(vertex.attributes.clone());
        }
        Ok(vertices.len())
    }

    fn upsert_edges(&mut self, edge_type: EdgeType, edges: &[GraphEdge]) -> Result<usize> {
        self.calls.push(format!("upsert_edges:{}", edge_type));
        for edge in edges {
            self.ensure_vertex(edge_type.source(), &edge.from_id);
            self.ensure_vertex(edge_type.target(), &edge.to_id);
            self.edges_from
                .entry((edge_type.source(), edge.from_id.clone()))
                .or_default()
                .insert((edge_type, edge.to_id.clone()));
        }
        Ok(edges.len())
    }

    fn run_installed_query(&mut self, name: &str, params: &[(String, String)]) -> Result<Vec<Value>> {
        self.calls.push(format!("run_installed_query:{}", name));
        let search_meta = params
            .iter()
            .find(|(key, _)| key.as_str() == SEARCH_META)
            .map(|(_, value)| value.as_str());
        match self.queries.get(name) {
            Some(InstalledQuery::Canned(results)) => Ok(results.clone()),
            Some(InstalledQuery::Summary) => Ok(vec![self.summary(search_meta)]),
            None => Err(Error::Graph(format!("query '{}' is not installed", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(id: &str, tag: &str) -> Vertex {
        Vertex::new(id).with("search_meta", tag)
    }

    #[test]
    fn test_upsert_merges_attributes() {
        let mut graph = MemoryGraph::new();
        graph
            .upsert_vertices(VertexType::Package, &[package("flask", "a")])
            .unwrap();
        graph
            .upsert_vertices(VertexType::Package, &[Vertex::new("flask").with("author", "armin")])
            .unwrap();

        let attrs = graph.get_vertex(VertexType::Package, "flask").unwrap();
        assert_eq!(attrs.get("search_meta").map(String::as_str), Some("a"));
        assert_eq!(attrs.get("author").map(String::as_str), Some("armin"));
        assert_eq!(graph.vertex_count(VertexType::Package), 1);
    }

    #[test]
    fn test_edges_create_endpoints() {
        let mut graph = MemoryGraph::new();
        graph
            .upsert_edges(EdgeType::HasLicense, &[GraphEdge::new("flask", "BSD")])
            .unwrap();

        assert!(graph.get_vertex(VertexType::Package, "flask").is_some());
        assert!(graph.get_vertex(VertexType::License, "BSD").is_some());
        assert_eq!(graph.targets("flask", EdgeType::HasLicense), vec!["BSD"]);
    }

    #[test]
    fn test_filtered_delete_keeps_other_runs() {
        let mut graph = MemoryGraph::new();
        graph
            .upsert_vertices(VertexType::Package, &[package("flask", "a"), package("django", "b")])
            .unwrap();
        graph
            .upsert_edges(
                EdgeType::HasLicense,
                &[GraphEdge::new("flask", "BSD"), GraphEdge::new("django", "BSD")],
            )
            .unwrap();

        let filter = AttributeFilter::new("search_meta", "a");
        let deleted = graph.delete_vertices(VertexType::Package, Some(&filter)).unwrap();

        assert_eq!(deleted, 1);
        assert!(graph.get_vertex(VertexType::Package, "flask").is_none());
        assert_eq!(graph.targets("django", EdgeType::HasLicense), vec!["BSD"]);
        assert_eq!(graph.edge_count(EdgeType::HasLicense), 1);
    }

    #[test]
    fn test_unfiltered_delete_drops_incoming_edges() {
        let mut graph = MemoryGraph::new();
        graph
            .upsert_edges(EdgeType::HasLicense, &[GraphEdge::new("flask", "BSD")])
            .unwrap();

        graph.delete_vertices(VertexType::License, None).unwrap();

        assert_eq!(graph.vertex_count(VertexType::License), 0);
        assert_eq!(graph.edge_count(EdgeType::HasLicense), 0);
    }

    #[test]
    fn test_queries() {
        let mut graph = MemoryGraph::new();
        graph.install_query("Stable_packages", vec![json!({"stable": ["flask"]})]);
        graph.install_summary_query("Summary");
        graph
            .upsert_edges(EdgeType::UsedLanguage, &[GraphEdge::new("flask", "Python")])
            .unwrap();

        let canned = graph.run_installed_query("Stable_packages", &[]).unwrap();
        assert_eq!(canned, vec![json!({"stable": ["flask"]})]);

        let summary = graph.run_installed_query("Summary", &[]).unwrap();
        assert_eq!(summary[0]["vertices"]["Programming_Lang"], json!(1));
        assert_eq!(summary[0]["edges"]["used_language"], json!(1));

        assert!(matches!(
            graph.run_installed_query("Missing", &[]),
            Err(Error::Graph(_))
        ));
    }

    #[test]
    fn test_summary_scoped_by_run_tag() {
        let mut graph = MemoryGraph::new();
        graph.install_summary_query("Summary");
        graph
            .upsert_vertices(VertexType::Package, &[package("flask", "web"), package("requests", "http")])
            .unwrap();
        graph
            .upsert_edges(
                EdgeType::HasLicense,
                &[GraphEdge::new("flask", "BSD"), GraphEdge::new("requests", "Apache 2.0")],
            )
            .unwrap();

        let params = vec![(SEARCH_META.to_string(), "web".to_string())];
        let scoped = graph.run_installed_query("Summary", &params).unwrap();
        assert_eq!(scoped[0]["vertices"]["Package"], json!(1));
        assert_eq!(scoped[0]["vertices"]["License"], json!(1));
        assert_eq!(scoped[0]["edges"]["has_license"], json!(1));

        let whole = graph.run_installed_query("Summary", &[]).unwrap();
        assert_eq!(whole[0]["vertices"]["Package"], json!(2));
    }
}
