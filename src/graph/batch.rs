//! Upsert batches
//!
//! A batch holds the Package vertices of one run and the four edge batches
//! leaving them. Package vertices are keyed by package name and carry the
//! run tag in `search_meta`. Value vertices (licenses, languages, ...) are
//! keyed by their value and shared.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{EdgeType, VertexType};
use crate::context::SearchContext;
use crate::record::PackageRecord;
use crate::store::{BasicRow, StagedTables};

/// Attribute name holding the run tag on Package vertices
pub const SEARCH_META: &str = "search_meta";

/// A vertex with string attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: String,
    pub attributes: BTreeMap<String, String>,
}

impl Vertex {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// An attribute-less edge between two vertex ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from_id: String,
    pub to_id: String,
}

impl GraphEdge {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
        }
    }
}

/// Vertex and edge batches for one run
#[derive(Debug, Clone, Default)]
pub struct GraphBatch {
    pub search_meta: String,
    pub packages: Vec<Vertex>,
    pub edges: BTreeMap<EdgeType, Vec<GraphEdge>>,
}

impl GraphBatch {
    pub fn new(context: &SearchContext) -> Self {
        let mut edges = BTreeMap::new();
        for kind in EdgeType::all() {
            edges.insert(*kind, Vec::new());
        }
        Self {
            search_meta: context.dir_name(),
            packages: Vec::new(),
            edges,
        }
    }

    /// Build directly from in-memory records
    pub fn from_records(context: &SearchContext, records: &[PackageRecord]) -> Self {
        let mut batch = Self::new(context);
        for record in records {
            batch.add_package(&BasicRow::from(record));
            for language in &record.languages {
                batch.add_edge(EdgeType::UsedLanguage, &record.name, language);
            }
            for dependency in &record.dependencies {
                batch.add_edge(EdgeType::HasDependency, &record.name, dependency);
            }
        }
        batch
    }

    /// Build from the staged CSV tables of a context
    pub fn from_tables(context: &SearchContext, tables: &StagedTables) -> Self {
        let mut batch = Self::new(context);
        for row in &tables.basic {
            batch.add_package(row);
        }
        for row in &tables.languages {
            batch.add_edge(EdgeType::UsedLanguage, &row.package_name, &row.language);
        }
        for row in &tables.dependencies {
            batch.add_edge(EdgeType::HasDependency, &row.package_name, &row.dependency_pkg);
        }
        batch
    }

    fn add_package(&mut self, row: &BasicRow) {
        let vertex = Vertex::new(row.package_name.as_str())
            .with("author", row.package_author.as_str())
            .with("author_email", row.package_author_email.as_str())
            .with("dev_status", row.package_dev_status.as_str())
            .with(SEARCH_META, self.search_meta.as_str());
        self.packages.push(vertex);

        self.add_edge(EdgeType::CurrStatus, &row.package_name, &row.package_dev_status);
        self.add_edge(EdgeType::HasLicense, &row.package_name, &row.package_license);
    }

    /// Empty target values (no license, no status) produce no edge
    fn add_edge(&mut self, kind: EdgeType, package: &str, target: &str) {
        if target.is_empty() {
            return;
        }
        let edge = GraphEdge::new(package, target);
        self.edges.entry(kind).or_default().push(edge);
    }

    pub fn edges_of(&self, kind: EdgeType) -> &[GraphEdge] {
        self.edges.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn total_edges(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Distinct target values per value vertex type
    pub fn value_vertex_count(&self, vertex_type: VertexType) -> usize {
        let mut values: Vec<&str> = EdgeType::all()
            .iter()
            .filter(|kind| kind.target() == vertex_type)
            .flat_map(|kind| self.edges_of(*kind))
            .map(|edge| edge.to_id.as_str())
            .collect();
        values.sort_unstable();
        values.dedup();
        values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DependencyEdge, LanguageEdge};

    fn record(name: &str, license: &str, status: &str, langs: &[&str], deps: &[&str]) -> PackageRecord {
        let mut r = PackageRecord::new(name);
        r.author = format!("{name} author");
        r.license = license.to_string();
        r.dev_status = status.to_string();
        r.languages = langs.iter().map(|s| s.to_string()).collect();
        r.dependencies = deps.iter().map(|s| s.to_string()).collect();
        r
    }

    #[test]
    fn test_from_records() {
        let ctx = SearchContext::from_phrase("the web framework");
        let records = vec![
            record("flask", "BSD", "5 - Production/Stable", &["Python"], &["Werkzeug", "Jinja2"]),
            record("bottle", "", "", &["Python"], &[]),
        ];

        let batch = GraphBatch::from_records(&ctx, &records);

        assert_eq!(batch.search_meta, "web_framework");
        assert_eq!(batch.packages.len(), 2);
        let flask = &batch.packages[0];
        assert_eq!(flask.id, "flask");
        assert_eq!(flask.attribute("name"), None);
        assert_eq!(flask.attribute("author"), Some("flask author"));
        assert_eq!(flask.attribute(SEARCH_META), Some("web_framework"));

        assert_eq!(batch.edges_of(EdgeType::CurrStatus).len(), 1);
        assert_eq!(batch.edges_of(EdgeType::HasLicense).len(), 1);
        assert_eq!(batch.edges_of(EdgeType::UsedLanguage).len(), 2);
        assert_eq!(batch.edges_of(EdgeType::HasDependency).len(), 2);
        assert_eq!(batch.total_edges(), 6);
        assert_eq!(batch.value_vertex_count(VertexType::ProgrammingLang), 1);
    }

    #[test]
    fn test_from_tables_matches_from_records() {
        let ctx = SearchContext::from_phrase("web framework");
        let rec = record("flask", "BSD", "4 - Beta", &["Python"], &["click"]);
        let tables = StagedTables {
            basic: vec![BasicRow::from(&rec)],
            dependencies: DependencyEdge::for_record(&rec),
            languages: LanguageEdge::for_record(&rec),
        };

        let from_tables = GraphBatch::from_tables(&ctx, &tables);
        let from_records = GraphBatch::from_records(&ctx, &[rec]);

        assert_eq!(from_tables.packages, from_records.packages);
        for kind in EdgeType::all() {
            assert_eq!(from_tables.edges_of(*kind), from_records.edges_of(*kind));
        }
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let ctx = SearchContext::from_phrase("http");
        let rec = record("requests", "Apache 2.0", "", &[], &[]);
        let batch = GraphBatch::from_records(&ctx, &[rec.clone(), rec]);

        assert_eq!(batch.packages.len(), 2);
        assert_eq!(batch.edges_of(EdgeType::HasLicense).len(), 2);
        assert_eq!(batch.value_vertex_count(VertexType::License), 1);
    }
}
