//! Package graph - vertex/edge schema and graph store backends
//!
//! The remote schema has five vertex types and four edge types, all edges
//! leaving a `Package` vertex:
//! - `curr_status`: Package → Dev_Status
//! - `has_license`: Package → License
//! - `used_language`: Package → Programming_Lang
//! - `has_dependency`: Package → Dependency_Package

pub mod batch;
pub mod loader;
pub mod memory;
pub mod store;
pub mod tigergraph;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use batch::{GraphBatch, GraphEdge, Vertex};
pub use loader::{GraphLoader, LoadOptions, LoadOutcome, ReplaceScope, DEFAULT_QUERY};
pub use memory::MemoryGraph;
pub use store::{AttributeFilter, GraphStore};
pub use tigergraph::TigerGraphClient;

/// Vertex types managed by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VertexType {
    Package,
    ProgrammingLang,
    License,
    DependencyPackage,
    DevStatus,
}

impl VertexType {
    /// Name of the vertex type in the remote schema
    pub fn as_str(&self) -> &'static str {
        match self {
            VertexType::Package => "Package",
            VertexType::ProgrammingLang => "Programming_Lang",
            VertexType::License => "License",
            VertexType::DependencyPackage => "Dependency_Package",
            VertexType::DevStatus => "Dev_Status",
        }
    }

    pub fn all() -> &'static [VertexType] {
        &[
            VertexType::Package,
            VertexType::ProgrammingLang,
            VertexType::License,
            VertexType::DependencyPackage,
            VertexType::DevStatus,
        ]
    }
}

impl FromStr for VertexType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VertexType::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| crate::Error::Graph(format!("Unknown vertex type: {}", s)))
    }
}

impl std::fmt::Display for VertexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Edge types, each from `Package` to one value vertex type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeType {
    CurrStatus,
    HasLicense,
    UsedLanguage,
    HasDependency,
}

impl EdgeType {
    /// Edge label in the remote schema
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::CurrStatus => "curr_status",
            EdgeType::HasLicense => "has_license",
            EdgeType::UsedLanguage => "used_language",
            EdgeType::HasDependency => "has_dependency",
        }
    }

    pub fn source(&self) -> VertexType {
        VertexType::Package
    }

    pub fn target(&self) -> VertexType {
        match self {
            EdgeType::CurrStatus => VertexType::DevStatus,
            EdgeType::HasLicense => VertexType::License,
            EdgeType::UsedLanguage => VertexType::ProgrammingLang,
            EdgeType::HasDependency => VertexType::DependencyPackage,
        }
    }

    /// All edge types in upsert order
    pub fn all() -> &'static [EdgeType] {
        &[
            EdgeType::CurrStatus,
            EdgeType::HasLicense,
            EdgeType::UsedLanguage,
            EdgeType::HasDependency,
        ]
    }
}

impl FromStr for EdgeType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeType::all()
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| crate::Error::Graph(format!("Unknown edge type: {}", s)))
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
