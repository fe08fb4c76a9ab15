//! # pypi-recom - Package relationship graph builder
//!
//! Searches the PyPI web index for a phrase, scrapes metadata for every
//! package on the first few result pages, stages it as flat CSV tables and
//! loads it into a TigerGraph dataset for relationship queries.
//!
//! pypi-recom provides:
//! - Stopword-free search contexts used as run identifiers
//! - Listing scraping and per-package metadata extraction
//! - CSV staging per search context with a global run index
//! - Vertex/edge batch construction and upsert into a graph store
//! - Cached snapshots of the aggregate graph query

pub mod config;
pub mod context;
pub mod graph;
pub mod pipeline;
pub mod record;
pub mod source;
pub mod store;
pub mod ui;

// Re-exports for convenient access
pub use context::SearchContext;
pub use graph::{GraphBatch, GraphLoader, GraphStore, MemoryGraph, TigerGraphClient};
pub use pipeline::{Pipeline, RunReport};
pub use record::PackageRecord;
pub use source::{PackageSource, PypiClient};
pub use store::LocalStore;

/// Result type alias for pypi-recom operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pypi-recom operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Listing parse error: {0}")]
    Listing(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Graph store error: {0}")]
    Graph(String),

    #[error("No graph snapshot for '{0}'")]
    SnapshotMissing(String),
}
