//! Graph loading - replace a run's dataset and cache the aggregate query
//!
//! Order of operations:
//! 1. delete every managed vertex type (or only the Package vertices tagged
//!    with this run)
//! 2. upsert Package vertices
//! 3. upsert the four edge batches, stopping at the first failure
//! 4. run the installed query and write its first result as the snapshot.
//!    A run-scoped load always passes `search_meta` so the snapshot covers
//!    this run only.
//!
//! Nothing is rolled back: a failure after step 1 leaves the run's dataset
//! deleted in the remote store.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::batch::SEARCH_META;
use super::store::{AttributeFilter, GraphStore};
use super::{EdgeType, GraphBatch, VertexType};
use crate::context::SearchContext;
use crate::record::PackageRecord;
use crate::store::LocalStore;
use crate::{Error, Result};

/// Default pre-installed aggregate query
pub const DEFAULT_QUERY: &str = "Stable_packages";

/// Which vertices are deleted before a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplaceScope {
    /// Only Package vertices tagged with this run's context
    Run,
    /// Every vertex of the five managed types
    #[default]
    All,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub query: String,
    /// Pass `search_meta=<context>` to the installed query. Implied by
    /// [`ReplaceScope::Run`].
    pub scope_query: bool,
    pub replace: ReplaceScope,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            scope_query: false,
            replace: ReplaceScope::All,
        }
    }
}

/// Counts from a successful load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    pub deleted_vertices: usize,
    pub upserted_vertices: usize,
    pub upserted_edges: usize,
}

impl LoadOptions {
    pub fn scopes_query(&self) -> bool {
        self.scope_query || self.replace == ReplaceScope::Run
    }
}

pub struct GraphLoader<'a, G: GraphStore> {
    graph: &'a mut G,
    local: &'a LocalStore,
    options: LoadOptions,
}

impl<'a, G: GraphStore> GraphLoader<'a, G> {
    pub fn new(graph: &'a mut G, local: &'a LocalStore, options: LoadOptions) -> Self {
        Self { graph, local, options }
    }

    /// Load a run from its in-memory records
    pub fn load_records(&mut self, context: &SearchContext, records: &[PackageRecord]) -> Result<LoadOutcome> {
        let batch = GraphBatch::from_records(context, records);
        self.load_batch(context, &batch)
    }

    /// Load a run from its staged CSV tables
    pub fn load_tables(&mut self, context: &SearchContext) -> Result<LoadOutcome> {
        let tables = self.local.read_tables(context)?;
        let batch = GraphBatch::from_tables(context, &tables);
        self.load_batch(context, &batch)
    }

    pub fn load_batch(&mut self, context: &SearchContext, batch: &GraphBatch) -> Result<LoadOutcome> {
        let mut outcome = LoadOutcome {
            deleted_vertices: self.delete_existing(batch)?,
            ..Default::default()
        };

        outcome.upserted_vertices = self
            .graph
            .upsert_vertices(VertexType::Package, &batch.packages)?;
        for kind in EdgeType::all() {
            let accepted = self.graph.upsert_edges(*kind, batch.edges_of(*kind))?;
            debug!(edge = %kind, accepted, "upserted edges");
            outcome.upserted_edges += accepted;
        }
        info!(
            context = %context,
            vertices = outcome.upserted_vertices,
            edges = outcome.upserted_edges,
            "graph generated"
        );

        let params = if self.options.scopes_query() {
            vec![(SEARCH_META.to_string(), batch.search_meta.clone())]
        } else {
            Vec::new()
        };
        let results = self.graph.run_installed_query(&self.options.query, &params)?;
        let first = results.into_iter().next().ok_or_else(|| {
            Error::Graph(format!("query '{}' returned an empty result", self.options.query))
        })?;
        self.local.write_snapshot(context, &first)?;

        Ok(outcome)
    }

    fn delete_existing(&mut self, batch: &GraphBatch) -> Result<usize> {
        match self.options.replace {
            ReplaceScope::Run => {
                let filter = AttributeFilter::new(SEARCH_META, batch.search_meta.as_str());
                self.graph.delete_vertices(VertexType::Package, Some(&filter))
            }
            ReplaceScope::All => {
                let mut deleted = 0;
                for vertex_type in VertexType::all() {
                    deleted += self.graph.delete_vertices(*vertex_type, None)?;
                }
                Ok(deleted)
            }
        }
    }
}
