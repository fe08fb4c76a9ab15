//! Scrape-and-load pipeline
//!
//! `run` sequences one search context through every stage:
//! index append → listing scrape → run directory → per-package fetch and
//! append → graph load. Only a listing failure aborts the run; every other
//! failure is logged and recorded in the [`RunReport`].

use serde::Serialize;
use tracing::{error, info, warn};

use crate::context::SearchContext;
use crate::graph::{GraphLoader, GraphStore, LoadOptions, LoadOutcome};
use crate::record::PackageRecord;
use crate::source::{PackageSource, DEFAULT_PAGES};
use crate::store::LocalStore;
use crate::ui::{ProgressMessage, ProgressPhase};
use crate::Result;

/// A package that was requested but not staged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageFailure {
    pub name: String,
    pub reason: String,
}

/// Result of the graph stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GraphStatus {
    Skipped,
    Loaded(LoadOutcome),
    Failed { reason: String },
}

/// Per-run outcome of every stage
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub context: String,
    pub directory: String,
    pub requested: Vec<String>,
    pub succeeded: Vec<String>,
    pub failed: Vec<PackageFailure>,
    pub directory_error: Option<String>,
    pub graph: GraphStatus,
}

impl RunReport {
    fn new(context: &SearchContext) -> Self {
        Self {
            context: context.to_string(),
            directory: context.dir_name(),
            requested: Vec::new(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            directory_error: None,
            graph: GraphStatus::Skipped,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
            && self.directory_error.is_none()
            && matches!(self.graph, GraphStatus::Loaded(_))
    }
}

type Observer = Box<dyn Fn(&ProgressMessage)>;

pub struct Pipeline<S: PackageSource> {
    source: S,
    store: LocalStore,
    pages: u32,
    load_options: LoadOptions,
    observer: Option<Observer>,
}

impl<S: PackageSource> Pipeline<S> {
    pub fn new(source: S, store: LocalStore) -> Self {
        Self {
            source,
            store,
            pages: DEFAULT_PAGES,
            load_options: LoadOptions::default(),
            observer: None,
        }
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_load_options(mut self, options: LoadOptions) -> Self {
        self.load_options = options;
        self
    }

    /// Receive progress messages as stages advance
    pub fn with_observer(mut self, observer: impl Fn(&ProgressMessage) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    fn emit(&self, msg: ProgressMessage) {
        if let Some(observer) = &self.observer {
            observer(&msg);
        }
    }

    /// Scrape and stage a context, then load it into the graph returned by `connect`
    pub fn run<G, F>(&self, context: &SearchContext, connect: F) -> Result<RunReport>
    where
        G: GraphStore,
        F: FnOnce() -> Result<G>,
    {
        let (mut report, records) = self.stage(context)?;

        self.emit(ProgressMessage::Started { phase: ProgressPhase::Loading, total: records.len() });
        let loaded = connect().and_then(|mut graph| self.load(&mut graph, context, &records));
        report.graph = match loaded {
            Ok(outcome) => GraphStatus::Loaded(outcome),
            Err(e) => {
                error!(context = %context, error = %e, "graph generation failed");
                GraphStatus::Failed { reason: e.to_string() }
            }
        };
        self.emit(ProgressMessage::Finished { phase: ProgressPhase::Loading });

        Ok(report)
    }

    /// Everything up to the graph load. Returns the report so far and the
    /// records that were staged.
    pub fn stage(&self, context: &SearchContext) -> Result<(RunReport, Vec<PackageRecord>)> {
        let mut report = RunReport::new(context);

        if let Err(e) = self.store.append_index(context) {
            warn!(error = %e, "could not append to index");
        }

        self.emit(ProgressMessage::Started { phase: ProgressPhase::Listing, total: self.pages as usize });
        report.requested = self.source.search(context, self.pages)?;
        self.emit(ProgressMessage::Finished { phase: ProgressPhase::Listing });
        info!(context = %context, packages = report.requested.len(), "scraped listing");

        if let Err(e) = self.store.create_run_dir(context) {
            error!(dir = %context.dir_name(), error = %e, "error in creating run directory");
            report.directory_error = Some(e.to_string());
        }

        let records = self.fetch_all(context, &mut report);
        Ok((report, records))
    }

    fn fetch_all(&self, context: &SearchContext, report: &mut RunReport) -> Vec<PackageRecord> {
        let total = report.requested.len();
        self.emit(ProgressMessage::Started { phase: ProgressPhase::Fetching, total });

        let mut records = Vec::new();
        for (i, name) in report.requested.iter().enumerate() {
            let staged = self
                .source
                .package_metadata(name)
                .and_then(|record| self.store.append_record(context, &record).map(|_| record));

            match staged {
                Ok(record) => {
                    report.succeeded.push(name.clone());
                    records.push(record);
                }
                Err(e) => {
                    warn!(package = %name, error = %e, "skipping package");
                    self.emit(ProgressMessage::Skipped { item: name.clone(), reason: e.to_string() });
                    report.failed.push(PackageFailure { name: name.clone(), reason: e.to_string() });
                }
            }
            self.emit(ProgressMessage::Progress {
                phase: ProgressPhase::Fetching,
                current: i + 1,
                item: Some(name.clone()),
            });
        }

        self.emit(ProgressMessage::Finished { phase: ProgressPhase::Fetching });
        records
    }

    /// Load already-staged records into a graph store
    pub fn load<G: GraphStore>(
        &self,
        graph: &mut G,
        context: &SearchContext,
        records: &[PackageRecord],
    ) -> Result<LoadOutcome> {
        GraphLoader::new(graph, &self.store, self.load_options.clone()).load_records(context, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, DEFAULT_QUERY};
    use crate::{Error, PackageSource};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeIndex {
        listing: Vec<String>,
        metadata: HashMap<String, PackageRecord>,
        listing_fails: bool,
    }

    impl FakeIndex {
        fn with_packages(names: &[&str]) -> Self {
            let mut index = Self::default();
            for name in names {
                index.listing.push(name.to_string());
                let mut record = PackageRecord::new(*name);
                record.license = "MIT".to_string();
                record.languages.insert("Python".to_string());
                index.metadata.insert(name.to_string(), record);
            }
            index
        }
    }

    impl PackageSource for FakeIndex {
        fn search_page(&self, _context: &SearchContext, page: u32) -> Result<Vec<String>> {
            if self.listing_fails {
                return Err(Error::Listing("connection reset".to_string()));
            }
            Ok(if page == 1 { self.listing.clone() } else { Vec::new() })
        }

        fn package_metadata(&self, name: &str) -> Result<PackageRecord> {
            self.metadata
                .get(name)
                .cloned()
                .ok_or_else(|| Error::HttpStatus { url: format!("/pypi/{name}/json"), status: 404 })
        }
    }

    /// Collects formatted log output
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn connected(result: serde_json::Value) -> impl FnOnce() -> Result<MemoryGraph> {
        move || {
            let mut graph = MemoryGraph::new();
            graph.install_query(DEFAULT_QUERY, vec![result]);
            Ok(graph)
        }
    }

    #[test]
    fn test_end_to_end_run() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("library"));
        let pipeline = Pipeline::new(FakeIndex::with_packages(&["requests", "flask"]), store);
        let ctx = SearchContext::from_phrase("the data science");
        assert_eq!(ctx.as_str(), "data science");

        let snapshot = json!({"Stable": ["requests", "flask"]});
        let report = pipeline.run(&ctx, connected(snapshot.clone())).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.directory, "data_science");
        assert_eq!(report.succeeded, vec!["requests", "flask"]);
        assert!(tmp.path().join("library").join("data_science").is_dir());

        let staged = pipeline.store().read_tables(&ctx).unwrap();
        assert_eq!(staged.basic.len(), 2);
        assert_eq!(pipeline.store().list_index().unwrap(), vec!["data_science"]);
        assert_eq!(pipeline.store().read_snapshot(&ctx).unwrap(), snapshot);
    }

    #[test]
    fn test_failed_fetch_is_skipped_and_reported() {
        let tmp = TempDir::new().unwrap();
        let mut index = FakeIndex::with_packages(&["requests", "flask"]);
        index.metadata.remove("flask");
        let pipeline = Pipeline::new(index, LocalStore::new(tmp.path()));
        let ctx = SearchContext::from_phrase("http");

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let report = tracing::subscriber::with_default(subscriber, || {
            pipeline.run(&ctx, connected(json!({})))
        })
        .unwrap();

        let logged = logs.contents();
        assert!(logged.contains("WARN"));
        assert!(logged.contains("skipping package"));
        assert!(logged.contains("package=flask"));
        assert_eq!(report.succeeded, vec!["requests"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "flask");
        assert!(report.failed[0].reason.contains("404"));
        assert!(!report.is_complete());

        let staged = pipeline.store().read_tables(&ctx).unwrap();
        assert_eq!(staged.basic.len(), 1);
        assert!(staged.languages.iter().all(|row| row.package_name == "requests"));
    }

    #[test]
    fn test_listing_failure_aborts_after_index_append() {
        let tmp = TempDir::new().unwrap();
        let index = FakeIndex { listing_fails: true, ..Default::default() };
        let pipeline = Pipeline::new(index, LocalStore::new(tmp.path()));
        let ctx = SearchContext::from_phrase("broken search");

        let err = pipeline.run(&ctx, connected(json!({}))).unwrap_err();

        assert!(matches!(err, Error::Listing(_)));
        assert_eq!(pipeline.store().list_index().unwrap(), vec!["broken_search"]);
        assert!(!pipeline.store().run_dir(&ctx).exists());
    }

    #[test]
    fn test_existing_directory_is_reported_and_run_continues() {
        let tmp = TempDir::new().unwrap();
        let pipeline = Pipeline::new(FakeIndex::with_packages(&["requests"]), LocalStore::new(tmp.path()));
        let ctx = SearchContext::from_phrase("http");

        pipeline.run(&ctx, connected(json!({}))).unwrap();
        let second = pipeline.run(&ctx, connected(json!({}))).unwrap();

        assert!(second.directory_error.is_some());
        assert_eq!(second.succeeded, vec!["requests"]);
        // No dedup across runs of the same context
        assert_eq!(pipeline.store().read_tables(&ctx).unwrap().basic.len(), 2);
        assert_eq!(pipeline.store().list_index().unwrap().len(), 2);
    }

    #[test]
    fn test_connection_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let pipeline = Pipeline::new(FakeIndex::with_packages(&["requests"]), LocalStore::new(tmp.path()));
        let ctx = SearchContext::from_phrase("http");

        let report = pipeline
            .run(&ctx, || -> Result<MemoryGraph> { Err(Error::Config("graph secret is not set".to_string())) })
            .unwrap();

        assert!(matches!(report.graph, GraphStatus::Failed { ref reason } if reason.contains("secret")));
        assert_eq!(report.succeeded, vec!["requests"]);
        assert!(!pipeline.store().has_snapshot(&ctx));
    }

    #[test]
    fn test_observer_sees_every_package() {
        let tmp = TempDir::new().unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let pipeline = Pipeline::new(FakeIndex::with_packages(&["a", "b", "c"]), LocalStore::new(tmp.path()))
            .with_pages(1)
            .with_observer(move |msg| {
                if let ProgressMessage::Progress { item: Some(item), .. } = msg {
                    sink.borrow_mut().push(item.clone());
                }
            });

        pipeline.stage(&SearchContext::from_phrase("letters")).unwrap();

        assert_eq!(*seen.borrow(), vec!["a", "b", "c"]);
    }
}
