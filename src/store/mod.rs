//! Storage Layer - flat-file staging per search context
//!
//! Layout under the library root:
//! - index.csv: one row per run (header-less, append-only)
//! - <context>/Package_Basic_Data.csv
//! - <context>/Package_Dependency.csv
//! - <context>/Package_Prog_Lang.csv
//! - <context>/graph.json: cached aggregate query result

pub mod snapshot;
pub mod tables;

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::context::SearchContext;
use crate::record::PackageRecord;
use crate::Result;

pub use tables::{BasicRow, DependencyEdge, LanguageEdge, StagedTables};

/// Filesystem store rooted at the library directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the tables of a context
    pub fn run_dir(&self, context: &SearchContext) -> PathBuf {
        self.root.join(context.dir_name())
    }

    fn table_path(&self, context: &SearchContext, file: &str) -> PathBuf {
        self.run_dir(context).join(file)
    }

    // ========== Index Operations ==========

    /// Append the context to the global index. No uniqueness check.
    pub fn append_index(&self, context: &SearchContext) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let mut writer = appender(&self.root.join(tables::INDEX_FILE))?;
        writer.write_record([context.dir_name()])?;
        writer.flush()?;
        Ok(())
    }

    /// All index entries in insertion order
    pub fn list_index(&self) -> Result<Vec<String>> {
        let path = self.root.join(tables::INDEX_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;
        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            entries.push(record.get(0).unwrap_or_default().to_string());
        }
        Ok(entries)
    }

    // ========== Table Operations ==========

    /// Create the context directory and its three tables with header rows.
    ///
    /// Fails if the directory already exists.
    pub fn create_run_dir(&self, context: &SearchContext) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let dir = self.run_dir(context);
        fs::create_dir(&dir)?;

        for (file, header) in tables::all_tables() {
            let mut writer = appender(&dir.join(file))?;
            writer.write_record(header)?;
            writer.flush()?;
        }

        debug!(dir = %dir.display(), "created run directory");
        Ok(dir)
    }

    /// Append one package: a basic row, then its dependency and language rows.
    ///
    /// Stops at the first table that fails; later tables are not written.
    pub fn append_record(&self, context: &SearchContext, record: &PackageRecord) -> Result<()> {
        append_rows(
            &self.table_path(context, tables::BASIC_DATA_FILE),
            &[BasicRow::from(record)],
        )?;
        append_rows(
            &self.table_path(context, tables::DEPENDENCY_FILE),
            &DependencyEdge::for_record(record),
        )?;
        append_rows(
            &self.table_path(context, tables::LANGUAGE_FILE),
            &LanguageEdge::for_record(record),
        )?;
        Ok(())
    }

    /// Read the three tables back, keyed by their header rows
    pub fn read_tables(&self, context: &SearchContext) -> Result<StagedTables> {
        Ok(StagedTables {
            basic: read_rows(&self.table_path(context, tables::BASIC_DATA_FILE))?,
            dependencies: read_rows(&self.table_path(context, tables::DEPENDENCY_FILE))?,
            languages: read_rows(&self.table_path(context, tables::LANGUAGE_FILE))?,
        })
    }
}

fn appender(path: &Path) -> Result<csv::Writer<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(csv::WriterBuilder::new().has_headers(false).from_writer(file))
}

fn append_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    // Tables must exist already; only the index is created on demand
    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
