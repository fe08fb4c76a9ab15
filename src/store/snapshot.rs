//! Graph snapshots - cached results of the aggregate graph query

use std::fs;
use std::io::ErrorKind;

use serde_json::Value;

use super::{tables, LocalStore};
use crate::context::SearchContext;
use crate::{Error, Result};

impl LocalStore {
    /// Overwrite the snapshot of a context
    pub fn write_snapshot(&self, context: &SearchContext, graph: &Value) -> Result<()> {
        let dir = self.run_dir(context);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(tables::SNAPSHOT_FILE), serde_json::to_vec(graph)?)?;
        Ok(())
    }

    /// Read the snapshot written by the last successful graph load
    pub fn read_snapshot(&self, context: &SearchContext) -> Result<Value> {
        let path = self.run_dir(context).join(tables::SNAPSHOT_FILE);
        let contents = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::SnapshotMissing(context.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&contents)?)
    }

    pub fn has_snapshot(&self, context: &SearchContext) -> bool {
        self.run_dir(context).join(tables::SNAPSHOT_FILE).exists()
    }
}
