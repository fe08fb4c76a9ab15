//! Table definitions
//!
//! Each search context directory holds three CSV tables:
//! - Package_Basic_Data.csv(package_name, package_author, package_author_email,
//!   package_license, package_dev_status, search_meta)
//! - Package_Dependency.csv(package_name, dependency_pkg)
//! - Package_Prog_Lang.csv(package_name, language)

use serde::{Deserialize, Serialize};

use crate::record::PackageRecord;

pub const BASIC_DATA_FILE: &str = "Package_Basic_Data.csv";
pub const DEPENDENCY_FILE: &str = "Package_Dependency.csv";
pub const LANGUAGE_FILE: &str = "Package_Prog_Lang.csv";
pub const INDEX_FILE: &str = "index.csv";
pub const SNAPSHOT_FILE: &str = "graph.json";

pub const BASIC_DATA_HEADER: &[&str] = &[
    "package_name",
    "package_author",
    "package_author_email",
    "package_license",
    "package_dev_status",
    "search_meta",
];
pub const DEPENDENCY_HEADER: &[&str] = &["package_name", "dependency_pkg"];
pub const LANGUAGE_HEADER: &[&str] = &["package_name", "language"];

/// All tables with their header rows, in creation order
pub fn all_tables() -> [(&'static str, &'static [&'static str]); 3] {
    [
        (BASIC_DATA_FILE, BASIC_DATA_HEADER),
        (DEPENDENCY_FILE, DEPENDENCY_HEADER),
        (LANGUAGE_FILE, LANGUAGE_HEADER),
    ]
}

/// One row of the basic-data table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRow {
    pub package_name: String,
    pub package_author: String,
    pub package_author_email: String,
    pub package_license: String,
    pub package_dev_status: String,
    pub search_meta: String,
}

impl From<&PackageRecord> for BasicRow {
    fn from(record: &PackageRecord) -> Self {
        Self {
            package_name: record.name.clone(),
            package_author: record.author.clone(),
            package_author_email: record.author_email.clone(),
            package_license: record.license.clone(),
            package_dev_status: record.dev_status.clone(),
            search_meta: String::new(),
        }
    }
}

/// One row of the dependency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub package_name: String,
    pub dependency_pkg: String,
}

/// One row of the language table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEdge {
    pub package_name: String,
    pub language: String,
}

impl DependencyEdge {
    pub fn for_record(record: &PackageRecord) -> Vec<Self> {
        record
            .dependencies
            .iter()
            .map(|dep| Self {
                package_name: record.name.clone(),
                dependency_pkg: dep.clone(),
            })
            .collect()
    }
}

impl LanguageEdge {
    pub fn for_record(record: &PackageRecord) -> Vec<Self> {
        record
            .languages
            .iter()
            .map(|lang| Self {
                package_name: record.name.clone(),
                language: lang.clone(),
            })
            .collect()
    }
}

/// The three tables of one context read back into typed rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedTables {
    pub basic: Vec<BasicRow>,
    pub dependencies: Vec<DependencyEdge>,
    pub languages: Vec<LanguageEdge>,
}
