//! Package records - normalized metadata for one package
//!
//! A record is extracted from the `info` section of the index's JSON
//! metadata document:
//! - `name`, `author`, `author_email`, `license` (missing values become `""`)
//! - `dev_status` from the `Development Status :: ...` classifier
//! - `languages` from `Programming Language :: ...` classifiers
//! - `dependencies` from the first token of each `requires_dist` entry

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const CLASSIFIER_SEPARATOR: &str = " :: ";
const DEV_STATUS_SEGMENT: &str = "Development Status";
const LANGUAGE_SEGMENT: &str = "Programming Language";

/// Metadata document as served by `/pypi/<name>/json`
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataDocument {
    pub info: PackageInfo,
}

/// The `info` section of a metadata document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageInfo {
    pub name: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub license: Option<String>,
    pub classifiers: Option<Vec<String>>,
    pub requires_dist: Option<Vec<String>>,
}

/// Normalized metadata for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub author: String,
    pub author_email: String,
    pub license: String,
    pub dev_status: String,
    pub languages: BTreeSet<String>,
    pub dependencies: BTreeSet<String>,
}

impl PackageRecord {
    /// Create a record with only a name set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Extract a record from a parsed metadata document
    pub fn from_document(doc: MetadataDocument) -> Result<Self> {
        let info = doc.info;
        let name = info
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::Metadata("metadata has no package name".to_string()))?;

        let mut record = PackageRecord::new(name);
        record.author = info.author.unwrap_or_default();
        record.author_email = info.author_email.unwrap_or_default();
        record.license = info.license.unwrap_or_default();

        for classifier in info.classifiers.unwrap_or_default() {
            let segments: Vec<&str> = classifier.split(CLASSIFIER_SEPARATOR).collect();
            if segments.contains(&DEV_STATUS_SEGMENT) {
                if let Some(last) = segments.last() {
                    record.dev_status = last.to_string();
                }
            } else if segments.contains(&LANGUAGE_SEGMENT) {
                if let Some(language) = segments.get(1) {
                    record.languages.insert(language.to_string());
                }
            }
        }

        record.dependencies = info
            .requires_dist
            .unwrap_or_default()
            .iter()
            .filter_map(|req| dependency_name(req))
            .collect();

        Ok(record)
    }

    /// Parse a raw JSON metadata body and extract a record
    pub fn from_json(body: &str) -> Result<Self> {
        let doc: MetadataDocument = serde_json::from_str(body)?;
        Self::from_document(doc)
    }
}

/// First whitespace-delimited token of a requirement string
pub fn dependency_name(requirement: &str) -> Option<String> {
    requirement.split_whitespace().next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLASK_JSON: &str = r#"{
        "info": {
            "name": "Flask",
            "author": "Armin Ronacher",
            "author_email": "armin.ronacher@active-4.com",
            "license": "BSD-3-Clause",
            "classifiers": [
                "Development Status :: 5 - Production/Stable",
                "Environment :: Web Environment",
                "Programming Language :: Python",
                "Programming Language :: Python :: 3 :: Only",
                "Topic :: Internet :: WWW/HTTP :: Dynamic Content"
            ],
            "requires_dist": [
                "Werkzeug (>=2.2.2)",
                "Jinja2 >=3.0",
                "click>=8.0",
                "asgiref (>=3.2) ; extra == 'async'"
            ]
        }
    }"#;

    #[test]
    fn test_extracts_full_record() {
        let record = PackageRecord::from_json(FLASK_JSON).unwrap();

        assert_eq!(record.name, "Flask");
        assert_eq!(record.author, "Armin Ronacher");
        assert_eq!(record.license, "BSD-3-Clause");
        assert_eq!(record.dev_status, "5 - Production/Stable");
        assert_eq!(record.languages.len(), 1);
        assert!(record.languages.contains("Python"));
        assert!(record.dependencies.contains("Werkzeug"));
        assert!(record.dependencies.contains("Jinja2"));
        assert!(record.dependencies.contains("click>=8.0"));
        assert!(record.dependencies.contains("asgiref"));
    }

    #[test]
    fn test_nulls_default_to_empty() {
        let json = r#"{"info": {"name": "bare", "author": null, "author_email": null,
            "license": null, "classifiers": null, "requires_dist": null}}"#;
        let record = PackageRecord::from_json(json).unwrap();

        assert_eq!(record, PackageRecord::new("bare"));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let record = PackageRecord::from_json(r#"{"info": {"name": "tiny"}}"#).unwrap();
        assert!(record.author.is_empty());
        assert!(record.dev_status.is_empty());
        assert!(record.languages.is_empty());
        assert!(record.dependencies.is_empty());
    }

    #[test]
    fn test_missing_name_is_error() {
        let err = PackageRecord::from_json(r#"{"info": {"author": "x"}}"#).unwrap_err();
        assert!(matches!(err, Error::Metadata(_)));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = PackageRecord::from_json("<html>not json</html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_dev_status_is_last_segment_of_a_status_classifier() {
        let json = r#"{"info": {"name": "p", "classifiers": [
            "Development Status :: 3 - Alpha",
            "Intended Audience :: Developers",
            "Development Status :: 4 - Beta"
        ]}}"#;
        let record = PackageRecord::from_json(json).unwrap();
        assert_eq!(record.dev_status, "4 - Beta");
    }

    #[test]
    fn test_languages_are_second_segments() {
        let json = r#"{"info": {"name": "p", "classifiers": [
            "Programming Language :: Cython",
            "Programming Language :: Python :: 3.11",
            "Programming Language :: Rust",
            "Operating System :: OS Independent"
        ]}}"#;
        let record = PackageRecord::from_json(json).unwrap();
        let langs: Vec<&str> = record.languages.iter().map(String::as_str).collect();
        assert_eq!(langs, vec!["Cython", "Python", "Rust"]);
    }

    #[test]
    fn test_dependency_name_is_first_token() {
        assert_eq!(dependency_name("pkgname (>=1.0)").as_deref(), Some("pkgname"));
        assert_eq!(dependency_name("  numpy   ").as_deref(), Some("numpy"));
        assert_eq!(dependency_name("   "), None);
    }
}
