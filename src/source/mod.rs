//! Package sources - where package names and metadata come from
//!
//! [`PackageSource`] is the seam between the pipeline and the network.
//! [`PypiClient`] implements it against the PyPI web index with a blocking
//! HTTP client.

pub mod listing;

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::context::SearchContext;
use crate::record::PackageRecord;
use crate::{Error, Result};

pub use listing::{parse_listing, search_url};

/// Default PyPI host
pub const DEFAULT_INDEX_HOST: &str = "https://pypi.org";

/// Number of result pages scraped per run
pub const DEFAULT_PAGES: u32 = 5;

/// A provider of search listings and package metadata.
pub trait PackageSource {
    /// Package names on one result page for the context
    fn search_page(&self, context: &SearchContext, page: u32) -> Result<Vec<String>>;

    /// Normalized metadata for one package
    fn package_metadata(&self, name: &str) -> Result<PackageRecord>;

    /// Concatenated results of pages `1..=pages`, duplicates kept
    fn search(&self, context: &SearchContext, pages: u32) -> Result<Vec<String>> {
        let mut packages = Vec::new();
        for page in 1..=pages {
            let names = self.search_page(context, page)?;
            debug!(page, found = names.len(), "scraped listing page");
            packages.extend(names);
        }
        Ok(packages)
    }
}

/// PyPI web index client
#[derive(Debug, Clone)]
pub struct PypiClient {
    client: Client,
    index_host: String,
}

impl PypiClient {
    /// Build a client for `index_host`. A zero timeout disables the timeout.
    pub fn new(index_host: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        builder = if timeout_secs > 0 {
            builder.timeout(Duration::from_secs(timeout_secs))
        } else {
            builder.timeout(None::<Duration>)
        };

        Ok(Self {
            client: builder.build()?,
            index_host: index_host.into().trim_end_matches('/').to_string(),
        })
    }

    /// Metadata endpoint for a package
    pub fn metadata_url(&self, name: &str) -> String {
        format!("{}/pypi/{}/json", self.index_host, name)
    }

    fn get_text(&self, url: &str) -> Result<String> {
        debug!(%url, "GET");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}

impl PackageSource for PypiClient {
    fn search_page(&self, context: &SearchContext, page: u32) -> Result<Vec<String>> {
        let url = search_url(&self.index_host, context, page)?;
        let html = self.get_text(url.as_str())?;
        parse_listing(&html)
    }

    fn package_metadata(&self, name: &str) -> Result<PackageRecord> {
        let body = self.get_text(&self.metadata_url(name))?;
        PackageRecord::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct PagedSource {
        pages: Vec<Vec<&'static str>>,
        requested: RefCell<Vec<u32>>,
    }

    impl PackageSource for PagedSource {
        fn search_page(&self, _context: &SearchContext, page: u32) -> Result<Vec<String>> {
            self.requested.borrow_mut().push(page);
            Ok(self
                .pages
                .get(page as usize - 1)
                .map(|names| names.iter().map(|n| n.to_string()).collect())
                .unwrap_or_default())
        }

        fn package_metadata(&self, name: &str) -> Result<PackageRecord> {
            Ok(PackageRecord::new(name))
        }
    }

    #[test]
    fn test_search_concatenates_pages_in_order() {
        let source = PagedSource {
            pages: vec![vec!["a", "b"], vec!["b", "c"], vec![]],
            requested: RefCell::new(Vec::new()),
        };
        let ctx = SearchContext::from_phrase("graph tools");

        let names = source.search(&ctx, 3).unwrap();

        assert_eq!(names, vec!["a", "b", "b", "c"]);
        assert_eq!(*source.requested.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_metadata_url() {
        let client = PypiClient::new("https://pypi.org/", 0).unwrap();
        assert_eq!(client.metadata_url("requests"), "https://pypi.org/pypi/requests/json");
    }
}
