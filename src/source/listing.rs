//! Search listing pages
//!
//! Result pages render each hit as `<a class="package-snippet"
//! href="/project/<name>/">`. The package name is the third `/` segment of
//! the anchor's `href`.

use crate::context::SearchContext;
use crate::{Error, Result};
use scraper::{Html, Selector};
use url::Url;

/// CSS selector for package result anchors
pub const SNIPPET_SELECTOR: &str = "a.package-snippet";

/// Build the search URL for one result page. A path on `index_host` is kept.
pub fn search_url(index_host: &str, context: &SearchContext, page: u32) -> Result<Url> {
    let base = format!("{}/", index_host.trim_end_matches('/'));
    let mut url = Url::parse(&base)?.join("search/")?;
    url.query_pairs_mut()
        .append_pair("q", context.as_str())
        .append_pair("page", &page.to_string());
    Ok(url)
}

/// Extract package names from a rendered result page, in page order
pub fn parse_listing(html: &str) -> Result<Vec<String>> {
    let selector = Selector::parse(SNIPPET_SELECTOR)
        .map_err(|e| Error::Listing(format!("invalid selector {SNIPPET_SELECTOR}: {e}")))?;
    let document = Html::parse_document(html);

    let names = document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(package_name_from_href)
        .collect();

    Ok(names)
}

fn package_name_from_href(href: &str) -> Option<String> {
    href.split('/')
        .nth(2)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
