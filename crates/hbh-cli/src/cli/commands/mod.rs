//! CLI command handlers, one per file.

mod download;
mod extract;
mod inspect;
mod sanitize;

pub use download::run_download;
pub use extract::run_extract;
pub use inspect::run_inspect;
pub use sanitize::run_sanitize;

use anyhow::Result;
use hbh_core::extractor::Page;
use hbh_core::fetch;

/// Loads the page off the async runtime (libcurl blocks).
pub(crate) async fn load_page(source: &str, page_url: Option<&str>) -> Result<Page> {
    let source = source.to_string();
    let page_url = page_url.map(str::to_string);
    tokio::task::spawn_blocking(move || fetch::load_page(&source, page_url.as_deref()))
        .await
        .map_err(|e| anyhow::anyhow!("page load task join: {}", e))?
}
