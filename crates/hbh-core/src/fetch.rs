//! Loading the page the extractor runs on: an `http(s)` URL fetched with
//! libcurl, or a saved HTML file.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::extractor::Page;

/// Upper bound on a page body; download pages are a few hundred KiB.
const MAX_PAGE_BYTES: usize = 32 * 1024 * 1024;

/// GETs `url` and returns the body as text (lossy UTF-8).
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn fetch_html(url: &str) -> Result<String> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(concat!("hbh/", env!("CARGO_PKG_VERSION")))?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(Duration::from_secs(60))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if body.len() + data.len() > MAX_PAGE_BYTES {
                return Ok(0); // abort transfer
            }
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Loads a page from `source`: an `http`/`https` URL or a local file.
///
/// For files, `page_url` (if given) is the URL the page was saved from; it
/// is used for the site check and to resolve relative links. Without it the
/// page's URL is the file's `file://` URL.
pub fn load_page(source: &str, page_url: Option<&str>) -> Result<Page> {
    if let Ok(url) = Url::parse(source) {
        if url.scheme() == "http" || url.scheme() == "https" {
            let html = fetch_html(source).with_context(|| format!("fetch {}", source))?;
            tracing::info!(url = %url, bytes = html.len(), "fetched page");
            return Ok(Page::new(Some(url), html));
        }
    }

    let path = Path::new(source);
    let html = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let url = match page_url {
        Some(u) => Some(Url::parse(u).with_context(|| format!("invalid page URL {}", u))?),
        None => std::fs::canonicalize(path)
            .ok()
            .and_then(|p| Url::from_file_path(p).ok()),
    };
    tracing::info!(path = %path.display(), bytes = html.len(), "loaded saved page");
    Ok(Page::new(url, html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_saved_page_with_page_url() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"<html><title>x</title></html>").unwrap();
        f.flush().unwrap();
        let source = f.path().to_str().unwrap();
        let page = load_page(source, Some("https://www.humblebundle.com/downloads?key=1")).unwrap();
        assert_eq!(page.url().unwrap().host_str(), Some("www.humblebundle.com"));
        assert!(page.html().contains("<title>x</title>"));
    }

    #[test]
    fn load_saved_page_defaults_to_file_url() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let page = load_page(f.path().to_str().unwrap(), None).unwrap();
        assert_eq!(page.url().unwrap().scheme(), "file");
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(load_page("/definitely/not/here.html", None).is_err());
    }

    #[test]
    fn bad_page_url_fails() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert!(load_page(f.path().to_str().unwrap(), Some("not a url")).is_err());
    }
}
