//! Bundle name resolution from the page title element or document title.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use super::selectors::Selectors;

/// Name used when neither the title element nor the document title yields anything.
pub const UNKNOWN_PAGE_NAME: &str = "Humble Page (Name Unknown)";

/// Shorter names are treated as logos or labels, not bundle names.
const MIN_NAME_CHARS: usize = 5;

static THANKS_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Thanks for purchasing").expect("static regex"));
static TITLE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i) Humble Bundle.*").expect("static regex"));

/// Resolves the display name of the bundle on this page.
pub fn resolve_bundle_name(doc: &Html, selectors: &Selectors) -> String {
    let candidate = title_element_text(doc, selectors).map(|raw| strip_thanks(&raw));
    let name = match candidate {
        Some(name) if is_usable(&name) => name,
        _ => name_from_document_title(&document_title(doc, selectors)),
    };
    if name.is_empty() {
        UNKNOWN_PAGE_NAME.to_string()
    } else {
        name
    }
}

/// Text of the first title candidate that matches, or its `alt` for image logos.
fn title_element_text(doc: &Html, selectors: &Selectors) -> Option<String> {
    let el = selectors
        .titles
        .iter()
        .find_map(|sel| doc.select(sel).next())?;
    let text: String = el.text().collect();
    let raw = if text.is_empty() {
        el.value().attr("alt").unwrap_or_default().to_string()
    } else {
        text
    };
    Some(raw.trim().to_string())
}

/// `document.title`: first `<title>` with whitespace stripped and collapsed.
fn document_title(doc: &Html, selectors: &Selectors) -> String {
    doc.select(&selectors.document_title)
        .next()
        .map(|t| t.text().collect::<String>())
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn strip_thanks(raw: &str) -> String {
    THANKS_PREFIX.replace(raw, "").trim().to_string()
}

pub(crate) fn name_from_document_title(title: &str) -> String {
    TITLE_SUFFIX.replace(title, "").trim().to_string()
}

fn is_usable(name: &str) -> bool {
    !name.is_empty() && name.chars().count() >= MIN_NAME_CHARS && name != "Humble"
}
