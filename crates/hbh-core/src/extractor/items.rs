//! Item rows: book names and per-format download links.

use scraper::{ElementRef, Html};
use url::Url;

use super::selectors::Selectors;
use crate::model::{Format, Item};
use crate::sanitize::sanitize_item_name;

/// A format label whose link could not be used.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("cannot resolve href {href:?}: {source}")]
    BadHref {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// Extracts one [`Item`] per matching row, in document order.
pub fn extract_items(doc: &Html, selectors: &Selectors, base: Option<&Url>) -> Vec<Item> {
    doc.select(&selectors.row)
        .enumerate()
        .map(|(index, row)| extract_item(row, index, selectors, base))
        .collect()
}

fn extract_item(
    row: ElementRef<'_>,
    index: usize,
    selectors: &Selectors,
    base: Option<&Url>,
) -> Item {
    let book_name = row_name(row, selectors).unwrap_or_else(|| format!("Item {}", index + 1));
    let mut item = Item {
        book_name: sanitize_item_name(&book_name),
        pdf_url: None,
        epub_url: None,
    };

    let Some(buttons) = row.select(&selectors.buttons).next() else {
        return item;
    };
    for label in buttons.select(&selectors.label) {
        match label_link(label, selectors, base) {
            Ok(Some((Format::Pdf, url))) => item.pdf_url = Some(url),
            Ok(Some((Format::Epub, url))) => item.epub_url = Some(url),
            Ok(None) => {}
            Err(e) => tracing::warn!(item = %item.book_name, "skipping download link: {}", e),
        }
    }
    item
}

/// `data-human-name`, else the title link's text.
fn row_name(row: ElementRef<'_>, selectors: &Selectors) -> Option<String> {
    if let Some(name) = row.value().attr("data-human-name").filter(|n| !n.is_empty()) {
        return Some(name.to_string());
    }
    row.select(&selectors.title_link)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Resolves the link belonging to one format label.
///
/// `Ok(None)` for labels that are not PDF/EPUB or have no usable anchor.
fn label_link(
    label: ElementRef<'_>,
    selectors: &Selectors,
    base: Option<&Url>,
) -> Result<Option<(Format, String)>, LabelError> {
    let Some(format) = Format::from_label(&label.text().collect::<String>()) else {
        return Ok(None);
    };
    let Some(download) = closest(label, &selectors.download) else {
        return Ok(None);
    };
    let Some(href) = download
        .select(&selectors.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|h| !h.is_empty())
    else {
        return Ok(None);
    };
    let resolved = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    }
    .map_err(|source| LabelError::BadHref {
        href: href.to_string(),
        source,
    })?;
    Ok(Some((format, resolved.to_string())))
}

/// `Element.closest`: the element itself or its nearest matching ancestor.
fn closest<'a>(el: ElementRef<'a>, selector: &scraper::Selector) -> Option<ElementRef<'a>> {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find(|e| selector.matches(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;

    fn items(html: &str, base: Option<&str>) -> Vec<Item> {
        let doc = Html::parse_document(html);
        let sel = Selectors::compile(&ExtractorConfig::default()).unwrap();
        let base = base.map(|b| Url::parse(b).unwrap());
        extract_items(&doc, &sel, base.as_ref())
    }

    fn button(label: &str, href: &str) -> String {
        format!(
            r#"<div class="download"><div class="flexbtn"><span class="label">{label}</span></div><a class="a" href="{href}">Download</a></div>"#
        )
    }

    fn row(name_attr: &str, inner: &str) -> String {
        format!(
            r#"<div class="row" data-human-name="{name_attr}"><div class="gameinfo"><div class="title"><a>Link Title</a></div></div><div class="download-buttons">{inner}</div></div>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(r#"<html><body><div class="download-rows">{}</div></body></html>"#, rows.concat())
    }

    #[test]
    fn no_rows_yields_empty_list() {
        assert!(items("<html><body><h1>hi</h1></body></html>", None).is_empty());
    }

    #[test]
    fn pdf_only_row() {
        let html = page(&[row("Rust in Action", &button("PDF", "https://dl.example.com/ria.pdf"))]);
        let got = items(&html, None);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].book_name, "Rust_in_Action");
        assert_eq!(got[0].pdf_url.as_deref(), Some("https://dl.example.com/ria.pdf"));
        assert_eq!(got[0].epub_url, None);
    }

    #[test]
    fn both_formats_and_unknown_labels() {
        let inner = [
            button("  epub ", "https://dl.example.com/b.epub"),
            button("MOBI", "https://dl.example.com/b.mobi"),
            button("PDF", "https://dl.example.com/b.pdf"),
        ]
        .concat();
        let got = items(&page(&[row("Book", &inner)]), None);
        assert_eq!(got[0].pdf_url.as_deref(), Some("https://dl.example.com/b.pdf"));
        assert_eq!(got[0].epub_url.as_deref(), Some("https://dl.example.com/b.epub"));
    }

    #[test]
    fn relative_hrefs_resolve_against_page_url() {
        let html = page(&[row("Book", &button("PDF", "/dl/book.pdf?key=1"))]);
        let got = items(&html, Some("https://www.humblebundle.com/downloads?key=abc"));
        assert_eq!(
            got[0].pdf_url.as_deref(),
            Some("https://www.humblebundle.com/dl/book.pdf?key=1")
        );
    }

    #[test]
    fn bad_label_is_skipped_and_others_kept() {
        let inner = [
            button("PDF", "/relative/without/base.pdf"),
            button("EPUB", "https://dl.example.com/ok.epub"),
        ]
        .concat();
        let got = items(&page(&[row("Book", &inner)]), None);
        assert_eq!(got[0].pdf_url, None);
        assert_eq!(got[0].epub_url.as_deref(), Some("https://dl.example.com/ok.epub"));
    }

    #[test]
    fn row_without_buttons_has_no_urls() {
        let html = page(&[r#"<div class="row" data-human-name="Lonely"></div>"#.to_string()]);
        let got = items(&html, None);
        assert_eq!(got[0].book_name, "Lonely");
        assert_eq!((got[0].pdf_url.as_deref(), got[0].epub_url.as_deref()), (None, None));
    }

    #[test]
    fn label_outside_download_container_is_ignored() {
        let inner = r#"<span class="label">PDF</span><a class="a" href="https://x/y.pdf">x</a>"#;
        let got = items(&page(&[row("Book", inner)]), None);
        assert_eq!(got[0].pdf_url, None);
    }

    #[test]
    fn name_fallbacks() {
        let html = page(&[
            row("", ""),
            r#"<div class="row" data-human-name=""></div>"#.to_string(),
            row("Why? Because: Reasons", ""),
        ]);
        let got = items(&html, None);
        assert_eq!(got[0].book_name, "Link_Title");
        assert_eq!(got[1].book_name, "Item_2");
        assert_eq!(got[2].book_name, "Why_Because_Reasons");
    }

    #[test]
    fn rows_outside_download_rows_are_ignored() {
        let html = format!(
            r#"<div class="row" data-human-name="Stray"></div>{}"#,
            page(&[row("Kept", "")])
        );
        let got = items(&html, None);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].book_name, "Kept");
    }
}
