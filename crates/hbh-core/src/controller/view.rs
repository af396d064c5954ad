//! What the popup shows, derived from the extracted bundle.

use crate::model::{BundleInfo, Format, LinkCounts};

pub const MSG_EXTRACTION_FAILED: &str = "Could not extract bundle information from the page.";
pub const MSG_NO_ITEMS: &str = "No downloadable items found on this page type.";
pub const MSG_NO_LINKS: &str = "Items found, but no PDF or EPUB download links were detected.";
pub const MSG_COUNTS_DIFFER: &str = "Note: link counts may differ from the item count.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Everything the user-facing surface displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopupView {
    pub bundle_name: Option<String>,
    pub counts: LinkCounts,
    pub status: Option<StatusLine>,
    pub error: Option<String>,
    pub selected_format: Option<Format>,
    pub download_enabled: bool,
    pub tally: Option<String>,
}

impl PopupView {
    /// Fresh view with `format` preselected and downloads disabled.
    pub fn new(format: Option<Format>) -> Self {
        Self {
            selected_format: format,
            ..Self::default()
        }
    }

    /// Fills in name, counts, status and the download toggle.
    pub fn show_bundle(&mut self, info: &BundleInfo) {
        let counts = info.counts();
        self.bundle_name = Some(info.bundle_name.clone());
        self.counts = counts;
        self.status = status_for(info);
        self.download_enabled = download_enabled(&counts);
        self.error = None;
    }

    /// Shows `message` on the error line and disables downloading.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.download_enabled = false;
    }
}

/// Download is possible only with at least one item and one link of some format.
pub fn download_enabled(counts: &LinkCounts) -> bool {
    counts.items > 0 && (counts.pdf > 0 || counts.epub > 0)
}

/// Status annotation for a freshly extracted bundle.
pub fn status_for(info: &BundleInfo) -> Option<StatusLine> {
    let counts = info.counts();
    if counts.items == 0 {
        return Some(if info.is_error_sentinel() {
            StatusLine::error(MSG_EXTRACTION_FAILED)
        } else {
            StatusLine::info(MSG_NO_ITEMS)
        });
    }
    if counts.pdf == 0 && counts.epub == 0 {
        return Some(StatusLine::warning(MSG_NO_LINKS));
    }
    if counts.pdf != counts.items || counts.epub != counts.items {
        return Some(StatusLine::info(MSG_COUNTS_DIFFER));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;

    fn bundle(name: &str, links: &[(bool, bool)]) -> BundleInfo {
        BundleInfo {
            bundle_name: name.to_string(),
            sanitized_bundle_name: name.replace(' ', "_"),
            items_data: links
                .iter()
                .enumerate()
                .map(|(i, (pdf, epub))| Item {
                    book_name: format!("Book_{i}"),
                    pdf_url: pdf.then(|| format!("https://x/{i}.pdf")),
                    epub_url: epub.then(|| format!("https://x/{i}.epub")),
                })
                .collect(),
        }
    }

    #[test]
    fn download_enabled_rule() {
        let c = |items, pdf, epub| LinkCounts { items, pdf, epub };
        assert!(!download_enabled(&c(0, 0, 0)));
        assert!(!download_enabled(&c(3, 0, 0)));
        assert!(download_enabled(&c(3, 1, 0)));
        assert!(download_enabled(&c(3, 0, 2)));
        assert!(download_enabled(&c(3, 3, 3)));
    }

    #[test]
    fn sentinel_without_items_is_extraction_failure() {
        let status = status_for(&BundleInfo::error_sentinel()).unwrap();
        assert_eq!(status, StatusLine::error(MSG_EXTRACTION_FAILED));
    }

    #[test]
    fn empty_page_is_informational() {
        let status = status_for(&bundle("Store Page", &[])).unwrap();
        assert_eq!(status, StatusLine::info(MSG_NO_ITEMS));
    }

    #[test]
    fn items_without_links_warn() {
        let status = status_for(&bundle("Foo Bundle", &[(false, false), (false, false)])).unwrap();
        assert_eq!(status.kind, StatusKind::Warning);
    }

    #[test]
    fn uneven_counts_are_noted() {
        let status = status_for(&bundle("Foo Bundle", &[(true, true), (true, false)])).unwrap();
        assert_eq!(status, StatusLine::info(MSG_COUNTS_DIFFER));
    }

    #[test]
    fn complete_bundle_has_no_status() {
        assert_eq!(status_for(&bundle("Foo Bundle", &[(true, true), (true, true)])), None);
    }

    #[test]
    fn show_bundle_fills_view() {
        let mut view = PopupView::new(Some(Format::Pdf));
        view.show_bundle(&bundle("Foo Bundle", &[(true, false), (false, false)]));
        assert_eq!(view.bundle_name.as_deref(), Some("Foo Bundle"));
        assert_eq!(
            view.counts,
            LinkCounts {
                items: 2,
                pdf: 1,
                epub: 0
            }
        );
        assert!(view.download_enabled);
        view.show_error("boom");
        assert!(!view.download_enabled);
        assert_eq!(view.error.as_deref(), Some("boom"));
    }
}
