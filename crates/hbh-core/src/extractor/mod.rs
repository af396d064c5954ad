//! Page-context extractor: reads the page once, builds a [`BundleInfo`] and
//! posts it to the controller.
//!
//! Extraction is synchronous and never fails: anything missing from the page
//! degrades to defaults. Only delivery is asynchronous.

mod guard;
mod items;
mod name;
mod selectors;

pub use guard::{ExtractionMarker, ExtractionToken};
pub use items::{extract_items, LabelError};
pub use name::{resolve_bundle_name, UNKNOWN_PAGE_NAME};
pub use selectors::{SelectorError, Selectors};

use scraper::Html;
use std::sync::Arc;
use url::Url;

use crate::config::ExtractorConfig;
use crate::message::{Ack, DeliveryError, MessageSender, RuntimeMessage};
use crate::model::{BundleInfo, Format};
use crate::sanitize::sanitize_bundle_name;

/// A loaded page: its URL, its HTML, and the marker shared by every
/// extractor injected into it.
#[derive(Debug, Clone)]
pub struct Page {
    url: Option<Url>,
    html: Arc<str>,
    marker: ExtractionMarker,
}

impl Page {
    pub fn new(url: Option<Url>, html: impl Into<Arc<str>>) -> Self {
        Self {
            url,
            html: html.into(),
            marker: ExtractionMarker::new(),
        }
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn marker(&self) -> &ExtractionMarker {
        &self.marker
    }
}

/// What one extractor invocation did.
#[derive(Debug)]
pub enum ExtractorOutcome {
    /// Another invocation on this page has not finished; nothing was sent.
    AlreadyRunning,
    /// Extracted and posted. `ack` is `None` if delivery failed (logged, not surfaced).
    Sent { info: BundleInfo, ack: Option<Ack> },
}

/// Builds the bundle description from the page.
pub fn extract_bundle_info(page: &Page, cfg: &ExtractorConfig) -> BundleInfo {
    let selectors = match Selectors::compile(cfg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("extractor cannot run: {}", e);
            return BundleInfo::error_sentinel();
        }
    };

    let doc = Html::parse_document(page.html());
    let bundle_name = resolve_bundle_name(&doc, &selectors);
    let sanitized_bundle_name = sanitize_bundle_name(&bundle_name);
    let items_data = extract_items(&doc, &selectors, page.url());

    let info = BundleInfo {
        bundle_name,
        sanitized_bundle_name,
        items_data,
    };
    let counts = info.counts();
    tracing::info!(
        bundle = %info.bundle_name,
        sanitized = %info.sanitized_bundle_name,
        items = counts.items,
        pdf = counts.for_format(Format::Pdf),
        epub = counts.for_format(Format::Epub),
        "extracted bundle info"
    );
    info
}

/// Runs the extractor once on `page` and posts the result through `sender`.
///
/// Refuses to run while another invocation on the same page is in flight.
/// Delivery failures are logged and swallowed: there is nobody to show them to.
pub async fn run_extractor(
    page: &Page,
    cfg: &ExtractorConfig,
    sender: &MessageSender,
) -> ExtractorOutcome {
    let Some(_token) = page.marker().try_claim() else {
        tracing::debug!("extractor already running on this page; skipping");
        return ExtractorOutcome::AlreadyRunning;
    };

    let info = extract_bundle_info(page, cfg);
    let ack = match sender.send(RuntimeMessage::SendBundleInfo(info.clone())).await {
        Ok(ack) => {
            tracing::debug!(status = %ack.status, "controller acknowledged bundle info");
            Some(ack)
        }
        Err(DeliveryError::NoReceiver) => {
            tracing::debug!("no controller listening for bundle info");
            None
        }
        Err(e) => {
            tracing::warn!("bundle info delivery failed: {}", e);
            None
        }
    };
    ExtractorOutcome::Sent { info, ack }
}
