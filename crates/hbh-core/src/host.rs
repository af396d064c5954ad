//! Seams to the browser-side collaborators: the active tab, script
//! injection, and the download facility.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ExtractorConfig;
use crate::extractor::{run_extractor, ExtractorOutcome, Page};
use crate::message::MessageSender;
use crate::model::BundleInfo;

/// Error reported by a host facility. Hosts report free-form messages, so
/// classification works on the message text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for HostError {
    fn from(e: anyhow::Error) -> Self {
        HostError::new(format!("{:#}", e))
    }
}

pub type TabId = u32;

/// The tab the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: Option<String>,
}

pub trait TabHost {
    /// Active tab of the current window, if the host can tell.
    fn active_tab(&self) -> Option<Tab>;

    /// Injects the extractor into `tab`. The extractor posts its result
    /// through `sender`; a host that can run it inline may instead return
    /// the result immediately as `Ok(Some(..))`.
    fn inject(&self, tab: TabId, sender: MessageSender) -> Result<Option<BundleInfo>, HostError>;
}

/// A single loaded page acting as the active tab. Injection spawns the
/// extractor on the tokio runtime; its result arrives as a message.
#[derive(Debug, Clone)]
pub struct PageTab {
    id: TabId,
    page: Page,
    extractor: ExtractorConfig,
}

impl PageTab {
    pub fn new(page: Page, extractor: ExtractorConfig) -> Self {
        Self {
            id: 1,
            page,
            extractor,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl TabHost for PageTab {
    fn active_tab(&self) -> Option<Tab> {
        Some(Tab {
            id: self.id,
            url: self.page.url().map(|u| u.to_string()),
        })
    }

    fn inject(&self, tab: TabId, sender: MessageSender) -> Result<Option<BundleInfo>, HostError> {
        if tab != self.id {
            return Err(HostError::new(format!("No tab with id: {}", tab)));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| HostError::new("Extension context invalidated."))?;
        let page = self.page.clone();
        let cfg = self.extractor.clone();
        runtime.spawn(async move {
            if let ExtractorOutcome::AlreadyRunning = run_extractor(&page, &cfg, &sender).await {
                tracing::debug!("duplicate injection ignored");
            }
        });
        Ok(None)
    }
}

/// One file to fetch. `filename` is a relative path with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub filename: String,
}

/// Opaque identifier the download facility hands back on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadId(pub u64);

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The host's download facility. Called from blocking worker threads.
pub trait DownloadHost: Send + Sync + 'static {
    fn download(&self, request: &DownloadRequest) -> Result<DownloadId, HostError>;
}

/// Host for read-only flows: every request is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDownloads;

impl DownloadHost for NoDownloads {
    fn download(&self, request: &DownloadRequest) -> Result<DownloadId, HostError> {
        Err(HostError::new(format!(
            "downloads are disabled (refused {})",
            request.filename
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{channel, Ack, RuntimeMessage};
    use url::Url;

    fn tab() -> PageTab {
        let page = Page::new(
            Some(Url::parse("https://www.humblebundle.com/downloads").unwrap()),
            "<html><head><title>Tiny Bundle Humble Bundle</title></head></html>",
        );
        PageTab::new(page, ExtractorConfig::default())
    }

    #[test]
    fn active_tab_reports_page_url() {
        let active = tab().active_tab().unwrap();
        assert_eq!(active.url.as_deref(), Some("https://www.humblebundle.com/downloads"));
    }

    #[tokio::test]
    async fn inject_posts_bundle_info() {
        let tab = tab();
        let (tx, mut rx) = channel();
        let id = tab.active_tab().unwrap().id;
        assert_eq!(tab.inject(id, tx).unwrap(), None);
        let RuntimeMessage::SendBundleInfo(info) = rx.recv().await.unwrap().reply(Ack::received());
        assert_eq!(info.bundle_name, "Tiny Bundle");
    }

    #[tokio::test]
    async fn inject_into_unknown_tab_fails() {
        let (tx, _rx) = channel();
        let err = tab().inject(99, tx).unwrap_err();
        assert_eq!(err.message, "No tab with id: 99");
    }

    #[test]
    fn inject_outside_runtime_is_context_invalidated() {
        let (tx, _rx) = channel();
        let err = tab().inject(1, tx).unwrap_err();
        assert!(err.message.contains("context invalidated"));
    }

    #[test]
    fn no_downloads_refuses_every_request() {
        let request = DownloadRequest {
            url: "https://dl.example/a.pdf".to_string(),
            filename: "A.pdf".to_string(),
        };
        let err = NoDownloads.download(&request).unwrap_err();
        assert!(err.message.contains("A.pdf"));
    }
}
