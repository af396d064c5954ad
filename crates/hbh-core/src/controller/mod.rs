//! UI-side controller: gate, inject, wait for the extractor, render, and run
//! the bulk download on confirmation.
//!
//! All mutable state lives in [`PopupState`]; each transition is a method on
//! it, so the flow can be driven and inspected step by step.

mod download;
mod inject;
mod view;

pub use download::{fan_out, first_failure, plan_requests, DownloadResult, Tally};
pub use inject::{classify_inject_error, InjectErrorKind};
pub use view::{
    download_enabled, status_for, PopupView, StatusKind, StatusLine, MSG_COUNTS_DIFFER,
    MSG_EXTRACTION_FAILED, MSG_NO_ITEMS, MSG_NO_LINKS,
};

use std::sync::Arc;
use std::time::Duration;

use crate::config::HbhConfig;
use crate::host::{DownloadHost, HostError, TabHost};
use crate::message::{self, Ack, RuntimeMessage};
use crate::model::{BundleInfo, Format};

pub const MSG_NO_TAB: &str = "Could not get active tab information.";
pub const MSG_SELECT_FORMAT: &str = "Please select a format (PDF or EPUB).";

/// Lifecycle of one controller instance. `Error` and `Done` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Injecting,
    WaitingForData,
    Displaying,
    Downloading,
    Done,
    Error,
}

/// Settings the controller needs, taken from [`HbhConfig`].
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub site_origin: String,
    pub default_format: Format,
    pub nest_by_bundle: bool,
    pub message_timeout: Option<Duration>,
}

impl From<&HbhConfig> for ControllerConfig {
    fn from(cfg: &HbhConfig) -> Self {
        Self {
            site_origin: cfg.site_origin.clone(),
            default_format: cfg.default_format,
            nest_by_bundle: cfg.nest_by_bundle,
            message_timeout: cfg.message_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from(&HbhConfig::default())
    }
}

/// Explicit UI state threaded through the transition handlers.
#[derive(Debug, Clone)]
pub struct PopupState {
    pub phase: Phase,
    pub view: PopupView,
    pub bundle: Option<BundleInfo>,
    pub results: Vec<DownloadResult>,
}

impl PopupState {
    pub fn new(default_format: Format) -> Self {
        Self {
            phase: Phase::Idle,
            view: PopupView::new(Some(default_format)),
            bundle: None,
            results: Vec::new(),
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.view.show_error(message);
        self.phase = Phase::Error;
    }

    fn fail_quietly(&mut self, err: &HostError) {
        tracing::debug!("injection abandoned: {}", err);
        self.view.download_enabled = false;
        self.phase = Phase::Error;
    }

    fn on_bundle_info(&mut self, info: BundleInfo) {
        tracing::info!(
            bundle = %info.bundle_name,
            items = info.items_data.len(),
            "received bundle info"
        );
        self.view.show_bundle(&info);
        self.bundle = Some(info);
        self.phase = Phase::Displaying;
    }

    fn on_downloads_finished(&mut self, results: Vec<DownloadResult>) {
        let tally = Tally::from_results(&results);
        tracing::info!(
            issued = tally.issued,
            succeeded = tally.succeeded,
            failed = tally.failed,
            "download batch finished"
        );
        if let Some(message) = first_failure(&results) {
            self.view.error = Some(message);
        }
        self.view.tally = Some(tally.message());
        self.view.download_enabled = false;
        self.results = results;
        self.phase = if tally.issued > 0 && tally.succeeded == 0 {
            Phase::Error
        } else {
            Phase::Done
        };
    }
}

pub struct Controller<T, D> {
    tabs: T,
    downloads: Arc<D>,
    cfg: ControllerConfig,
    state: PopupState,
}

impl<T: TabHost, D: DownloadHost> Controller<T, D> {
    pub fn new(tabs: T, downloads: D, cfg: ControllerConfig) -> Self {
        let state = PopupState::new(cfg.default_format);
        Self {
            tabs,
            downloads: Arc::new(downloads),
            cfg,
            state,
        }
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    pub fn view(&self) -> &PopupView {
        &self.state.view
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Runs the popup from `Idle` to `Displaying` (or `Error`).
    pub async fn open(&mut self) -> &PopupView {
        if self.state.phase != Phase::Idle {
            tracing::debug!(phase = ?self.state.phase, "open ignored");
            return &self.state.view;
        }

        let Some(tab) = self.tabs.active_tab() else {
            self.state.fail(MSG_NO_TAB);
            return &self.state.view;
        };
        let Some(url) = tab.url.as_deref() else {
            self.state.fail(MSG_NO_TAB);
            return &self.state.view;
        };
        if !url.starts_with(&self.cfg.site_origin) {
            tracing::info!(url, "page is outside {}", self.cfg.site_origin);
            self.state.fail(format!(
                "This tool only works on Humble Bundle pages ({}...).",
                self.cfg.site_origin
            ));
            return &self.state.view;
        }

        self.state.phase = Phase::Injecting;
        let (sender, mut receiver) = message::channel();
        match self.tabs.inject(tab.id, sender) {
            Ok(Some(info)) => {
                self.state.on_bundle_info(info);
                return &self.state.view;
            }
            Ok(None) => tracing::debug!(tab = tab.id, "extractor injected; waiting for message"),
            Err(e) => {
                match classify_inject_error(&e) {
                    InjectErrorKind::Quiet => self.state.fail_quietly(&e),
                    InjectErrorKind::Visible => {
                        self.state.fail(format!("Error injecting script: {}", e))
                    }
                }
                return &self.state.view;
            }
        }

        self.state.phase = Phase::WaitingForData;
        let envelope = match self.cfg.message_timeout {
            Some(limit) => tokio::time::timeout(limit, receiver.recv())
                .await
                .unwrap_or_else(|_| {
                    tracing::warn!("no bundle info after {:?}", limit);
                    None
                }),
            None => receiver.recv().await,
        };
        match envelope {
            Some(envelope) => {
                let RuntimeMessage::SendBundleInfo(info) = envelope.reply(Ack::received());
                self.state.on_bundle_info(info);
            }
            None => self.state.fail(MSG_EXTRACTION_FAILED),
        }
        &self.state.view
    }

    /// Chooses the format (the selector is mutually exclusive; `None` clears it).
    pub fn select_format(&mut self, format: Option<Format>) {
        if self.state.phase == Phase::Displaying {
            self.state.view.selected_format = format;
        }
    }

    /// Requests that would be issued for the selected format right now.
    pub fn planned_requests(&self) -> Vec<crate::host::DownloadRequest> {
        match (&self.state.bundle, self.state.view.selected_format) {
            (Some(info), Some(format)) => plan_requests(info, format, self.cfg.nest_by_bundle),
            _ => Vec::new(),
        }
    }

    /// User confirmed: download every item that has a link in the selected format.
    pub async fn confirm(&mut self) -> &PopupView {
        if self.state.phase != Phase::Displaying || !self.state.view.download_enabled {
            tracing::debug!(phase = ?self.state.phase, "confirm ignored");
            return &self.state.view;
        }
        let Some(format) = self.state.view.selected_format else {
            self.state.view.error = Some(MSG_SELECT_FORMAT.to_string());
            return &self.state.view;
        };

        let requests = self.planned_requests();
        if requests.is_empty() {
            self.state.view.status = Some(StatusLine::warning(format!(
                "No {} links found for the items on this page.",
                format.label()
            )));
            return &self.state.view;
        }

        tracing::info!(format = %format, count = requests.len(), "starting downloads");
        self.state.view.error = None;
        self.state.phase = Phase::Downloading;
        let results = fan_out(Arc::clone(&self.downloads), requests).await;
        self.state.on_downloads_finished(results);
        &self.state.view
    }

    /// Closes the popup, handing back the final state.
    pub fn close(self) -> PopupState {
        tracing::debug!(phase = ?self.state.phase, "popup closed");
        self.state
    }
}
