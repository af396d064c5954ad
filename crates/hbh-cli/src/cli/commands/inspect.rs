//! `hbh inspect <source>` – open the popup flow and show what was found.

use anyhow::Result;
use hbh_core::config::HbhConfig;
use hbh_core::controller::{Controller, ControllerConfig};
use hbh_core::host::{NoDownloads, PageTab};

use super::load_page;
use crate::cli::render::print_view;

pub async fn run_inspect(cfg: &HbhConfig, source: &str, page_url: Option<&str>) -> Result<()> {
    let page = load_page(source, page_url).await?;
    let mut controller = Controller::new(
        PageTab::new(page, cfg.extractor.clone()),
        NoDownloads,
        ControllerConfig::from(cfg),
    );
    let view = controller.open().await;
    print_view(view);
    if view.download_enabled {
        println!("Downloads available.");
    }
    Ok(())
}
