//! `hbh extract <source>` – print the extractor's message as JSON.

use anyhow::Result;
use hbh_core::config::HbhConfig;
use hbh_core::extractor::extract_bundle_info;
use hbh_core::message::RuntimeMessage;

use super::load_page;

pub async fn run_extract(cfg: &HbhConfig, source: &str, page_url: Option<&str>) -> Result<()> {
    let page = load_page(source, page_url).await?;
    let info = extract_bundle_info(&page, &cfg.extractor);
    let json = serde_json::to_string_pretty(&RuntimeMessage::SendBundleInfo(info))?;
    println!("{}", json);
    Ok(())
}
