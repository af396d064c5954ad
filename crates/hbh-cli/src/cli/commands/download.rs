//! `hbh download <source>` – confirm, then download every item in the chosen format.

use anyhow::{Context, Result};
use hbh_core::config::HbhConfig;
use hbh_core::controller::{Controller, ControllerConfig, Phase};
use hbh_core::download::CurlDownloadHost;
use hbh_core::host::PageTab;
use hbh_core::model::Format;
use std::io::{self, BufRead, Write};
use std::path::Path;

use super::load_page;
use crate::cli::render::print_view;

pub async fn run_download(
    cfg: &HbhConfig,
    source: &str,
    page_url: Option<&str>,
    format: Format,
    dir: &Path,
    yes: bool,
) -> Result<()> {
    let page = load_page(source, page_url).await?;
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let mut controller = Controller::new(
        PageTab::new(page, cfg.extractor.clone()),
        CurlDownloadHost::new(dir),
        ControllerConfig::from(cfg),
    );
    print_view(controller.open().await);
    if controller.phase() != Phase::Displaying || !controller.view().download_enabled {
        anyhow::bail!("nothing to download");
    }

    controller.select_format(Some(format));
    let planned = controller.planned_requests();
    if !planned.is_empty() && !yes && !confirm(planned.len(), format, dir).await? {
        println!("Cancelled.");
        return Ok(());
    }

    let view = controller.confirm().await;
    print_view(view);
    let state = controller.close();
    for result in &state.results {
        match &result.outcome {
            Ok(id) => println!("  ok     {} ({})", result.request.filename, id),
            Err(e) => println!("  failed {}: {}", result.request.filename, e),
        }
    }
    if state.phase == Phase::Error {
        anyhow::bail!("all downloads failed");
    }
    Ok(())
}

/// Asks on stdin; the read runs off the async runtime.
async fn confirm(count: usize, format: Format, dir: &Path) -> Result<bool> {
    print!("Download {} {} file(s) into {}? [y/N] ", count, format, dir.display());
    io::stdout().flush()?;
    let answer = tokio::task::spawn_blocking(|| -> io::Result<String> {
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer)
    })
    .await
    .map_err(|e| anyhow::anyhow!("prompt task join: {}", e))?
    .context("read confirmation")?;
    Ok(parse_answer(&answer))
}

pub(crate) fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
