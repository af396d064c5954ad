use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::model::Format;

/// CSS selectors the extractor uses (optional `[extractor]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Title element candidates, tried in order; the first match wins.
    pub title_selectors: Vec<String>,
    /// Item rows on the downloads page.
    pub row_selector: String,
    /// Link inside a row whose text names the item (fallback for the row attribute).
    pub title_link_selector: String,
    /// Container of the per-format download buttons inside a row.
    pub buttons_selector: String,
    /// Format label inside the buttons container.
    pub label_selector: String,
    /// Closest ancestor of a label that holds its anchor.
    pub download_selector: String,
    /// Anchor carrying the download URL.
    pub link_selector: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            title_selectors: vec![
                "h1#hibtext".to_string(),
                ".product-title-text".to_string(),
                ".heading-large".to_string(),
                "a#logo img".to_string(),
            ],
            row_selector: ".download-rows .row[data-human-name]".to_string(),
            title_link_selector: ".gameinfo .title a".to_string(),
            buttons_selector: ".download-buttons".to_string(),
            label_selector: "span.label".to_string(),
            download_selector: ".download".to_string(),
            link_selector: "a.a".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/hbh/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HbhConfig {
    /// Pages must start with this origin for the extractor to be injected.
    pub site_origin: String,
    /// Format selected when the popup opens.
    pub default_format: Format,
    /// Where downloads are written (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Save files under `<sanitized bundle name>/` instead of flat names.
    #[serde(default)]
    pub nest_by_bundle: bool,
    /// Give up waiting for the extractor's message after this many seconds (None = wait).
    #[serde(default)]
    pub message_timeout_secs: Option<u64>,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl Default for HbhConfig {
    fn default() -> Self {
        Self {
            site_origin: "https://www.humblebundle.com/".to_string(),
            default_format: Format::Pdf,
            download_dir: None,
            nest_by_bundle: false,
            message_timeout_secs: None,
            extractor: ExtractorConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hbh")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HbhConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HbhConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: HbhConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = HbhConfig::default();
        assert_eq!(cfg.site_origin, "https://www.humblebundle.com/");
        assert_eq!(cfg.default_format, Format::Pdf);
        assert!(!cfg.nest_by_bundle);
        assert!(cfg.message_timeout_secs.is_none());
        assert_eq!(cfg.extractor.title_selectors.len(), 4);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = HbhConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: HbhConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.site_origin, cfg.site_origin);
        assert_eq!(parsed.default_format, cfg.default_format);
        assert_eq!(parsed.extractor, cfg.extractor);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            site_origin = "https://example.com/"
            default_format = "epub"
            download_dir = "/tmp/books"
            nest_by_bundle = true
            message_timeout_secs = 10
        "#;
        let cfg: HbhConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.site_origin, "https://example.com/");
        assert_eq!(cfg.default_format, Format::Epub);
        assert_eq!(cfg.download_dir, Some(PathBuf::from("/tmp/books")));
        assert!(cfg.nest_by_bundle);
        assert_eq!(cfg.message_timeout_secs, Some(10));
        assert_eq!(cfg.extractor, ExtractorConfig::default());
    }

    #[test]
    fn config_toml_partial_extractor_section() {
        let toml = r#"
            site_origin = "https://www.humblebundle.com/"
            default_format = "pdf"

            [extractor]
            row_selector = ".rows .row"
        "#;
        let cfg: HbhConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.extractor.row_selector, ".rows .row");
        assert_eq!(cfg.extractor.link_selector, "a.a");
        assert_eq!(cfg.extractor.title_selectors[0], "h1#hibtext");
    }
}
