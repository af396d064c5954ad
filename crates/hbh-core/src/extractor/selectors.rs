//! Compiled CSS selectors for one extraction.

use crate::config::ExtractorConfig;
use scraper::Selector;

#[derive(Debug, thiserror::Error)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

fn compile(selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug)]
pub struct Selectors {
    pub titles: Vec<Selector>,
    pub document_title: Selector,
    pub row: Selector,
    pub title_link: Selector,
    pub buttons: Selector,
    pub label: Selector,
    pub download: Selector,
    pub link: Selector,
}

impl Selectors {
    pub fn compile(cfg: &ExtractorConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            titles: cfg
                .title_selectors
                .iter()
                .map(|s| compile(s))
                .collect::<Result<_, _>>()?,
            document_title: compile("title")?,
            row: compile(&cfg.row_selector)?,
            title_link: compile(&cfg.title_link_selector)?,
            buttons: compile(&cfg.buttons_selector)?,
            label: compile(&cfg.label_selector)?,
            download: compile(&cfg.download_selector)?,
            link: compile(&cfg.link_selector)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selectors_compile() {
        let sel = Selectors::compile(&ExtractorConfig::default()).unwrap();
        assert_eq!(sel.titles.len(), 4);
    }

    #[test]
    fn bad_selector_is_reported() {
        let cfg = ExtractorConfig {
            row_selector: "div[".to_string(),
            ..ExtractorConfig::default()
        };
        let err = Selectors::compile(&cfg).unwrap_err();
        assert_eq!(err.selector, "div[");
    }
}
