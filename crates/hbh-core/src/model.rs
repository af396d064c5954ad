//! Data carried from the extractor to the controller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bundle name the extractor reports when it could not run at all.
pub const ERROR_BUNDLE_NAME: &str = "Error Fetching";

/// Sanitized counterpart of [`ERROR_BUNDLE_NAME`].
pub const ERROR_SANITIZED_BUNDLE_NAME: &str = "Error_Bundle";

/// Bundle names that mean "extraction failed" rather than "empty page".
pub const ERROR_SENTINELS: &[&str] = &[ERROR_BUNDLE_NAME, "Not Found"];

/// Downloadable book format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Pdf,
    Epub,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Pdf, Format::Epub];

    /// Label as shown on the download buttons.
    pub fn label(self) -> &'static str {
        match self {
            Format::Pdf => "PDF",
            Format::Epub => "EPUB",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Epub => "epub",
        }
    }

    /// Matches a button label after trimming and upper-casing.
    pub fn from_label(label: &str) -> Option<Format> {
        match label.trim().to_uppercase().as_str() {
            "PDF" => Some(Format::Pdf),
            "EPUB" => Some(Format::Epub),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::from_label(s).ok_or_else(|| format!("unknown format: {s}"))
    }
}

/// One book in a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Sanitized book name, used as the file stem.
    pub book_name: String,
    pub pdf_url: Option<String>,
    pub epub_url: Option<String>,
}

impl Item {
    pub fn url(&self, format: Format) -> Option<&str> {
        match format {
            Format::Pdf => self.pdf_url.as_deref(),
            Format::Epub => self.epub_url.as_deref(),
        }
    }
}

/// Everything one extractor run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleInfo {
    /// Raw name for display.
    pub bundle_name: String,
    /// Name safe for path use.
    pub sanitized_bundle_name: String,
    pub items_data: Vec<Item>,
}

impl BundleInfo {
    /// Value reported when extraction could not be attempted.
    pub fn error_sentinel() -> Self {
        Self {
            bundle_name: ERROR_BUNDLE_NAME.to_string(),
            sanitized_bundle_name: ERROR_SANITIZED_BUNDLE_NAME.to_string(),
            items_data: Vec::new(),
        }
    }

    pub fn is_error_sentinel(&self) -> bool {
        ERROR_SENTINELS.contains(&self.bundle_name.as_str())
    }

    pub fn counts(&self) -> LinkCounts {
        LinkCounts {
            items: self.items_data.len(),
            pdf: self.items_data.iter().filter(|i| i.pdf_url.is_some()).count(),
            epub: self.items_data.iter().filter(|i| i.epub_url.is_some()).count(),
        }
    }

    /// Items carrying a link for `format`, in page order.
    pub fn items_with(&self, format: Format) -> impl Iterator<Item = &Item> {
        self.items_data.iter().filter(move |i| i.url(format).is_some())
    }
}

/// Item and per-format link counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkCounts {
    pub items: usize,
    pub pdf: usize,
    pub epub: usize,
}

impl LinkCounts {
    pub fn for_format(&self, format: Format) -> usize {
        match format {
            Format::Pdf => self.pdf,
            Format::Epub => self.epub,
        }
    }
}
