//! CLI for the Humble Bundle bulk downloader.

mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use hbh_core::config;
use hbh_core::model::Format;
use std::path::PathBuf;

use commands::{run_download, run_extract, run_inspect, run_sanitize};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hbh")]
#[command(
    about = "Bulk-download PDF/EPUB files from a Humble Bundle downloads page",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Book format selector (mutually exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Pdf,
    Epub,
}

impl From<FormatArg> for Format {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Pdf => Format::Pdf,
            FormatArg::Epub => Format::Epub,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show bundle name, item counts and link status for a page.
    Inspect {
        /// Downloads page URL (http/https) or a saved HTML file.
        source: String,
        /// URL a saved page was taken from (site check and relative links).
        #[arg(long, value_name = "URL")]
        page_url: Option<String>,
    },

    /// Print the extractor's message as JSON.
    Extract {
        /// Downloads page URL (http/https) or a saved HTML file.
        source: String,
        /// URL a saved page was taken from (relative links).
        #[arg(long, value_name = "URL")]
        page_url: Option<String>,
    },

    /// Download every item that has a link in the chosen format.
    Download {
        /// Downloads page URL (http/https) or a saved HTML file.
        source: String,
        /// Format to download (default from config).
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Directory to save into (default from config, else current directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// URL a saved page was taken from (site check and relative links).
        #[arg(long, value_name = "URL")]
        page_url: Option<String>,
        /// Do not ask for confirmation.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show how names would be turned into filenames.
    Sanitize {
        /// Names to sanitize.
        #[arg(required = true)]
        names: Vec<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Inspect { source, page_url } => {
                run_inspect(&cfg, &source, page_url.as_deref()).await?
            }
            CliCommand::Extract { source, page_url } => {
                run_extract(&cfg, &source, page_url.as_deref()).await?
            }
            CliCommand::Download {
                source,
                format,
                dir,
                page_url,
                yes,
            } => {
                let dir = match dir.or_else(|| cfg.download_dir.clone()) {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                let format = format.map(Format::from).unwrap_or(cfg.default_format);
                run_download(&cfg, &source, page_url.as_deref(), format, &dir, yes).await?;
            }
            CliCommand::Sanitize { names } => run_sanitize(&names),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
