//! Tests for inspect, extract and sanitize.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_inspect() {
    match parse(&["hbh", "inspect", "page.html"]) {
        CliCommand::Inspect { source, page_url } => {
            assert_eq!(source, "page.html");
            assert!(page_url.is_none());
        }
        _ => panic!("expected Inspect"),
    }
}

#[test]
fn cli_parse_extract_page_url() {
    match parse(&[
        "hbh",
        "extract",
        "page.html",
        "--page-url",
        "https://www.humblebundle.com/downloads",
    ]) {
        CliCommand::Extract { source, page_url } => {
            assert_eq!(source, "page.html");
            assert_eq!(page_url.as_deref(), Some("https://www.humblebundle.com/downloads"));
        }
        _ => panic!("expected Extract"),
    }
}

#[test]
fn cli_parse_sanitize() {
    match parse(&["hbh", "sanitize", "a/b", "c?d"]) {
        CliCommand::Sanitize { names } => assert_eq!(names, ["a/b", "c?d"]),
        _ => panic!("expected Sanitize"),
    }
}

#[test]
fn cli_parse_sanitize_requires_names() {
    assert!(Cli::try_parse_from(["hbh", "sanitize"]).is_err());
}
