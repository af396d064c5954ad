pub mod config;
pub mod logging;

pub mod controller;
pub mod download;
pub mod extractor;
pub mod fetch;
pub mod host;
pub mod message;
pub mod model;
pub mod sanitize;
