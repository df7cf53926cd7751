use std::path::Path;

use anyhow::Context;
use confique::Config as DeriveConfig;

/// Tool configuration, loadable from a TOML file via `--config`.
#[derive(Debug, DeriveConfig)]
pub struct Config {
    /// Run the location-index self-verification pass after parsing. The pass
    /// re-slices every tracked span twice, so it can be turned off for very
    /// large documents.
    #[config(default = true)]
    pub verify_locations: bool,

    /// Number of bytes of context shown around a syntax error site.
    #[config(default = 40)]
    pub snippet_radius: usize,
}

pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let builder = Config::builder();
    let config = match path {
        Some(path) => builder.file(path).load(),
        None => builder.load(),
    };
    config.context("failed to load configuration")
}
