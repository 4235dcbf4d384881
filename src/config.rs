//! Runtime configuration from the environment and command line

use crate::browser::{default_cache_dir, BrowserOptions};
use crate::cli::Cli;
use std::path::PathBuf;

/// Browser settings from the environment, overridden by command-line flags.
///
/// The timeout is not here: it always comes from `--timeout`, whose default
/// lives on the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub browser: BrowserOptions,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let executable = lookup("STREAM_LINK_CHROME")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        let cache_dir = lookup("STREAM_LINK_CACHE_DIR")
            .filter(|s| !s.is_empty())
            .map_or_else(default_cache_dir, PathBuf::from);
        let allow_download = !lookup("STREAM_LINK_NO_DOWNLOAD").is_some_and(|v| is_truthy(&v));

        Self {
            browser: BrowserOptions {
                executable,
                cache_dir,
                allow_download,
            },
        }
    }

    /// Apply command-line flags on top of the environment.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(chrome) = &cli.chrome {
            self.browser.executable = Some(chrome.clone());
        }
        if cli.no_download {
            self.browser.allow_download = false;
        }
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
