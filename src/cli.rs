//! Command-line front end

use crate::config::Config;
use crate::error::ExtractError;
use crate::extractor::{get_stream_link, DEFAULT_TIMEOUT_MS};
use crate::logging::LogFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Get the stream link for a given video player URL.
#[derive(Debug, Parser)]
#[command(name = "stream-link", version)]
#[command(about = "Get the stream link for a given video player URL", long_about = None)]
pub struct Cli {
    /// Player page URL. Omit or pass `-` to read one line from stdin.
    pub url: Option<String>,

    /// Timeout in milliseconds.
    #[arg(short, long, value_name = "TIMEOUT", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Chrome/Chromium executable (overrides `STREAM_LINK_CHROME`).
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Never download Chromium when no system browser is found.
    #[arg(long)]
    pub no_download: bool,

    /// More log output on stderr (repeat for more).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Resolve the URL, run the extraction, and return the stream link.
    pub async fn run(&self) -> Result<String, ExtractError> {
        let config = Config::from_env().with_cli(self);
        let url = resolve_url(self.url.as_deref(), BufReader::new(tokio::io::stdin())).await?;
        tracing::debug!(url = %url, timeout_ms = self.timeout, "Resolved input");
        get_stream_link(&url, Duration::from_millis(self.timeout), &config.browser).await
    }
}

/// The positional URL, or one trimmed line of `input` if it is absent or `-`.
pub async fn resolve_url<R>(arg: Option<&str>, mut input: R) -> std::io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    match arg {
        Some(url) if url != "-" => Ok(url.to_string()),
        _ => {
            let mut line = String::new();
            input.read_line(&mut line).await?;
            Ok(line.trim().to_string())
        }
    }
}
