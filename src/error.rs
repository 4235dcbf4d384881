//! Extraction error types

use crate::browser::BrowserError;
use std::time::Duration;
use thiserror::Error;

/// Why a stream link could not be produced.
///
/// Every variant is terminal for the invocation; nothing is retried.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input did not parse as an absolute URL. Carries the original input.
    #[error("Invalid URL: {0}")]
    InvalidInput(String),

    /// No manifest request was observed before the deadline.
    #[error(
        "Unable to get stream link: Timed out waiting for \"index.mpd\" file after {}ms",
        .0.as_millis()
    )]
    Timeout(Duration),

    /// Browser launch, navigation or event subscription failed.
    #[error("Unable to get stream link: {0}")]
    Session(#[from] BrowserError),

    #[error("Failed to read URL from stdin: {0}")]
    Stdin(#[from] std::io::Error),
}
