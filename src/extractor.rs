//! Stream link extraction: load the player, catch the manifest request

use crate::browser::{self, BrowserError, BrowserOptions, BrowserSession};
use crate::error::ExtractError;
use crate::normalize::normalize_url;
use crate::race::{first_match, Outcome};
use std::time::Duration;

/// Default wait for the manifest request, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Load `url` in a fresh headless browser and return the URL of the first
/// request whose path ends with `/index.mpd`.
///
/// The browser is closed before this returns, whatever the outcome.
pub async fn get_stream_link(
    url: &str,
    timeout: Duration,
    options: &BrowserOptions,
) -> Result<String, ExtractError> {
    let url = normalize_url(url)?;

    let mut session = BrowserSession::launch(options).await?;
    let result = watch_for_manifest(&session, &url, timeout).await;
    session.close().await;

    match &result {
        Ok(link) => tracing::info!(stream_link = %link, "Manifest request intercepted"),
        Err(e) => tracing::debug!(error = %e, "Extraction failed"),
    }
    result
}

async fn watch_for_manifest(
    session: &BrowserSession,
    url: &str,
    timeout: Duration,
) -> Result<String, ExtractError> {
    // Subscribe before navigating so no early request slips past.
    let requests = browser::request_urls(session.page()).await?;

    session.navigate(url).await?;
    tracing::debug!(url, ?timeout, "Page loaded, waiting for manifest request");

    match first_match(requests, |u: &String| browser::is_manifest_request(u), timeout).await {
        Outcome::Matched(link) => Ok(link),
        Outcome::Elapsed(waited) => Err(ExtractError::Timeout(waited)),
        Outcome::Closed => Err(BrowserError::RequestStreamClosed.into()),
    }
}
