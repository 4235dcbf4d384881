//! Outgoing request observation

use super::session::BrowserError;
use chromiumoxide::cdp::browser_protocol::network::EventRequestWillBeSent;
use chromiumoxide::Page;
use futures::{Stream, StreamExt};
use url::Url;

/// Path suffix of a DASH manifest request.
pub const MANIFEST_SUFFIX: &str = "/index.mpd";

/// Subscribe to the page's outgoing requests and yield their URLs.
///
/// The subscription is registered by the time this returns, so requests
/// issued by a navigation started afterwards are all delivered.
pub async fn request_urls(
    page: &Page,
) -> Result<impl Stream<Item = String> + Send + 'static, BrowserError> {
    let events = page.event_listener::<EventRequestWillBeSent>().await?;
    Ok(events.map(|event| {
        tracing::trace!(url = %event.request.url, "Request observed");
        event.request.url.clone()
    }))
}

/// True if `request_url` points at a DASH manifest.
///
/// Matches on the URL path so query strings and fragments don't hide the
/// manifest. Strings that don't parse fall back to a raw suffix check.
pub fn is_manifest_request(request_url: &str) -> bool {
    match Url::parse(request_url) {
        Ok(url) => url.path().ends_with(MANIFEST_SUFFIX),
        Err(_) => request_url.ends_with(MANIFEST_SUFFIX),
    }
}
