//! Player URL normalization

use crate::error::ExtractError;
use url::Url;

/// Query parameter that makes the player start without a click.
const AUTOPLAY_PARAM: &str = "autoplay";

/// Parse `input` as an absolute URL and make sure it carries `autoplay`.
///
/// An existing `autoplay` pair is kept as-is whatever its value; otherwise
/// `autoplay=true` is appended after the existing pairs.
pub fn normalize_url(input: &str) -> Result<String, ExtractError> {
    let mut url = Url::parse(input).map_err(|e| {
        tracing::debug!(input, error = %e, "URL failed to parse");
        ExtractError::InvalidInput(input.to_string())
    })?;

    let has_autoplay = url.query_pairs().any(|(key, _)| key == AUTOPLAY_PARAM);
    if !has_autoplay {
        url.query_pairs_mut().append_pair(AUTOPLAY_PARAM, "true");
    }

    Ok(url.into())
}
