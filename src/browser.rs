//! Headless browser automation over the Chrome `DevTools` Protocol

mod observer;
mod session;


pub use observer::{is_manifest_request, request_urls};
pub use session::{default_cache_dir, BrowserError, BrowserOptions, BrowserSession};
