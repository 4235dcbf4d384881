//! Browser session lifecycle
//!
//! One headless Chromium per extraction, with a private throwaway profile
//! so cookies and storage never carry over between runs.

use chromiumoxide::{
    browser::{Browser, BrowserConfig},
    fetcher::{BrowserFetcher, BrowserFetcherOptions},
    handler::viewport::Viewport,
    Page,
};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Extra Chrome flags.
///
/// Site isolation is off so cross-origin iframes render in the page's own
/// target; their requests then reach the page's network listener instead of
/// a separately attached child session.
const LAUNCH_ARGS: &[&str] = &[
    "--disable-gpu",
    "--disable-software-rasterizer",
    "--mute-audio",
    "--autoplay-policy=no-user-gesture-required",
    "--disable-site-isolation-trials",
    "--disable-features=IsolateOrigins,site-per-process",
];

/// Default viewport dimensions
const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
const DEFAULT_VIEWPORT_HEIGHT: u32 = 720;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Browser operation failed: {0}")]
    OperationFailed(String),

    #[error("Navigation to {url} failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("Browser stopped reporting requests before a manifest request was seen")]
    RequestStreamClosed,
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        BrowserError::OperationFailed(e.to_string())
    }
}

/// Where the browser binary comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Explicit Chrome/Chromium executable. When set, no fallback is tried.
    pub executable: Option<PathBuf>,
    /// Cache for a fetched Chromium.
    pub cache_dir: PathBuf,
    /// Download Chromium when no system browser launches.
    pub allow_download: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            executable: None,
            cache_dir: default_cache_dir(),
            allow_download: true,
        }
    }
}

/// Directory where the fetcher caches downloaded Chrome binaries
pub fn default_cache_dir() -> PathBuf {
    let base = std::env::var("HOME").map_or_else(|_| PathBuf::from("/tmp"), PathBuf::from);
    base.join(".cache/stream-link/chromium")
}

/// A launched browser with one page, owned by a single extraction.
///
/// Call [`BrowserSession::close`] to shut it down; if it is dropped without
/// closing, chromiumoxide kills the child process and the profile directory
/// is removed.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    profile: Option<TempDir>,
    closed: bool,
}

impl BrowserSession {
    /// Build a `BrowserConfig` with optional explicit Chrome executable path
    fn browser_config(
        profile: &Path,
        executable: Option<&Path>,
    ) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .new_headless_mode()
            .no_sandbox()
            .args(LAUNCH_ARGS.iter().copied())
            .user_data_dir(profile)
            .viewport(Viewport {
                width: DEFAULT_VIEWPORT_WIDTH,
                height: DEFAULT_VIEWPORT_HEIGHT,
                device_scale_factor: Some(1.0),
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            });

        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(BrowserError::LaunchFailed)
    }

    /// Launch browser with a fresh profile and open a blank page
    async fn launch_and_init(executable: Option<&Path>) -> Result<Self, BrowserError> {
        let profile = tempfile::Builder::new()
            .prefix("stream-link-chrome-")
            .tempdir()
            .map_err(|e| BrowserError::LaunchFailed(format!("Failed to create profile dir: {e}")))?;

        let config = Self::browser_config(profile.path(), executable)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::warn!("CDP handler error: {e}");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(BrowserError::LaunchFailed(e.to_string()));
            }
        };

        tracing::debug!(profile = %profile.path().display(), "Browser launched");

        Ok(Self {
            browser,
            handler_task,
            page,
            profile: Some(profile),
            closed: false,
        })
    }

    /// Launch a headless browser session.
    ///
    /// Uses the configured executable if there is one. Otherwise tries system
    /// Chrome first and, when downloads are allowed, falls back to a Chromium
    /// fetched into the cache directory.
    pub async fn launch(options: &BrowserOptions) -> Result<Self, BrowserError> {
        if let Some(path) = options.executable.as_deref() {
            tracing::debug!(executable = %path.display(), "Launching configured browser");
            return Self::launch_and_init(Some(path)).await;
        }

        // 1. Try system Chrome (no explicit executable, chromiumoxide finds it)
        let system_err = match Self::launch_and_init(None).await {
            Ok(session) => return Ok(session),
            Err(e) => e,
        };

        if !options.allow_download {
            return Err(system_err);
        }
        tracing::info!("System Chrome not available ({system_err}), trying fetcher...");

        // 2. Download / use cached Chrome via fetcher
        let cache_dir = &options.cache_dir;
        tracing::info!("Downloading Chrome to {cache_dir:?} (first run only)...");

        tokio::fs::create_dir_all(cache_dir).await.map_err(|e| {
            BrowserError::LaunchFailed(format!(
                "Failed to create cache dir {}: {e}",
                cache_dir.display()
            ))
        })?;

        let fetcher_opts = BrowserFetcherOptions::builder()
            .with_path(cache_dir)
            .build()
            .map_err(|e| BrowserError::LaunchFailed(format!("Fetcher config error: {e}")))?;

        let info = BrowserFetcher::new(fetcher_opts)
            .fetch()
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("Chrome download failed: {e:#}")))?;

        tracing::info!("Using Chrome at {:?}", info.executable_path);

        Self::launch_and_init(Some(&info.executable_path)).await
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate the page and wait for it to finish loading.
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        tracing::debug!(url, "Navigating");
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Shut the browser down and remove the profile. Idempotent.
    ///
    /// Failures are logged, never returned: by the time a session is closed
    /// the caller already holds its result.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "Browser.close failed, killing process");
            if let Err(e) = self.browser.kill().await.transpose() {
                tracing::warn!(error = %e, "Failed to kill browser process");
            }
        }
        match self.browser.wait().await {
            Ok(status) => tracing::debug!(?status, "Browser exited"),
            Err(e) => tracing::warn!(error = %e, "Failed waiting for browser exit"),
        }
        self.handler_task.abort();

        if let Some(profile) = self.profile.take() {
            let path = profile.path().to_path_buf();
            if let Err(e) = profile.close() {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove browser profile");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.is_closed() {
            tracing::debug!("Browser session dropped without close");
            self.handler_task.abort();
        }
    }
}
