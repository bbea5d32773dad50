//! Live browser session driven over the Chrome DevTools Protocol.
//!
//! Uses chromiumoxide to launch (or attach to) Chrome and exposes the single
//! page it opens through the [`ElementLocator`](super::locator::ElementLocator)
//! and [`PageSession`](super::locator::PageSession) traits.

mod config;
#[cfg(feature = "browser")]
mod locator;

pub use config::{BrowserConfig, DEFAULT_USER_AGENT};

#[cfg(feature = "browser")]
use std::path::{Path, PathBuf};
#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig as CdpConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

use crate::error::ScrapeError;

/// One browser with one page, alive for a single scrape.
#[cfg(feature = "browser")]
pub struct BrowserSession {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    /// Attached to an existing browser rather than launched by us.
    remote: bool,
    load_timeout: Duration,
}

#[cfg(feature = "browser")]
impl BrowserSession {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Launch (or connect to) a browser and open a blank page.
    ///
    /// `load_timeout` bounds each later [`open`](super::locator::PageSession::open).
    pub async fn launch(config: &BrowserConfig, load_timeout: Duration) -> Result<Self, ScrapeError> {
        let (browser, handler, remote) = match config.remote_url {
            Some(ref url) => {
                let (browser, handler) = Self::connect_remote(url, config).await?;
                (browser, handler, true)
            }
            None => {
                let (browser, handler) = Self::launch_local(config).await?;
                (browser, handler, false)
            }
        };

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(ScrapeError::Session(format!("Failed to open page: {}", e)));
            }
        };

        // Set user agent before any navigation
        if let Err(e) = page
            .execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await
        {
            warn!("Failed to set user agent: {}", e);
        }

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            remote,
            load_timeout,
        })
    }

    /// Find Chrome executable.
    fn find_chrome(configured: Option<&Path>) -> Result<PathBuf, ScrapeError> {
        if let Some(path) = configured {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            warn!("Configured Chrome not found at {}", path.display());
        }

        for path in Self::CHROME_PATHS {
            let p = Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in [
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(ScrapeError::Session(
            "Chrome/Chromium not found. Please install it:\n\
             - Arch/Manjaro: sudo pacman -S chromium\n\
             - Ubuntu/Debian: sudo apt install chromium-browser\n\
             - Fedora: sudo dnf install chromium\n\
             - Or set CHROME_PATH / CHROME_REMOTE_URL"
                .to_string(),
        ))
    }

    async fn launch_local(config: &BrowserConfig) -> Result<(Browser, JoinHandle<()>), ScrapeError> {
        info!("Launching browser (headless={})", config.headless);

        let chrome_path = Self::find_chrome(config.chrome_path.as_deref())?;
        let (width, height) = config.window_size;

        let mut builder = CdpConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(width, height)
            .launch_timeout(Duration::from_secs(config.launch_timeout_secs));

        // with_head means NOT headless
        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg(format!("--user-agent={}", config.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| ScrapeError::Session(format!("Failed to build browser config: {}", e)))?;

        let (browser, handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| ScrapeError::Session(format!("Failed to launch browser: {}", e)))?;

        Ok((browser, spawn_handler(handler)))
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(
        url: &str,
        config: &BrowserConfig,
    ) -> Result<(Browser, JoinHandle<()>), ScrapeError> {
        info!("Connecting to remote browser at {}", url);
        let timeout = Duration::from_secs(config.launch_timeout_secs);

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScrapeError::Session(e.to_string()))?;
        let resp: serde_json::Value = client
            .get(&version_url)
            .send()
            .await
            .map_err(|e| ScrapeError::Session(format!("Failed to connect to remote browser: {}", e)))?
            .json()
            .await
            .map_err(|e| ScrapeError::Session(format!("Failed to parse browser version info: {}", e)))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ScrapeError::Session("No webSocketDebuggerUrl in response".to_string()))?;

        info!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: timeout,
            ..Default::default()
        };

        let (browser, handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| ScrapeError::Session(format!("Failed to connect to remote browser: {}", e)))?;

        Ok((browser, spawn_handler(handler)))
    }

    pub(crate) fn page(&self) -> &Page {
        &self.page
    }

    pub(crate) fn load_timeout(&self) -> Duration {
        self.load_timeout
    }

    /// Close the page and the browser and stop the handler task.
    pub(crate) async fn shutdown(&self) {
        if let Err(e) = self.page.clone().close().await {
            debug!("Page close error: {}", e);
        }

        // Leave browsers we merely attached to running
        if !self.remote {
            let mut browser = self.browser.lock().await;
            if let Err(e) = browser.close().await {
                warn!("Browser close error: {}", e);
            }
            let _ = browser.wait().await;
        }

        self.handler.abort();
        info!("Browser closed");
    }
}

#[cfg(feature = "browser")]
impl Drop for BrowserSession {
    fn drop(&mut self) {
        // A launched Browser kills its process on drop; the handler needs stopping
        self.handler.abort();
    }
}

#[cfg(feature = "browser")]
fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserSession;

#[cfg(not(feature = "browser"))]
impl BrowserSession {
    pub async fn launch(
        _config: &BrowserConfig,
        _load_timeout: std::time::Duration,
    ) -> Result<Self, ScrapeError> {
        Err(ScrapeError::Session(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        ))
    }
}
