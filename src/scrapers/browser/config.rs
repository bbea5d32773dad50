//! Browser launch configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Desktop Chrome fingerprint sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Browser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Window size as (width, height).
    #[serde(default = "default_window_size")]
    pub window_size: (u32, u32),

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Chrome executable to use instead of searching for one.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Browser launch / connect timeout in seconds.
    #[serde(default = "default_launch_timeout")]
    pub launch_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            window_size: default_window_size(),
            user_agent: default_user_agent(),
            chrome_args: Vec::new(),
            chrome_path: None,
            remote_url: None,
            launch_timeout_secs: default_launch_timeout(),
        }
    }
}

pub fn default_headless() -> bool {
    true
}

fn default_window_size() -> (u32, u32) {
    (1920, 1080)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_launch_timeout() -> u64 {
    60
}
