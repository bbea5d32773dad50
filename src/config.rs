//! Configuration management using the prefer crate for file discovery.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scrapers::browser::BrowserConfig;

/// Default CSV file name prefix.
pub const DEFAULT_FILE_PREFIX: &str = "booking_reviews_";

/// Default web server address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Default log directory, relative to the working directory.
const DEFAULT_LOG_DIR: &str = "logs";

/// Timing knobs for the crawl. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// Initial navigation and document readiness.
    pub load_timeout_ms: u64,
    /// Review cards appearing after load or a page change.
    pub render_timeout_ms: u64,
    /// Page content changing after a pagination click.
    pub page_change_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Pause after dismissing the cookie banner.
    pub consent_settle_ms: u64,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            load_timeout_ms: 30_000,
            render_timeout_ms: 15_000,
            page_change_timeout_ms: 10_000,
            poll_interval_ms: 250,
            consent_settle_ms: 500,
        }
    }
}

impl CrawlSettings {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn page_change_timeout(&self) -> Duration {
        Duration::from_millis(self.page_change_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn consent_settle(&self) -> Duration {
        Duration::from_millis(self.consent_settle_ms)
    }

    /// Short timeouts for driving snapshot pages in tests.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            load_timeout_ms: 100,
            render_timeout_ms: 50,
            page_change_timeout_ms: 50,
            poll_interval_ms: 5,
            consent_settle_ms: 0,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory CSV files are written to.
    pub output_dir: PathBuf,
    /// Prefix for CSV file names.
    pub file_prefix: String,
    /// Directory for the log file (None = stderr only).
    pub log_dir: Option<PathBuf>,
    /// Web server bind address.
    pub bind: String,
    pub browser: BrowserConfig,
    pub crawl: CrawlSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            log_dir: Some(PathBuf::from(DEFAULT_LOG_DIR)),
            bind: DEFAULT_BIND.to_string(),
            browser: BrowserConfig::default(),
            crawl: CrawlSettings::default(),
        }
    }
}

impl Settings {
    /// Create settings writing output to `output_dir`.
    pub fn with_output_dir(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Default::default()
        }
    }

    /// Apply environment variable overrides.
    ///
    /// `lookup` returns the value of a variable, if set.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(dir) = var("REVIEWHARVEST_OUTPUT_DIR") {
            tracing::debug!("Using REVIEWHARVEST_OUTPUT_DIR from environment: {}", dir);
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(bind) = var("REVIEWHARVEST_BIND") {
            tracing::debug!("Using REVIEWHARVEST_BIND from environment: {}", bind);
            self.bind = bind;
        }
        if let Some(url) = var("CHROME_REMOTE_URL") {
            tracing::debug!("Using CHROME_REMOTE_URL from environment: {}", url);
            self.browser.remote_url = Some(url);
        }
        if let Some(path) = var("CHROME_PATH") {
            tracing::debug!("Using CHROME_PATH from environment: {}", path);
            self.browser.chrome_path = Some(PathBuf::from(path));
        }
        if let Some(headless) = var("REVIEWHARVEST_HEADLESS") {
            self.browser.headless =
                !(headless == "0" || headless.eq_ignore_ascii_case("false"));
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory CSV files are written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// CSV file name prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_prefix: Option<String>,
    /// Log directory; an empty string disables the log file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
    /// Web server bind address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl: Option<CrawlSettings>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers reviewharvest config files in standard locations.
    pub async fn load() -> Self {
        // Use prefer for file discovery, then parse with serde
        match prefer::load("reviewharvest").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let path = Path::new(path_str);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// `base_dir` is used to resolve relative paths (typically config file dir or CWD).
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref output_dir) = self.output_dir {
            settings.output_dir = self.resolve_path(output_dir, base_dir);
        }
        if let Some(ref prefix) = self.file_prefix {
            settings.file_prefix = prefix.clone();
        }
        if let Some(ref log_dir) = self.log_dir {
            settings.log_dir = if log_dir.is_empty() {
                None
            } else {
                Some(self.resolve_path(log_dir, base_dir))
            };
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(ref browser) = self.browser {
            settings.browser = browser.clone();
        }
        if let Some(ref crawl) = self.crawl {
            settings.crawl = crawl.clone();
        }
    }
}

/// Options controlling where configuration comes from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file (--config).
    pub config_path: Option<PathBuf>,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await.unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Config::default()
        }),
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);

    // Environment variables take precedence over the config file
    settings.apply_env_overrides(|name| std::env::var(name).ok());

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert_eq!(settings.file_prefix, "booking_reviews_");
        assert_eq!(settings.log_dir, Some(PathBuf::from("logs")));
        assert_eq!(settings.bind, "127.0.0.1:5000");
        assert!(settings.browser.headless);
        assert_eq!(settings.crawl.poll_interval(), Duration::from_millis(250));
        assert_eq!(settings.crawl.page_change_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_formats() {
        let toml = Config::parse(
            "output_dir = \"out\"\n[crawl]\nrender_timeout_ms = 2000\n",
            "toml",
        )
        .unwrap();
        assert_eq!(toml.output_dir.as_deref(), Some("out"));
        let crawl = toml.crawl.unwrap();
        assert_eq!(crawl.render_timeout_ms, 2000);
        // Unset crawl fields keep their defaults
        assert_eq!(crawl.poll_interval_ms, 250);

        let yaml = Config::parse("file_prefix: reviews_\n", "yml").unwrap();
        assert_eq!(yaml.file_prefix.as_deref(), Some("reviews_"));

        let json = Config::parse(r#"{"bind": "0.0.0.0:8080"}"#, "json").unwrap();
        assert_eq!(json.bind.as_deref(), Some("0.0.0.0:8080"));

        assert!(Config::parse("not = [valid", "toml").is_err());
    }

    #[test]
    fn test_apply_to_settings_resolves_relative_paths() {
        let config = Config {
            output_dir: Some("csv".to_string()),
            log_dir: Some(String::new()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/etc/reviewharvest"));
        assert_eq!(settings.output_dir, PathBuf::from("/etc/reviewharvest/csv"));
        assert_eq!(settings.log_dir, None);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("REVIEWHARVEST_OUTPUT_DIR", "/tmp/out"),
            ("REVIEWHARVEST_BIND", "0.0.0.0:9000"),
            ("CHROME_REMOTE_URL", "ws://localhost:9222"),
            ("CHROME_PATH", ""),
            ("REVIEWHARVEST_HEADLESS", "false"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.bind, "0.0.0.0:9000");
        assert_eq!(
            settings.browser.remote_url.as_deref(),
            Some("ws://localhost:9222")
        );
        // Empty values are ignored
        assert_eq!(settings.browser.chrome_path, None);
        assert!(!settings.browser.headless);
    }

    #[tokio::test]
    async fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviewharvest.toml");
        std::fs::write(&path, "output_dir = \"exports\"\n").unwrap();

        let (settings, config) = load_settings_with_options(LoadOptions {
            config_path: Some(path.clone()),
        })
        .await;
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));
        assert_eq!(settings.output_dir, dir.path().join("exports"));
    }
}
