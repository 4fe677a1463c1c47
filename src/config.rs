//! Configuration
//!
//! Loaded in order of precedence:
//! 1. Command-line flags (highest priority, applied by the binary)
//! 2. Environment variables (`LIVEFEED_*`)
//! 3. Config file (~/.config/livefeed/config.toml)
//! 4. Built-in defaults (lowest priority)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_URL: &str = "https://feeds.bbci.co.uk/news/rss.xml";

// ─────────────────────────────────────────────────────────────────────────────
// Resolved configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Feed URL to load
    pub url: String,

    /// Label shown next to every item
    pub label: String,

    /// Items per page served by the source
    pub page_size: usize,

    /// How often the source polls for push updates
    pub poll_interval: Duration,

    /// Quiet window before push updates are applied
    pub debounce_delay: Duration,

    /// HTTP timeout for a single request
    pub request_timeout: Duration,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default filter level when RUST_LOG is unset
    pub level: String,
    /// Also write JSON logs to rolling files
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            label: "RSS".to_string(),
            page_size: 20,
            poll_interval: Duration::from_secs(60),
            debounce_delay: crate::debounce::DEFAULT_DELAY,
            request_timeout: Duration::from_secs(15),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_prefix: "livefeed.log".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File representation (every field optional)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub label: Option<String>,
    pub page_size: Option<usize>,
    pub poll_secs: Option<u64>,
    pub debounce_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: FileLogging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<PathBuf>,
    pub file_prefix: Option<String>,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub label: Option<String>,
    pub page_size: Option<usize>,
    pub poll_secs: Option<u64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// ~/.config/livefeed/config.toml, Unix-style on every platform.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("livefeed").join("config.toml"))
    }

    /// Read a config file. A missing file yields defaults; a broken one is
    /// an error, so a typo never silently falls back.
    pub fn load_file(path: &Path) -> Result<FileConfig> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e).with_context(|| format!("cannot read config file {}", path.display())),
        }
    }

    /// Config file, then environment, then defaults.
    pub fn load() -> Result<Self> {
        let file = match Self::config_path() {
            Some(path) => Self::load_file(&path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with environment lookups over the defaults.
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let url = env("LIVEFEED_URL").or(file.url).unwrap_or(defaults.url);
        let label = file.label.unwrap_or(defaults.label);

        let page_size = match env("LIVEFEED_PAGE_SIZE") {
            Some(v) => v.parse().with_context(|| format!("LIVEFEED_PAGE_SIZE is not a number: {v}"))?,
            None => file.page_size.unwrap_or(defaults.page_size),
        };

        let poll_interval = match env("LIVEFEED_POLL_SECS") {
            Some(v) => Duration::from_secs(
                v.parse().with_context(|| format!("LIVEFEED_POLL_SECS is not a number: {v}"))?,
            ),
            None => file.poll_secs.map(Duration::from_secs).unwrap_or(defaults.poll_interval),
        };

        let debounce_delay = file
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce_delay);
        let request_timeout = file
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let logging = LoggingConfig {
            level: env("LIVEFEED_LOG_LEVEL")
                .or(file.logging.level)
                .unwrap_or(defaults.logging.level),
            file_enabled: file.logging.file_enabled.unwrap_or(defaults.logging.file_enabled),
            file_dir: file.logging.file_dir.unwrap_or(defaults.logging.file_dir),
            file_prefix: file.logging.file_prefix.unwrap_or(defaults.logging.file_prefix),
        };

        let config = Self {
            url,
            label,
            page_size,
            poll_interval,
            debounce_delay,
            request_timeout,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line values on top.
    pub fn apply(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(url) = overrides.url {
            self.url = url;
        }
        if let Some(label) = overrides.label {
            self.label = label;
        }
        if let Some(page_size) = overrides.page_size {
            self.page_size = page_size;
        }
        if let Some(secs) = overrides.poll_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.page_size > 0, "page_size must be at least 1");
        anyhow::ensure!(!self.poll_interval.is_zero(), "poll interval must be at least 1 second");
        anyhow::ensure!(!self.url.trim().is_empty(), "feed url is empty");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::resolve(FileConfig::default(), no_env).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            url = "https://example.com/feed.xml"
            label = "Community"
            page_size = 5
            debounce_ms = 100

            [logging]
            level = "debug"
            file_enabled = true
            "#,
        )
        .unwrap();

        let config = Config::resolve(file, no_env).unwrap();
        assert_eq!(config.url, "https://example.com/feed.xml");
        assert_eq!(config.label, "Community");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.debounce_delay, Duration::from_millis(100));
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file_enabled);
    }

    #[test]
    fn env_beats_file() {
        let file = FileConfig {
            url: Some("https://file.example/feed".into()),
            page_size: Some(5),
            ..FileConfig::default()
        };
        let env = env_of(&[("LIVEFEED_URL", "https://env.example/feed"), ("LIVEFEED_PAGE_SIZE", "7")]);

        let config = Config::resolve(file, env).unwrap();
        assert_eq!(config.url, "https://env.example/feed");
        assert_eq!(config.page_size, 7);
    }

    #[test]
    fn bad_env_number_is_an_error() {
        let env = env_of(&[("LIVEFEED_POLL_SECS", "soon")]);
        assert!(Config::resolve(FileConfig::default(), env).is_err());
    }

    #[test]
    fn overrides_beat_everything() {
        let config = Config::resolve(FileConfig::default(), env_of(&[("LIVEFEED_URL", "https://env")]))
            .unwrap()
            .apply(Overrides {
                url: Some("https://cli".into()),
                poll_secs: Some(5),
                ..Overrides::default()
            })
            .unwrap();

        assert_eq!(config.url, "https://cli");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let result = Config::default().apply(Overrides {
            page_size: Some(0),
            ..Overrides::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = Config::load_file(&dir.path().join("absent.toml")).unwrap();
        assert!(file.url.is_none());
    }

    #[test]
    fn broken_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = \"many\"").unwrap();
        assert!(Config::load_file(file.path()).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "colour = \"blue\"").unwrap();
        assert!(Config::load_file(file.path()).is_err());
    }
}
