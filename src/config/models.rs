// src/config/models.rs
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MONITOR_SITE_URL: &str = "https://smal82.netsons.org";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_CONTENT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MONITOR_TIMEOUT_SECS: u64 = 5;

/// Flat key set as it arrives from the file and environment layers.
/// Environment names are lower-cased by the `config` crate, so
/// `WORDPRESS_API_BASE_URL` lands in `wordpress_api_base_url`.
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub secret_key: Option<String>,

    #[serde(default)]
    pub wordpress_api_base_url: Option<String>,

    #[serde(default = "default_monitor_site_url")]
    pub monitor_site_url: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_content_timeout_secs")]
    pub content_timeout_secs: u64,

    #[serde(default = "default_monitor_timeout_secs")]
    pub monitor_timeout_secs: u64,

    #[serde(default)]
    pub metrics_enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

fn default_monitor_site_url() -> String {
    DEFAULT_MONITOR_SITE_URL.to_string()
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_content_timeout_secs() -> u64 {
    DEFAULT_CONTENT_TIMEOUT_SECS
}

fn default_monitor_timeout_secs() -> u64 {
    DEFAULT_MONITOR_TIMEOUT_SECS
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

/// Immutable process configuration, built once before serving.
#[derive(Clone)]
pub struct Config {
    pub secret_key: Option<String>,
    pub wordpress_api_base_url: Url,
    /// Monitored site exactly as configured; reported back in monitor bodies.
    pub monitor_site: String,
    pub monitor_site_url: Url,
    pub listen_addr: SocketAddr,
    pub content_timeout: Duration,
    pub monitor_timeout: Duration,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Config {
    /// Defaults for everything except the content API base URL.
    pub fn new(wordpress_api_base_url: Url) -> Self {
        Self {
            secret_key: None,
            wordpress_api_base_url,
            monitor_site: DEFAULT_MONITOR_SITE_URL.to_string(),
            monitor_site_url: Url::parse(DEFAULT_MONITOR_SITE_URL)
                .expect("default monitor URL is valid"),
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .expect("default listen address is valid"),
            content_timeout: Duration::from_secs(DEFAULT_CONTENT_TIMEOUT_SECS),
            monitor_timeout: Duration::from_secs(DEFAULT_MONITOR_TIMEOUT_SECS),
            metrics: MetricsConfig {
                enabled: false,
                port: default_metrics_port(),
                path: default_metrics_path(),
            },
        }
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = anyhow::Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let base = match raw.wordpress_api_base_url.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => bail!("WORDPRESS_API_BASE_URL is not set"),
        };
        let wordpress_api_base_url =
            parse_http_url(base).context("WORDPRESS_API_BASE_URL is not a valid http(s) URL")?;

        let monitor_site = raw.monitor_site_url.trim().to_string();
        let monitor_site_url = parse_http_url(&monitor_site)
            .context("MONITOR_SITE_URL is not a valid http(s) URL")?;

        let listen_addr: SocketAddr = raw
            .listen_addr
            .trim()
            .parse()
            .with_context(|| format!("LISTEN_ADDR '{}' is not a socket address", raw.listen_addr))?;

        if raw.content_timeout_secs == 0 {
            bail!("CONTENT_TIMEOUT_SECS must be greater than 0");
        }
        if raw.monitor_timeout_secs == 0 {
            bail!("MONITOR_TIMEOUT_SECS must be greater than 0");
        }
        if !raw.metrics_path.starts_with('/') {
            bail!("METRICS_PATH must start with '/'");
        }

        Ok(Self {
            secret_key: raw.secret_key.filter(|key| !key.is_empty()),
            wordpress_api_base_url,
            monitor_site,
            monitor_site_url,
            listen_addr,
            content_timeout: Duration::from_secs(raw.content_timeout_secs),
            monitor_timeout: Duration::from_secs(raw.monitor_timeout_secs),
            metrics: MetricsConfig {
                enabled: raw.metrics_enabled,
                port: raw.metrics_port,
                path: raw.metrics_path,
            },
        })
    }
}

fn parse_http_url(value: &str) -> Result<Url> {
    let url = Url::parse(value)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("unsupported scheme '{}'", other),
    }
}

// The secret never reaches the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("wordpress_api_base_url", &self.wordpress_api_base_url.as_str())
            .field("monitor_site", &self.monitor_site)
            .field("listen_addr", &self.listen_addr)
            .field("content_timeout", &self.content_timeout)
            .field("monitor_timeout", &self.monitor_timeout)
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{environment, from_builder};
    use config::{File, FileFormat};
    use std::collections::HashMap;

    fn load(yaml: &str) -> Result<Config> {
        from_builder(config::Config::builder().add_source(File::from_str(yaml, FileFormat::Yaml)))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load("wordpress_api_base_url: https://example.org/wp-json/wp/v2\n").unwrap();

        assert_eq!(
            config.wordpress_api_base_url.as_str(),
            "https://example.org/wp-json/wp/v2"
        );
        assert_eq!(config.monitor_site, "https://smal82.netsons.org");
        assert_eq!(config.monitor_site_url.as_str(), "https://smal82.netsons.org/");
        assert_eq!(config.listen_addr, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.content_timeout, Duration::from_secs(10));
        assert_eq!(config.monitor_timeout, Duration::from_secs(5));
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.path, "/metrics");
        assert!(config.secret_key.is_none());
    }

    #[test]
    fn test_missing_base_url_is_rejected() {
        let err = load("secret_key: abc\n").unwrap_err();
        assert!(err.to_string().contains("WORDPRESS_API_BASE_URL"));
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let err = load("wordpress_api_base_url: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("WORDPRESS_API_BASE_URL"));
    }

    #[test]
    fn test_non_http_base_url_is_rejected() {
        let err = load("wordpress_api_base_url: ftp://example.org/\n").unwrap_err();
        assert!(format!("{:#}", err).contains("WORDPRESS_API_BASE_URL"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = load(
            "wordpress_api_base_url: https://example.org\nmonitor_timeout_secs: 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("MONITOR_TIMEOUT_SECS"));
    }

    #[test]
    fn test_overrides() {
        let config = load(
            "wordpress_api_base_url: http://localhost:8000/wp-json/wp/v2\n\
             monitor_site_url: http://localhost:8000\n\
             listen_addr: 0.0.0.0:8080\n\
             content_timeout_secs: 3\n\
             metrics_enabled: true\n\
             metrics_port: 9100\n",
        )
        .unwrap();

        assert_eq!(config.monitor_site_url.host_str(), Some("localhost"));
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.content_timeout, Duration::from_secs(3));
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9100);
    }

    fn load_env(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        from_builder(config::Config::builder().add_source(environment().source(Some(vars))))
    }

    #[test]
    fn test_secret_key_from_env_is_kept_verbatim() {
        for secret in ["0123", "1e3", "inf", "TRUE"] {
            let config = load_env(&[
                ("WORDPRESS_API_BASE_URL", "https://example.org"),
                ("SECRET_KEY", secret),
            ])
            .unwrap();
            assert_eq!(config.secret_key.as_deref(), Some(secret));
        }
    }

    #[test]
    fn test_typed_fields_from_env_strings() {
        let config = load_env(&[
            ("WORDPRESS_API_BASE_URL", "https://example.org"),
            ("CONTENT_TIMEOUT_SECS", "7"),
            ("METRICS_ENABLED", "true"),
            ("METRICS_PORT", "9200"),
        ])
        .unwrap();

        assert_eq!(config.content_timeout, Duration::from_secs(7));
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9200);
    }

    #[test]
    fn test_monitor_site_kept_as_configured() {
        let config = load_env(&[
            ("WORDPRESS_API_BASE_URL", "https://example.org"),
            ("MONITOR_SITE_URL", " https://status.example.org "),
        ])
        .unwrap();

        assert_eq!(config.monitor_site, "https://status.example.org");
        assert_eq!(config.monitor_site_url.as_str(), "https://status.example.org/");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = load(
            "wordpress_api_base_url: https://example.org\nsecret_key: hunter2\n",
        )
        .unwrap();

        assert_eq!(config.secret_key.as_deref(), Some("hunter2"));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
