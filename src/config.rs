use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Farm backend
    pub backend_base_url: String,
    pub backend_timeout_seconds: u64,

    // Polling
    pub poll_interval_seconds: u64,
    /// Maximum number of sensor cards shown; `None` shows every sensor.
    pub sensor_cap: Option<usize>,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,

    // Logging
    pub log_format: LogFormat,

    // Application metadata
    pub deployment: Deployment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:5000/api".to_string(),
            backend_timeout_seconds: 10,
            poll_interval_seconds: 10,
            sensor_cap: Some(3),
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            disable_rate_limiting: false,
            rate_limit_per_second: 5,
            rate_limit_burst: 30,
            log_format: LogFormat::Text,
            deployment: Deployment::Local,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env`), falling
    /// back to defaults.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key/value source.
    ///
    /// Unparseable numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a variable is set but cannot be used
    /// (zero poll interval, backend URL without an http(s) scheme).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let backend_base_url = lookup("BACKEND_API_URL")
            .unwrap_or(defaults.backend_base_url)
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !backend_base_url.starts_with("http://") && !backend_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid("BACKEND_API_URL", backend_base_url));
        }

        let poll_interval_seconds =
            parse_or(&lookup, "POLL_INTERVAL_SECONDS", defaults.poll_interval_seconds);
        if poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "POLL_INTERVAL_SECONDS",
                poll_interval_seconds.to_string(),
            ));
        }

        // 0 disables the cap
        let sensor_cap = match parse_or(&lookup, "SENSOR_CAP", 3usize) {
            0 => None,
            cap => Some(cap),
        };

        Ok(Self {
            backend_base_url,
            backend_timeout_seconds: parse_or(
                &lookup,
                "BACKEND_TIMEOUT_SECONDS",
                defaults.backend_timeout_seconds,
            ),
            poll_interval_seconds,
            sensor_cap,
            api_host: lookup("API_HOST").unwrap_or(defaults.api_host),
            api_port: parse_or(&lookup, "API_PORT", defaults.api_port),
            disable_rate_limiting: parse_or(
                &lookup,
                "DISABLE_RATE_LIMITING",
                defaults.disable_rate_limiting,
            ),
            rate_limit_per_second: parse_or(
                &lookup,
                "RATE_LIMIT_PER_SECOND",
                defaults.rate_limit_per_second,
            ),
            rate_limit_burst: parse_or(&lookup, "RATE_LIMIT_BURST", defaults.rate_limit_burst),
            log_format: LogFormat::parse(&lookup("LOG_FORMAT").unwrap_or_default()),
            deployment: Deployment::parse(
                &lookup("DEPLOYMENT").unwrap_or_else(|| "local".to_string()),
            ),
        })
    }

    /// Configuration pointing at a specific backend, defaults elsewhere.
    #[must_use]
    pub fn with_backend(base_url: impl Into<String>) -> Self {
        Self {
            backend_base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
