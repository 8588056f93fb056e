/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, CACHE_BACKEND, 各 backend の接続先など)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Store implementation selected by `CACHE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis,
    Memcached,
}

impl CacheBackend {
    /// Unset or unrecognized values select the in-process store.
    ///
    /// Returns the backend and whether the raw value was recognized.
    fn parse(raw: Option<&str>) -> (Self, bool) {
        let Some(raw) = raw else {
            return (Self::Memory, true);
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" | "" => (Self::Memory, true),
            "redis" | "valkey" => (Self::Redis, true),
            "memcached" => (Self::Memcached, true),
            _ => (Self::Memory, false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl RedisSettings {
    /// `redis://[:password@]host:port`, with the password percent-encoded.
    pub fn url(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&format!("redis://{}:{}", self.host, self.port))
            .map_err(|_| ConfigError::Invalid("REDIS_HOST"))?;

        if let Some(password) = self.password.as_deref() {
            url.set_password(Some(password))
                .map_err(|_| ConfigError::Invalid("REDIS_PASSWORD"))?;
        }

        Ok(url)
    }
}

#[derive(Debug, Clone)]
pub struct MemcachedSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    // Raw CACHE_BACKEND value when it was not recognized (logged at startup).
    pub unrecognized_backend: Option<String>,
    pub redis: RedisSettings,
    pub memcached: MemcachedSettings,
    pub key_prefix: String,
    // Bound on every networked store call.
    pub op_timeout: Duration,
    // None disables the in-process sweeper.
    pub sweep_interval: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cache: CacheSettings,

    pub public_base_url: Option<Url>,
    pub max_secret_hours: f64,

    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the process env in production).
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&var, "PORT", 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let raw_backend = var("CACHE_BACKEND");
        let (backend, recognized) = CacheBackend::parse(raw_backend.as_deref());
        let unrecognized_backend = if recognized { None } else { raw_backend };

        let redis = RedisSettings {
            host: var("REDIS_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&var, "REDIS_PORT", 6379)?,
            password: var("REDIS_PASSWORD").filter(|s| !s.is_empty()),
        };

        let memcached = MemcachedSettings {
            host: var("MEMCACHED_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&var, "MEMCACHED_PORT", 11211)?,
        };

        let key_prefix = var("CACHE_KEY_PREFIX").unwrap_or_else(|| "onetime".to_string());

        let op_timeout = Duration::from_millis(parse_or(&var, "CACHE_TIMEOUT_MS", 5000)?);
        if op_timeout.is_zero() {
            return Err(ConfigError::Invalid("CACHE_TIMEOUT_MS"));
        }

        let sweep_secs: u64 = parse_or(&var, "MEMORY_SWEEP_INTERVAL_SECS", 60)?;
        let sweep_interval = (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs));

        let public_base_url = var("PUBLIC_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_base_url(&s))
            .transpose()?;

        let max_secret_hours: f64 = parse_or(&var, "SECRET_MAX_HOURS", 720.0)?;
        if !max_secret_hours.is_finite() || max_secret_hours <= 0.0 {
            return Err(ConfigError::Invalid("SECRET_MAX_HOURS"));
        }

        let max_body_bytes = parse_or(&var, "MAX_BODY_BYTES", 1024 * 1024)?;
        let request_timeout = Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECS", 30)?);

        Ok(Self {
            addr,
            app_env,
            cache: CacheSettings {
                backend,
                unrecognized_backend,
                redis,
                memcached,
                key_prefix,
                op_timeout,
                sweep_interval,
            },
            public_base_url,
            max_secret_hours,
            max_body_bytes,
            request_timeout,
        })
    }
}

// Missing keys take the default; present but unparsable keys fail startup.
fn parse_or<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

// Links are built with `Url::join`, which needs the trailing slash to keep the path.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("PUBLIC_BASE_URL"))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid("PUBLIC_BASE_URL"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
