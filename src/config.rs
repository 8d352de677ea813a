/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, VALKEY_URL, JWT 署名鍵/issuer, identity TTL など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::repos::identity_repo::DEFAULT_LOGIN_QUERY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
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
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub login_query: String,

    // None -> in-process cache (single instance only)
    pub valkey_url: Option<String>,
    pub identity_cache_prefix: String,

    pub jwt_signing_key: String,
    pub jwt_issuer: String,
    // Token lifetime and cache TTL (seconds)
    pub identity_ttl_seconds: u64,

    pub auth_header_names: Vec<String>,

    // Transport limits for /authorize and friends
    pub body_limit_bytes: usize,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material or connection strings
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("valkey", &self.valkey_url.is_some())
            .field("identity_cache_prefix", &self.identity_cache_prefix)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("identity_ttl_seconds", &self.identity_ttl_seconds)
            .field("auth_header_names", &self.auth_header_names)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("AUTHORIZER_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("AUTHORIZER_PORT"))?,
            None => 4100,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("AUTHORIZER_PORT"))?;

        let app_env = get("APP_ENV")
            .map(|raw| AppEnv::parse(&raw))
            .unwrap_or(AppEnv::Development);

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let login_query = get("IDENTITY_LOGIN_QUERY")
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOGIN_QUERY.to_string());

        let valkey_url = get("VALKEY_URL").filter(|s| !s.trim().is_empty());

        let identity_cache_prefix =
            get("IDENTITY_CACHE_PREFIX").unwrap_or_else(|| "identity".to_string());

        let jwt_signing_key =
            get("JWT_SIGNING_KEY").ok_or(ConfigError::Missing("JWT_SIGNING_KEY"))?;
        let jwt_issuer = get("JWT_ISSUER").ok_or(ConfigError::Missing("JWT_ISSUER"))?;

        let identity_ttl_seconds = match get("IDENTITY_TTL_SECONDS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or(ConfigError::Invalid("IDENTITY_TTL_SECONDS"))?,
            None => 3600, // 1 hour
        };

        let auth_header_names = get("AUTH_HEADER_NAMES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        let auth_header_names = if auth_header_names.is_empty() {
            vec!["authorization".to_string()]
        } else {
            auth_header_names
        };

        let body_limit_bytes = match get("BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("BODY_LIMIT_BYTES"))?,
            None => 64 * 1024,
        };

        let request_timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?,
            None => 10,
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            login_query,
            valkey_url,
            identity_cache_prefix,
            jwt_signing_key,
            jwt_issuer,
            identity_ttl_seconds,
            auth_header_names,
            body_limit_bytes,
            request_timeout_secs,
        })
    }
}
