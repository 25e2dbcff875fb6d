// Runtime configuration
// Built once at startup and handed to state construction; nothing reads the
// environment after `Config::from_env` returns.

use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_ISSUER: &str = "item-api";
const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;
/// Ten years
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read {key} from {path}: {source}")]
    KeyFile {
        key: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub token: TokenConfig,
    pub hashing: HashingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where persisted users and items live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres(String),
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// Signing material and claim parameters for bearer tokens
#[derive(Clone)]
pub struct TokenConfig {
    pub private_key_pem: Vec<u8>,
    pub public_key_pem: Vec<u8>,
    pub issuer: String,
    pub ttl: Duration,
}

// Key material stays out of debug output.
impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Argon2id cost parameters
#[derive(Clone)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub salt_len: usize,
    pub output_len: usize,
    pub pepper: Option<Vec<u8>>,
}

impl Default for HashingConfig {
    /// OWASP-recommended Argon2id baseline (19 MiB, 2 passes, 1 lane)
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
            salt_len: 16,
            output_len: 32,
            pepper: None,
        }
    }
}

impl std::fmt::Debug for HashingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashingConfig")
            .field("memory_kib", &self.memory_kib)
            .field("iterations", &self.iterations)
            .field("parallelism", &self.parallelism)
            .field("salt_len", &self.salt_len)
            .field("output_len", &self.output_len)
            .field("pepper", &self.pepper.is_some())
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let backend = if database_url.starts_with("memory:") {
            StoreBackend::Memory
        } else {
            StoreBackend::Postgres(database_url)
        };

        let server = ServerConfig {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
        };

        let database = DatabaseConfig {
            backend,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?),
        };

        let token = TokenConfig {
            private_key_pem: key_material(&lookup, "TOKEN_PRIVATE_KEY", "TOKEN_PRIVATE_KEY_FILE")?,
            public_key_pem: key_material(&lookup, "TOKEN_PUBLIC_KEY", "TOKEN_PUBLIC_KEY_FILE")?,
            issuer: lookup("TOKEN_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
            ttl: Duration::from_secs(parse_or(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?),
        };
        if token.ttl.is_zero() || token.ttl.as_secs() > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_SECS",
                reason: format!("must be between 1 and {} seconds", MAX_TOKEN_TTL_SECS),
            });
        }

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: parse_or(&lookup, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "ARGON2_PARALLELISM", defaults.parallelism)?,
            salt_len: parse_or(&lookup, "ARGON2_SALT_LEN", defaults.salt_len)?,
            output_len: parse_or(&lookup, "ARGON2_OUTPUT_LEN", defaults.output_len)?,
            pepper: lookup("PASSWORD_PEPPER")
                .filter(|p| !p.is_empty())
                .map(String::into_bytes),
        };
        if !(8..=48).contains(&hashing.salt_len) {
            return Err(ConfigError::Invalid {
                key: "ARGON2_SALT_LEN",
                reason: "must be between 8 and 48 bytes".to_string(),
            });
        }

        Ok(Self {
            server,
            database,
            token,
            hashing,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Inline PEM wins over a file path
fn key_material<F>(lookup: &F, inline_key: &'static str, file_key: &'static str) -> Result<Vec<u8>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(pem) = lookup(inline_key) {
        return Ok(pem.replace("\\n", "\n").into_bytes());
    }

    let path = lookup(file_key).ok_or(ConfigError::Missing(inline_key))?;
    std::fs::read(&path).map_err(|source| ConfigError::KeyFile {
        key: file_key,
        path,
        source,
    })
}
