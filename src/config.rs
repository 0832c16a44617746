use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context};
use rand::{distributions::Alphanumeric, Rng};

const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => AppEnv::Development,
            _ => AppEnv::Production,
        }
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// Argon2 work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Clone)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub bucket: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: String,
    pub upload_prefix: String,
    pub presign_ttl_secs: u64,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("upload_prefix", &self.upload_prefix)
            .field("presign_ttl_secs", &self.presign_ttl_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: AppEnv,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub storage: StorageConfig,
    pub allowed_origins: Vec<String>,
    pub contact_redirect_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Fails when `JWT_SECRET` is missing outside development; in
    /// development a random per-process secret is generated instead.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env = get("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Production);

        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if env == AppEnv::Development => {
                tracing::warn!("JWT_SECRET not set; using a random per-process development secret");
                rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(64)
                    .map(char::from)
                    .collect()
            }
            None => bail!("JWT_SECRET must be set outside the development environment"),
        };

        let jwt = JwtConfig {
            secret,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "counselport".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "counselport-users".into()),
            ttl_minutes: parse_or(&get, "JWT_TTL_MINUTES", 60 * 24)?,
        };
        if jwt.ttl_minutes <= 0 {
            bail!("JWT_TTL_MINUTES must be positive");
        }
        if jwt.ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            bail!("JWT_TTL_MINUTES must be at most {MAX_TOKEN_TTL_MINUTES} (365 days)");
        }

        let password = PasswordConfig {
            memory_kib: parse_or(&get, "PASSWORD_MEMORY_KIB", 19 * 1024)?,
            iterations: parse_or(&get, "PASSWORD_ITERATIONS", 2)?,
            parallelism: parse_or(&get, "PASSWORD_PARALLELISM", 1)?,
        };

        let storage = StorageConfig {
            endpoint: get("S3_ENDPOINT"),
            bucket: get("S3_BUCKET").context("S3_BUCKET must be set")?,
            access_key: get("S3_ACCESS_KEY"),
            secret_key: get("S3_SECRET_KEY"),
            region: get("S3_REGION").unwrap_or_else(|| "us-east-1".into()),
            upload_prefix: get("UPLOAD_PREFIX")
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or_else(|| "uploads".into()),
            presign_ttl_secs: parse_or(&get, "PRESIGN_TTL_SECONDS", 15 * 60)?,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            env,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "APP_PORT", 8080)?,
            database_url,
            jwt,
            password,
            storage,
            allowed_origins,
            contact_redirect_url: get("CONTACT_REDIRECT_URL"),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
