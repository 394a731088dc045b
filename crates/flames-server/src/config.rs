use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use flames_crypto::HashCost;
use flames_db::store::DEFAULT_RETENTION_DAYS;

/// One week. Keeps interval deadlines well inside the range of `Instant`.
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 7 * 24 * 3600;

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub public_url: String,
    pub retention_days: i64,
    pub sweep_interval_secs: u64,
    pub hash_cost: HashCost,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("FLAMES_HOST").unwrap_or_else(|| "0.0.0.0".into());

        // PORT is what most hosting platforms inject
        let port: u16 = match lookup("FLAMES_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw.parse().with_context(|| format!("invalid port {:?}", raw))?,
            None => 5000,
        };

        let db_path: PathBuf = lookup("FLAMES_DB_PATH")
            .unwrap_or_else(|| "secret_notes.db".into())
            .into();
        let public_url =
            lookup("FLAMES_PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{}", port));

        let retention_days: i64 = parse_or(&lookup, "FLAMES_RETENTION_DAYS", DEFAULT_RETENTION_DAYS)?;
        let sweep_interval_secs: u64 = parse_or(&lookup, "FLAMES_SWEEP_INTERVAL_SECS", 3600)?;
        if !(1..=MAX_SWEEP_INTERVAL_SECS).contains(&sweep_interval_secs) {
            anyhow::bail!(
                "FLAMES_SWEEP_INTERVAL_SECS must be between 1 and {}, got {}",
                MAX_SWEEP_INTERVAL_SECS,
                sweep_interval_secs
            );
        }

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_or(&lookup, "FLAMES_ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "FLAMES_ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "FLAMES_ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            host,
            port,
            db_path,
            public_url,
            retention_days,
            sweep_interval_secs,
            hash_cost,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value {:?}", key, raw)),
        None => Ok(default),
    }
}
