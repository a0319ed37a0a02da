use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::classroom::ClassroomConfig;
use crate::error::AppError;
use crate::graph::GraphConfig;
use crate::services::MigrationConfig;

/// Reads a variable through `lookup`, falling back to `default` when unset.
pub fn lookup_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        _ => Ok(default),
    }
}

pub fn lookup_string<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub http_timeout: Duration,
    pub classroom: ClassroomConfig,
    pub graph: GraphConfig,
    pub migration: MigrationConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup_or(
            &lookup,
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3000)),
        )?;
        let http_timeout = Duration::from_secs(lookup_or(&lookup, "HTTP_TIMEOUT_SECS", 30u64)?);

        Ok(Self {
            bind_addr,
            http_timeout,
            classroom: ClassroomConfig::from_lookup(&lookup),
            graph: GraphConfig::from_lookup(&lookup),
            migration: MigrationConfig::from_lookup(&lookup)?,
        })
    }
}
