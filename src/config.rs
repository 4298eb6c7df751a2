// ==================== CONFIGURATION ====================
// Runtime settings are read from the environment (after `.env` is loaded
// by main). Only DATABASE_URL is mandatory.

use crate::utils::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DATABASE_NAME: &str = "catalog";
const DEFAULT_MAX_POOL_SIZE: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
    pub max_pool_size: u32,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    /// Insert sample users/students into empty collections before the run
    pub seed_sample_data: bool,
    /// Run the concurrent users overview before the catalog
    pub run_users_overview: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::ConfigError("DATABASE_URL must be set".to_string()))?;

        let name = lookup("DATABASE_NAME")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| database_name_from_url(&url))
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());

        let max_pool_size = parse_var(&lookup, "MONGO_MAX_POOL_SIZE", DEFAULT_MAX_POOL_SIZE)?;
        let connect_timeout_secs =
            parse_var(&lookup, "MONGO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?;

        Ok(Self {
            database: DatabaseConfig {
                url,
                name,
                max_pool_size,
                connect_timeout: Duration::from_secs(connect_timeout_secs),
            },
            seed_sample_data: parse_var(&lookup, "SEED_SAMPLE_DATA", false)?,
            run_users_overview: parse_var(&lookup, "RUN_USERS_OVERVIEW", false)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .to_lowercase()
            .parse::<T>()
            .map_err(|e| AppError::ConfigError(format!("{} has invalid value '{}': {}", key, raw, e))),
        _ => Ok(default),
    }
}

/// Extracts the database segment of a connection string
/// (`mongodb://host:27017/mydb?retryWrites=true` -> `mydb`).
fn database_name_from_url(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let (_, path) = without_scheme.split_once('/')?;
    let name = path.split('?').next().unwrap_or("");

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
