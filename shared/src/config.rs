//! Server configuration loaded from a `key=value` file.
//!
//! The file uses the same line syntax as a `.env` file (comments with `#`,
//! optional quoting), but values are only collected into [`ServerConfig`];
//! the process environment is never modified.

use std::{collections::HashMap, net::SocketAddr, path::Path, str::FromStr, time::Duration};

use tracing::warn;

use crate::errors::ConfigError;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_BODY_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(10_000);

const KNOWN_KEYS: &[&str] = &[
    "port",
    "root",
    "defaultPage",
    "maxThreads",
    "readTimeout",
    "bodyTimeout",
    "writeTimeout",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Document root as written in the file; a leading `~` is expanded when
    /// paths are resolved, not here.
    pub root: String,
    pub default_page: String,
    pub max_workers: usize,
    /// Idle deadline for every line of the request head.
    pub read_timeout: Duration,
    /// Deadline for reading a declared request body.
    pub body_timeout: Duration,
    pub write_timeout: Duration,
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let read_error = |source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut entries = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(read_error)? {
            let (key, value) = item.map_err(read_error)?;
            entries.insert(key, value);
        }

        Self::from_entries(entries)
    }

    pub fn from_entries(entries: HashMap<String, String>) -> Result<Self, ConfigError> {
        for key in entries.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!("Ignoring unknown configuration key '{}'", key);
            }
        }

        let max_workers: usize = parse_required(&entries, "maxThreads")?;
        if max_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }

        Ok(Self {
            port: parse_required(&entries, "port")?,
            root: required(&entries, "root")?.to_string(),
            default_page: required(&entries, "defaultPage")?.to_string(),
            max_workers,
            read_timeout: parse_millis(&entries, "readTimeout", DEFAULT_READ_TIMEOUT)?,
            body_timeout: parse_millis(&entries, "bodyTimeout", DEFAULT_BODY_TIMEOUT)?,
            write_timeout: parse_millis(&entries, "writeTimeout", DEFAULT_WRITE_TIMEOUT)?,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            root: "./www/".to_string(),
            default_page: "index.html".to_string(),
            max_workers: 10,
            read_timeout: DEFAULT_READ_TIMEOUT,
            body_timeout: DEFAULT_BODY_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

fn required<'a>(
    entries: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    entries
        .get(key)
        .map(|value| value.trim())
        .ok_or(ConfigError::MissingKey(key))
}

fn parse_required<T: FromStr>(
    entries: &HashMap<String, String>,
    key: &'static str,
) -> Result<T, ConfigError> {
    let value = required(entries, key)?;
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_millis(
    entries: &HashMap<String, String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match entries.get(key) {
        None => Ok(default),
        Some(_) => parse_required::<u64>(entries, key).map(Duration::from_millis),
    }
}
