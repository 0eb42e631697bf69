use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Fixture error: {0}")]
    Fixture(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("Missing configuration key: {0}")]
    MissingKey(&'static str),

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("maxThreads must be at least 1")]
    NoWorkers,
}
