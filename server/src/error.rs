use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures while producing a response body. All of them surface to the
/// client as 500.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Template {0} is missing")]
    MissingTemplate(PathBuf),
}

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Read timed out")]
    TimedOut,

    #[error("Connection closed while reading the request body")]
    TruncatedBody,

    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: io::Error,
    },

    #[error("Failed to start worker thread: {0}")]
    Worker(io::Error),
}
