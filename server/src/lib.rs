pub mod acceptor;
pub mod builder;
pub mod connection;
pub mod content_type;
pub mod encoding;
pub mod error;
pub mod filesystem;
pub mod pool;
pub mod resolver;
pub mod response;
pub mod service;
pub mod status;
pub mod template;

pub use acceptor::Acceptor;
pub use builder::ResponseBuilder;
pub use connection::{ConnectionHandler, ConnectionState, handle_connection};
pub use error::{BuildError, ConnectionError, ServerError};
pub use filesystem::{FileSystem, LocalFileSystem};
pub use pool::WorkerPool;
pub use resolver::PathResolver;
pub use response::Response;
pub use service::HttpService;
pub use status::StatusCode;

/// Binds the configured port and serves until `shutdown` yields or its
/// sender is dropped.
pub async fn serve(
    config: &shared::ServerConfig,
    shutdown: smol::channel::Receiver<()>,
) -> Result<(), ServerError> {
    Acceptor::bind(config).await?.run(shutdown).await;
    Ok(())
}
