use std::{io, net::SocketAddr, sync::Arc};

use shared::ServerConfig;
use smol::{channel::Receiver, future::FutureExt, net::TcpListener};
use tracing::{error, info, warn};

use crate::{connection::handle_connection, error::ServerError, pool::WorkerPool, service::HttpService};

/// Owns the listening socket and hands every accepted connection to the
/// worker pool.
pub struct Acceptor {
    listener: TcpListener,
    service: Arc<HttpService>,
    pool: WorkerPool,
}

impl Acceptor {
    pub fn new(listener: TcpListener, service: Arc<HttpService>, pool: WorkerPool) -> Self {
        Self {
            listener,
            service,
            pool,
        }
    }

    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let addr = config.listen_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self::new(
            listener,
            Arc::new(HttpService::from_config(config)),
            WorkerPool::new(config.max_workers)?,
        ))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts until `shutdown` yields (or its sender is dropped), then waits
    /// for in-flight connections and releases the pool and the socket.
    pub async fn run(self, shutdown: Receiver<()>) {
        info!(
            "Listening on {} with {} workers",
            self.local_addr()
                .map_or_else(|_| "<unknown>".to_string(), |addr| addr.to_string()),
            self.pool.size()
        );

        loop {
            let accepted = async { Some(self.listener.accept().await) }
                .or(async {
                    let _ = shutdown.recv().await;
                    None
                })
                .await;

            match accepted {
                Some(Ok((stream, addr))) => {
                    info!("Accepted connection from {}", addr);
                    let service = Arc::clone(&self.service);
                    let submitted = self.pool.submit(async move {
                        handle_connection(service, stream, addr).await;
                    });
                    if !submitted {
                        warn!("Dropping connection from {}, pool is shutting down", addr);
                    }
                }
                Some(Err(e)) => error!("Failed to accept connection: {}", e),
                None => break,
            }
        }

        info!(
            "Shutting down, waiting for {} connections",
            self.pool.active_tasks()
        );
        self.pool.wait().await;

        let Self { listener, pool, .. } = self;
        drop(listener);
        pool.shutdown();
        info!("Server is closed");
    }
}
