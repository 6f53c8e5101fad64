use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::connection::handle_connection;
use crate::error::ServerError;
use crate::registry::LobbyRegistry;

/// The listening server: accepts TCP clients up to the configured
/// connection cap and hands each to a connection task.
pub struct Server {
    listener: TcpListener,
    registry: Arc<LobbyRegistry>,
    config: ServerConfig,
    connection_count: Arc<AtomicUsize>,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener =
            TcpListener::bind(&config.listen_addr)
                .await
                .map_err(|source| ServerError::Bind {
                    addr: config.listen_addr.clone(),
                    source,
                })?;
        let registry = Arc::new(LobbyRegistry::new(config.game, config.lobby));
        Ok(Self {
            listener,
            registry,
            config,
            connection_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The bound address, useful when listening on port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Accept clients forever. Connections beyond the cap are dropped
    /// immediately without being seated.
    pub async fn serve(self) -> Result<(), ServerError> {
        tracing::info!(
            addr = %self.config.listen_addr,
            max_connections = self.config.limits.max_connections,
            "server listening"
        );
        loop {
            let (stream, peer) = self
                .listener
                .accept()
                .await
                .map_err(|source| ServerError::Accept { source })?;

            let active = self.connection_count.load(Ordering::Relaxed);
            if active >= self.config.limits.max_connections {
                tracing::warn!(%peer, active, "connection cap reached, dropping client");
                drop(stream);
                continue;
            }

            let registry = Arc::clone(&self.registry);
            let limits = self.config.limits;
            let guard = ConnectionGuard::acquire(Arc::clone(&self.connection_count));
            tokio::spawn(async move {
                handle_connection(stream, registry, limits).await;
                drop(guard);
            });
        }
    }
}

/// Counts a live connection; decrements on drop so the cap tracks
/// tasks that end for any reason.
struct ConnectionGuard {
    count: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn acquire(count: Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::Relaxed);
        Self { count }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::Relaxed);
    }
}
