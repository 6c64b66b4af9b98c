//! Server network layer: TCP accept loop and session spawning

use crate::buffer::BroadcastBuffer;
use crate::client_manager::ClientManager;
use crate::config::{check_window, ServerConfig};
use crate::session::ClientSession;
use log::{debug, error, info, warn};
use shared::{ChatError, SERVER_FULL};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpListener, TcpSocket, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};

/// Pause after a failed accept so a persistent error does not spin the loop
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Upper bound on telling a refused client that the server is full
const REFUSAL_TIMEOUT: Duration = Duration::from_secs(1);

/// Chat server owning the listen socket and the shared broadcast buffer
pub struct Server {
    listener: TcpListener,
    buffer: Arc<BroadcastBuffer>,
    clients: Arc<Mutex<ClientManager>>,
    config: ServerConfig,
}

impl Server {
    /// Validates `config`, creates the broadcast buffer and binds the listener
    pub async fn bind(config: ServerConfig) -> Result<Self, ChatError> {
        config.validate()?;
        let buffer = Arc::new(BroadcastBuffer::new(config.capacity, config.period));
        Self::with_buffer(config, buffer).await
    }

    /// Binds the listener around an existing buffer
    ///
    /// The buffer's own capacity and period are checked with the same rule
    /// as the config's.
    pub async fn with_buffer(
        config: ServerConfig,
        buffer: Arc<BroadcastBuffer>,
    ) -> Result<Self, ChatError> {
        config.validate()?;
        check_window(buffer.capacity(), buffer.period())?;

        let address = config.address();
        let addr = lookup_host(&address)
            .await?
            .next()
            .ok_or_else(|| ChatError::Config(format!("cannot resolve {}", address)))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(config.backlog)?;

        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            buffer,
            clients: Arc::new(Mutex::new(ClientManager::new(config.max_clients))),
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ChatError> {
        Ok(self.listener.local_addr()?)
    }

    /// The buffer shared by every session of this server
    pub fn buffer(&self) -> Arc<BroadcastBuffer> {
        Arc::clone(&self.buffer)
    }

    /// Number of sessions currently registered
    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Accepts connections until `shutdown` completes
    ///
    /// On shutdown the listener is closed and every running session is
    /// aborted, which drops and therefore closes its connection.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ChatError>
    where
        F: Future<Output = ()>,
    {
        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        info!("Server started successfully");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Server shutting down");
                    break;
                }

                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.handle_connection(stream, addr, &mut sessions).await,
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            sleep(ACCEPT_BACKOFF).await;
                        }
                    }
                }

                Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = finished {
                        if e.is_panic() {
                            error!("Session task panicked: {}", e);
                        }
                    }
                }
            }
        }

        let Server {
            listener, clients, ..
        } = self;
        drop(listener);

        let open = clients.lock().await.client_addrs();
        if !open.is_empty() {
            info!("Closing {} open connection(s)", open.len());
            for (id, addr) in &open {
                debug!("Closing client {} at {}", id, addr);
            }
        }
        sessions.shutdown().await;

        Ok(())
    }

    /// Registers a new connection and starts its session, or refuses it
    /// when the server is full
    async fn handle_connection(
        &self,
        mut stream: TcpStream,
        addr: SocketAddr,
        sessions: &mut JoinSet<()>,
    ) {
        let client_id = self.clients.lock().await.add_client(addr);

        let Some(client_id) = client_id else {
            warn!("Refusing connection from {}: server full", addr);
            let refusal = async {
                stream.write_all(format!("{}\n", SERVER_FULL).as_bytes()).await?;
                stream.shutdown().await
            };
            if let Ok(Err(e)) = timeout(REFUSAL_TIMEOUT, refusal).await {
                debug!("Failed to notify {} of refusal: {}", addr, e);
            }
            return;
        };

        let session = ClientSession::from_tcp(stream, addr, self.buffer(), &self.config);
        let clients = Arc::clone(&self.clients);

        sessions.spawn(async move {
            session.run().await;
            clients.lock().await.remove_client(&client_id);
        });
    }
}
