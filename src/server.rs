use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::{Config, PoolConfig};
use crate::error::{Error, Result};
use crate::pool::{WorkerPool, raised};

const RECV_BUFFER_SIZE: usize = 1500;

/// An encoded reply and where to send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub payload: Vec<u8>,
    pub destination: SocketAddr,
}

/// Turns one received datagram into at most one reply.
///
/// Runs on a blocking thread, so implementations may do synchronous work.
/// A panic is logged and does not stop the server.
pub trait DatagramHandler: Send + Sync + 'static {
    fn service_datagram(&self, datagram: &[u8], source: SocketAddr) -> Option<Reply>;
}

impl<F> DatagramHandler for F
where
    F: Fn(&[u8], SocketAddr) -> Option<Reply> + Send + Sync + 'static,
{
    fn service_datagram(&self, datagram: &[u8], source: SocketAddr) -> Option<Reply> {
        self(datagram, source)
    }
}

pub struct DhcpServer<H> {
    inner: Arc<ServerInner<H>>,
}

struct ServerInner<H> {
    socket: UdpSocket,
    handler: H,
    pool: PoolConfig,
    stopped: watch::Sender<bool>,
}

impl<H> Clone for DhcpServer<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: DatagramHandler> DhcpServer<H> {
    /// Binds the listen socket described by `config`.
    pub async fn bind(config: &Config, handler: H) -> Result<Self> {
        let listen = config.listen_addr()?;
        let socket = Self::create_socket(listen)?;
        let (stopped, _) = watch::channel(false);

        let server = Self {
            inner: Arc::new(ServerInner {
                socket,
                handler,
                pool: config.pool.clone(),
                stopped,
            }),
        };

        info!("DHCP server bound to {}", server.local_addr()?);
        info!(
            "Worker pool: {} core, {} max, {}s keep-alive, queue depth {}",
            config.pool.core_workers,
            config.pool.max_workers,
            config.pool.keep_alive_secs,
            config.pool.queue_depth
        );

        Ok(server)
    }

    fn create_socket(listen: SocketAddr) -> Result<UdpSocket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|error| Error::Socket(format!("Failed to create socket: {}", error)))?;

        socket
            .set_reuse_address(true)
            .map_err(|error| Error::Socket(format!("Failed to set SO_REUSEADDR: {}", error)))?;

        socket
            .set_broadcast(true)
            .map_err(|error| Error::Socket(format!("Failed to set SO_BROADCAST: {}", error)))?;

        socket
            .set_nonblocking(true)
            .map_err(|error| Error::Socket(format!("Failed to set non-blocking: {}", error)))?;

        socket
            .bind(&listen.into())
            .map_err(|error| Error::Socket(format!("Failed to bind to {}: {}", listen, error)))?;

        let std_socket: std::net::UdpSocket = socket.into();
        let tokio_socket = UdpSocket::from_std(std_socket).map_err(|error| {
            Error::Socket(format!("Failed to convert to tokio socket: {}", error))
        })?;

        Ok(tokio_socket)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.socket.local_addr()?)
    }

    pub fn handler(&self) -> &H {
        &self.inner.handler
    }

    /// Receives datagrams and hands each to the worker pool until [`stop`]
    /// is called. Returns once dispatches already running have sent their
    /// replies.
    ///
    /// [`stop`]: DhcpServer::stop
    pub async fn run(&self) -> Result<()> {
        let pool = WorkerPool::from_config(&self.inner.pool);
        let mut stopped = self.inner.stopped.subscribe();
        let mut buffer = [0u8; RECV_BUFFER_SIZE];

        info!("DHCP server ready and listening");

        loop {
            let received = tokio::select! {
                _ = raised(&mut stopped) => break,
                received = self.inner.socket.recv_from(&mut buffer) => received,
            };

            match received {
                Ok((size, source)) => {
                    debug!("Received {} bytes from {}", size, source);
                    let task = dispatch(Arc::clone(&self.inner), buffer[..size].to_vec(), source);

                    let submitted = tokio::select! {
                        _ = raised(&mut stopped) => break,
                        submitted = pool.submit(Box::pin(task)) => submitted,
                    };

                    if let Err(error) = submitted {
                        warn!("Dropping datagram from {}: {}", source, error);
                    }
                }
                Err(error) => {
                    error!("Error receiving packet: {}", error);
                }
            }
        }

        pool.shutdown();
        pool.join().await;
        info!("DHCP server stopped");
        Ok(())
    }

    /// Signals [`run`] to return. Datagrams still queued are discarded;
    /// dispatches already in progress finish and send their replies.
    ///
    /// [`run`]: DhcpServer::run
    pub fn stop(&self) {
        if !self.inner.stopped.send_replace(true) {
            info!("Stopping DHCP server");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }

    pub async fn send_response(&self, reply: &Reply) -> Result<()> {
        self.inner.send_response(reply).await
    }
}

impl<H> ServerInner<H> {
    fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }

    async fn send_response(&self, reply: &Reply) -> Result<()> {
        self.socket
            .send_to(&reply.payload, reply.destination)
            .await?;
        Ok(())
    }
}

async fn dispatch<H: DatagramHandler>(
    inner: Arc<ServerInner<H>>,
    datagram: Vec<u8>,
    source: SocketAddr,
) {
    if inner.is_stopped() {
        debug!("Discarding datagram from {} queued before stop", source);
        return;
    }

    let worker = Arc::clone(&inner);
    let outcome =
        tokio::task::spawn_blocking(move || worker.handler.service_datagram(&datagram, source))
            .await;

    match outcome {
        Ok(Some(reply)) => {
            if let Err(error) = inner.send_response(&reply).await {
                warn!("Failed to send reply to {}: {}", reply.destination, error);
            }
        }
        Ok(None) => {}
        Err(error) => {
            error!("Handler failed for datagram from {}: {}", source, error);
        }
    }
}

/// Builds the multi-threaded runtime the server runs on, sized from the
/// pool settings. Threads are named `dhcp-worker-N`.
pub fn build_runtime(pool: &PoolConfig) -> Result<Runtime> {
    static THREAD_ID: AtomicUsize = AtomicUsize::new(0);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(pool.core_workers.max(1))
        .max_blocking_threads(pool.max_workers.max(1))
        .thread_keep_alive(pool.keep_alive())
        .thread_name_fn(|| {
            let id = THREAD_ID.fetch_add(1, Ordering::SeqCst);
            format!("dhcp-worker-{}", id)
        })
        .enable_all()
        .build()?;

    Ok(runtime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_runtime_names_threads() {
        let runtime = build_runtime(&PoolConfig::default()).unwrap();
        let name = runtime.block_on(async {
            tokio::task::spawn_blocking(|| {
                std::thread::current().name().map(str::to_string)
            })
            .await
            .unwrap()
        });
        assert!(name.unwrap().starts_with("dhcp-worker-"));
    }

    #[tokio::test]
    async fn test_bind_rejects_bad_listen() {
        let config = Config {
            listen: "nonsense".to_string(),
            ..Default::default()
        };
        let handler = |_: &[u8], _: SocketAddr| -> Option<Reply> { None };
        assert!(DhcpServer::bind(&config, handler).await.is_err());
    }

    #[tokio::test]
    async fn test_stop_before_run_returns_immediately() {
        let config = Config {
            listen: "127.0.0.1:0".to_string(),
            ..Default::default()
        };
        let handler = |_: &[u8], _: SocketAddr| -> Option<Reply> { None };
        let server = DhcpServer::bind(&config, handler).await.unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);

        server.stop();
        assert!(server.is_stopped());
        tokio::time::timeout(std::time::Duration::from_secs(5), server.run())
            .await
            .unwrap()
            .unwrap();
    }
}
