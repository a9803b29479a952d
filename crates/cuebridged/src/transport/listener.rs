//! Socket listener serving gateway clients, one thread per connection.
//!
//! The accept loop polls a non-blocking socket so it can notice shutdown
//! requests. Every accepted stream is numbered, counted while open and
//! reported to the health reporter when it opens and closes.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use cuebridge_config::SocketEndpoint;

use crate::health::HealthReporter;

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
#[cfg(unix)]
use std::path::Path;

const IDLE_POLL: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
const ACCEPT_THREAD: &str = "cuebridge-accept";
const CONNECTION_THREAD: &str = "cuebridge-connection";

/// A bound, not yet accepting, gateway socket.
///
/// A Unix socket file is removed again when the listener is dropped.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: SocketEndpoint,
    socket: Socket,
}

#[derive(Debug)]
enum Socket {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Socket {
    fn set_nonblocking(&self) -> io::Result<()> {
        match self {
            Self::Tcp(listener) => listener.set_nonblocking(true),
            #[cfg(unix)]
            Self::Unix(listener) => listener.set_nonblocking(true),
        }
    }

    /// Accepts one pending stream, or `None` when nobody is waiting.
    fn accept(&self) -> io::Result<Option<ConnectionStream>> {
        let accepted = match self {
            Self::Tcp(listener) => listener
                .accept()
                .map(|(stream, _)| ConnectionStream::Tcp(stream)),
            #[cfg(unix)]
            Self::Unix(listener) => listener
                .accept()
                .map(|(stream, _)| ConnectionStream::Unix(stream)),
        };
        match accepted {
            Ok(stream) => {
                stream.prepare()?;
                Ok(Some(stream))
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

impl SocketListener {
    /// Binds `endpoint`, reclaiming a stale Unix socket left by a previous
    /// run.
    pub(crate) fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let socket = match endpoint {
            SocketEndpoint::Tcp { host, port } => Socket::Tcp(bind_tcp(endpoint, host, *port)?),
            #[cfg(unix)]
            SocketEndpoint::Unix { path } => {
                Socket::Unix(bind_unix(endpoint, path.as_std_path())?)
            }
            #[cfg(not(unix))]
            SocketEndpoint::Unix { .. } => {
                return Err(ListenerError::bind(
                    endpoint,
                    io::Error::from(io::ErrorKind::Unsupported),
                ));
            }
        };
        let listener = Self {
            endpoint: endpoint.clone(),
            socket,
        };
        listener
            .socket
            .set_nonblocking()
            .map_err(|source| ListenerError::bind(endpoint, source))?;
        Ok(listener)
    }

    /// The bound TCP address, useful when binding port zero.
    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        match &self.socket {
            Socket::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            Socket::Unix(_) => None,
        }
    }

    pub(crate) fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }

    /// Starts the accept loop on a background thread.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Result<ListenerHandle, ListenerError> {
        let endpoint = self.endpoint.clone();
        let shutdown = Arc::new(AtomicBool::new(false));
        let open = Arc::new(AtomicUsize::new(0));
        let accept_loop = AcceptLoop {
            listener: self,
            handler,
            reporter,
            shutdown: Arc::clone(&shutdown),
            open: Arc::clone(&open),
            last_id: 0,
        };
        let thread = thread::Builder::new()
            .name(String::from(ACCEPT_THREAD))
            .spawn(move || accept_loop.run())
            .map_err(|source| ListenerError::Spawn {
                endpoint: endpoint.clone(),
                source,
            })?;
        Ok(ListenerHandle {
            endpoint,
            shutdown,
            open,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SocketListener {
    fn drop(&mut self) {
        let SocketEndpoint::Unix { path } = &self.endpoint else {
            return;
        };
        if let Err(error) = fs::remove_file(path.as_std_path())
            && error.kind() != io::ErrorKind::NotFound
        {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                path = %path,
                "failed to remove unix socket file"
            );
        }
    }
}

/// Handle to the background accept loop.
///
/// Dropping the handle requests shutdown without waiting for the loop.
pub(crate) struct ListenerHandle {
    endpoint: SocketEndpoint,
    shutdown: Arc<AtomicBool>,
    open: Arc<AtomicUsize>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop. Open connections run to completion.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Connections accepted and not yet closed.
    pub(crate) fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        thread
            .join()
            .map_err(|_| ListenerError::AcceptLoopPanicked {
                endpoint: self.endpoint.clone(),
            })
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

struct AcceptLoop {
    listener: SocketListener,
    handler: Arc<dyn ConnectionHandler>,
    reporter: Arc<dyn HealthReporter>,
    shutdown: Arc<AtomicBool>,
    open: Arc<AtomicUsize>,
    last_id: u64,
}

impl AcceptLoop {
    fn run(mut self) {
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.listener.endpoint,
            "gateway listener active"
        );
        let mut last_error = None::<io::ErrorKind>;
        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.socket.accept() {
                Ok(Some(stream)) => {
                    last_error = None;
                    self.serve(stream);
                }
                Ok(None) => thread::sleep(IDLE_POLL),
                Err(error) => {
                    // Repeats of the same failure are only logged once.
                    if last_error != Some(error.kind()) {
                        warn!(
                            target: LISTENER_TARGET,
                            error = %error,
                            "socket accept error"
                        );
                    }
                    last_error = Some(error.kind());
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.listener.endpoint,
            accepted = self.last_id,
            still_open = self.open.load(Ordering::SeqCst),
            "gateway listener stopped"
        );
    }

    fn serve(&mut self, stream: ConnectionStream) {
        self.last_id += 1;
        let id = self.last_id;
        let tracker = OpenConnection::track(id, &self.open, &self.reporter);
        let handler = Arc::clone(&self.handler);
        let spawned = thread::Builder::new()
            .name(format!("{CONNECTION_THREAD}-{id}"))
            .spawn(move || {
                let _tracker = tracker;
                handler.handle(id, stream);
            });
        // On failure the closure, and with it the tracker, is dropped here.
        if let Err(error) = spawned {
            warn!(
                target: LISTENER_TARGET,
                connection = id,
                error = %error,
                "failed to spawn connection thread"
            );
        }
    }
}

/// Counts a connection as open until dropped, even if its handler panics.
struct OpenConnection {
    id: u64,
    open: Arc<AtomicUsize>,
    reporter: Arc<dyn HealthReporter>,
}

impl OpenConnection {
    fn track(id: u64, open: &Arc<AtomicUsize>, reporter: &Arc<dyn HealthReporter>) -> Self {
        let now = open.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            target: LISTENER_TARGET,
            connection = id,
            open = now,
            "accepted connection"
        );
        reporter.connection_opened(id, now);
        Self {
            id,
            open: Arc::clone(open),
            reporter: Arc::clone(reporter),
        }
    }
}

impl Drop for OpenConnection {
    fn drop(&mut self) {
        let now = self.open.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        self.reporter.connection_closed(self.id, now);
    }
}

fn bind_tcp(
    endpoint: &SocketEndpoint,
    host: &str,
    port: u16,
) -> Result<TcpListener, ListenerError> {
    let address = (host, port)
        .to_socket_addrs()
        .and_then(|mut addresses| {
            addresses.next().ok_or_else(|| {
                io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no addresses")
            })
        })
        .map_err(|source| ListenerError::bind(endpoint, source))?;
    TcpListener::bind(address).map_err(|source| ListenerError::bind(endpoint, source))
}

#[cfg(unix)]
fn bind_unix(endpoint: &SocketEndpoint, path: &Path) -> Result<UnixListener, ListenerError> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if !metadata.file_type().is_socket() => {
            return Err(ListenerError::NotSocket {
                endpoint: endpoint.clone(),
            });
        }
        Ok(_) => reclaim_stale_socket(endpoint, path)?,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(ListenerError::bind(endpoint, source)),
    }
    UnixListener::bind(path).map_err(|source| ListenerError::bind(endpoint, source))
}

/// Removes a socket file nobody answers on; refuses one that is live.
#[cfg(unix)]
fn reclaim_stale_socket(endpoint: &SocketEndpoint, path: &Path) -> Result<(), ListenerError> {
    match UnixStream::connect(path) {
        Ok(_) => Err(ListenerError::InUse {
            endpoint: endpoint.clone(),
        }),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ) =>
        {
            debug!(target: LISTENER_TARGET, %endpoint, "removing stale unix socket");
            fs::remove_file(path).map_err(|source| ListenerError::bind(endpoint, source))
        }
        Err(source) => Err(ListenerError::bind(endpoint, source)),
    }
}
