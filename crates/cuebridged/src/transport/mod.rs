//! Socket transport for gateway clients.
//!
//! A [`SocketListener`] binds the configured TCP or Unix endpoint and hands
//! every accepted stream to a [`ConnectionHandler`] on its own thread, tagged
//! with a connection id. The listener knows nothing about the request
//! protocol; it only counts connections and reports them to the
//! [`HealthReporter`](crate::health::HealthReporter).

use std::io;

use thiserror::Error;

use cuebridge_config::SocketEndpoint;

mod handler;
mod listener;
#[cfg(test)]
mod listener_tests;
#[cfg(test)]
mod test_utils;

pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
pub(crate) use self::listener::{ListenerHandle, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, HoldingHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Failures binding or running the gateway listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The endpoint could not be resolved, bound or switched to non-blocking.
    #[error("cannot listen on {endpoint}: {source}")]
    Bind {
        endpoint: SocketEndpoint,
        #[source]
        source: io::Error,
    },
    /// Another process still answers on the Unix socket.
    #[error("{endpoint} is already served by another process")]
    InUse { endpoint: SocketEndpoint },
    /// The Unix socket path is taken by something that is not a socket.
    #[error("{endpoint} names a file that is not a socket")]
    NotSocket { endpoint: SocketEndpoint },
    /// The accept loop thread could not be started.
    #[error("cannot start the accept loop for {endpoint}: {source}")]
    Spawn {
        endpoint: SocketEndpoint,
        #[source]
        source: io::Error,
    },
    /// The accept loop panicked.
    #[error("accept loop for {endpoint} panicked")]
    AcceptLoopPanicked { endpoint: SocketEndpoint },
}

impl ListenerError {
    fn bind(endpoint: &SocketEndpoint, source: io::Error) -> Self {
        Self::Bind {
            endpoint: endpoint.clone(),
            source,
        }
    }
}
