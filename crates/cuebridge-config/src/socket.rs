//! Listen endpoint for remote-control clients.
//!
//! Endpoints are written as URLs: `tcp://host[:port]` or `unix:///path`.
//! A TCP endpoint without a port listens on
//! [`DEFAULT_TCP_PORT`](crate::DEFAULT_TCP_PORT).

use std::fmt;
use std::fs::{self, DirBuilder};
use std::io;
use std::net::IpAddr;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::defaults::DEFAULT_TCP_PORT;

/// Where the gateway accepts remote-control connections.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum SocketEndpoint {
    /// Local clients connect through a socket file.
    Unix { path: Utf8PathBuf },
    /// Clients connect over TCP.
    Tcp { host: String, port: u16 },
}

impl SocketEndpoint {
    /// A socket file at `path`.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// A TCP listener on `host` and `port`.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Whether only this machine can reach the endpoint.
    ///
    /// Socket files and loopback addresses count as local. Host names other
    /// than `localhost` are treated as reachable from the network.
    #[must_use]
    pub fn is_local(&self) -> bool {
        match self {
            Self::Unix { .. } => true,
            Self::Tcp { host, .. } if host.eq_ignore_ascii_case("localhost") => true,
            Self::Tcp { host, .. } => host
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
                .is_ok_and(|address| address.is_loopback()),
        }
    }

    /// Creates the directory holding a Unix socket file, readable by the
    /// owner only on Unix. Does nothing for TCP.
    ///
    /// # Errors
    ///
    /// Fails when the socket path has no parent, when the parent exists but
    /// is not a directory, or when it cannot be created.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Self::Unix { path } = self else {
            return Ok(());
        };
        let directory = socket_directory(path)?;
        match fs::metadata(directory.as_std_path()) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(SocketPreparationError::NotADirectory {
                directory: directory.to_path_buf(),
            }),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                private_directory_builder()
                    .create(directory.as_std_path())
                    .map_err(|source| SocketPreparationError::CreateDirectory {
                        directory: directory.to_path_buf(),
                        source,
                    })
            }
            Err(source) => Err(SocketPreparationError::CreateDirectory {
                directory: directory.to_path_buf(),
                source,
            }),
        }
    }
}

fn socket_directory(path: &Utf8Path) -> Result<&Utf8Path, SocketPreparationError> {
    path.parent()
        .filter(|parent| !parent.as_str().is_empty())
        .ok_or_else(|| SocketPreparationError::MissingParent {
            path: path.to_path_buf(),
        })
}

fn private_directory_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = SocketParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| SocketParseError {
            input: input.to_owned(),
            reason,
        };
        let url = Url::parse(input).map_err(|error| invalid(ParseFailure::Url(error)))?;
        match url.scheme() {
            "tcp" => {
                let host = url
                    .host_str()
                    .filter(|host| !host.is_empty())
                    .ok_or_else(|| invalid(ParseFailure::MissingHost))?;
                Ok(Self::tcp(host, url.port().unwrap_or(DEFAULT_TCP_PORT)))
            }
            "unix" => match url.path() {
                "" | "/" => Err(invalid(ParseFailure::MissingPath)),
                path => Ok(Self::unix(path)),
            },
            scheme => Err(invalid(ParseFailure::Scheme(scheme.to_owned()))),
        }
    }
}

/// A listen endpoint that could not be understood.
#[derive(Debug, Error)]
#[error("invalid listen socket '{input}': {reason}")]
pub struct SocketParseError {
    input: String,
    #[source]
    reason: ParseFailure,
}

impl SocketParseError {
    /// The text that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

#[derive(Debug, Error)]
enum ParseFailure {
    #[error("expected tcp:// or unix://, found {0}://")]
    Scheme(String),
    #[error("no host given")]
    MissingHost,
    #[error("no socket file path given")]
    MissingPath,
    #[error(transparent)]
    Url(url::ParseError),
}

/// The directory for a Unix socket file could not be made ready.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// The socket path is a bare file name.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent { path: Utf8PathBuf },
    /// Something other than a directory sits where the socket directory
    /// belongs.
    #[error("socket directory '{directory}' exists but is not a directory")]
    NotADirectory { directory: Utf8PathBuf },
    /// The directory could not be inspected or created.
    #[error("failed to create socket directory '{directory}': {source}")]
    CreateDirectory {
        directory: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}
