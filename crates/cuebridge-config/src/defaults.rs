use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Host the gateway binds to when nothing else is configured.
pub const DEFAULT_TCP_HOST: &str = "127.0.0.1";

/// Port the gateway binds to when nothing else is configured.
pub const DEFAULT_TCP_PORT: u16 = 4444;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Loopback TCP endpoint on the well-known remote-control port.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_TCP_HOST, DEFAULT_TCP_PORT)
}
