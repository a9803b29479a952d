//! Per-connection session state.

/// State owned by the transport for one client connection.
///
/// The dispatcher borrows it mutably for each request, so the authorisation
/// check and any handler mutation happen without interleaving.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionContext {
    id: u64,
    authenticated: bool,
    heartbeat: bool,
}

impl ConnectionContext {
    /// Creates an unauthenticated context for connection `id`.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Transport-assigned connection identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the client has completed `Authenticate`.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Records a successful authentication. There is no way back.
    pub fn mark_authenticated(&mut self) {
        self.authenticated = true;
    }

    /// Whether the client asked for heartbeat events.
    pub fn heartbeat_enabled(&self) -> bool {
        self.heartbeat
    }

    /// Stores the client's heartbeat preference.
    pub fn set_heartbeat(&mut self, enabled: bool) {
        self.heartbeat = enabled;
    }
}
