//! Runtime authentication policy.

use std::sync::atomic::{AtomicBool, Ordering};

/// Reports whether non-exempt commands require an authenticated connection.
///
/// Read on every dispatch, never cached.
pub trait AuthPolicy: Send + Sync {
    /// Whether authentication is currently required.
    fn authentication_required(&self) -> bool;
}

/// Policy backed by an atomic flag that can be flipped while serving.
#[derive(Debug, Default)]
pub struct AtomicAuthPolicy {
    required: AtomicBool,
}

impl AtomicAuthPolicy {
    /// Creates a policy with the given initial setting.
    pub fn new(required: bool) -> Self {
        Self {
            required: AtomicBool::new(required),
        }
    }

    /// Changes the policy; takes effect for the next dispatched request.
    pub fn set_required(&self, required: bool) {
        self.required.store(required, Ordering::SeqCst);
    }
}

impl AuthPolicy for AtomicAuthPolicy {
    fn authentication_required(&self) -> bool {
        self.required.load(Ordering::SeqCst)
    }
}
