//! Test helpers for the transport module.

use std::io::Read;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::{ConnectionHandler, ConnectionStream};

/// Counts connections and drops them immediately.
pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _id: u64, _stream: ConnectionStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Tracks how many connections are open at once, holding each until the
/// client hangs up.
pub(crate) struct HoldingHandler {
    open: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl HoldingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let peak = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            open: Arc::new(AtomicUsize::new(0)),
            peak: Arc::clone(&peak),
        });
        (peak, handler)
    }
}

impl ConnectionHandler for HoldingHandler {
    fn handle(&self, _id: u64, mut stream: ConnectionStream) {
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
