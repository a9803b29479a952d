//! Tests for the socket listener.

use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use cuebridge_config::SocketEndpoint;

use crate::health::HealthReporter;
use crate::tests::support::{HealthEvent, RecordingHealthReporter};

use super::listener::{ListenerHandle, SocketListener};
use super::{ConnectionHandler, CountingHandler, HoldingHandler, ListenerError};

#[derive(Clone)]
struct CountingFixture {
    count: Arc<AtomicUsize>,
    handler: Arc<CountingHandler>,
}

#[fixture]
fn counting_fixture() -> CountingFixture {
    let (count, handler) = CountingHandler::new();
    CountingFixture { count, handler }
}

#[fixture]
fn reporter() -> Arc<RecordingHealthReporter> {
    Arc::new(RecordingHealthReporter::default())
}

fn shared(reporter: &Arc<RecordingHealthReporter>) -> Arc<dyn HealthReporter> {
    Arc::clone(reporter) as Arc<dyn HealthReporter>
}

#[fixture]
fn tcp_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", 0)
}

fn wait_for_count(count: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if count.load(Ordering::SeqCst) >= expected {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[rstest]
fn tcp_listener_accepts_connections(
    tcp_endpoint: SocketEndpoint,
    counting_fixture: CountingFixture,
    reporter: Arc<RecordingHealthReporter>,
) {
    let listener = SocketListener::bind(&tcp_endpoint).expect("bind tcp listener");
    assert_eq!(listener.endpoint(), &tcp_endpoint);
    let addr = listener
        .local_addr()
        .expect("listener should report local address");
    let CountingFixture { count, handler } = counting_fixture;
    let handler: Arc<dyn ConnectionHandler> = handler;
    let handle = listener
        .start(handler, shared(&reporter))
        .expect("start listener");

    TcpStream::connect(addr).expect("connect first client");
    TcpStream::connect(addr).expect("connect second client");

    assert!(wait_for_count(&count, 2), "expected two connections");
    handle.shutdown();
    handle.join().expect("join listener");
}

#[rstest]
fn connections_are_served_concurrently(
    tcp_endpoint: SocketEndpoint,
    reporter: Arc<RecordingHealthReporter>,
) {
    let listener = SocketListener::bind(&tcp_endpoint).expect("bind tcp listener");
    let addr = listener.local_addr().expect("local address");
    let (peak, handler) = HoldingHandler::new();
    let handle = listener
        .start(handler, shared(&reporter))
        .expect("start listener");

    let clients: Vec<TcpStream> = (0..4)
        .map(|_| TcpStream::connect(addr).expect("connect client"))
        .collect();
    assert!(
        wait_for_count(&peak, clients.len()),
        "every client should be held open at the same time"
    );

    assert_eq!(handle.open_connections(), clients.len());

    for client in &clients {
        client.shutdown(Shutdown::Both).expect("close client");
    }
    handle.shutdown();
    handle.join().expect("join listener");
}

fn wait_for_drain(handle: &ListenerHandle) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if handle.open_connections() == 0 {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[rstest]
fn connections_are_numbered_and_reported(
    tcp_endpoint: SocketEndpoint,
    counting_fixture: CountingFixture,
    reporter: Arc<RecordingHealthReporter>,
) {
    let listener = SocketListener::bind(&tcp_endpoint).expect("bind tcp listener");
    let addr = listener.local_addr().expect("local address");
    let CountingFixture { count, handler } = counting_fixture;
    let handle = listener
        .start(handler, shared(&reporter))
        .expect("start listener");

    for _ in 0..3 {
        TcpStream::connect(addr).expect("connect client");
    }
    assert!(wait_for_count(&count, 3), "expected three connections");
    assert!(wait_for_drain(&handle), "every connection should close");
    handle.shutdown();
    handle.join().expect("join listener");

    let events = reporter.events();
    let opened: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            HealthEvent::ConnectionOpened(id) => Some(*id),
            _ => None,
        })
        .collect();
    let mut closed: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            HealthEvent::ConnectionClosed(id) => Some(*id),
            _ => None,
        })
        .collect();
    closed.sort_unstable();
    assert_eq!(opened, vec![1, 2, 3]);
    assert_eq!(closed, opened);
}

#[cfg(unix)]
#[fixture]
fn unix_tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("temp dir")
}

#[cfg(unix)]
#[rstest]
fn unix_listener_cleans_stale_socket_files(
    unix_tempdir: tempfile::TempDir,
    reporter: Arc<RecordingHealthReporter>,
) {
    let path = unix_tempdir.path().join("cuebridged.sock");
    {
        let _stale = std::os::unix::net::UnixListener::bind(&path).expect("bind stale listener");
    }
    assert!(path.exists(), "stale socket should remain");

    let endpoint = SocketEndpoint::unix(path.to_str().expect("utf8 path").to_string());
    let listener = SocketListener::bind(&endpoint).expect("bind new listener");
    assert!(listener.local_addr().is_none());
    let (_, handler) = CountingHandler::new();
    let handle = listener
        .start(handler, shared(&reporter))
        .expect("start listener");

    std::os::unix::net::UnixStream::connect(&path).expect("connect unix client");

    handle.shutdown();
    handle.join().expect("join listener");
    assert!(
        !path.exists(),
        "listener should remove unix socket on shutdown"
    );
}

#[cfg(unix)]
#[rstest]
fn unix_listener_rejects_in_use_socket(unix_tempdir: tempfile::TempDir) {
    let path = unix_tempdir.path().join("cuebridged.sock");
    let _existing = std::os::unix::net::UnixListener::bind(&path).expect("bind existing listener");

    let endpoint = SocketEndpoint::unix(path.to_str().expect("utf8 path").to_string());
    let error = SocketListener::bind(&endpoint).expect_err("should fail bind");
    assert!(matches!(error, ListenerError::InUse { .. }));
}
