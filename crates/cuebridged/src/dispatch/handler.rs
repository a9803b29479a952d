//! Connection handler that serves newline-delimited JSON requests.
//!
//! Each accepted connection gets its own [`ConnectionContext`]. Requests are
//! read, dispatched and answered strictly in order until the client closes
//! its half of the stream.

use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::DISPATCH_TARGET;
use super::context::ConnectionContext;
use super::dispatcher::Dispatcher;
use super::errors::DispatchError;
use super::request::{Request, is_blank, recover_message_id};
use super::response::{Response, ResponseWriter};

/// Maximum size of a single request line in bytes, excluding the delimiter.
pub(crate) const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Serves gateway requests on accepted connections.
#[derive(Debug)]
pub struct GatewayConnectionHandler {
    dispatcher: Arc<Dispatcher>,
}

impl GatewayConnectionHandler {
    /// Creates a handler that routes every request through `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    fn serve(&self, id: u64, stream: ConnectionStream) {
        let mut connection = ConnectionContext::new(id);
        debug!(
            target: DISPATCH_TARGET,
            connection = connection.id(),
            "serving requests"
        );

        let mut reader = BufReader::new(stream);
        let mut line = Vec::new();
        loop {
            line.clear();
            let response = match read_request_line(&mut reader, &mut line) {
                Ok(0) => break,
                Ok(_) if is_blank(&line) => continue,
                Ok(_) => self.respond(&mut connection, &line),
                Err(error) => {
                    warn!(
                        target: DISPATCH_TARGET,
                        connection = connection.id(),
                        %error,
                        "request line could not be read"
                    );
                    let mut writer = ResponseWriter::new(reader.get_mut());
                    if let Err(write_error) = writer.write_error(&recover_message_id(&line), &error) {
                        debug!(target: DISPATCH_TARGET, error = %write_error, "failed to report read failure");
                    }
                    if error.closes_connection() {
                        break;
                    }
                    continue;
                }
            };

            let mut writer = ResponseWriter::new(reader.get_mut());
            if let Err(error) = writer.write_response(&response) {
                warn!(
                    target: DISPATCH_TARGET,
                    connection = connection.id(),
                    %error,
                    "failed to write response"
                );
                break;
            }
        }

        debug!(
            target: DISPATCH_TARGET,
            connection = connection.id(),
            "request stream ended"
        );
    }

    fn respond(&self, connection: &mut ConnectionContext, line: &[u8]) -> Response {
        match Request::parse(line) {
            Ok(request) => self.dispatcher.handle(connection, &request),
            Err(error) => {
                debug!(
                    target: DISPATCH_TARGET,
                    connection = connection.id(),
                    %error,
                    "rejected malformed request"
                );
                Response::failure(recover_message_id(line), error.to_string())
            }
        }
    }
}

impl ConnectionHandler for GatewayConnectionHandler {
    fn handle(&self, id: u64, stream: ConnectionStream) {
        self.serve(id, stream);
    }
}

/// Reads one bounded request line into `line`, returning the bytes read.
///
/// Zero means the peer closed the stream. A final line without a trailing
/// newline is still returned.
fn read_request_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> Result<usize, DispatchError> {
    let limit = u64::try_from(MAX_REQUEST_BYTES + 1).unwrap_or(u64::MAX);
    let read = reader.by_ref().take(limit).read_until(b'\n', line)?;
    let content = line.len() - usize::from(line.ends_with(b"\n"));
    if content > MAX_REQUEST_BYTES {
        return Err(DispatchError::request_too_large(MAX_REQUEST_BYTES));
    }
    Ok(read)
}
