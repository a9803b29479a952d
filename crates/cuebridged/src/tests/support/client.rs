//! Line-oriented JSON client for driving a served gateway.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use serde_json::{Map, Value, json};

/// One client connection. Each call writes a request line and blocks for
/// the matching response line.
pub struct GatewayClient {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl GatewayClient {
    /// Connects to a gateway served on `address`.
    pub fn connect(address: SocketAddr) -> Self {
        let stream = TcpStream::connect(address).expect("connect to gateway");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set read timeout");
        let reader = BufReader::new(stream.try_clone().expect("clone stream"));
        Self {
            writer: stream,
            reader,
        }
    }

    /// Sends `command` with `params` merged into the envelope.
    pub fn call(&mut self, command: &str, message_id: &str, params: Value) -> Value {
        let mut envelope = Map::new();
        envelope.insert(String::from("request-type"), json!(command));
        envelope.insert(String::from("message-id"), json!(message_id));
        if let Value::Object(params) = params {
            envelope.extend(params);
        }
        self.send_line(&Value::Object(envelope).to_string())
    }

    /// Writes a raw line and reads one response.
    pub fn send_line(&mut self, line: &str) -> Value {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .expect("write request");
        self.writer.flush().expect("flush request");

        let mut response = String::new();
        let read = self.reader.read_line(&mut response).expect("read response");
        assert!(read > 0, "gateway closed the connection");
        serde_json::from_str(&response).expect("response is JSON")
    }
}
