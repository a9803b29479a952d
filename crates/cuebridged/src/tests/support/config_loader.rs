//! Test configuration loaders for scenarios covering success and failure paths.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use ortho_config::OrthoError;
use tempfile::TempDir;

use cuebridge_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Loader that listens on a Unix socket under a temporary directory, or on
/// an ephemeral loopback port.
pub struct TestConfigLoader {
    socket_dir: Arc<Mutex<TempDir>>,
    tcp: bool,
    auth_required: bool,
    auth_secret: Option<String>,
}

impl TestConfigLoader {
    /// A loader using a Unix socket and no authentication.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for socket");
        Self {
            socket_dir: Arc::new(Mutex::new(dir)),
            tcp: false,
            auth_required: false,
            auth_secret: None,
        }
    }

    /// A loader binding `127.0.0.1:0`.
    #[must_use]
    pub fn loopback() -> Self {
        Self {
            tcp: true,
            ..Self::new()
        }
    }

    /// Sets the authentication policy and secret.
    #[must_use]
    pub fn with_auth(mut self, required: bool, secret: Option<&str>) -> Self {
        self.auth_required = required;
        self.auth_secret = secret.map(str::to_owned);
        self
    }

    fn socket_path(&self) -> String {
        let dir = self
            .socket_dir
            .lock()
            .expect("temporary directory mutex poisoned");
        let path = dir.path().join("run").join("cuebridged.sock");
        path.to_str()
            .expect("temporary socket path was not valid UTF-8")
            .to_owned()
    }
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let listen_socket = if self.tcp {
            SocketEndpoint::tcp("127.0.0.1", 0)
        } else {
            SocketEndpoint::unix(self.socket_path())
        };
        Ok(Config {
            listen_socket,
            auth_required: self.auth_required,
            auth_secret: self.auth_secret.clone(),
            ..Config::default()
        })
    }
}

/// Loader that hands out a fixed sequence of configurations, repeating the
/// last one once the sequence runs out. Used to exercise reloads.
pub struct ScriptedConfigLoader {
    configs: Mutex<VecDeque<Config>>,
}

impl ScriptedConfigLoader {
    /// Queues `configs` in load order.
    #[must_use]
    pub fn new(configs: Vec<Config>) -> Self {
        Self {
            configs: Mutex::new(configs.into()),
        }
    }
}

impl ConfigLoader for ScriptedConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let mut configs = self.configs.lock().expect("scripted loader mutex poisoned");
        let config = if configs.len() > 1 {
            configs.pop_front()
        } else {
            configs.front().cloned()
        };
        Ok(config.expect("scripted loader has no configurations"))
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("cuebridged"),
            OsString::from("--listen-socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
