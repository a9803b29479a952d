//! Test harness utilities shared by the gateway behaviour suites.

mod client;
mod config_loader;
mod reporter;
mod world;

pub use client::GatewayClient;
pub use config_loader::{FailingConfigLoader, ScriptedConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{TestWorld, world};
