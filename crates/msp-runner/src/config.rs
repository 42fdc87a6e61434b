//! Run configuration.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use msp_telemetry::TelemetryConfig;

use crate::error::{RunnerError, RunnerResult};

/// Host that receives link statistics when none is given.
pub const DEFAULT_FORWARD_HOST: &str = "127.0.0.1";

/// Where the byte stream comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// Datagrams received on a local UDP port.
    Udp { port: u16 },
    /// A capture file read to the end.
    File { path: PathBuf },
}

impl std::fmt::Display for InputSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSpec::Udp { port } => write!(f, "udp:{}", port),
            InputSpec::File { path } => write!(f, "file:{}", path.display()),
        }
    }
}

/// Everything needed to build and run a bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Byte source.
    pub input: InputSpec,
    /// Destination for RC link statistics; `None` disables forwarding.
    pub forward: Option<SocketAddr>,
    /// Options passed to the telemetry core.
    pub telemetry: TelemetryConfig,
    /// Write a JSON state report here when the run ends.
    pub dump_state: Option<PathBuf>,
}

impl BridgeConfig {
    /// A configuration with no forwarding and no state report.
    pub fn new(input: InputSpec) -> Self {
        BridgeConfig {
            input,
            forward: None,
            telemetry: TelemetryConfig::default(),
            dump_state: None,
        }
    }

    /// Resolve `host:port` and use it as the forward destination.
    pub fn with_forward(mut self, host: &str, port: u16) -> RunnerResult<Self> {
        self.forward = Some(resolve_forward(host, port)?);
        Ok(self)
    }
}

/// Resolve a forward destination, taking the first address.
pub fn resolve_forward(host: &str, port: u16) -> RunnerResult<SocketAddr> {
    let invalid = || RunnerError::ForwardAddress {
        host: host.to_string(),
        port,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(|_| invalid())?
        .next()
        .ok_or_else(invalid)
}
