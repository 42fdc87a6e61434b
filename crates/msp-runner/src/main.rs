//! `msp-bridge`: decode an MSP v1 stream from UDP or a capture file.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use msp_runner::{open_source, Bridge, BridgeConfig, InputSpec, RunnerError, RunnerResult, DEFAULT_FORWARD_HOST};
use msp_telemetry::TelemetryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputKind {
    /// Listen for datagrams on a local port.
    Udp,
    /// Read a capture file to the end.
    File,
}

/// MSP telemetry bridge.
#[derive(Debug, Parser)]
#[command(name = "msp-bridge", version, about)]
struct Cli {
    /// Where the MSP byte stream comes from.
    #[arg(value_enum)]
    input: InputKind,

    /// UDP port to listen on, or the capture file path.
    source: String,

    /// Forward RC link statistics to this UDP port.
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    out_port: Option<u16>,

    /// Host receiving forwarded link statistics.
    #[arg(long, default_value = DEFAULT_FORWARD_HOST)]
    out_host: String,

    /// Debug-level logging.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors; per-message reports drop to debug.
    #[arg(short, long)]
    quiet: bool,

    /// Write the final flight state and parser counters as JSON.
    #[arg(long, value_name = "PATH")]
    dump_state: Option<PathBuf>,

    /// Serve Prometheus metrics on this address.
    #[cfg(feature = "prometheus")]
    #[arg(long, value_name = "ADDR")]
    metrics_addr: Option<std::net::SocketAddr>,
}

impl Cli {
    fn input_spec(&self) -> Result<InputSpec, clap::Error> {
        match self.input {
            InputKind::Udp => {
                let port = self.source.parse::<u16>().ok().filter(|p| *p != 0).ok_or_else(|| {
                    Cli::command().error(
                        ErrorKind::InvalidValue,
                        format!("invalid UDP port '{}': expected 1-65535", self.source),
                    )
                })?;
                Ok(InputSpec::Udp { port })
            }
            InputKind::File => Ok(InputSpec::File {
                path: PathBuf::from(&self.source),
            }),
        }
    }

    fn bridge_config(&self, input: InputSpec) -> RunnerResult<BridgeConfig> {
        let mut config = BridgeConfig::new(input);
        config.telemetry = if self.quiet {
            TelemetryConfig::quiet()
        } else {
            TelemetryConfig::default()
        };
        config.dump_state = self.dump_state.clone();
        match self.out_port {
            Some(port) => config.with_forward(&self.out_host, port),
            None => Ok(config),
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, input: InputSpec) -> RunnerResult<()> {
    let config = cli.bridge_config(input)?;

    #[cfg(feature = "prometheus")]
    if let Some(addr) = cli.metrics_addr {
        msp_metrics::install_prometheus_exporter(addr).map_err(|e| RunnerError::MetricsExporter(e.to_string()))?;
        info!("Serving metrics on http://{}/metrics", addr);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)).map_err(RunnerError::from)?;

    let mut bridge = Bridge::new(&config)?;
    let mut source = open_source(&config.input)?;
    let summary = bridge.run(source.as_mut(), &shutdown);
    info!("Stopped reading {}: {}", config.input, summary);

    if let Some(path) = &config.dump_state {
        bridge.write_report(path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let input = match cli.input_spec() {
        Ok(input) => input,
        Err(e) => e.exit(),
    };
    init_tracing(&cli);

    match run(&cli, input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
