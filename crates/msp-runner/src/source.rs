//! Byte sources.
//!
//! The bridge only needs "give me up to N bytes, or tell me the stream ended".
//! UDP sources never end; file sources end at EOF or after their first error.

use std::fs::File;
use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::config::InputSpec;
use crate::error::{RunnerError, RunnerResult};

/// How long a UDP read blocks before the loop re-checks for shutdown.
const UDP_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result of one read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were written to the start of the buffer.
    Data(usize),
    /// Nothing arrived yet; try again.
    Idle,
    /// The source is exhausted for good.
    EndOfStream,
}

/// Supplies raw bytes to the bridge.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes.
    ///
    /// An `Err` is a transient failure; the caller logs it and reads again.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

// ============================================================================
// UDP
// ============================================================================

/// Receives datagrams on a local UDP port.
#[derive(Debug)]
pub struct UdpSource {
    socket: UdpSocket,
}

impl UdpSource {
    /// Bind `0.0.0.0:port`.
    pub fn bind(port: u16) -> RunnerResult<Self> {
        Self::bind_addr((Ipv4Addr::UNSPECIFIED, port).into())
    }

    /// Bind a specific local address.
    pub fn bind_addr(addr: SocketAddr) -> RunnerResult<Self> {
        let bind_err = |source| RunnerError::Bind {
            port: addr.port(),
            source,
        };
        let socket = UdpSocket::bind(addr).map_err(bind_err)?;
        socket.set_read_timeout(Some(UDP_POLL_INTERVAL)).map_err(bind_err)?;
        let source = UdpSource { socket };
        info!("Listening on UDP {}", source.describe());
        Ok(source)
    }

    /// The bound local address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl ByteSource for UdpSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        match self.socket.recv_from(buf) {
            Ok((0, _)) => Ok(ReadOutcome::Idle),
            Ok((n, _)) => Ok(ReadOutcome::Data(n)),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => Ok(ReadOutcome::Idle),
            Err(e) => Err(e),
        }
    }

    fn describe(&self) -> String {
        match self.socket.local_addr() {
            Ok(addr) => addr.to_string(),
            Err(_) => "udp (unbound)".to_string(),
        }
    }
}

// ============================================================================
// Readers / Files
// ============================================================================

/// Reads from any [`Read`] until EOF.
///
/// After the first read error the source reports end of stream.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    name: String,
    finished: bool,
}

/// A capture file source.
pub type FileSource = ReaderSource<File>;

impl<R: Read> ReaderSource<R> {
    /// Wrap a reader.
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        ReaderSource {
            reader,
            name: name.into(),
            finished: false,
        }
    }
}

impl FileSource {
    /// Open a capture file.
    pub fn open(path: impl AsRef<Path>) -> RunnerResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RunnerError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Reading from file: {}", path.display());
        Ok(ReaderSource::new(file, path.display().to_string()))
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        if self.finished {
            return Ok(ReadOutcome::EndOfStream);
        }
        match self.reader.read(buf) {
            Ok(0) => {
                self.finished = true;
                Ok(ReadOutcome::EndOfStream)
            }
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::Idle),
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Open the source described by `spec`.
pub fn open_source(spec: &InputSpec) -> RunnerResult<Box<dyn ByteSource>> {
    match spec {
        InputSpec::Udp { port } => Ok(Box::new(UdpSource::bind(*port)?)),
        InputSpec::File { path } => Ok(Box::new(FileSource::open(path)?)),
    }
}
