//! MSP_RC executors.
//!
//! Two executors share the RC command: one mirrors channel values into the
//! flight state, the other derives link-quality statistics and forwards them
//! downstream as a text datagram.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use msp_metrics::metric_defs;
use msp_protocol::Message;
use tracing::{debug, warn};

use crate::dispatcher::CommandExecutor;
use crate::error::{TelemetryError, TelemetryResult};
use crate::events::{TelemetryEvent, TelemetryEventSink};
use crate::state::FlightState;

/// Channels carried by an RC frame and copied into state.
pub const RC_WIRE_CHANNELS: usize = 16;

/// Minimum RC payload: 16 channels of 2 bytes.
pub const RC_MIN_PAYLOAD: usize = RC_WIRE_CHANNELS * 2;

/// Channel carrying link quality.
pub const LINK_QUALITY_CHANNEL: usize = 8;

/// Channel whose low 5 bits carry the lost packet count.
pub const LOST_PACKETS_CHANNEL: usize = 10;

/// Channel whose bits 5..10 carry the recovered packet count.
pub const RECOVERED_PACKETS_CHANNEL: usize = 11;

/// Placeholder fields appended to every link-stats line.
const LINK_LINE_PLACEHOLDERS: &str = "20:20:20:20";

fn rc_channel(msg: &Message, index: usize) -> Option<u16> {
    msg.read_u16_le(index * 2)
}

// ============================================================================
// Console
// ============================================================================

/// Copies the 16 wire channels into the first 16 state slots.
///
/// Slots 16 and 17 keep whatever they held before.
#[derive(Debug, Clone, Copy, Default)]
pub struct RcConsoleExecutor;

impl CommandExecutor for RcConsoleExecutor {
    fn name(&self) -> &'static str {
        "rc_console"
    }

    fn execute(&mut self, msg: &Message, state: &mut FlightState, events: &mut dyn TelemetryEventSink) {
        if msg.len() < RC_MIN_PAYLOAD {
            return;
        }
        for (index, slot) in state.channels.iter_mut().take(RC_WIRE_CHANNELS).enumerate() {
            if let Some(value) = rc_channel(msg, index) {
                *slot = value;
            }
        }
        events.emit(TelemetryEvent::ChannelSnapshot(state.channels));
    }
}

// ============================================================================
// Link Stats Forwarding
// ============================================================================

/// Link health values packed into RC channels by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    /// Channel 8 as-is.
    pub link_quality: u16,
    /// Bits 5..10 of channel 11.
    pub recovered_packets: u16,
    /// Low 5 bits of channel 10.
    pub lost_packets: u16,
}

impl LinkStats {
    /// Extract link stats from an RC frame, if it carries all 16 channels.
    pub fn from_message(msg: &Message) -> Option<Self> {
        if msg.len() < RC_MIN_PAYLOAD {
            return None;
        }
        Some(LinkStats {
            link_quality: rc_channel(msg, LINK_QUALITY_CHANNEL)?,
            recovered_packets: (rc_channel(msg, RECOVERED_PACKETS_CHANNEL)? >> 5) & 0x1F,
            lost_packets: rc_channel(msg, LOST_PACKETS_CHANNEL)? & 0x1F,
        })
    }

    /// Format the downstream line:
    /// `timestamp:lq:lq:recovered:lost:20:20:20:20\n`.
    pub fn to_line(&self, timestamp: i64) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}\n",
            timestamp,
            self.link_quality,
            self.link_quality,
            self.recovered_packets,
            self.lost_packets,
            LINK_LINE_PLACEHOLDERS
        )
    }
}

/// Sends one link-stats datagram per RC frame to a fixed destination.
///
/// The socket is opened at construction and closed when the executor drops.
#[derive(Debug)]
pub struct RcForwardExecutor {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl RcForwardExecutor {
    /// Open a sending socket for `destination`.
    pub fn new(destination: SocketAddr) -> TelemetryResult<Self> {
        let local: SocketAddr = match destination {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).map_err(|source| TelemetryError::ForwardSocket { destination, source })?;
        debug!("Forwarding link stats to {}", destination);
        Ok(RcForwardExecutor { socket, destination })
    }

    /// Where datagrams are sent.
    pub fn destination(&self) -> SocketAddr {
        self.destination
    }
}

impl CommandExecutor for RcForwardExecutor {
    fn name(&self) -> &'static str {
        "rc_forward"
    }

    fn execute(&mut self, msg: &Message, _state: &mut FlightState, events: &mut dyn TelemetryEventSink) {
        let Some(stats) = LinkStats::from_message(msg) else {
            return;
        };
        let line = stats.to_line(chrono::Utc::now().timestamp());

        match self.socket.send_to(line.as_bytes(), self.destination) {
            Ok(_) => {
                metrics::counter!(metric_defs::FORWARD_SENT.name).increment(1);
                events.emit(TelemetryEvent::LinkStatsSent { stats, line });
            }
            Err(e) => {
                warn!("Failed to send link stats to {}: {}", self.destination, e);
                metrics::counter!(metric_defs::FORWARD_SEND_ERRORS.name).increment(1);
            }
        }
    }
}
