//! Per-command executors.
//!
//! | Command | Executor | Effect |
//! |---|---|---|
//! | STATUS | [`StatusExecutor`] | `armed` from bit 0 of byte 6 |
//! | ATTITUDE | [`AttitudeExecutor`] | roll, pitch, heading |
//! | FC_VARIANT | [`FcVariantExecutor`] | identifier, only when it changes |
//! | RC | [`RcConsoleExecutor`] | first 16 channels + snapshot event |
//! | RC | [`RcForwardExecutor`] | link-stats datagram |

mod attitude;
mod fc_variant;
mod rc;
mod status;

pub use attitude::AttitudeExecutor;
pub use fc_variant::FcVariantExecutor;
pub use rc::{
    LinkStats, RcConsoleExecutor, RcForwardExecutor, LINK_QUALITY_CHANNEL, LOST_PACKETS_CHANNEL,
    RC_MIN_PAYLOAD, RC_WIRE_CHANNELS, RECOVERED_PACKETS_CHANNEL,
};
pub use status::StatusExecutor;
