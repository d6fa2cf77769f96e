//! Core types and traits for the slotsync protocol
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod error;
pub mod types;
pub mod serde;

pub use self::error::{Error, Result};
pub use self::types::{
    NodeConfig,
    NodeId,
    SignalMetrics,
    SinkConfig,
    SlotConfig,
};

use std::time::Duration;

/// Maximum radio packet payload in bytes (SX127x FIFO limit)
pub const MAX_PACKET_SIZE: usize = 255;

/// Interval between polls of the radio for a pending packet
pub const PACKET_POLL_INTERVAL: Duration = Duration::from_millis(5);
