//! slotsync: slot-based time synchronization for multi-hop LoRa sensor networks
//!
//! A single mains-powered sink broadcasts a beacon each epoch; battery-powered
//! nodes at increasing hop distance relay it outward, report data back inward,
//! and sleep through every slot that is not theirs. Synchronization is
//! bootstrapped entirely by the decrementing countdown each relayed beacon
//! carries; there is no clock exchange, acknowledgment or retry.

pub mod core;
pub mod protocol;
pub mod radio;
pub mod sync;
pub mod time;

// Re-export commonly used items
pub use crate::core::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
