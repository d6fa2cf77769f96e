//! Wire formats and the node synchronization state machine
//!
//! Beacons and data messages share one radio channel and are told apart by
//! the reserved first character of the beacon tag.

pub mod beacon;
pub mod data;
pub mod state;

pub use self::beacon::{is_beacon, Beacon};
pub use self::data::{DataEntry, DataMessage};
pub use self::state::{DiscardReason, NodePhase, NodeRuntimeState, Reaction, SyncStateMachine};

/// Reserved first character of every beacon; data messages must never start with it
pub const BEACON_TAG: char = 'L';

/// Literal tag opening every beacon record
pub const BEACON_PREFIX: &str = "Layer: ";

/// Separator between entries of a data message
pub const ENTRY_DELIMITER: &str = "| ";
