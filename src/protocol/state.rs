use std::time::Duration;

use crate::core::NodeId;

use super::beacon::{is_beacon, Beacon};
use super::data::DataEntry;
use super::ENTRY_DELIMITER;

/// The two observable wait states of a node
///
/// Transmitting and sleeping never outlive a single transition; they are
/// expressed by the returned [`Reaction`], not stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePhase {
    /// Waiting for this epoch's beacon; every epoch starts and ends here
    AwaitingBeacon,
    /// Beacon handled; listening for a data message to forward
    AwaitingDataForward,
}

/// Per-epoch runtime state of a node
///
/// Held as an explicit value owned by the state machine rather than
/// process-wide globals, so transitions can be unit-tested without a radio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRuntimeState {
    pub phase: NodePhase,
    /// Guards re-forwarding within the current wake window
    pub data_sent: bool,
    /// Beacon-relay hops still ahead of this node, as of the last beacon
    pub layers_remaining: u32,
    /// Slots of any kind still to elapse in the epoch, as of the last beacon
    pub slots_remaining: u32,
    /// Network-wide slot duration, copied verbatim from the last beacon
    pub slot_time: Duration,
    /// Send counter; persists across epochs
    pub sequence: u32,
}

impl NodeRuntimeState {
    fn new() -> Self {
        NodeRuntimeState {
            phase: NodePhase::AwaitingBeacon,
            data_sent: false,
            layers_remaining: 0,
            slots_remaining: 0,
            slot_time: Duration::ZERO,
            sequence: 0,
        }
    }
}

/// What a transition asks the surrounding runner to do
///
/// The state machine itself performs no I/O; the runner transmits the frame,
/// returns the radio to receive mode and suspends for the requested duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Relay the decremented beacon, then sleep out the rest of the beacon phase
    RelayBeacon { frame: String, sleep: Duration },
    /// Terminal layer: transmit this node's own single-entry report
    SendOwnData { frame: String },
    /// Forward a received report with this node's entry appended, then sleep
    /// out the rest of the data phase
    ForwardData { frame: String, sleep: Duration },
    /// Packet dropped; no transmission, no sleep
    Discard(DiscardReason),
}

/// Why a packet was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Undecodable beacon while awaiting one; countdown state is untouched
    MalformedBeacon,
    /// Stray beacon inside this node's data phase
    BeaconDuringDataPhase,
    /// Data arrived after this node already forwarded in this wake window
    DataAlreadySent,
    /// Beacon with an exhausted layer countdown; fields adopted, nothing relayed
    ExhaustedBeacon,
}

/// Slot-synchronization state machine for a normal node
///
/// Consumes received packets one at a time and drives beacon relay, data
/// relay and the sleep computations that keep the node awake only during its
/// assigned window.
#[derive(Debug)]
pub struct SyncStateMachine {
    node_id: NodeId,
    state: NodeRuntimeState,
}

impl SyncStateMachine {
    /// Creates a state machine for the given node identity
    pub fn new(node_id: NodeId) -> Self {
        SyncStateMachine {
            node_id,
            state: NodeRuntimeState::new(),
        }
    }

    /// This node's identity
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Current runtime state
    pub fn state(&self) -> &NodeRuntimeState {
        &self.state
    }

    /// Runs one full transition for a received packet
    ///
    /// `reading` is the current sensor sample, used only when the transition
    /// originates or forwards a report.
    pub fn handle_packet(&mut self, packet: &str, reading: f32) -> Reaction {
        match self.state.phase {
            NodePhase::AwaitingBeacon => self.on_beacon_window(packet, reading),
            NodePhase::AwaitingDataForward => self.on_data_window(packet, reading),
        }
    }

    fn on_beacon_window(&mut self, packet: &str, reading: f32) -> Reaction {
        let beacon = match Beacon::decode(packet) {
            Ok(beacon) => beacon,
            Err(_) => return Reaction::Discard(DiscardReason::MalformedBeacon),
        };

        self.state.layers_remaining = beacon.layers_remaining;
        self.state.slots_remaining = beacon.slots_remaining;
        self.state.slot_time = beacon.slot_time;

        if beacon.layers_remaining > 1 {
            // Not the last layer: pass the countdown on, then sleep until the
            // beacon phase ends from this node's perspective.
            self.state.layers_remaining -= 1;
            self.state.slots_remaining -= 1;
            self.state.data_sent = false;
            self.state.phase = NodePhase::AwaitingDataForward;

            let relay = Beacon::new(
                self.state.layers_remaining,
                self.state.slots_remaining,
                self.state.slot_time,
            );
            let sleep = self.state.slot_time * self.state.layers_remaining;
            Reaction::RelayBeacon {
                frame: relay.encode(),
                sleep,
            }
        } else if beacon.layers_remaining == 1 {
            // Terminal layer: originate data instead of relaying further. The
            // send guard is cleared right away; it only protects a single
            // wake window.
            let frame = self.own_entry(reading).encode();
            self.state.data_sent = false;
            self.state.phase = NodePhase::AwaitingBeacon;
            Reaction::SendOwnData { frame }
        } else {
            // Countdown already exhausted. Fields are adopted and the beacon
            // counts as received, but there is nothing left to relay.
            self.state.phase = NodePhase::AwaitingDataForward;
            Reaction::Discard(DiscardReason::ExhaustedBeacon)
        }
    }

    fn on_data_window(&mut self, packet: &str, reading: f32) -> Reaction {
        if is_beacon(packet) {
            return Reaction::Discard(DiscardReason::BeaconDuringDataPhase);
        }
        if self.state.data_sent {
            return Reaction::Discard(DiscardReason::DataAlreadySent);
        }

        // Forwarding appends textually; the received payload is passed through
        // untouched ahead of this node's entry.
        let entry = self.own_entry(reading);
        let frame = format!("{}{}{}", packet, ENTRY_DELIMITER, entry.encode());

        self.state.data_sent = true;
        self.state.phase = NodePhase::AwaitingBeacon;

        // Beacon fields are unvalidated input; clamp rather than underflow.
        let data_slots = self
            .state
            .slots_remaining
            .saturating_sub(self.state.layers_remaining);
        Reaction::ForwardData {
            frame,
            sleep: self.state.slot_time * data_slots,
        }
    }

    fn own_entry(&mut self, reading: f32) -> DataEntry {
        self.state.sequence += 1;
        DataEntry::new(self.node_id, reading, self.state.sequence)
    }
}
