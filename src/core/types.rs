use std::fmt;
use std::time::Duration;

use serde::{Serialize, Deserialize};

use super::error::{Error, Result};

/// Node identifier, assigned at provisioning time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u16);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signal metrics reported by the radio for the last received packet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    /// Received signal strength indicator in dBm
    pub rssi: i16,
    /// Signal-to-noise ratio in dB
    pub snr: f32,
}

/// Slot layout shared by every node in the network for the duration of an epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Total number of slots per epoch
    pub total_slots: u32,
    /// First N slots reserved for beacon relay, one per layer
    pub beacon_slots: u32,
    /// Duration of a single slot
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub slot_time: Duration,
}

impl Default for SlotConfig {
    fn default() -> Self {
        SlotConfig {
            total_slots: 5,
            beacon_slots: 2,
            slot_time: Duration::from_millis(2000),
        }
    }
}

impl SlotConfig {
    /// Checks that the slot layout can carry at least one beacon and one data slot
    pub fn validate(&self) -> Result<()> {
        if self.beacon_slots == 0 {
            return Err(Error::config("beacon_slots must be at least 1"));
        }
        if self.beacon_slots >= self.total_slots {
            return Err(Error::config(
                "beacon_slots must leave room for data slots",
            ));
        }
        if self.slot_time.is_zero() {
            return Err(Error::config("slot_time must be non-zero"));
        }
        Ok(())
    }
}

/// Configuration for a normal (relay/leaf) node
///
/// Everything else a node needs to participate is carried by the beacon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This node's identity, printed in every data entry it originates
    pub node_id: NodeId,
}

/// Configuration for the sink node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Length of the broadcast-then-listen window
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub epoch_time: Duration,
    /// Idle gap between epochs
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub epoch_delay: Duration,
    /// Slot layout advertised in every beacon
    pub slots: SlotConfig,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            epoch_time: Duration::from_millis(10_000),
            epoch_delay: Duration::from_millis(1000),
            slots: SlotConfig::default(),
        }
    }
}

impl SinkConfig {
    /// Validates the slot layout and that the listen window spans every slot
    pub fn validate(&self) -> Result<()> {
        self.slots.validate()?;
        if self.epoch_time < self.slots.slot_time * self.slots.total_slots {
            return Err(Error::config(
                "epoch_time is shorter than the slot schedule it advertises",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deployment_constants() {
        let config = SinkConfig::default();
        assert_eq!(config.epoch_time, Duration::from_millis(10_000));
        assert_eq!(config.epoch_delay, Duration::from_millis(1000));
        assert_eq!(config.slots.total_slots, 5);
        assert_eq!(config.slots.beacon_slots, 2);
        assert_eq!(config.slots.slot_time, Duration::from_millis(2000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_slot_config_validation() {
        let mut slots = SlotConfig::default();
        slots.beacon_slots = 0;
        assert!(matches!(slots.validate(), Err(Error::Config(_))));

        let mut slots = SlotConfig::default();
        slots.beacon_slots = slots.total_slots;
        assert!(matches!(slots.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_epoch_must_cover_slots() {
        let mut config = SinkConfig::default();
        config.epoch_time = Duration::from_millis(5000);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_config_round_trip() {
        let config = SinkConfig::default();
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: SinkConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.epoch_time, config.epoch_time);
        assert_eq!(deserialized.slots, config.slots);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(2).to_string(), "2");
    }
}
