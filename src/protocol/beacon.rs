use std::time::Duration;

use crate::core::{Error, Result};

use super::{BEACON_PREFIX, BEACON_TAG};

/// Synchronization beacon carried in the first slots of every epoch
///
/// `layers_remaining` counts the relay hops still needed to reach the farthest
/// layer; `slots_remaining` counts the slots of any kind still to elapse in the
/// epoch as of this hop. Both tick down by one per relay. `slot_time` is fixed
/// for the whole network and copied verbatim through every relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beacon {
    pub layers_remaining: u32,
    pub slots_remaining: u32,
    pub slot_time: Duration,
}

impl Beacon {
    /// Creates a new beacon value
    pub fn new(layers_remaining: u32, slots_remaining: u32, slot_time: Duration) -> Self {
        Beacon {
            layers_remaining,
            slots_remaining,
            slot_time,
        }
    }

    /// Encodes the beacon wire record, e.g. `Layer: 2 05 2000`
    ///
    /// The slot count is zero-padded to two digits; the slot time is in
    /// milliseconds.
    pub fn encode(&self) -> String {
        format!(
            "{}{} {:02} {}",
            BEACON_PREFIX,
            self.layers_remaining,
            self.slots_remaining,
            self.slot_time.as_millis()
        )
    }

    /// Decodes a beacon wire record
    ///
    /// Surrounding whitespace is tolerated; the tag and all three numeric
    /// fields are required in the positions `encode` produces.
    pub fn decode(text: &str) -> Result<Self> {
        let body = text
            .trim()
            .strip_prefix(BEACON_PREFIX)
            .ok_or_else(|| Error::malformed_beacon(format!("missing tag: {:?}", text)))?;

        let mut fields = body.split_whitespace();
        let layers_remaining = parse_field(fields.next(), "layers")?;
        let slots_remaining = parse_field(fields.next(), "slots")?;
        let slot_time_ms: u64 = parse_field(fields.next(), "slot time")?;
        if fields.next().is_some() {
            return Err(Error::malformed_beacon(format!(
                "trailing fields: {:?}",
                text
            )));
        }

        Ok(Beacon {
            layers_remaining,
            slots_remaining,
            slot_time: Duration::from_millis(slot_time_ms),
        })
    }
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, name: &str) -> Result<T> {
    field
        .ok_or_else(|| Error::malformed_beacon(format!("missing {} field", name)))?
        .parse()
        .map_err(|_| Error::malformed_beacon(format!("non-numeric {} field", name)))
}

/// Tells beacons apart from data messages by the reserved first character alone
pub fn is_beacon(text: &str) -> bool {
    text.starts_with(BEACON_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_wire_format() {
        let beacon = Beacon::new(2, 5, Duration::from_millis(2000));
        assert_eq!(beacon.encode(), "Layer: 2 05 2000");

        let relayed = Beacon::new(1, 4, Duration::from_millis(2000));
        assert_eq!(relayed.encode(), "Layer: 1 04 2000");
    }

    #[test]
    fn test_wide_slot_counts_not_padded_further() {
        let beacon = Beacon::new(2, 30, Duration::from_millis(2000));
        assert_eq!(beacon.encode(), "Layer: 2 30 2000");
    }

    #[test]
    fn test_round_trip() {
        let beacon = Beacon::new(3, 12, Duration::from_millis(500));
        assert_eq!(Beacon::decode(&beacon.encode()).unwrap(), beacon);
    }

    #[test]
    fn test_decode_tolerates_surrounding_whitespace() {
        let beacon = Beacon::decode("  Layer: 2 05 2000 \n").unwrap();
        assert_eq!(beacon.layers_remaining, 2);
        assert_eq!(beacon.slots_remaining, 5);
        assert_eq!(beacon.slot_time, Duration::from_millis(2000));
    }

    #[test]
    fn test_decode_rejects_missing_tag() {
        assert!(matches!(
            Beacon::decode("ID: 2, DATA: 22.22, 1"),
            Err(crate::core::Error::MalformedBeacon(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_numeric_fields() {
        assert!(Beacon::decode("Layer: x 05 2000").is_err());
        assert!(Beacon::decode("Layer: 2 05 fast").is_err());
        assert!(Beacon::decode("Layer: 2 05").is_err());
        assert!(Beacon::decode("Layer: 2 05 2000 9").is_err());
        assert!(Beacon::decode("").is_err());
    }

    #[test]
    fn test_is_beacon_inspects_first_character_only() {
        assert!(is_beacon("Layer: 2 05 2000"));
        assert!(is_beacon("Lorem"));
        assert!(!is_beacon("ID: 2, DATA: 22.22, 1"));
        assert!(!is_beacon(""));
    }
}
