use crate::core::{Error, NodeId, Result};

use super::ENTRY_DELIMITER;

/// One node's contribution to a data message
#[derive(Debug, Clone, PartialEq)]
pub struct DataEntry {
    pub node_id: NodeId,
    pub value: f32,
    /// Per-node send counter, monotonically increasing across epochs
    pub sequence: u32,
}

impl DataEntry {
    /// Creates a new data entry
    pub fn new(node_id: NodeId, value: f32, sequence: u32) -> Self {
        DataEntry {
            node_id,
            value,
            sequence,
        }
    }

    /// Encodes the entry wire record, e.g. `ID: 2, DATA: 22.22, 1`
    pub fn encode(&self) -> String {
        format!("ID: {}, DATA: {:.2}, {}", self.node_id, self.value, self.sequence)
    }

    /// Decodes a single entry record
    pub fn decode(text: &str) -> Result<Self> {
        let mut parts = text.trim().split(", ");

        let node_id = parts
            .next()
            .and_then(|part| part.strip_prefix("ID: "))
            .and_then(|id| id.parse().ok())
            .map(NodeId)
            .ok_or_else(|| Error::malformed_data(format!("bad node id in {:?}", text)))?;

        let value = parts
            .next()
            .and_then(|part| part.strip_prefix("DATA: "))
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| Error::malformed_data(format!("bad value in {:?}", text)))?;

        let sequence = parts
            .next()
            .and_then(|seq| seq.parse().ok())
            .ok_or_else(|| Error::malformed_data(format!("bad sequence in {:?}", text)))?;

        if parts.next().is_some() {
            return Err(Error::malformed_data(format!("trailing fields in {:?}", text)));
        }

        Ok(DataEntry {
            node_id,
            value,
            sequence,
        })
    }
}

/// Data message relayed inward toward the sink
///
/// Entries stay in child-to-parent origination order; each forwarding node
/// appends its own entry to the tail.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMessage {
    pub entries: Vec<DataEntry>,
}

impl DataMessage {
    /// Creates a single-entry message, the leaf node's first contribution
    pub fn from_entry(entry: DataEntry) -> Self {
        DataMessage {
            entries: vec![entry],
        }
    }

    /// Appends a forwarding node's entry to the tail
    pub fn append(&mut self, entry: DataEntry) {
        self.entries.push(entry);
    }

    /// Encodes the message as delimiter-joined entry records
    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(DataEntry::encode)
            .collect::<Vec<_>>()
            .join(ENTRY_DELIMITER)
    }

    /// Decodes a full message into its ordered entries
    pub fn decode(text: &str) -> Result<Self> {
        let entries = text
            .split(ENTRY_DELIMITER)
            .map(DataEntry::decode)
            .collect::<Result<Vec<_>>>()?;
        if entries.is_empty() {
            return Err(Error::malformed_data("empty data message"));
        }
        Ok(DataMessage { entries })
    }
}
