//! Radio transport abstraction
//!
//! The protocol consumes a half-duplex packet radio through [`RadioTransport`].
//! Transmit and receive are mutually exclusive; the transport's mode is
//! explicit and observable so callers (and tests) can hold the invariant that
//! an idle radio is always in receive mode.

pub mod channel;

pub use self::channel::{ChannelRadio, SharedMedium};

use bytes::{BufMut, BytesMut};

use crate::core::{Result, SignalMetrics};

/// Current mode of a half-duplex radio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioMode {
    Transmit,
    Receive,
}

/// Half-duplex packet radio consumed by the sink and node roles
pub trait RadioTransport {
    /// Opens an outbound packet and switches the radio to transmit mode
    fn begin_transmission(&mut self) -> Result<()>;

    /// Appends payload bytes to the open outbound packet
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Sends the open packet over the air
    fn end_transmission(&mut self) -> Result<()>;

    /// Switches the radio back to continuous receive mode
    fn set_receive_mode(&mut self);

    /// Current transmit/receive mode
    fn mode(&self) -> RadioMode;

    /// Size of a pending inbound packet, or 0 when none is waiting
    ///
    /// A pending packet is claimed for reading; the next calls to
    /// [`read_available_byte`](RadioTransport::read_available_byte) drain it.
    fn poll_incoming_packet(&mut self) -> usize;

    /// Next byte of the claimed inbound packet
    fn read_available_byte(&mut self) -> Option<u8>;

    /// Signal strength of the last received packet, in dBm
    fn last_packet_rssi(&self) -> i16;

    /// Signal-to-noise ratio of the last received packet, in dB
    fn last_packet_snr(&self) -> f32;

    /// Sends one packet and drops the radio back into receive mode
    fn transmit(&mut self, frame: &str) -> Result<()> {
        self.begin_transmission()?;
        self.write_bytes(frame.as_bytes())?;
        self.end_transmission()?;
        self.set_receive_mode();
        Ok(())
    }

    /// Polls for a pending packet and drains it into a string
    fn read_packet(&mut self) -> Option<String> {
        let size = self.poll_incoming_packet();
        if size == 0 {
            return None;
        }
        let mut buf = BytesMut::with_capacity(size);
        while let Some(byte) = self.read_available_byte() {
            buf.put_u8(byte);
        }
        Some(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Signal metrics of the last received packet
    fn last_packet_metrics(&self) -> SignalMetrics {
        SignalMetrics {
            rssi: self.last_packet_rssi(),
            snr: self.last_packet_snr(),
        }
    }
}
