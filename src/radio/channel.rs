//! In-memory shared radio medium for tests and simulation
//!
//! Every attached [`ChannelRadio`] is a port on one [`SharedMedium`]. Links
//! are explicit: a transmission reaches exactly the ports linked to the
//! sender, which models the limited range that keeps the layer chain linear.
//!
//! Each port carries a one-deep receive latch, like the packet FIFO of a
//! LoRa chip: the radio keeps receiving while the host sleeps, an unread
//! packet is overwritten by a newer one, and the overwrite is counted as a
//! dropped packet.

use std::sync::{Arc, Mutex};

use bytes::{Bytes, BytesMut};

use crate::core::{Error, Result, MAX_PACKET_SIZE};

use super::{RadioMode, RadioTransport};

/// Default link quality reported for every delivered packet
const DEFAULT_RSSI: i16 = -60;
const DEFAULT_SNR: f32 = 7.5;

struct PortState {
    mode: RadioMode,
    /// One-deep receive latch
    pending: Option<Bytes>,
    dropped: u64,
    last_rssi: i16,
    last_snr: f32,
}

impl PortState {
    fn new() -> Self {
        PortState {
            mode: RadioMode::Receive,
            pending: None,
            dropped: 0,
            last_rssi: 0,
            last_snr: 0.0,
        }
    }
}

struct MediumState {
    ports: Vec<Arc<Mutex<PortState>>>,
    links: Vec<(usize, usize)>,
    rssi: i16,
    snr: f32,
}

/// Shared radio channel connecting any number of [`ChannelRadio`] ports
#[derive(Clone)]
pub struct SharedMedium {
    state: Arc<Mutex<MediumState>>,
}

impl SharedMedium {
    /// Creates an empty medium with the default link quality
    pub fn new() -> Self {
        Self::with_link_quality(DEFAULT_RSSI, DEFAULT_SNR)
    }

    /// Creates an empty medium reporting the given metrics for every packet
    pub fn with_link_quality(rssi: i16, snr: f32) -> Self {
        SharedMedium {
            state: Arc::new(Mutex::new(MediumState {
                ports: Vec::new(),
                links: Vec::new(),
                rssi,
                snr,
            })),
        }
    }

    /// Attaches a new radio port, starting in receive mode
    pub fn attach(&self) -> ChannelRadio {
        let port = Arc::new(Mutex::new(PortState::new()));
        let mut medium = self.state.lock().expect("medium lock poisoned");
        medium.ports.push(port.clone());
        ChannelRadio {
            medium: self.state.clone(),
            port,
            index: medium.ports.len() - 1,
            tx_buf: BytesMut::new(),
            rx_buf: None,
        }
    }

    /// Puts two ports in radio range of each other
    pub fn link(&self, a: &ChannelRadio, b: &ChannelRadio) {
        let mut medium = self.state.lock().expect("medium lock poisoned");
        medium.links.push((a.index, b.index));
    }
}

impl Default for SharedMedium {
    fn default() -> Self {
        Self::new()
    }
}

/// One port on a [`SharedMedium`]
pub struct ChannelRadio {
    medium: Arc<Mutex<MediumState>>,
    port: Arc<Mutex<PortState>>,
    index: usize,
    tx_buf: BytesMut,
    /// Claimed inbound packet being drained, with its read position
    rx_buf: Option<(Bytes, usize)>,
}

impl ChannelRadio {
    /// Packets overwritten in this port's latch before being read
    pub fn dropped_packets(&self) -> u64 {
        self.port.lock().expect("port lock poisoned").dropped
    }

    fn deliver(&self, frame: Bytes) {
        // Lock order: own port is released before the medium is taken, and
        // target ports are only taken while holding the medium.
        let medium = self.medium.lock().expect("medium lock poisoned");
        for &(a, b) in &medium.links {
            let target = match (a == self.index, b == self.index) {
                (true, false) => b,
                (false, true) => a,
                _ => continue,
            };
            let mut port = medium.ports[target].lock().expect("port lock poisoned");
            if port.mode != RadioMode::Receive {
                continue;
            }
            if port.pending.replace(frame.clone()).is_some() {
                port.dropped += 1;
            }
            port.last_rssi = medium.rssi;
            port.last_snr = medium.snr;
        }
    }
}

impl RadioTransport for ChannelRadio {
    fn begin_transmission(&mut self) -> Result<()> {
        let mut port = self.port.lock().expect("port lock poisoned");
        port.mode = RadioMode::Transmit;
        self.tx_buf.clear();
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        {
            let port = self.port.lock().expect("port lock poisoned");
            if port.mode != RadioMode::Transmit {
                return Err(Error::radio("write outside an open transmission"));
            }
        }
        if self.tx_buf.len() + data.len() > MAX_PACKET_SIZE {
            return Err(Error::radio("payload exceeds maximum packet size"));
        }
        self.tx_buf.extend_from_slice(data);
        Ok(())
    }

    fn end_transmission(&mut self) -> Result<()> {
        {
            let port = self.port.lock().expect("port lock poisoned");
            if port.mode != RadioMode::Transmit {
                return Err(Error::radio("no open transmission"));
            }
        }
        let frame = self.tx_buf.split().freeze();
        self.deliver(frame);
        Ok(())
    }

    fn set_receive_mode(&mut self) {
        self.port.lock().expect("port lock poisoned").mode = RadioMode::Receive;
    }

    fn mode(&self) -> RadioMode {
        self.port.lock().expect("port lock poisoned").mode
    }

    fn poll_incoming_packet(&mut self) -> usize {
        let mut port = self.port.lock().expect("port lock poisoned");
        if port.mode != RadioMode::Receive {
            return 0;
        }
        match port.pending.take() {
            Some(frame) => {
                let size = frame.len();
                self.rx_buf = Some((frame, 0));
                size
            }
            None => 0,
        }
    }

    fn read_available_byte(&mut self) -> Option<u8> {
        let (frame, pos) = self.rx_buf.as_mut()?;
        let byte = frame.get(*pos).copied();
        if byte.is_some() {
            *pos += 1;
        } else {
            self.rx_buf = None;
        }
        byte
    }

    fn last_packet_rssi(&self) -> i16 {
        self.port.lock().expect("port lock poisoned").last_rssi
    }

    fn last_packet_snr(&self) -> f32 {
        self.port.lock().expect("port lock poisoned").last_snr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_follows_links() {
        let medium = SharedMedium::new();
        let mut sender = medium.attach();
        let mut linked = medium.attach();
        let mut unlinked = medium.attach();
        medium.link(&sender, &linked);

        sender.transmit("Layer: 2 05 2000").unwrap();

        assert_eq!(linked.read_packet().as_deref(), Some("Layer: 2 05 2000"));
        assert_eq!(unlinked.read_packet(), None);
        assert_eq!(sender.mode(), RadioMode::Receive);
    }

    #[test]
    fn test_links_are_bidirectional() {
        let medium = SharedMedium::new();
        let mut a = medium.attach();
        let mut b = medium.attach();
        medium.link(&a, &b);

        b.transmit("ID: 2, DATA: 22.22, 1").unwrap();
        assert_eq!(a.read_packet().as_deref(), Some("ID: 2, DATA: 22.22, 1"));
    }

    #[test]
    fn test_transmitting_port_misses_packets() {
        let medium = SharedMedium::new();
        let mut a = medium.attach();
        let mut b = medium.attach();
        medium.link(&a, &b);

        b.begin_transmission().unwrap();
        a.transmit("Layer: 2 05 2000").unwrap();
        b.set_receive_mode();

        assert_eq!(b.read_packet(), None);
    }

    #[test]
    fn test_latch_keeps_newest_packet_and_counts_drops() {
        let medium = SharedMedium::new();
        let mut sender = medium.attach();
        let mut receiver = medium.attach();
        medium.link(&sender, &receiver);

        sender.transmit("first").unwrap();
        sender.transmit("second").unwrap();

        assert_eq!(receiver.read_packet().as_deref(), Some("second"));
        assert_eq!(receiver.dropped_packets(), 1);
        assert_eq!(receiver.read_packet(), None);
    }

    #[test]
    fn test_reported_metrics_come_from_the_medium() {
        let medium = SharedMedium::with_link_quality(-87, 4.25);
        let mut sender = medium.attach();
        let mut receiver = medium.attach();
        medium.link(&sender, &receiver);

        sender.transmit("ID: 1, DATA: 20.00, 1").unwrap();
        receiver.read_packet().unwrap();

        let metrics = receiver.last_packet_metrics();
        assert_eq!(metrics.rssi, -87);
        assert_eq!(metrics.snr, 4.25);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let medium = SharedMedium::new();
        let mut sender = medium.attach();
        sender.begin_transmission().unwrap();
        let oversized = vec![b'x'; MAX_PACKET_SIZE + 1];
        assert!(matches!(
            sender.write_bytes(&oversized),
            Err(Error::Radio(_))
        ));
    }

    #[test]
    fn test_write_requires_open_transmission() {
        let medium = SharedMedium::new();
        let mut radio = medium.attach();
        assert!(radio.write_bytes(b"data").is_err());
        assert!(radio.end_transmission().is_err());
    }
}
