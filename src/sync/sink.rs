use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::core::{Result, SignalMetrics, SinkConfig, PACKET_POLL_INTERVAL};
use crate::protocol::{is_beacon, Beacon, DataMessage};
use crate::radio::RadioTransport;

/// One data packet collected by the sink during a listen window
#[derive(Debug, Clone)]
pub struct DataReport {
    /// Raw payload as received
    pub payload: String,
    /// Parsed entries, when the payload is a well-formed data message
    pub entries: Option<DataMessage>,
    /// Signal metrics reported by the radio for this packet
    pub metrics: SignalMetrics,
}

/// Everything the sink collected in one epoch
#[derive(Debug, Clone, Default)]
pub struct EpochReport {
    pub received: Vec<DataReport>,
}

/// Sink-side epoch driver
///
/// Broadcasts the synchronization beacon, listens for the rest of the epoch,
/// idles, repeats. The sink is assumed mains-powered: it never sleeps through
/// its listen window and deliberately shares no machinery with the node role.
pub struct EpochScheduler<R: RadioTransport> {
    config: SinkConfig,
    radio: R,
}

impl<R: RadioTransport> EpochScheduler<R> {
    /// Creates a scheduler after validating the configuration
    pub fn new(config: SinkConfig, radio: R) -> Result<Self> {
        config.validate()?;
        Ok(EpochScheduler { config, radio })
    }

    /// The radio owned by this scheduler
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Runs one broadcast-then-listen cycle and returns the collected data
    ///
    /// The listen window is measured from broadcast start. Beacons heard
    /// during the window are ignored; a sink never relays.
    pub async fn run_epoch(&mut self) -> Result<EpochReport> {
        let slots = &self.config.slots;
        let beacon = Beacon::new(slots.beacon_slots, slots.total_slots, slots.slot_time);
        let frame = beacon.encode();

        let window_start = Instant::now();
        self.radio.transmit(&frame)?;
        info!(%frame, "beacon broadcast");

        let mut report = EpochReport::default();
        while window_start.elapsed() < self.config.epoch_time {
            if let Some(payload) = self.radio.read_packet() {
                if is_beacon(&payload) {
                    debug!(%payload, "ignoring relayed beacon");
                } else {
                    let metrics = self.radio.last_packet_metrics();
                    info!(
                        %payload,
                        rssi = metrics.rssi,
                        snr = f64::from(metrics.snr),
                        "data received"
                    );
                    report.received.push(DataReport {
                        entries: DataMessage::decode(&payload).ok(),
                        payload,
                        metrics,
                    });
                }
            }
            time::sleep(PACKET_POLL_INTERVAL).await;
        }
        Ok(report)
    }

    /// Drives epochs forever, idling for the configured gap between them
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let report = self.run_epoch().await?;
            info!(packets = report.received.len(), "epoch ended");
            time::sleep(self.config.epoch_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::core::types::{NodeConfig, NodeId, SlotConfig};
    use crate::radio::{RadioMode, SharedMedium};
    use crate::sync::node::NodeRunner;
    use crate::sync::sampler::FixedSampler;
    use crate::time::TimerSleep;
    use tokio_test::assert_ok;

    fn test_config() -> SinkConfig {
        SinkConfig {
            epoch_time: Duration::from_millis(10_000),
            epoch_delay: Duration::from_millis(1000),
            slots: SlotConfig {
                total_slots: 5,
                beacon_slots: 2,
                slot_time: Duration::from_millis(2000),
            },
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let medium = SharedMedium::new();
        let mut config = test_config();
        config.slots.beacon_slots = 0;
        assert!(EpochScheduler::new(config, medium.attach()).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcasts_configured_beacon() {
        let medium = SharedMedium::new();
        let sink_radio = medium.attach();
        let mut observer = medium.attach();
        medium.link(&sink_radio, &observer);

        let mut scheduler = EpochScheduler::new(test_config(), sink_radio).unwrap();
        let report = scheduler.run_epoch().await.unwrap();

        assert_eq!(observer.read_packet().as_deref(), Some("Layer: 2 05 2000"));
        assert!(report.received.is_empty());
        assert_eq!(scheduler.radio().mode(), RadioMode::Receive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listen_window_spans_epoch_time() {
        let medium = SharedMedium::new();
        let mut scheduler = EpochScheduler::new(test_config(), medium.attach()).unwrap();

        let start = Instant::now();
        tokio_test::assert_ok!(scheduler.run_epoch().await);
        assert!(start.elapsed() >= Duration::from_millis(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_beacons_heard_in_window_are_not_recorded() {
        let medium = SharedMedium::new();
        let sink_radio = medium.attach();
        let mut stray = medium.attach();
        medium.link(&sink_radio, &stray);

        let handle = tokio::spawn(async move {
            time::sleep(Duration::from_millis(100)).await;
            stray.transmit("Layer: 1 04 2000").unwrap();
        });

        let mut scheduler = EpochScheduler::new(test_config(), sink_radio).unwrap();
        let report = scheduler.run_epoch().await.unwrap();
        handle.await.unwrap();

        assert!(report.received.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_data_with_metrics() {
        let medium = SharedMedium::with_link_quality(-71, 6.5);
        let sink_radio = medium.attach();
        let mut reporter = medium.attach();
        medium.link(&sink_radio, &reporter);

        let handle = tokio::spawn(async move {
            time::sleep(Duration::from_millis(4000)).await;
            reporter.transmit("ID: 2, DATA: 22.22, 1").unwrap();
        });

        let mut scheduler = EpochScheduler::new(test_config(), sink_radio).unwrap();
        let report = scheduler.run_epoch().await.unwrap();
        handle.await.unwrap();

        assert_eq!(report.received.len(), 1);
        let data = &report.received[0];
        assert_eq!(data.payload, "ID: 2, DATA: 22.22, 1");
        assert_eq!(data.metrics, SignalMetrics { rssi: -71, snr: 6.5 });
        assert_eq!(data.entries.as_ref().unwrap().entries.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_epoch_over_two_hop_chain() {
        let medium = SharedMedium::new();
        let sink_radio = medium.attach();
        let relay_radio = medium.attach();
        let leaf_radio = medium.attach();
        medium.link(&sink_radio, &relay_radio);
        medium.link(&relay_radio, &leaf_radio);

        let mut relay = NodeRunner::new(
            NodeConfig { node_id: NodeId(1) },
            relay_radio,
            TimerSleep,
            FixedSampler::default(),
        );
        let mut leaf = NodeRunner::new(
            NodeConfig { node_id: NodeId(2) },
            leaf_radio,
            TimerSleep,
            FixedSampler::default(),
        );
        let relay_task = tokio::spawn(async move { relay.run().await });
        let leaf_task = tokio::spawn(async move { leaf.run().await });

        let mut scheduler = EpochScheduler::new(test_config(), sink_radio).unwrap();
        let report = scheduler.run_epoch().await.unwrap();
        relay_task.abort();
        leaf_task.abort();

        assert_eq!(report.received.len(), 1);
        let data = &report.received[0];
        assert_eq!(data.payload, "ID: 2, DATA: 22.22, 1| ID: 1, DATA: 22.22, 1");

        let entries = &data.entries.as_ref().unwrap().entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].node_id, NodeId(2));
        assert_eq!(entries[1].node_id, NodeId(1));
    }
}
