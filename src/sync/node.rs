use tokio::time;
use tracing::{debug, info, warn};

use crate::core::{NodeConfig, Result, PACKET_POLL_INTERVAL};
use crate::protocol::{DiscardReason, Reaction, SyncStateMachine};
use crate::radio::RadioTransport;
use crate::sync::sampler::SensorSampler;
use crate::time::SleepCapability;

/// Node-side control loop
///
/// A thin adapter over the pure [`SyncStateMachine`]: polls the radio, runs
/// one transition per packet and performs its effects (transmit, log,
/// suspend). Single-threaded and cooperative: a transition always runs to
/// completion (sleep included) before the next poll, so packets arriving
/// mid-sleep wait in the radio, or are lost.
pub struct NodeRunner<R, S, P>
where
    R: RadioTransport,
    S: SleepCapability,
    P: SensorSampler,
{
    machine: SyncStateMachine,
    radio: R,
    sleeper: S,
    sampler: P,
}

impl<R, S, P> NodeRunner<R, S, P>
where
    R: RadioTransport,
    S: SleepCapability,
    P: SensorSampler,
{
    /// Creates a runner for the given provisioned identity
    pub fn new(config: NodeConfig, radio: R, sleeper: S, sampler: P) -> Self {
        NodeRunner {
            machine: SyncStateMachine::new(config.node_id),
            radio,
            sleeper,
            sampler,
        }
    }

    /// The underlying state machine
    pub fn machine(&self) -> &SyncStateMachine {
        &self.machine
    }

    /// The radio owned by this runner
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// The sleeper owned by this runner
    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Polls once and, when a packet is pending, runs its full transition
    pub async fn step(&mut self) -> Result<()> {
        let Some(packet) = self.radio.read_packet() else {
            time::sleep(PACKET_POLL_INTERVAL).await;
            return Ok(());
        };
        debug!(%packet, "packet received");

        let reading = self.sampler.sample();
        let reaction = self.machine.handle_packet(&packet, reading);
        self.apply(reaction).await
    }

    /// Drives the control loop forever
    pub async fn run(&mut self) -> Result<()> {
        info!(node_id = %self.machine.node_id(), "node loop started");
        loop {
            self.step().await?;
        }
    }

    async fn apply(&mut self, reaction: Reaction) -> Result<()> {
        match reaction {
            Reaction::RelayBeacon { frame, sleep } => {
                self.radio.transmit(&frame)?;
                debug!(%frame, sleep_ms = sleep.as_millis() as u64, "beacon relayed");
                self.sleeper.sleep_for(sleep).await;
            }
            Reaction::SendOwnData { frame } => {
                self.radio.transmit(&frame)?;
                debug!(%frame, "own report sent");
            }
            Reaction::ForwardData { frame, sleep } => {
                self.radio.transmit(&frame)?;
                debug!(%frame, sleep_ms = sleep.as_millis() as u64, "report forwarded");
                self.sleeper.sleep_for(sleep).await;
            }
            Reaction::Discard(reason) => match reason {
                DiscardReason::MalformedBeacon => warn!("undecodable beacon dropped"),
                DiscardReason::BeaconDuringDataPhase => {
                    info!("beacon during data phase, discarding")
                }
                DiscardReason::DataAlreadySent => debug!("report already sent, discarding"),
                DiscardReason::ExhaustedBeacon => debug!("beacon countdown exhausted"),
            },
        }
        Ok(())
    }
}
