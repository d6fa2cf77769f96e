//! Epoch synchronization roles
//!
//! The sink and node roles are deliberately separate contracts: the sink is
//! mains-powered and listens through every data slot, while nodes sleep
//! through every slot that is not theirs.

pub mod node;
pub mod sampler;
pub mod sink;

pub use self::node::NodeRunner;
pub use self::sampler::{FixedSampler, SensorSampler, UniformSampler};
pub use self::sink::{DataReport, EpochReport, EpochScheduler};
