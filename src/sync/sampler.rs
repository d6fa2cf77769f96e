use rand::Rng;

/// Source of the sensor reading a node reports each epoch
pub trait SensorSampler {
    /// Takes one reading
    fn sample(&mut self) -> f32;
}

/// Always returns the same reading
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler(pub f32);

impl Default for FixedSampler {
    fn default() -> Self {
        // The dummy reading used for packet-delivery testing on hardware.
        FixedSampler(22.22)
    }
}

impl SensorSampler for FixedSampler {
    fn sample(&mut self) -> f32 {
        self.0
    }
}

/// Uniformly random readings within a range, for simulations
#[derive(Debug, Clone, Copy)]
pub struct UniformSampler {
    low: f32,
    high: f32,
}

impl UniformSampler {
    /// Creates a sampler over the inclusive range `low..=high`
    pub fn new(low: f32, high: f32) -> Self {
        UniformSampler { low, high }
    }
}

impl SensorSampler for UniformSampler {
    fn sample(&mut self) -> f32 {
        rand::thread_rng().gen_range(self.low..=self.high)
    }
}
