use crate::error::{Error, Result};

/// Mono PCM samples in [-1, 1] at a fixed sample rate.
#[derive(Clone, Debug)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::invalid_input("waveform contains no samples"));
        }
        if sample_rate == 0 {
            return Err(Error::invalid_input("sample rate must be positive"));
        }
        if let Some(bad) = samples.iter().find(|s| !s.is_finite()) {
            return Err(Error::invalid_input(format!(
                "waveform contains a non-finite sample ({})",
                bad
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Convert a duration in seconds to a (fractional) sample count.
    pub fn seconds_to_samples(&self, seconds: f64) -> f64 {
        seconds * self.sample_rate as f64
    }
}
