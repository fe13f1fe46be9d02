use std::sync::Arc;

use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::audio::waveform::Waveform;
use crate::error::{Error, Result};

/// Magnitude spectrum of one analysis window.
#[derive(Clone, Debug)]
pub struct SpectralFrame {
    /// Interpolated sample index of the window centre.
    pub center: f64,
    /// `window_size / 2 + 1` linear magnitudes, DC first.
    pub magnitudes: Vec<f32>,
}

/// Hamming-windowed, hopped STFT over a fully loaded waveform.
///
/// Frames are computed on demand so the fine alignment pass only pays for the
/// neighbourhoods it inspects. Window centres are spaced linearly from
/// `W/2` to `len - W/2`.
pub struct SpectralFrameSource<'a> {
    samples: &'a [f32],
    window_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    centers: Vec<f64>,
    fft: Arc<dyn Fft<f32>>,
}

impl<'a> SpectralFrameSource<'a> {
    pub fn new(waveform: &'a Waveform, window_size: usize, hop_size: usize) -> Result<Self> {
        let samples = waveform.samples();
        if window_size < 2 {
            return Err(Error::invalid_input(format!(
                "window size must be at least 2 (got {})",
                window_size
            )));
        }
        if hop_size == 0 {
            return Err(Error::invalid_input("hop size must be positive"));
        }
        if window_size > samples.len() {
            return Err(Error::invalid_input(format!(
                "window size {} exceeds signal length {}",
                window_size,
                samples.len()
            )));
        }

        let frame_count = (samples.len() - window_size) / hop_size + 1;
        let centers = linspace(
            window_size as f64 / 2.0,
            samples.len() as f64 - window_size as f64 / 2.0,
            frame_count,
        );

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(window_size);

        Ok(Self {
            samples,
            window_size,
            hop_size,
            window: hamming_window(window_size),
            centers,
            fft,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn frame_count(&self) -> usize {
        self.centers.len()
    }

    pub fn bin_count(&self) -> usize {
        self.window_size / 2 + 1
    }

    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Magnitude spectrum of frame `index`, `None` past the last frame.
    pub fn magnitudes(&self, index: usize) -> Option<Vec<f32>> {
        if index >= self.frame_count() {
            return None;
        }
        let start = index * self.hop_size;
        let mut buffer: Vec<Complex<f32>> = self.samples[start..start + self.window_size]
            .iter()
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        self.fft.process(&mut buffer);
        Some(buffer[..self.bin_count()].iter().map(|c| c.norm()).collect())
    }

    pub fn frame(&self, index: usize) -> Option<SpectralFrame> {
        Some(SpectralFrame {
            center: *self.centers.get(index)?,
            magnitudes: self.magnitudes(index)?,
        })
    }

    /// All frames in time order.
    pub fn frames(&self) -> Vec<SpectralFrame> {
        (0..self.frame_count())
            .into_par_iter()
            .filter_map(|i| self.frame(i))
            .collect()
    }
}

fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

fn hamming_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()
        })
        .collect()
}
