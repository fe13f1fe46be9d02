//! Beat and intensity detection over a fully loaded waveform.
//!
//! Coarse STFT → focused bin → onset candidates → strength merge → fine
//! re-alignment gives the beats; the same coarse frames feed the intensity
//! curve.

pub mod align;
pub mod focus;
pub mod intensity;
pub mod merge;
pub mod onset;
pub mod spectrum;

use serde::Serialize;

use crate::audio::waveform::Waveform;
use crate::config::AnalysisConfig;
use crate::error::Result;

pub use intensity::IntensitySample;

/// An onset before clustering. Strength accumulates while merging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeatCandidate {
    pub sample_index: usize,
    pub strength: f64,
}

/// A detected beat.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Beat {
    pub sample_index: usize,
    pub strength: f64,
}

impl From<Beat> for BeatCandidate {
    fn from(beat: Beat) -> Self {
        Self {
            sample_index: beat.sample_index,
            strength: beat.strength,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BeatDetectionResult {
    pub bpm: f64,
    /// Strictly ascending by sample index.
    pub beats: Vec<Beat>,
    pub intensity: Vec<IntensitySample>,
}

/// Run the full detector on `waveform`.
pub fn detect_beats(waveform: &Waveform, config: &AnalysisConfig) -> Result<BeatDetectionResult> {
    config.validate()?;
    let sr = waveform.sample_rate();

    log::info!(
        "Pass 1: STFT (window={}, hop={})...",
        config.window_size,
        config.hop_size
    );
    let coarse = spectrum::SpectralFrameSource::new(waveform, config.window_size, config.hop_size)?;
    let frames = coarse.frames();
    log::info!("  {} frames x {} bins", frames.len(), coarse.bin_count());

    let focus = focus::focused_bins(&frames, waveform.seconds_to_samples(config.focus_seconds));
    let unfocused = focus.iter().filter(|f| f.is_none()).count();
    if unfocused > 0 {
        log::debug!("{} frames without a focused bin", unfocused);
    }

    let candidates = onset::detect_candidates(&frames, &focus, config.onset_thresholds());
    log::info!("Pass 2: {} onset candidates", candidates.len());

    let merged = merge::merge_by_strength(
        candidates,
        waveform.seconds_to_samples(config.merge_seconds),
    );
    log::info!("Pass 3: {} beats after strength merge", merged.len());

    let fine = spectrum::SpectralFrameSource::new(
        waveform,
        config.fine_window_size,
        config.fine_hop_size,
    )?;
    let beats = align::micro_align(&merged, &fine, config.hop_size, waveform.len());
    log::info!(
        "Pass 4: aligned on {}-sample grid ({} fine frames)",
        config.fine_hop_size,
        fine.frame_count()
    );

    let intensity = intensity::estimate_intensity(&frames, sr, config.hop_size, config.intensity_params())?;

    let bpm = 60.0 * merged.len() as f64 / waveform.duration_seconds();
    log::info!(
        "Detected {} beats, {:.1} BPM, {} intensity points",
        beats.len(),
        bpm,
        intensity.len()
    );

    Ok(BeatDetectionResult {
        bpm,
        beats,
        intensity,
    })
}
