use serde::Serialize;

use crate::analysis::{detect_beats, BeatDetectionResult};
use crate::audio::waveform::Waveform;
use crate::choreography::patterns::PatternLibrary;
use crate::choreography::{generate, Choreography, GenerationParams};
use crate::config::{AnalysisConfig, GenerationConfig};
use crate::error::Result;
use crate::rng::create_keyed_rng;

/// Everything produced for one song, ready to be written as JSON.
#[derive(Clone, Debug, Serialize)]
pub struct SongDocument {
    pub source: String,
    pub sample_rate: u32,
    pub duration_seconds: f64,
    pub seed: u64,
    pub analysis: BeatDetectionResult,
    pub levels: Vec<Choreography>,
}

/// Analyse `waveform` once, then build one level per requested difficulty.
///
/// Each difficulty draws from its own stream derived from `seed`, so adding
/// or removing a difficulty leaves the others unchanged.
pub fn process_song(
    source: &str,
    waveform: &Waveform,
    analysis: &AnalysisConfig,
    generation: &GenerationConfig,
    library: &PatternLibrary,
    seed: u64,
) -> Result<SongDocument> {
    generation.validate()?;
    let detection = detect_beats(waveform, analysis)?;

    let levels = generation
        .difficulties
        .iter()
        .map(|&difficulty| {
            let mut rng = create_keyed_rng(seed, difficulty.name());
            let params = GenerationParams {
                difficulty,
                skill_level: generation.skill_level,
                lead_in_seconds: generation.lead_in_seconds,
            };
            generate(&detection, waveform.sample_rate(), library, params, &mut rng)
        })
        .collect();

    Ok(SongDocument {
        source: source.to_string(),
        sample_rate: waveform.sample_rate(),
        duration_seconds: waveform.duration_seconds(),
        seed,
        analysis: detection,
        levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choreography::difficulty::Difficulty;
    use crate::error::Error;

    #[test]
    fn silent_song_is_degenerate() {
        let waveform = Waveform::new(vec![0.0; 44100 * 2], 44100).unwrap();
        let library = PatternLibrary::embedded().unwrap();
        let err = process_song(
            "silence",
            &waveform,
            &AnalysisConfig::default(),
            &GenerationConfig::default(),
            &library,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Degenerate(_)));
    }

    #[test]
    fn short_song_is_invalid_input() {
        let waveform = Waveform::new(vec![0.1; 1000], 44100).unwrap();
        let library = PatternLibrary::embedded().unwrap();
        let err = process_song(
            "short",
            &waveform,
            &AnalysisConfig::default(),
            &GenerationConfig::default(),
            &library,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn bad_skill_rejected_before_analysis() {
        let waveform = Waveform::new(vec![0.0; 44100], 44100).unwrap();
        let library = PatternLibrary::embedded().unwrap();
        let generation = GenerationConfig {
            skill_level: -0.1,
            difficulties: vec![Difficulty::Easy],
            ..GenerationConfig::default()
        };
        let err = process_song("x", &waveform, &AnalysisConfig::default(), &generation, &library, 1)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
