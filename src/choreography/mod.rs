//! Beat list → playable level: difficulty thinning, then the style-driven
//! note placement.

pub mod difficulty;
pub mod generator;
pub mod grid;
pub mod notes;
pub mod patterns;
pub mod style;

use rand::Rng;
use serde::Serialize;

use crate::analysis::merge::merge_by_strength;
use crate::analysis::{Beat, BeatCandidate, BeatDetectionResult};
use difficulty::Difficulty;
use generator::Orchestrator;
use notes::{Note, Obstacle};
use patterns::PatternLibrary;

pub const BEATS_PER_BAR: u32 = 4;
pub const NOTE_JUMP_SPEED: u32 = 10;

/// One difficulty's level content plus the metadata a level writer needs.
#[derive(Clone, Debug, Serialize)]
pub struct Choreography {
    pub difficulty: Difficulty,
    pub bpm: f64,
    pub beats_per_bar: u32,
    pub note_jump_speed: u32,
    pub notes: Vec<Note>,
    pub obstacles: Vec<Obstacle>,
}

#[derive(Clone, Copy, Debug)]
pub struct GenerationParams {
    pub difficulty: Difficulty,
    pub skill_level: f32,
    pub lead_in_seconds: f64,
}

/// Merge beats closer than the difficulty's spacing, strongest first.
pub fn thin_beats(beats: &[Beat], sample_rate: u32, difficulty: Difficulty, skill_level: f32) -> Vec<Beat> {
    let radius = difficulty.merge_radius_seconds(skill_level) * sample_rate as f64;
    let candidates: Vec<BeatCandidate> = beats.iter().copied().map(BeatCandidate::from).collect();
    merge_by_strength(candidates, radius)
}

pub fn generate<R: Rng + ?Sized>(
    detection: &BeatDetectionResult,
    sample_rate: u32,
    library: &PatternLibrary,
    params: GenerationParams,
    rng: &mut R,
) -> Choreography {
    let beats = thin_beats(&detection.beats, sample_rate, params.difficulty, params.skill_level);
    let (notes, obstacles) =
        Orchestrator::new(library, detection.bpm, sample_rate, params.lead_in_seconds).run(&beats, rng);
    log::info!(
        "{}: {} of {} beats kept, {} notes, {} walls",
        params.difficulty,
        beats.len(),
        detection.beats.len(),
        notes.len(),
        obstacles.len()
    );

    Choreography {
        difficulty: params.difficulty,
        bpm: detection.bpm,
        beats_per_bar: BEATS_PER_BAR,
        note_jump_speed: NOTE_JUMP_SPEED,
        notes,
        obstacles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    fn beats(spacing_samples: usize, count: usize) -> Vec<Beat> {
        (1..=count)
            .map(|k| Beat {
                sample_index: k * spacing_samples,
                strength: (k % 4) as f64 + 1.0,
            })
            .collect()
    }

    #[test]
    fn expert_plus_keeps_every_beat() {
        let input = beats(4410, 50);
        let thinned = thin_beats(&input, 44100, Difficulty::ExpertPlus, 0.5);
        assert_eq!(thinned.len(), input.len());
    }

    #[test]
    fn easier_levels_have_fewer_beats() {
        let input = beats(4410, 200);
        let mut counts = Vec::new();
        for d in Difficulty::ALL {
            counts.push(thin_beats(&input, 44100, d, 0.2).len());
        }
        for pair in counts.windows(2) {
            assert!(pair[0] <= pair[1], "{:?}", counts);
        }
        assert!(counts[0] < counts[4]);
    }

    #[test]
    fn choreography_carries_level_metadata() {
        let detection = BeatDetectionResult {
            bpm: 120.0,
            beats: beats(22050, 60),
            intensity: Vec::new(),
        };
        let library = PatternLibrary::embedded().unwrap();
        let params = GenerationParams {
            difficulty: Difficulty::Hard,
            skill_level: 0.5,
            lead_in_seconds: 4.0,
        };
        let level = generate(&detection, 44100, &library, params, &mut create_rng(42));
        assert_eq!(level.bpm, 120.0);
        assert_eq!(level.beats_per_bar, 4);
        assert_eq!(level.note_jump_speed, 10);
        assert!(!level.notes.is_empty());
    }
}
