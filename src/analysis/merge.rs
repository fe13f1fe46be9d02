use super::{Beat, BeatCandidate};

/// Greedy strongest-first clustering.
///
/// Repeatedly takes the strongest remaining candidate and absorbs every other
/// candidate closer than `radius_samples`, adding their strength to it. Equal
/// strengths resolve to the candidate that appears first in the input. The
/// result is strictly ascending by sample index; survivors that land on the
/// same index (only possible with a zero radius) are folded together.
pub fn merge_by_strength(mut candidates: Vec<BeatCandidate>, radius_samples: f64) -> Vec<Beat> {
    let mut merged: Vec<Beat> = Vec::with_capacity(candidates.len());

    while let Some(idx) = strongest(&candidates) {
        let anchor = candidates.remove(idx);
        let mut strength = anchor.strength;
        candidates.retain(|c| {
            if (c.sample_index.abs_diff(anchor.sample_index) as f64) < radius_samples {
                strength += c.strength;
                false
            } else {
                true
            }
        });
        merged.push(Beat {
            sample_index: anchor.sample_index,
            strength,
        });
    }

    merged.sort_by_key(|b| b.sample_index);
    merged.dedup_by(|later, earlier| {
        if later.sample_index == earlier.sample_index {
            earlier.strength += later.strength;
            true
        } else {
            false
        }
    });
    merged
}

fn strongest(candidates: &[BeatCandidate]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in candidates.iter().enumerate() {
        match best {
            Some((_, s)) if c.strength <= s => {}
            _ => best = Some((i, c.strength)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(sample_index: usize, strength: f64) -> BeatCandidate {
        BeatCandidate {
            sample_index,
            strength,
        }
    }

    #[test]
    fn empty_input() {
        assert!(merge_by_strength(Vec::new(), 100.0).is_empty());
    }

    #[test]
    fn strongest_absorbs_neighbours() {
        let beats = merge_by_strength(
            vec![cand(100, 1.0), cand(150, 5.0), cand(190, 2.0), cand(400, 1.0)],
            60.0,
        );
        assert_eq!(beats.len(), 2);
        assert_eq!(beats[0].sample_index, 150);
        assert!((beats[0].strength - 8.0).abs() < 1e-12);
        assert_eq!(beats[1].sample_index, 400);
        assert_eq!(beats[1].strength, 1.0);
    }

    #[test]
    fn absorption_is_not_transitive() {
        // 100 absorbs 150 but not 210, which is out of its radius.
        let beats = merge_by_strength(vec![cand(100, 3.0), cand(150, 1.0), cand(210, 1.0)], 60.0);
        let idx: Vec<usize> = beats.iter().map(|b| b.sample_index).collect();
        assert_eq!(idx, vec![100, 210]);
    }

    #[test]
    fn output_ascending_and_not_larger() {
        let input: Vec<BeatCandidate> = (0..50)
            .map(|i| cand((i * 37 % 50) * 90, ((i * 13) % 7) as f64))
            .collect();
        let n = input.len();
        let beats = merge_by_strength(input, 200.0);
        assert!(beats.len() <= n);
        for pair in beats.windows(2) {
            assert!(pair[0].sample_index < pair[1].sample_index);
        }
    }

    #[test]
    fn ties_prefer_earliest_input() {
        let beats = merge_by_strength(vec![cand(100, 2.0), cand(130, 2.0)], 50.0);
        assert_eq!(beats.len(), 1);
        assert_eq!(beats[0].sample_index, 100);
    }

    #[test]
    fn zero_radius_keeps_distinct_and_folds_duplicates() {
        let beats = merge_by_strength(vec![cand(10, 1.0), cand(20, 1.0), cand(10, 2.0)], 0.0);
        assert_eq!(beats.len(), 2);
        assert_eq!(beats[0].sample_index, 10);
        assert_eq!(beats[0].strength, 3.0);
        assert_eq!(beats[1].sample_index, 20);
    }

    #[test]
    fn four_impulses_half_a_second_apart() {
        let sr = 44100.0;
        let truth: Vec<usize> = (1..=4).map(|k| k * 22050).collect();
        let mut input = Vec::new();
        for &t in &truth {
            // smeared detections around each impulse, strongest at the impulse
            input.push(cand(t - 2048, 1.0));
            input.push(cand(t - 1024, 2.0));
            input.push(cand(t, 6.0));
            input.push(cand(t + 1024, 1.5));
        }
        let beats = merge_by_strength(input, 0.125 * sr);
        assert_eq!(beats.len(), 4);
        for (beat, &t) in beats.iter().zip(truth.iter()) {
            let err_seconds = beat.sample_index.abs_diff(t) as f64 / sr;
            assert!(err_seconds <= 0.003);
            assert!((beat.strength - 10.5).abs() < 1e-12);
        }
    }
}
