use super::spectrum::SpectralFrame;
use super::BeatCandidate;

/// Thresholds for accepting a rise at the focused bin as an onset.
#[derive(Clone, Copy, Debug)]
pub struct OnsetThresholds {
    /// Magnitude the focused bin must exceed.
    pub min_intensity: f32,
    /// Required increase over the previous frame at the focused bin.
    pub min_delta: f32,
}

impl Default for OnsetThresholds {
    fn default() -> Self {
        Self {
            min_intensity: 0.75,
            min_delta: 0.75,
        }
    }
}

/// Emit a candidate wherever the focused bin jumps sharply.
///
/// The first and last frame are never candidates. A candidate's strength is
/// the positive flux over all bins, not only the focused one, so broadband
/// hits outrank a noisy focused bin.
pub fn detect_candidates(
    frames: &[SpectralFrame],
    focus: &[Option<usize>],
    thresholds: OnsetThresholds,
) -> Vec<BeatCandidate> {
    let mut candidates = Vec::new();
    if frames.len() < 3 {
        return candidates;
    }

    for i in 1..frames.len() - 1 {
        let Some(bin) = focus.get(i).copied().flatten() else {
            continue;
        };
        let now = frames[i].magnitudes[bin];
        let before = frames[i - 1].magnitudes[bin];
        if now > thresholds.min_intensity && now > before + thresholds.min_delta {
            candidates.push(BeatCandidate {
                sample_index: frames[i].center as usize,
                strength: positive_flux(&frames[i - 1].magnitudes, &frames[i].magnitudes),
            });
        }
    }

    candidates
}

/// Sum of magnitude increases from `prev` to `cur`.
pub fn positive_flux(prev: &[f32], cur: &[f32]) -> f64 {
    cur.iter()
        .zip(prev.iter())
        .map(|(c, p)| (c - p).max(0.0) as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(center: f64, magnitudes: &[f32]) -> SpectralFrame {
        SpectralFrame {
            center,
            magnitudes: magnitudes.to_vec(),
        }
    }

    #[test]
    fn detects_sharp_rise_and_scores_all_bins() {
        let frames = vec![
            frame(100.0, &[0.0, 0.0, 1.0]),
            frame(200.0, &[2.0, 0.5, 0.0]),
            frame(300.0, &[2.0, 0.5, 0.0]),
        ];
        let focus = vec![Some(0); 3];
        let c = detect_candidates(&frames, &focus, OnsetThresholds::default());
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].sample_index, 200);
        assert!((c[0].strength - 2.5).abs() < 1e-9);
    }

    #[test]
    fn ignores_small_or_weak_rises() {
        let frames = vec![
            frame(0.0, &[0.0]),
            frame(1.0, &[0.7]), // below minimum intensity
            frame(2.0, &[1.2]), // rise of 0.5 only
            frame(3.0, &[0.0]),
        ];
        let focus = vec![Some(0); 4];
        assert!(detect_candidates(&frames, &focus, OnsetThresholds::default()).is_empty());
    }

    #[test]
    fn skips_sentinel_and_edge_frames() {
        let frames = vec![
            frame(0.0, &[5.0]),
            frame(1.0, &[0.0]),
            frame(2.0, &[5.0]),
            frame(3.0, &[0.0]),
            frame(4.0, &[5.0]),
        ];
        let focus = vec![Some(0), Some(0), None, Some(0), Some(0)];
        // frame 2 is unfocused, frame 4 is the last frame
        assert!(detect_candidates(&frames, &focus, OnsetThresholds::default()).is_empty());
    }

    #[test]
    fn positive_flux_ignores_decreases() {
        assert_eq!(positive_flux(&[1.0, 2.0, 3.0], &[2.0, 1.0, 3.5]), 1.5);
    }
}
