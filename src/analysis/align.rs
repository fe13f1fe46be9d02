use rayon::prelude::*;

use super::onset::positive_flux;
use super::spectrum::SpectralFrameSource;
use super::Beat;

/// Snap each beat to the fine frame with the largest positive flux.
///
/// The search covers `±coarse_hop / 2` samples around the beat. Strength,
/// count and order are preserved; a beat whose neighbourhood contains no fine
/// frame keeps its coarse position.
pub fn micro_align(
    beats: &[Beat],
    fine: &SpectralFrameSource,
    coarse_hop: usize,
    signal_len: usize,
) -> Vec<Beat> {
    let half = coarse_hop / 2;
    beats
        .par_iter()
        .map(|beat| {
            let lo = beat.sample_index.saturating_sub(half) as f64;
            let hi = (beat.sample_index + half).min(signal_len) as f64;
            match best_frame(fine, lo, hi) {
                Some(center) => Beat {
                    sample_index: center as usize,
                    strength: beat.strength,
                },
                None => *beat,
            }
        })
        .collect()
}

/// Centre of the frame in `[lo, hi)` with maximal flux against its predecessor.
///
/// The first frame in range is the fallback and is not itself scored. `None`
/// when no frame centre falls inside the range.
fn best_frame(fine: &SpectralFrameSource, lo: f64, hi: f64) -> Option<f64> {
    let centers = fine.centers();
    let first = centers.partition_point(|&c| c < lo);
    let end = centers.partition_point(|&c| c < hi);
    if first >= end {
        return None;
    }

    let mut best = first;
    let mut best_flux = 0.0f64;
    if end > first + 1 {
        let mut prev = fine.magnitudes(first)?;
        for idx in first + 1..end {
            let cur = fine.magnitudes(idx)?;
            let flux = positive_flux(&prev, &cur);
            if flux > best_flux {
                best = idx;
                best_flux = flux;
            }
            prev = cur;
        }
    }
    Some(centers[best])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::waveform::Waveform;

    fn click_track(len: usize, at: &[usize]) -> Waveform {
        let mut samples = vec![0.0f32; len];
        for &pos in at {
            for s in samples.iter_mut().skip(pos).take(16) {
                *s = 1.0;
            }
        }
        Waveform::new(samples, 44100).unwrap()
    }

    #[test]
    fn preserves_count_order_and_strength() {
        let w = click_track(44100, &[10000, 30000]);
        let fine = SpectralFrameSource::new(&w, 1024, 128).unwrap();
        let beats = vec![
            Beat { sample_index: 10300, strength: 4.0 },
            Beat { sample_index: 29800, strength: 2.0 },
        ];
        let aligned = micro_align(&beats, &fine, 1024, w.len());
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0].strength, 4.0);
        assert_eq!(aligned[1].strength, 2.0);
        assert!(aligned[0].sample_index < aligned[1].sample_index);
        for (a, b) in aligned.iter().zip(beats.iter()) {
            assert!(a.sample_index.abs_diff(b.sample_index) <= 512);
        }
    }

    #[test]
    fn moves_towards_the_click() {
        let w = click_track(44100, &[20000]);
        let fine = SpectralFrameSource::new(&w, 1024, 128).unwrap();
        let beats = vec![Beat { sample_index: 19900, strength: 1.0 }];
        let aligned = micro_align(&beats, &fine, 1024, w.len());
        // The steepest rise happens while the click enters the window, i.e. the
        // frame centre sits slightly before the click.
        let idx = aligned[0].sample_index;
        assert!(idx < 20000, "aligned to {}", idx);
        assert!(idx > 19600, "aligned to {}", idx);
    }

    #[test]
    fn beat_past_last_frame_keeps_position() {
        let w = click_track(4096, &[]);
        let fine = SpectralFrameSource::new(&w, 1024, 128).unwrap();
        let beats = vec![Beat { sample_index: 4090, strength: 1.0 }];
        let aligned = micro_align(&beats, &fine, 64, w.len());
        assert_eq!(aligned[0].sample_index, 4090);
    }

    #[test]
    fn empty_search_window_keeps_position() {
        // fine centres at 512, 2560, 4608, ...
        let w = click_track(1024 + 2048 * 4, &[]);
        let fine = SpectralFrameSource::new(&w, 1024, 2048).unwrap();
        assert_eq!(&fine.centers()[..2], &[512.0, 2560.0]);
        let beats = vec![
            Beat { sample_index: 1500, strength: 1.0 },
            Beat { sample_index: 2600, strength: 1.0 },
        ];
        let aligned = micro_align(&beats, &fine, 1024, w.len());
        assert_eq!(aligned[0].sample_index, 1500);
        assert_eq!(aligned[1].sample_index, 2560);
    }
}
