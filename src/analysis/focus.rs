use rayon::prelude::*;

use super::spectrum::SpectralFrame;

/// For every frame, pick the bin whose magnitude varied most within
/// `±radius_samples` of the frame centre.
///
/// Variation is the sum of absolute frame-to-frame magnitude differences
/// across the window. `None` marks windows with no variation at all (silence
/// or a window holding a single frame); such frames produce no onsets.
pub fn focused_bins(frames: &[SpectralFrame], radius_samples: f64) -> Vec<Option<usize>> {
    let centers: Vec<f64> = frames.iter().map(|f| f.center).collect();

    (0..frames.len())
        .into_par_iter()
        .map(|i| {
            let here = centers[i];
            let start = centers.partition_point(|&c| here - c >= radius_samples);
            let end = centers.partition_point(|&c| c - here < radius_samples);
            if end == 0 || start >= end {
                return None;
            }
            strongest_varying_bin(&frames[start..end])
        })
        .collect()
}

fn strongest_varying_bin(window: &[SpectralFrame]) -> Option<usize> {
    let bins = window.first()?.magnitudes.len();
    let mut variation = vec![0.0f64; bins];
    for pair in window.windows(2) {
        for (acc, (cur, prev)) in variation
            .iter_mut()
            .zip(pair[1].magnitudes.iter().zip(pair[0].magnitudes.iter()))
        {
            *acc += (cur - prev).abs() as f64;
        }
    }

    let mut best: Option<usize> = None;
    let mut best_value = 0.0f64;
    for (bin, &v) in variation.iter().enumerate() {
        if v > best_value {
            best = Some(bin);
            best_value = v;
        }
    }
    best
}
