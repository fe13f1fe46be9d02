use serde::Serialize;

use super::spectrum::SpectralFrame;
use crate::error::{Error, Result};

/// One point of the normalized song-energy curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IntensitySample {
    pub sample_index: usize,
    /// In [0, 1]; the loudest point of the curve is exactly 1.0.
    pub value: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct IntensityParams {
    /// Minimum per-bin increase counted as flux.
    pub flux_epsilon: f32,
    /// Width of the sliding dynamic-threshold window.
    pub threshold_seconds: f64,
    /// Full width of the centred median filter.
    pub median_seconds: f64,
}

impl Default for IntensityParams {
    fn default() -> Self {
        Self {
            flux_epsilon: 1e-5,
            threshold_seconds: 1.5,
            median_seconds: 1.0,
        }
    }
}

/// A (sample index, value) point of an intermediate series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
}

/// Median-filtered spectral flux normalized to a peak of 1.0.
///
/// The dynamic threshold is computed alongside for diagnostics only; it does
/// not gate the flux. Sparse material (isolated hits between silences) can be
/// flattened to zero by the median; the raw flux is normalized instead then.
/// Fails with [`Error::Degenerate`] only when the raw flux is zero everywhere.
pub fn estimate_intensity(
    frames: &[SpectralFrame],
    sample_rate: u32,
    hop_size: usize,
    params: IntensityParams,
) -> Result<Vec<IntensitySample>> {
    let flux = flux_counts(frames, params.flux_epsilon);
    if !flux.iter().any(|p| p.y > 0.0) {
        return Err(Error::degenerate("spectral flux is zero across the whole signal"));
    }

    let threshold_window =
        (params.threshold_seconds * sample_rate as f64 / hop_size as f64).floor() as usize;
    let flux_values: Vec<f64> = flux.iter().map(|p| p.y).collect();
    match dynamic_threshold(&flux_values, threshold_window, 2, 4) {
        Some(threshold) => log::debug!(
            "Dynamic flux threshold: window={} points, mean={:.2}",
            threshold_window,
            threshold.iter().sum::<f64>() / threshold.len().max(1) as f64
        ),
        None => log::debug!(
            "Dynamic flux threshold: signal shorter than one {}-point window",
            threshold_window
        ),
    }

    let filtered = median_filter(&flux, params.median_seconds * sample_rate as f64);
    let curve = if filtered.iter().any(|p| p.y > 0.0) {
        filtered
    } else {
        log::debug!("Median filter flattened the flux; using the unfiltered series");
        flux
    };

    let peak = curve.iter().map(|p| p.y).fold(0.0f64, f64::max);
    Ok(curve
        .iter()
        .map(|p| IntensitySample {
            sample_index: p.x as usize,
            value: (p.y / peak) as f32,
        })
        .collect())
}

/// Per frame (from the second on), how many bins rose by more than `epsilon`.
pub fn flux_counts(frames: &[SpectralFrame], epsilon: f32) -> Vec<SeriesPoint> {
    frames
        .windows(2)
        .map(|pair| {
            let rising = pair[1]
                .magnitudes
                .iter()
                .zip(pair[0].magnitudes.iter())
                .filter(|(cur, prev)| *cur - *prev > epsilon)
                .count();
            SeriesPoint {
                x: pair[1].center,
                y: rising as f64,
            }
        })
        .collect()
}

/// Centred median over every point within `±window / 2` on the x axis.
pub fn median_filter(series: &[SeriesPoint], window: f64) -> Vec<SeriesPoint> {
    let half = window / 2.0;
    let mut lo = 0;
    let mut hi = 0;
    let mut scratch: Vec<f64> = Vec::new();

    series
        .iter()
        .map(|p| {
            while series[lo].x < p.x - half {
                lo += 1;
            }
            while hi < series.len() && series[hi].x <= p.x + half {
                hi += 1;
            }
            scratch.clear();
            scratch.extend(series[lo..hi].iter().map(|q| q.y));
            SeriesPoint {
                x: p.x,
                y: median(&mut scratch),
            }
        })
        .collect()
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) * 0.5
    } else {
        values[mid]
    }
}

/// Sliding peak-based threshold over `values`, one entry per input index.
///
/// Each `window`-long slice (stride `window / 2`) contributes
/// `0.8 * k_min-th highest + 0.2 * k_max-th highest` at its centre; values
/// between centres are interpolated linearly and held flat beyond the first
/// and last centre. Returns `None` when no full window fits.
pub fn dynamic_threshold(
    values: &[f64],
    window: usize,
    min_peak: usize,
    max_peak: usize,
) -> Option<Vec<f64>> {
    if min_peak == 0 || max_peak == 0 || window < min_peak.max(max_peak) || window < 2 {
        return None;
    }

    let mut points: Vec<SeriesPoint> = Vec::new();
    let mut start = 0;
    let mut ordered: Vec<f64> = Vec::with_capacity(window);
    while start + window <= values.len() {
        ordered.clear();
        ordered.extend_from_slice(&values[start..start + window]);
        ordered.sort_by(|a, b| b.total_cmp(a));
        let combined = 0.8 * ordered[min_peak - 1] + 0.2 * ordered[max_peak - 1];
        points.push(SeriesPoint {
            x: (start + window / 2) as f64,
            y: combined,
        });
        start += window / 2;
    }

    let first = *points.first()?;
    let last = *points.last()?;

    let mut segment = 0;
    let curve = (0..values.len())
        .map(|idx| {
            let x = idx as f64;
            if x <= first.x {
                return first.y;
            }
            if x >= last.x {
                return last.y;
            }
            while points[segment + 1].x < x {
                segment += 1;
            }
            let a = points[segment];
            let b = points[segment + 1];
            a.y + (b.y - a.y) * (x - a.x) / (b.x - a.x)
        })
        .collect();
    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> SeriesPoint {
        SeriesPoint { x, y }
    }

    fn frame(center: f64, magnitudes: &[f32]) -> SpectralFrame {
        SpectralFrame {
            center,
            magnitudes: magnitudes.to_vec(),
        }
    }

    #[test]
    fn flux_counts_rising_bins() {
        let frames = vec![
            frame(0.0, &[0.0, 1.0, 1.0]),
            frame(10.0, &[1.0, 1.0, 2.0]),
            frame(20.0, &[0.5, 1.000001, 2.0]),
        ];
        let flux = flux_counts(&frames, 1e-5);
        assert_eq!(flux, vec![pt(10.0, 2.0), pt(20.0, 0.0)]);
    }

    #[test]
    fn median_removes_spikes() {
        let series: Vec<SeriesPoint> = (0..9)
            .map(|i| pt(i as f64 * 10.0, if i == 4 { 100.0 } else { 1.0 }))
            .collect();
        let filtered = median_filter(&series, 40.0);
        assert!(filtered.iter().all(|p| p.y == 1.0));
    }

    #[test]
    fn median_of_even_window_averages_middle() {
        let series = vec![pt(0.0, 1.0), pt(10.0, 3.0)];
        let filtered = median_filter(&series, 20.0);
        assert_eq!(filtered[0].y, 2.0);
        assert_eq!(filtered[1].y, 2.0);
    }

    #[test]
    fn intensity_normalized_to_unit_peak() {
        let frames: Vec<SpectralFrame> = (0..40)
            .map(|i| {
                let level = if (10..20).contains(&i) { i as f32 } else { (i % 2) as f32 };
                frame(i as f64 * 1000.0, &[level, level * 0.5, 0.0, level * 2.0])
            })
            .collect();
        let curve = estimate_intensity(&frames, 10_000, 1000, IntensityParams::default()).unwrap();
        assert_eq!(curve.len(), 39);
        assert!(curve.iter().all(|s| (0.0..=1.0).contains(&s.value)));
        assert!(curve.iter().any(|s| s.value == 1.0));
        for pair in curve.windows(2) {
            assert!(pair[0].sample_index < pair[1].sample_index);
        }
    }

    #[test]
    fn sparse_hits_fall_back_to_raw_flux() {
        // one rising frame every 50 frames; the median over ±0.5 s is zero
        let frames: Vec<SpectralFrame> = (0..200)
            .map(|i| {
                let level = if i % 50 == 25 { 1.0 } else { 0.0 };
                frame(i as f64 * 100.0, &[level, level, 0.0])
            })
            .collect();
        let curve = estimate_intensity(&frames, 10_000, 100, IntensityParams::default()).unwrap();
        assert_eq!(curve.len(), 199);
        let peaks: Vec<usize> = curve
            .iter()
            .filter(|s| s.value == 1.0)
            .map(|s| s.sample_index)
            .collect();
        assert_eq!(peaks, vec![2500, 7500, 12500, 17500]);
        assert!(curve.iter().all(|s| s.value == 0.0 || s.value == 1.0));
    }

    #[test]
    fn silent_intensity_is_degenerate() {
        let frames: Vec<SpectralFrame> = (0..10).map(|i| frame(i as f64, &[0.0, 0.0])).collect();
        let err = estimate_intensity(&frames, 100, 1, IntensityParams::default()).unwrap_err();
        assert!(matches!(err, Error::Degenerate(_)));
    }

    #[test]
    fn threshold_blends_second_and_fourth_peak() {
        let values = vec![1.0, 9.0, 3.0, 7.0, 5.0, 0.0, 2.0, 8.0];
        // window 8 -> single point: 2nd highest 8, 4th highest 5
        let t = dynamic_threshold(&values, 8, 2, 4).unwrap();
        assert_eq!(t.len(), 8);
        let expected = 0.8 * 8.0 + 0.2 * 5.0;
        assert!(t.iter().all(|v| (v - expected).abs() < 1e-12));
    }

    #[test]
    fn threshold_interpolates_between_windows() {
        let mut values = vec![0.0; 8];
        values.extend(vec![10.0; 4]);
        // windows of 8 at starts 0 and 4: centres 4 and 8
        let t = dynamic_threshold(&values, 8, 2, 4).unwrap();
        assert_eq!(t.len(), 12);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[4], 0.0);
        assert!((t[6] - 5.0).abs() < 1e-12);
        assert_eq!(t[8], 10.0);
        assert_eq!(t[11], 10.0);
    }

    #[test]
    fn threshold_needs_a_full_window() {
        assert!(dynamic_threshold(&[1.0, 2.0], 8, 2, 4).is_none());
    }
}
