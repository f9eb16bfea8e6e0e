//! Trimming silent leading and trailing samples using a short-time
//! power spectrum.

use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;
use std::ops::Range;

/// Longest segment used per spectrogram frame.
pub const MAX_SEGMENT: usize = 256;

/// Frame start indices and the mean power of each frame.
///
/// Frames are `min(n, MAX_SEGMENT)` samples long with 50% overlap. Each
/// frame has its mean removed and a Hann window applied; power is the
/// window-normalised sum of the squared FFT magnitudes.
pub fn frame_powers(signal: &[f64]) -> (usize, Vec<(usize, f64)>) {
    let n = signal.len();
    let seg = n.min(MAX_SEGMENT);
    if seg < 2 {
        return (seg, Vec::new());
    }
    let step = (seg / 2).max(1);

    let window: Vec<f64> = (0..seg)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / seg as f64).cos())
        .collect();
    let window_energy: f64 = window.iter().map(|w| w * w).sum();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(seg);

    let mut frames = Vec::new();
    let mut buf = vec![Complex64::new(0.0, 0.0); seg];
    let mut start = 0;
    while start + seg <= n {
        let frame = &signal[start..start + seg];
        let mean = frame.iter().sum::<f64>() / seg as f64;
        for ((b, x), w) in buf.iter_mut().zip(frame).zip(&window) {
            *b = Complex64::new((x - mean) * w, 0.0);
        }
        fft.process(&mut buf);
        // Parseval: sum |X|^2 / N equals the windowed frame energy
        let power = buf.iter().map(|c| c.norm_sqr()).sum::<f64>() / (seg as f64 * window_energy);
        frames.push((start, power));
        start += step;
    }
    (seg, frames)
}

/// Sample range spanning every frame whose power exceeds `threshold`.
///
/// If no frame qualifies (or the signal is too short to frame), the full
/// range is returned.
pub fn spectral_clip_bounds(signal: &[f64], threshold: f64) -> Range<usize> {
    let full = 0..signal.len();
    let (seg, frames) = frame_powers(signal);
    let mut active = frames.iter().filter(|(_, p)| *p > threshold);
    let Some(&(first, _)) = active.next() else {
        return full;
    };
    let last = active.last().map_or(first, |&(s, _)| s);
    first..(last + seg).min(signal.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst(n: usize, on: Range<usize>) -> Vec<f64> {
        (0..n)
            .map(|i| if on.contains(&i) { (i as f64 * 0.7).sin() } else { 0.0 })
            .collect()
    }

    #[test]
    fn trims_silence_around_burst() {
        let sig = burst(4096, 1500..2500);
        let r = spectral_clip_bounds(&sig, 1e-4);
        assert!(r.start > 1000 && r.start <= 1500, "start {}", r.start);
        assert!(r.end >= 2500 && r.end < 3100, "end {}", r.end);
    }

    #[test]
    fn silent_signal_is_kept_whole() {
        let sig = vec![0.0; 1000];
        assert_eq!(spectral_clip_bounds(&sig, 1e-4), 0..1000);
    }

    #[test]
    fn dc_offset_is_not_signal() {
        let sig = vec![3.0; 1000];
        assert_eq!(spectral_clip_bounds(&sig, 1e-4), 0..1000);
        let (_, frames) = frame_powers(&sig);
        assert!(frames.iter().all(|(_, p)| *p < 1e-20));
    }

    #[test]
    fn sine_power_is_half_amplitude_squared() {
        let sig: Vec<f64> = (0..256).map(|i| (2.0 * PI * 16.0 * i as f64 / 256.0).sin()).collect();
        let (_, frames) = frame_powers(&sig);
        approx::assert_relative_eq!(frames[0].1, 0.5, max_relative = 1e-9);
    }

    #[test]
    fn short_signals_are_not_clipped() {
        assert_eq!(spectral_clip_bounds(&[1.0], 1e-4), 0..1);
        assert_eq!(spectral_clip_bounds(&[], 1e-4), 0..0);
    }
}
