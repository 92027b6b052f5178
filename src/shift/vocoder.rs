use super::stft::{Frame, Stft};
use rustfft::num_complex::Complex;
use std::f32::consts::PI;

const TWO_PI: f32 = 2.0 * PI;

/// Time-stretches a signal by `rate` without changing its pitch.
///
/// `rate > 1` speeds the signal up (shorter output), `rate < 1` slows it down.
/// The output has `round(len / rate)` samples, never fewer than one.
pub fn time_stretch(stft: &Stft, signal: &[f32], rate: f64) -> Vec<f32> {
    let frames = stft.analyze(signal);
    let stretched = phase_vocoder(&frames, rate, stft.hop(), stft.fft_size());
    let length = ((signal.len() as f64 / rate).round() as usize).max(1);
    stft.synthesize(&stretched, length)
}

/// Resamples a sequence of STFT frames in time by `rate`.
///
/// Output frame `t` reads the analysis position `t * rate`. Magnitudes are
/// interpolated linearly between the two surrounding frames; the phase of
/// every bin is accumulated from the instantaneous frequency measured between
/// those frames.
///
/// Phases are locked to spectral peaks: a bin outside a peak takes the peak's
/// accumulated phase plus the phase offset the two bins had in the analysis
/// frame. Without this, bins of one partial drift apart when a frame is
/// replayed many times and the partial loses level at large stretches.
pub fn phase_vocoder(frames: &[Frame], rate: f64, hop: usize, fft_size: usize) -> Vec<Frame> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    let num_bins = first.len();
    let num_frames = frames.len();

    // Expected phase advance per hop for the center frequency of each bin
    let phase_advance: Vec<f32> = (0..num_bins)
        .map(|k| TWO_PI * hop as f32 * k as f32 / fft_size as f32)
        .collect();

    let mut phase_acc: Vec<f32> = first.iter().map(|c| c.arg()).collect();
    let silent = vec![Complex::new(0.0f32, 0.0); num_bins];
    let column = |i: usize| frames.get(i).unwrap_or(&silent);

    let mut output = Vec::with_capacity((num_frames as f64 / rate).ceil() as usize);
    let mut t = 0usize;
    loop {
        let step = t as f64 * rate;
        if step >= num_frames as f64 {
            break;
        }
        let index = step.floor() as usize;
        let alpha = (step - index as f64) as f32;
        let left = column(index);
        let right = column(index + 1);

        let magnitudes: Vec<f32> = (0..num_bins)
            .map(|k| (1.0 - alpha) * left[k].norm() + alpha * right[k].norm())
            .collect();
        let peaks = find_peaks(&magnitudes);

        let mut frame = Vec::with_capacity(num_bins);
        let mut nearest = 0usize;
        for k in 0..num_bins {
            while nearest + 1 < peaks.len()
                && peaks[nearest + 1].abs_diff(k) <= peaks[nearest].abs_diff(k)
            {
                nearest += 1;
            }
            let phase = match peaks.get(nearest) {
                Some(&p) if p != k => phase_acc[p] + left[k].arg() - left[p].arg(),
                _ => phase_acc[k],
            };
            frame.push(Complex::from_polar(magnitudes[k], phase));
        }

        for k in 0..num_bins {
            let mut delta = right[k].arg() - left[k].arg() - phase_advance[k];
            delta -= TWO_PI * (delta / TWO_PI).round();
            // Wrapped so the accumulator never loses precision on long inputs
            phase_acc[k] = (phase_acc[k] + phase_advance[k] + delta).rem_euclid(TWO_PI);
        }
        output.push(frame);
        t += 1;
    }

    output
}

/// Bins whose magnitude is a local maximum
fn find_peaks(magnitudes: &[f32]) -> Vec<usize> {
    let last = magnitudes.len().saturating_sub(1);
    (0..magnitudes.len())
        .filter(|&k| {
            let m = magnitudes[k];
            m > 0.0
                && (k == 0 || m > magnitudes[k - 1])
                && (k == last || m >= magnitudes[k + 1])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_follows_rate() {
        let frames = vec![vec![Complex::new(1.0f32, 0.0); 5]; 10];
        assert_eq!(phase_vocoder(&frames, 1.0, 2, 8).len(), 10);
        assert_eq!(phase_vocoder(&frames, 0.5, 2, 8).len(), 20);
        assert_eq!(phase_vocoder(&frames, 2.0, 2, 8).len(), 5);
        assert!(phase_vocoder(&[], 2.0, 2, 8).is_empty());
    }

    #[test]
    fn peaks_are_local_maxima() {
        assert_eq!(find_peaks(&[0.0, 1.0, 0.5, 0.2, 0.8, 0.8, 0.1]), vec![1, 4]);
        assert_eq!(find_peaks(&[3.0, 2.0, 1.0]), vec![0]);
        assert!(find_peaks(&[0.0; 4]).is_empty());
    }

    #[test]
    fn stretched_length_is_rounded() {
        let stft = Stft::new(256, 64);
        let signal: Vec<f32> = (0..1001).map(|i| (i as f32 * 0.1).sin()).collect();
        assert_eq!(time_stretch(&stft, &signal, 0.5).len(), 2002);
        assert_eq!(time_stretch(&stft, &signal, 2.0).len(), 501);
        assert_eq!(time_stretch(&stft, &[0.5], 4.0).len(), 1);
    }
}
