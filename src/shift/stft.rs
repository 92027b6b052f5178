use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// One analysis frame: bins `0..=fft_size / 2`
pub type Frame = Vec<Complex<f32>>;

/// Forward and inverse transforms for a fixed frame size and hop.
///
/// Frames are centered: the signal is zero-padded by half a frame on each
/// side, so frame `t` is centered on sample `t * hop`.
pub struct Stft {
    fft_size: usize,
    hop: usize,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl Stft {
    pub fn new(fft_size: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::new();
        Stft {
            fft_size,
            hop,
            window: hann_window(fft_size),
            forward: planner.plan_fft_forward(fft_size),
            inverse: planner.plan_fft_inverse(fft_size),
        }
    }

    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Short-time Fourier transform of a signal.
    pub fn analyze(&self, signal: &[f32]) -> Vec<Frame> {
        let pad = self.fft_size / 2;
        let mut padded = vec![0.0f32; signal.len() + 2 * pad];
        padded[pad..pad + signal.len()].copy_from_slice(signal);

        let num_frames = 1 + (padded.len() - self.fft_size) / self.hop;
        let num_bins = self.num_bins();
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.fft_size];

        (0..num_frames)
            .map(|t| {
                let start = t * self.hop;
                for (i, slot) in buffer.iter_mut().enumerate() {
                    *slot = Complex::new(padded[start + i] * self.window[i], 0.0);
                }
                self.forward.process(&mut buffer);
                buffer[..num_bins].to_vec()
            })
            .collect()
    }

    /// Inverse transform by weighted overlap-add, trimmed to `length` samples.
    ///
    /// The output is normalized by the summed squared window, so a signal
    /// passed through `analyze` and `synthesize` unchanged comes back intact.
    pub fn synthesize(&self, frames: &[Frame], length: usize) -> Vec<f32> {
        let n = self.fft_size;
        let pad = n / 2;
        let total = if frames.is_empty() {
            0
        } else {
            (frames.len() - 1) * self.hop + n
        };
        let mut output = vec![0.0f32; total.max(length + pad)];
        let mut window_sum = vec![0.0f32; output.len()];
        let mut buffer = vec![Complex::new(0.0f32, 0.0); n];
        let scale = 1.0 / n as f32;

        for (t, frame) in frames.iter().enumerate() {
            // Rebuild the full Hermitian spectrum from the positive bins
            buffer[0] = Complex::new(frame[0].re, 0.0);
            for k in 1..n / 2 {
                buffer[k] = frame[k];
                buffer[n - k] = frame[k].conj();
            }
            buffer[n / 2] = Complex::new(frame[n / 2].re, 0.0);

            self.inverse.process(&mut buffer);

            let start = t * self.hop;
            for i in 0..n {
                let w = self.window[i];
                output[start + i] += buffer[i].re * scale * w;
                window_sum[start + i] += w * w;
            }
        }

        for (sample, &wss) in output.iter_mut().zip(&window_sum) {
            if wss > 1e-8 {
                *sample /= wss;
            }
        }

        output[pad..pad + length].to_vec()
    }
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / size as f32).cos())
        .collect()
}
