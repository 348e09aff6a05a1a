//! Analysis tap: recent output samples and a peak-bin pitch estimate

use std::f64::consts::PI;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Samples kept by the tap; also the FFT size used for estimates
pub const TAP_SIZE: usize = 4096;

/// Ring buffer of the most recent output samples
#[derive(Debug, Clone)]
pub struct AnalysisTap {
    samples: Vec<f32>,
    capacity: usize,
    write_pos: usize,
}

impl AnalysisTap {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: vec![0.0; capacity],
            capacity,
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a new sample into the buffer
    pub fn push(&mut self, sample: f32) {
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// All samples in order (oldest to newest)
    pub fn time_domain(&self) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.capacity);
        result.extend_from_slice(&self.samples[self.write_pos..]);
        result.extend_from_slice(&self.samples[..self.write_pos]);
        result
    }

    /// The most recent `count` samples
    pub fn recent(&self, count: usize) -> Vec<f32> {
        let count = count.min(self.capacity);
        let samples = self.time_domain();
        samples[self.capacity - count..].to_vec()
    }

    pub fn clear(&mut self) {
        self.samples.iter_mut().for_each(|s| *s = 0.0);
        self.write_pos = 0;
    }

    /// Peak-bin frequency estimate over the whole buffer
    pub fn peak_frequency(&self, sample_rate: f64) -> Option<f64> {
        peak_frequency(&self.time_domain(), sample_rate)
    }
}

impl Default for AnalysisTap {
    fn default() -> Self {
        Self::new(TAP_SIZE)
    }
}

/// Index of the first rising zero crossing, or 0 if there is none
pub fn find_zero_crossing(samples: &[f32]) -> usize {
    samples
        .windows(2)
        .position(|w| w[0] < 0.0 && w[1] >= 0.0)
        .unwrap_or(0)
}

/// Estimate the dominant frequency as the strongest FFT bin.
///
/// Applies a Hann window, ignores the DC bin and returns `bin * rate / len`.
/// Returns `None` for fewer than two samples or a silent spectrum.
pub fn peak_frequency(samples: &[f32], sample_rate: f64) -> Option<f64> {
    let len = samples.len();
    if len < 2 {
        return None;
    }

    let denom = (len - 1) as f64;
    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let window = 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos());
            Complex::new(s as f64 * window, 0.0)
        })
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(len).process(&mut buffer);

    let (bin, magnitude) = buffer[1..=len / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| (i + 1, c.norm()))
        .fold((0, 0.0), |best, current| if current.1 > best.1 { current } else { best });

    if magnitude <= f64::EPSILON {
        return None;
    }
    Some(bin as f64 * sample_rate / len as f64)
}
