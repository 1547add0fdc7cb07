//! Offline waveform analysis.
//!
//! Everything here operates on decoded captures, not the live stream: the
//! dissect tool and tests are the consumers. Frequency comes out two ways,
//! a forward FFT for the dominant component and the mean-crossing count the
//! oscilloscope GUI's autoset used.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::types::RawSample;

/// Summary statistics over a capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveStats {
    pub min: RawSample,
    pub max: RawSample,
    pub mean_counts: f64,
}

impl WaveStats {
    pub fn peak_to_peak(&self) -> u16 {
        self.max.counts() - self.min.counts()
    }

    pub fn peak_to_peak_volts(&self) -> f64 {
        self.max.volts() - self.min.volts()
    }

    /// Midpoint of the observed range, the autoset trigger level.
    pub fn suggested_trigger(&self) -> u16 {
        // min + span/2 rather than (min + max)/2: the sum can exceed u16
        // when a capture carries out-of-range words.
        self.min.counts() + (self.max.counts() - self.min.counts()) / 2
    }
}

pub fn stats(samples: &[RawSample]) -> Option<WaveStats> {
    let first = *samples.first()?;
    let mut min = first;
    let mut max = first;
    let mut sum = 0.0;
    for &sample in samples {
        min = min.min(sample);
        max = max.max(sample);
        sum += f64::from(sample.counts());
    }
    Some(WaveStats {
        min,
        max,
        mean_counts: sum / samples.len() as f64,
    })
}

/// Dominant frequency of a capture, in Hz.
///
/// Forward FFT of the mean-removed buffer, then the positive-frequency bin
/// with the largest magnitude. The converter's output is unipolar, so the
/// mean has to go or DC swamps every real component. Returns None for
/// captures too short to transform or with no AC content at all.
pub fn dominant_frequency(samples: &[RawSample], sample_rate: f64) -> Option<f64> {
    if samples.len() < 4 {
        return None;
    }
    let mean = stats(samples)?.mean_counts;
    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .map(|s| Complex::new(f64::from(s.counts()) - mean, 0.0))
        .collect();

    FftPlanner::new()
        .plan_fft_forward(buffer.len())
        .process(&mut buffer);

    // Real input, symmetric spectrum: only the positive half matters.
    let half = buffer.len() / 2;
    let (offset, peak) = buffer[1..=half]
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.norm_sqr().total_cmp(&b.1.norm_sqr()))?;
    if peak.norm_sqr() == 0.0 {
        return None;
    }
    Some((offset + 1) as f64 * sample_rate / buffer.len() as f64)
}

/// Frequency from mean-level crossings, in Hz.
///
/// The signal crosses its mean twice per period, so the average crossing
/// interval is half the period. Needs at least two crossings.
pub fn zero_crossing_frequency(samples: &[RawSample], sample_rate: f64) -> Option<f64> {
    let mean = stats(samples)?.mean_counts;
    let mut first = None;
    let mut last = None;
    let mut count = 0usize;
    for (i, pair) in samples.windows(2).enumerate() {
        let a = f64::from(pair[0].counts()) - mean;
        let b = f64::from(pair[1].counts()) - mean;
        if (a < 0.0) != (b < 0.0) {
            if first.is_none() {
                first = Some(i);
            }
            last = Some(i);
            count += 1;
        }
    }
    if count < 2 {
        return None;
    }
    let span = (last? - first?) as f64;
    let interval = span / (count - 1) as f64;
    Some(sample_rate / (2.0 * interval))
}
