//! Edge-trigger waveform capture.
//!
//! Scope-style triggering over the sample stream: keep a bounded window of
//! recent samples, arm on a threshold crossing with the selected slope, then
//! collect a fixed post-trigger depth. The completed waveform is the
//! pre-trigger window followed by the post-trigger samples.

use std::collections::VecDeque;

use crate::types::RawSample;

pub const DEFAULT_THRESHOLD: u16 = 512;
pub const DEFAULT_PRE_SAMPLES: usize = 100;
pub const DEFAULT_POST_SAMPLES: usize = 400;

/// Which way the signal must cross the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    Rising,
    Falling,
}

impl Slope {
    // Strict on both sides: a sample sitting exactly on the threshold
    // neither arms nor fires.
    fn crossed(self, previous: u16, current: u16, threshold: u16) -> bool {
        match self {
            Slope::Rising => previous < threshold && current > threshold,
            Slope::Falling => previous > threshold && current < threshold,
        }
    }
}

/// Single-shot edge trigger that re-arms after each capture.
#[derive(Debug)]
pub struct TriggerCapture {
    slope: Slope,
    threshold: u16,
    pre_depth: usize,
    post_depth: usize,
    window: VecDeque<RawSample>,
    post: Option<Vec<RawSample>>,
}

impl Default for TriggerCapture {
    fn default() -> Self {
        Self::new(
            Slope::Rising,
            DEFAULT_THRESHOLD,
            DEFAULT_PRE_SAMPLES,
            DEFAULT_POST_SAMPLES,
        )
    }
}

impl TriggerCapture {
    pub fn new(slope: Slope, threshold: u16, pre_depth: usize, post_depth: usize) -> Self {
        Self {
            slope,
            threshold,
            pre_depth,
            post_depth,
            window: VecDeque::with_capacity(pre_depth + 1),
            post: None,
        }
    }

    /// Feed one sample; returns the completed waveform once the
    /// post-trigger depth fills.
    ///
    /// A crossing needs two samples, so the very first sample can never
    /// fire the trigger.
    pub fn push(&mut self, sample: RawSample) -> Option<Vec<RawSample>> {
        match &mut self.post {
            Some(post) => {
                post.push(sample);
                if post.len() < self.post_depth {
                    return None;
                }
                let mut wave: Vec<RawSample> = self.window.drain(..).collect();
                if let Some(post) = self.post.take() {
                    wave.extend(post);
                }
                Some(wave)
            }
            None => {
                let fired = self.window.back().is_some_and(|previous| {
                    self.slope
                        .crossed(previous.counts(), sample.counts(), self.threshold)
                });
                self.window.push_back(sample);
                while self.window.len() > self.pre_depth {
                    self.window.pop_front();
                }
                if fired {
                    self.post = Some(Vec::with_capacity(self.post_depth));
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn feed(capture: &mut TriggerCapture, counts: &[u16]) -> Option<Vec<u16>> {
        let mut result = None;
        for &c in counts {
            if let Some(wave) = capture.push(RawSample::new(c)) {
                result = Some(wave.iter().map(|s| s.counts()).collect());
            }
        }
        result
    }

    #[test]
    fn test_rising_edge_capture() {
        let mut capture = TriggerCapture::new(Slope::Rising, 512, 3, 2);
        // 400 -> 600 crosses; the trigger sample stays in the window.
        let wave = feed(&mut capture, &[100, 200, 400, 600, 700, 800]);
        assert_eq!(wave.unwrap(), vec![200, 400, 600, 700, 800]);
    }

    #[test]
    fn test_falling_edge_capture() {
        let mut capture = TriggerCapture::new(Slope::Falling, 512, 2, 2);
        let wave = feed(&mut capture, &[900, 600, 400, 300, 200]);
        assert_eq!(wave.unwrap(), vec![600, 400, 300, 200]);
    }

    #[test_case(Slope::Rising ; "rising")]
    #[test_case(Slope::Falling ; "falling")]
    fn test_first_sample_never_fires(slope: Slope) {
        let mut capture = TriggerCapture::new(slope, 512, 2, 1);
        // Would look like a crossing if the window started non-empty.
        assert!(capture.push(RawSample::new(2000)).is_none());
        assert!(capture.push(RawSample::new(2000)).is_none());
    }

    #[test]
    fn test_threshold_touch_does_not_fire() {
        let mut capture = TriggerCapture::new(Slope::Rising, 512, 2, 1);
        assert!(feed(&mut capture, &[512, 513, 514]).is_none());
    }

    #[test]
    fn test_rearms_after_capture() {
        let mut capture = TriggerCapture::new(Slope::Rising, 512, 1, 1);
        let first = feed(&mut capture, &[400, 600, 999]);
        assert_eq!(first.unwrap(), vec![600, 999]);
        let second = feed(&mut capture, &[400, 600, 999]);
        assert_eq!(second.unwrap(), vec![600, 999]);
    }

    #[test]
    fn test_pre_window_is_bounded() {
        let mut capture = TriggerCapture::new(Slope::Rising, 512, 2, 1);
        let wave = feed(&mut capture, &[1, 2, 3, 4, 400, 600, 700]);
        assert_eq!(wave.unwrap(), vec![400, 600, 700]);
    }
}
