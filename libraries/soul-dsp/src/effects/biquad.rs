/// Biquad filter cell
///
/// Second-order IIR section in direct form I, configured as a peaking EQ
/// (RBJ Audio EQ Cookbook). One cell processes one channel; each EQ band owns
/// a left and a right cell.
use std::f32::consts::PI;

/// Outputs smaller than this are flushed to zero before entering history
const DENORMAL_THRESHOLD: f32 = 1e-15;

/// Single biquad filter cell with its own history
#[derive(Debug, Clone, PartialEq)]
pub struct BiquadFilter {
    // Normalized coefficients (a0 already divided out)
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    // Input history
    x1: f32,
    x2: f32,
    // Output history
    y1: f32,
    y2: f32,
}

impl BiquadFilter {
    /// Create a pass-through filter with cleared history
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Configure as a peaking EQ band
    ///
    /// Requires `sample_rate > 0`, `q > 0` and `0 < center_freq < sample_rate / 2`.
    /// Outside that range the coefficients are whatever the formulas produce.
    /// History is left untouched.
    pub fn configure_peaking_eq(&mut self, sample_rate: f32, center_freq: f32, q: f32, db_gain: f32) {
        let a = 10.0_f32.powf(db_gain / 40.0);
        let w0 = 2.0 * PI * center_freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cos_w0;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha / a;

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    /// Process one sample
    ///
    /// A non-finite result (NaN input, or overflow under extreme gain)
    /// clears the history and yields silence, so the cell recovers on the
    /// next finite sample instead of carrying the value forever.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let mut y = self.b0 * sample + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        if !y.is_finite() {
            self.reset();
            return 0.0;
        }
        if y.abs() < DENORMAL_THRESHOLD {
            y = 0.0;
        }

        self.x2 = self.x1;
        self.x1 = sample;
        self.y2 = self.y1;
        self.y1 = y;

        y
    }

    /// Reset filter history (coefficients are preserved)
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Normalized coefficients as `(b0, b1, b2, a1, a2)`
    #[cfg(test)]
    pub(crate) fn coefficients(&self) -> (f32, f32, f32, f32, f32) {
        (self.b0, self.b1, self.b2, self.a1, self.a2)
    }

    /// Check if the history is all zeros
    #[cfg(test)]
    pub(crate) fn is_at_rest(&self) -> bool {
        self.x1 == 0.0 && self.x2 == 0.0 && self.y1 == 0.0 && self.y2 == 0.0
    }
}

impl Default for BiquadFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn new_filter_passes_through() {
        let mut filter = BiquadFilter::new();
        for &s in &[0.5, -0.25, 1.0, 0.0] {
            assert_eq!(filter.process(s), s);
        }
    }

    #[test]
    fn peaking_coefficients_match_cookbook() {
        let mut filter = BiquadFilter::new();
        filter.configure_peaking_eq(48000.0, 1000.0, 1.0, 6.0);

        let a = 10.0_f32.powf(6.0 / 40.0);
        let w0 = 2.0 * PI * 1000.0 / 48000.0;
        let alpha = w0.sin() / 2.0;
        let a0 = 1.0 + alpha / a;

        let (b0, b1, b2, a1, a2) = filter.coefficients();
        assert!((b0 - (1.0 + alpha * a) / a0).abs() < 1e-6);
        assert!((b1 - (-2.0 * w0.cos()) / a0).abs() < 1e-6);
        assert!((b2 - (1.0 - alpha * a) / a0).abs() < 1e-6);
        assert!((a1 - b1).abs() < 1e-7, "peaking filter has b1 == a1");
        assert!((a2 - (1.0 - alpha / a) / a0).abs() < 1e-6);
    }

    #[test]
    fn zero_gain_band_is_transparent() {
        let mut filter = BiquadFilter::new();
        filter.configure_peaking_eq(44100.0, 1000.0, 0.7, 0.0);

        let input = sine(440.0, 44100.0, 512);
        for &s in &input {
            let out = filter.process(s);
            assert!((out - s).abs() < 1e-5, "{} vs {}", out, s);
        }
    }

    #[test]
    fn boost_raises_level_at_center() {
        let mut filter = BiquadFilter::new();
        filter.configure_peaking_eq(44100.0, 1000.0, 1.0, 6.0206);

        let input = sine(1000.0, 44100.0, 44100);
        let output: Vec<f32> = input.iter().map(|&s| filter.process(s)).collect();

        // Skip the settling period
        let ratio = rms(&output[4410..]) / rms(&input[4410..]);
        assert!((ratio - 2.0).abs() < 0.05, "gain at center was {}", ratio);
    }

    #[test]
    fn cut_lowers_level_at_center() {
        let mut filter = BiquadFilter::new();
        filter.configure_peaking_eq(48000.0, 2000.0, 2.0, -12.0);

        let input = sine(2000.0, 48000.0, 48000);
        let output: Vec<f32> = input.iter().map(|&s| filter.process(s)).collect();

        let ratio = rms(&output[4800..]) / rms(&input[4800..]);
        assert!(ratio < 0.3, "cut at center was {}", ratio);
    }

    #[test]
    fn non_finite_input_does_not_stick() {
        let mut filter = BiquadFilter::new();
        filter.configure_peaking_eq(44100.0, 1000.0, 1.0, 3.0);

        assert_eq!(filter.process(f32::NAN), 0.0);
        assert!(filter.is_at_rest());
        assert_eq!(filter.process(f32::INFINITY), 0.0);
        assert!(filter.is_at_rest());

        let output: Vec<f32> = sine(1000.0, 44100.0, 512)
            .iter()
            .map(|&s| 0.5 * filter.process(s))
            .collect();
        assert!(output.iter().all(|s| s.is_finite()));
        assert!(rms(&output) > 0.1);
    }

    #[test]
    fn overflow_resets_history() {
        let mut filter = BiquadFilter::new();
        filter.configure_peaking_eq(44100.0, 1000.0, 1.0, 30.0);

        // Large enough that the boosted output overflows f32
        assert_eq!(filter.process(f32::MAX), 0.0);
        assert!(filter.is_at_rest());
        assert!(filter.process(0.5).is_finite());
    }

    #[test]
    fn first_sample_differs_when_boosting() {
        let mut filter = BiquadFilter::new();
        filter.configure_peaking_eq(44100.0, 1000.0, 1.414, 6.0206);
        assert_ne!(filter.process(0.5), 0.5);
    }

    #[test]
    fn reset_clears_history_and_keeps_coefficients() {
        let mut filter = BiquadFilter::new();
        filter.configure_peaking_eq(44100.0, 500.0, 1.0, 9.0);
        let coefficients = filter.coefficients();

        let first: Vec<f32> = (0..64).map(|i| filter.process((i as f32 * 0.1).sin())).collect();
        assert!(!filter.is_at_rest());

        filter.reset();
        assert!(filter.is_at_rest());
        assert_eq!(filter.coefficients(), coefficients);

        let second: Vec<f32> = (0..64).map(|i| filter.process((i as f32 * 0.1).sin())).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn tiny_outputs_flush_to_zero() {
        let mut filter = BiquadFilter::new();
        filter.configure_peaking_eq(44100.0, 100.0, 0.5, 3.0);

        filter.process(1.0);
        for _ in 0..200_000 {
            filter.process(0.0);
        }
        assert_eq!(filter.process(0.0), 0.0);
        assert!(filter.is_at_rest());
    }
}
