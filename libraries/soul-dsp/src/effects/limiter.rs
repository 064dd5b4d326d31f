//! Peak limiter
//!
//! Hard clamp to the float PCM range, applied after gain and EQ. Stateless,
//! so it adds no latency and needs no reset.

/// Largest magnitude the chain ever emits
pub const CEILING: f32 = 1.0;

/// Hard-clipping peak limiter
#[derive(Debug, Clone, Copy, Default)]
pub struct PeakLimiter;

impl PeakLimiter {
    /// Create a limiter
    pub fn new() -> Self {
        Self
    }

    /// Clamp one sample into `[-CEILING, CEILING]`
    ///
    /// NaN is replaced with silence so nothing unbounded reaches the output.
    #[inline]
    pub fn process(&self, sample: f32) -> f32 {
        if sample.is_nan() {
            0.0
        } else {
            sample.clamp(-CEILING, CEILING)
        }
    }
}
