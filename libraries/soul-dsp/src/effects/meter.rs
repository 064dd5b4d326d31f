/// Peak meter
///
/// Holds the largest absolute sample value seen since the last poll. The
/// audio thread raises it once per block; a UI thread polls it at its own
/// rate with [`PeakMeter::read_and_reset`].
use std::sync::atomic::{AtomicU32, Ordering};

/// Lock-free "peak held until polled" meter
///
/// Stores the bit pattern of a non-negative `f32`. For non-negative floats
/// the bit patterns order the same way as the values, so raising the peak is
/// a plain `fetch_max`.
#[derive(Debug, Default)]
pub struct PeakMeter {
    bits: AtomicU32,
}

impl PeakMeter {
    /// Create a meter reading 0
    pub fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
        }
    }

    /// Raise the stored peak to `peak` if it is larger
    ///
    /// Negative and NaN values are ignored.
    #[inline]
    pub fn observe(&self, peak: f32) {
        if peak > 0.0 {
            self.bits.fetch_max(peak.to_bits(), Ordering::AcqRel);
        }
    }

    /// Return the stored peak and set it to 0
    pub fn read_and_reset(&self) -> f32 {
        f32::from_bits(self.bits.swap(0, Ordering::AcqRel))
    }

    /// Return the stored peak without resetting it
    pub fn peek(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Set the stored peak to 0
    pub fn reset(&self) {
        self.bits.store(0, Ordering::Release);
    }
}

/// Running maximum of `|sample|` over one processing call
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockPeak(f32);

impl BlockPeak {
    /// Start a new block
    pub fn new() -> Self {
        Self(0.0)
    }

    /// Account for one output sample
    #[inline]
    pub fn track(&mut self, sample: f32) {
        self.0 = self.0.max(sample.abs());
    }

    /// Publish the block peak to a shared meter
    pub fn commit(self, meter: &PeakMeter) {
        meter.observe(self.0);
    }
}
