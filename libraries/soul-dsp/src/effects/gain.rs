/// Gain staging
///
/// Pre-amp and loudness adjustment (ReplayGain) are set in dB and applied as
/// one linear scalar before the EQ. No clamping happens here; the peak
/// limiter takes care of anything pushed past full scale.
use std::sync::atomic::{AtomicU64, Ordering};

/// Lower end of the documented gain control range in dB
pub const MIN_GAIN_DB: f32 = -30.0;

/// Upper end of the documented gain control range in dB
pub const MAX_GAIN_DB: f32 = 30.0;

/// Convert dB to linear gain
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear gain to dB
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.log10()
}

/// Pre-amp and loudness adjustment as linear scalars
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainStage {
    pre_amp: f32,
    replay_gain: f32,
}

impl GainStage {
    /// Unity gain on both controls
    pub const UNITY: Self = Self {
        pre_amp: 1.0,
        replay_gain: 1.0,
    };

    /// Set the pre-amp in dB
    pub fn set_pre_amp(&mut self, db: f32) {
        self.pre_amp = db_to_linear(db);
    }

    /// Set the loudness adjustment in dB
    pub fn set_replay_gain(&mut self, db: f32) {
        self.replay_gain = db_to_linear(db);
    }

    /// Linear pre-amp scalar
    pub fn pre_amp_linear(&self) -> f32 {
        self.pre_amp
    }

    /// Linear loudness adjustment scalar
    pub fn replay_gain_linear(&self) -> f32 {
        self.replay_gain
    }

    /// Pre-amp in dB
    pub fn pre_amp_db(&self) -> f32 {
        linear_to_db(self.pre_amp)
    }

    /// Loudness adjustment in dB
    pub fn replay_gain_db(&self) -> f32 {
        linear_to_db(self.replay_gain)
    }

    /// Combined scalar applied to every sample
    #[inline]
    pub fn total(&self) -> f32 {
        self.pre_amp * self.replay_gain
    }

    fn to_bits(self) -> u64 {
        (u64::from(self.pre_amp.to_bits()) << 32) | u64::from(self.replay_gain.to_bits())
    }

    fn from_bits(bits: u64) -> Self {
        Self {
            pre_amp: f32::from_bits((bits >> 32) as u32),
            replay_gain: f32::from_bits(bits as u32),
        }
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::UNITY
    }
}

/// Gain stage shared between the control and audio threads
///
/// Both scalars live in one 64-bit word, so a reader always sees a pair that
/// was written together.
#[derive(Debug)]
pub struct AtomicGainStage {
    bits: AtomicU64,
}

impl AtomicGainStage {
    /// Create a shared gain stage
    pub fn new(gain: GainStage) -> Self {
        Self {
            bits: AtomicU64::new(gain.to_bits()),
        }
    }

    /// Current snapshot
    #[inline]
    pub fn load(&self) -> GainStage {
        GainStage::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Read-modify-write without losing a concurrent update to the other control
    pub fn update(&self, f: impl Fn(&mut GainStage)) {
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let mut gain = GainStage::from_bits(bits);
                f(&mut gain);
                Some(gain.to_bits())
            });
    }
}

impl Default for AtomicGainStage {
    fn default() -> Self {
        Self::new(GainStage::UNITY)
    }
}
