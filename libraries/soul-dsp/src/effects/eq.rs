/// Parametric Equalizer
///
/// Up to 32 peaking bands, each realized by a left/right pair of biquad
/// cells. Bands cascade in slot order; disabled bands are skipped.
use serde::{Deserialize, Serialize};

use super::biquad::BiquadFilter;

/// Maximum number of bands supported by the EQ engine
pub const MAX_EQ_BANDS: usize = 32;

/// EQ band configuration
///
/// A band's identity is its position in the band list, which is also its
/// position in the signal chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBand {
    /// Center frequency in Hz
    pub frequency: f32,
    /// Gain in dB
    #[serde(alias = "gain")]
    pub gain_db: f32,
    /// Q factor (> 0), higher is narrower
    pub q: f32,
    /// Disabled bands are skipped entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl EqBand {
    /// Create an enabled peaking band
    pub fn peaking(frequency: f32, gain_db: f32, q: f32) -> Self {
        Self {
            frequency,
            gain_db,
            q,
            enabled: true,
        }
    }

    /// Same band, disabled
    #[must_use]
    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    /// Flat, disabled placeholder used for unused slots
    pub const fn neutral() -> Self {
        Self {
            frequency: 1000.0,
            gain_db: 0.0,
            q: 1.0,
            enabled: false,
        }
    }
}

impl Default for EqBand {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Fixed-capacity, ordered band list
///
/// `Copy` and heap-free so a whole configuration can be handed to the
/// audio thread without allocating or freeing there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSet {
    bands: [EqBand; MAX_EQ_BANDS],
    len: usize,
}

impl BandSet {
    /// Create an empty band set
    pub const fn new() -> Self {
        Self {
            bands: [EqBand::neutral(); MAX_EQ_BANDS],
            len: 0,
        }
    }

    /// Copy up to [`MAX_EQ_BANDS`] bands; the excess is ignored
    pub fn from_slice(bands: &[EqBand]) -> Self {
        let mut set = Self::new();
        let len = bands.len().min(MAX_EQ_BANDS);
        set.bands[..len].copy_from_slice(&bands[..len]);
        set.len = len;
        set
    }

    /// Active bands in slot order
    pub fn as_slice(&self) -> &[EqBand] {
        &self.bands[..self.len]
    }

    /// Band at `index`, if supplied
    pub fn get(&self, index: usize) -> Option<&EqBand> {
        self.as_slice().get(index)
    }

    /// Number of supplied bands
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no bands were supplied
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the supplied bands
    pub fn iter(&self) -> std::slice::Iter<'_, EqBand> {
        self.as_slice().iter()
    }

    /// Number of supplied bands that are enabled
    pub fn enabled_count(&self) -> usize {
        self.iter().filter(|band| band.enabled).count()
    }
}

impl Default for BandSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Multi-band parametric EQ engine
///
/// All filters are pre-allocated. `setup` and `process_*` never allocate.
#[derive(Debug, Clone)]
pub struct ParametricEq {
    filters_l: [BiquadFilter; MAX_EQ_BANDS],
    filters_r: [BiquadFilter; MAX_EQ_BANDS],

    /// Band list the filters were last set up with
    bands: BandSet,

    /// Slot capacity, fixed at construction (1 to MAX_EQ_BANDS)
    num_bands: usize,
}

impl ParametricEq {
    /// Create an EQ with the full [`MAX_EQ_BANDS`] slots
    pub fn new() -> Self {
        Self::with_capacity(MAX_EQ_BANDS)
    }

    /// Create an EQ with `num_bands` slots (clamped to 1..=MAX_EQ_BANDS)
    pub fn with_capacity(num_bands: usize) -> Self {
        Self {
            filters_l: std::array::from_fn(|_| BiquadFilter::new()),
            filters_r: std::array::from_fn(|_| BiquadFilter::new()),
            bands: BandSet::new(),
            num_bands: num_bands.clamp(1, MAX_EQ_BANDS),
        }
    }

    /// Number of filter slots
    pub fn capacity(&self) -> usize {
        self.num_bands
    }

    /// Band list currently applied
    pub fn bands(&self) -> &BandSet {
        &self.bands
    }

    /// Number of bands that take part in processing
    fn active_len(&self) -> usize {
        self.num_bands.min(self.bands.len())
    }

    /// Apply a band list at the given sample rate
    ///
    /// Enabled bands get fresh coefficients (history preserved). Disabled
    /// bands have their history cleared and are not configured. Slots past
    /// the end of `bands` keep whatever state they had.
    pub fn setup(&mut self, sample_rate: f32, bands: &BandSet) {
        self.bands = *bands;

        for i in 0..self.active_len() {
            let band = self.bands.as_slice()[i];
            if band.enabled {
                self.filters_l[i].configure_peaking_eq(sample_rate, band.frequency, band.q, band.gain_db);
                self.filters_r[i].configure_peaking_eq(sample_rate, band.frequency, band.q, band.gain_db);
            } else {
                self.filters_l[i].reset();
                self.filters_r[i].reset();
            }
        }
    }

    /// Process one sample of the left (even-indexed) cascade
    #[inline]
    pub fn process_l(&mut self, sample: f32) -> f32 {
        let active = self.active_len();
        let mut out = sample;
        for (band, filter) in self.bands.as_slice()[..active]
            .iter()
            .zip(self.filters_l.iter_mut())
        {
            if band.enabled {
                out = filter.process(out);
            }
        }
        out
    }

    /// Process one sample of the right (odd-indexed) cascade
    #[inline]
    pub fn process_r(&mut self, sample: f32) -> f32 {
        let active = self.active_len();
        let mut out = sample;
        for (band, filter) in self.bands.as_slice()[..active]
            .iter()
            .zip(self.filters_r.iter_mut())
        {
            if band.enabled {
                out = filter.process(out);
            }
        }
        out
    }

    /// Clear the history of every filter, enabled or not
    pub fn reset(&mut self) {
        for filter in self.filters_l.iter_mut().chain(self.filters_r.iter_mut()) {
            filter.reset();
        }
    }

    /// Left cell of a slot
    #[cfg(test)]
    fn left_filter(&self, index: usize) -> Option<&BiquadFilter> {
        self.filters_l[..self.num_bands].get(index)
    }

    /// Right cell of a slot
    #[cfg(test)]
    fn right_filter(&self, index: usize) -> Option<&BiquadFilter> {
        self.filters_r[..self.num_bands].get(index)
    }
}

impl Default for ParametricEq {
    fn default() -> Self {
        Self::new()
    }
}
