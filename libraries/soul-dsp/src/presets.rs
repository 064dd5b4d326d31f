//! EQ presets
//!
//! Named band lists over the ISO octave frequencies. A preset only produces
//! a band list; persisting the user's choice is up to the settings layer.

use crate::effects::EqBand;

/// 10-band ISO standard frequencies (Hz)
pub const ISO_10_BAND_FREQUENCIES: [f32; 10] = [
    31.5, 63.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// Octave bandwidth Q used by preset bands
pub const PRESET_Q: f32 = 1.41;

/// Built-in EQ preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqPreset {
    /// All bands at 0 dB
    #[default]
    Flat,
    /// Enhanced low frequencies
    BassBoost,
    /// Enhanced high frequencies
    TrebleBoost,
    /// Boosted lows and highs, reduced mids
    VShape,
    /// Enhanced mid frequencies for voice
    Vocal,
    /// Punchy lows and bright highs
    Rock,
    /// Deep bass and crisp highs
    Electronic,
    /// Natural, slightly warm
    Acoustic,
}

impl EqPreset {
    /// Every built-in preset
    pub const ALL: [Self; 8] = [
        Self::Flat,
        Self::BassBoost,
        Self::TrebleBoost,
        Self::VShape,
        Self::Vocal,
        Self::Rock,
        Self::Electronic,
        Self::Acoustic,
    ];

    /// Per-band gains in dB, aligned with [`ISO_10_BAND_FREQUENCIES`]
    pub fn gains(&self) -> [f32; 10] {
        match self {
            Self::Flat => [0.0; 10],
            Self::BassBoost => [6.0, 5.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            Self::TrebleBoost => [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 4.0, 5.0, 6.0],
            Self::VShape => [5.0, 4.0, 2.0, -1.0, -2.0, -2.0, -1.0, 2.0, 4.0, 5.0],
            Self::Vocal => [-2.0, -1.0, 0.0, 2.0, 4.0, 4.0, 2.0, 0.0, -1.0, -2.0],
            Self::Rock => [4.0, 3.0, 1.0, 0.0, -1.0, 0.0, 1.0, 3.0, 4.0, 4.0],
            Self::Electronic => [5.0, 4.0, 2.0, 0.0, 1.0, 2.0, 1.0, 3.0, 4.0, 4.0],
            Self::Acoustic => [2.0, 1.0, 0.0, 1.0, 2.0, 2.0, 1.0, 2.0, 2.0, 1.0],
        }
    }

    /// Band list for this preset
    ///
    /// Bands at 0 dB are emitted disabled so they cost nothing to process.
    pub fn bands(&self) -> Vec<EqBand> {
        ISO_10_BAND_FREQUENCIES
            .iter()
            .zip(self.gains())
            .map(|(&frequency, gain_db)| {
                let band = EqBand::peaking(frequency, gain_db, PRESET_Q);
                if gain_db == 0.0 {
                    band.disabled()
                } else {
                    band
                }
            })
            .collect()
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flat => "Flat",
            Self::BassBoost => "Bass Boost",
            Self::TrebleBoost => "Treble Boost",
            Self::VShape => "V-Shape",
            Self::Vocal => "Vocal",
            Self::Rock => "Rock",
            Self::Electronic => "Electronic",
            Self::Acoustic => "Acoustic",
        }
    }

    /// Parse from string for settings persistence
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "flat" => Some(Self::Flat),
            "bassboost" | "bass" => Some(Self::BassBoost),
            "trebleboost" | "treble" => Some(Self::TrebleBoost),
            "vshape" => Some(Self::VShape),
            "vocal" => Some(Self::Vocal),
            "rock" => Some(Self::Rock),
            "electronic" => Some(Self::Electronic),
            "acoustic" => Some(Self::Acoustic),
            _ => None,
        }
    }

    /// Convert to string for settings persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::BassBoost => "bass_boost",
            Self::TrebleBoost => "treble_boost",
            Self::VShape => "v_shape",
            Self::Vocal => "vocal",
            Self::Rock => "rock",
            Self::Electronic => "electronic",
            Self::Acoustic => "acoustic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_frequencies_ascend() {
        for window in ISO_10_BAND_FREQUENCIES.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn flat_preset_disables_every_band() {
        let bands = EqPreset::Flat.bands();
        assert_eq!(bands.len(), 10);
        assert!(bands.iter().all(|band| !band.enabled));
    }

    #[test]
    fn bass_boost_enables_low_bands_only() {
        let bands = EqPreset::BassBoost.bands();
        assert!(bands[0].enabled);
        assert_eq!(bands[0].gain_db, 6.0);
        assert_eq!(bands[0].frequency, 31.5);
        assert!(!bands[9].enabled);
        assert!(bands.iter().all(|band| band.q == PRESET_Q));
    }

    #[test]
    fn string_round_trip() {
        for preset in EqPreset::ALL {
            assert_eq!(EqPreset::from_str(preset.as_str()), Some(preset));
            assert_eq!(EqPreset::from_str(preset.name()), Some(preset));
        }
        assert_eq!(EqPreset::from_str("loudness"), None);
    }
}
