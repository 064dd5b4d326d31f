//! DSP settings
//!
//! A serializable snapshot of everything the control surface holds. Loaded
//! from an optional TOML file with environment overrides:
//!
//! ```toml
//! pre_amp_db = -3.0
//! replay_gain_db = 0.0
//! eq_enabled = true
//!
//! [[bands]]
//! frequency = 100.0
//! gain_db = 4.0
//! q = 0.7
//! ```
//!
//! Environment variables use the `SOUL_DSP_` prefix, e.g.
//! `SOUL_DSP_PRE_AMP_DB=3`.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use soul_core::SampleRate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::controls::DspControls;
use crate::effects::{EqBand, MAX_EQ_BANDS, MAX_GAIN_DB, MIN_GAIN_DB};
use crate::error::Result;
use crate::presets::EqPreset;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SOUL_DSP";

/// Settings snapshot for a DSP chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DspSettings {
    /// Pre-amp in dB
    #[serde(default)]
    pub pre_amp_db: f32,

    /// Loudness adjustment (ReplayGain) in dB
    #[serde(default)]
    pub replay_gain_db: f32,

    /// Whether the EQ stage runs
    #[serde(default)]
    pub eq_enabled: bool,

    /// Band list in slot order
    #[serde(default)]
    pub bands: Vec<EqBand>,
}

/// A parameter outside its contract range
///
/// Out-of-range values are still applied; the chain's output stays defined
/// (the limiter bounds it) but will not sound as intended.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterWarning {
    /// Gain outside -30 to +30 dB, or not finite
    #[error("{control} of {db} dB is outside the {} to {} dB range", MIN_GAIN_DB, MAX_GAIN_DB)]
    GainOutOfRange {
        /// Which gain control
        control: &'static str,
        /// Supplied value
        db: f32,
    },

    /// Non-positive or non-finite Q
    #[error("band {band}: Q of {q} must be positive")]
    InvalidQ {
        /// Band index
        band: usize,
        /// Supplied Q
        q: f32,
    },

    /// Center frequency not strictly between 0 and Nyquist
    #[error("band {band}: {frequency} Hz is outside (0, {nyquist}) Hz")]
    FrequencyOutOfRange {
        /// Band index
        band: usize,
        /// Supplied frequency
        frequency: f32,
        /// Upper limit (infinite when the sample rate is unknown)
        nyquist: f32,
    },

    /// More bands than the engine has slots
    #[error("{supplied} bands supplied, only the first {} are used", MAX_EQ_BANDS)]
    TooManyBands {
        /// Number of bands supplied
        supplied: usize,
    },
}

impl DspSettings {
    /// Load settings from an optional TOML file plus `SOUL_DSP_*` overrides
    ///
    /// Missing keys fall back to defaults (unity gain, EQ off, no bands).
    /// A path that is given but does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        debug!(
            path = ?path,
            bands = settings.bands.len(),
            eq_enabled = settings.eq_enabled,
            "Loaded DSP settings"
        );
        Ok(settings)
    }

    /// Parse settings from a TOML string (no environment overrides)
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Settings with the EQ enabled on a preset's band list
    pub fn from_preset(preset: EqPreset) -> Self {
        Self {
            eq_enabled: true,
            bands: preset.bands(),
            ..Self::default()
        }
    }

    /// Check every parameter against its contract range
    ///
    /// With a sample rate, band frequencies are also checked against Nyquist.
    pub fn validate(&self, sample_rate: Option<SampleRate>) -> Vec<ParameterWarning> {
        let mut warnings = Vec::new();

        for (control, db) in [
            ("pre-amp", self.pre_amp_db),
            ("replay gain", self.replay_gain_db),
        ] {
            if !(MIN_GAIN_DB..=MAX_GAIN_DB).contains(&db) {
                warnings.push(ParameterWarning::GainOutOfRange { control, db });
            }
        }

        if self.bands.len() > MAX_EQ_BANDS {
            warnings.push(ParameterWarning::TooManyBands {
                supplied: self.bands.len(),
            });
        }

        let nyquist = sample_rate.map_or(f32::INFINITY, |rate| rate.nyquist());

        for (band, eq_band) in self.bands.iter().take(MAX_EQ_BANDS).enumerate() {
            if !(eq_band.q.is_finite() && eq_band.q > 0.0) {
                warnings.push(ParameterWarning::InvalidQ { band, q: eq_band.q });
            }
            if !(eq_band.frequency > 0.0 && eq_band.frequency < nyquist) {
                warnings.push(ParameterWarning::FrequencyOutOfRange {
                    band,
                    frequency: eq_band.frequency,
                    nyquist,
                });
            }
        }

        warnings
    }

    /// Push these settings onto a control surface
    ///
    /// Parameter warnings are logged, never rejected.
    pub fn apply(&self, controls: &DspControls) {
        for warning in self.validate(None) {
            warn!("{}", warning);
        }

        controls.set_pre_amp(self.pre_amp_db);
        controls.set_replay_gain(self.replay_gain_db);
        controls.set_eq_bands(&self.bands);
        controls.set_eq_enabled(self.eq_enabled);
    }

    /// Capture the current state of a control surface
    pub fn capture(controls: &DspControls) -> Self {
        let gain = controls.gain();
        Self {
            pre_amp_db: gain.pre_amp_db(),
            replay_gain_db: gain.replay_gain_db(),
            eq_enabled: controls.is_eq_enabled(),
            bands: controls.eq_bands(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_TOML: &str = r#"
pre_amp_db = -3.0
eq_enabled = true

[[bands]]
frequency = 100.0
gain_db = 4.0
q = 0.7

[[bands]]
frequency = 8000.0
gain = -2.5
q = 1.41
enabled = false
"#;

    #[test]
    fn defaults_are_neutral() {
        let settings = DspSettings::default();
        assert_eq!(settings.pre_amp_db, 0.0);
        assert_eq!(settings.replay_gain_db, 0.0);
        assert!(!settings.eq_enabled);
        assert!(settings.bands.is_empty());
        assert!(settings.validate(Some(SampleRate::CD_QUALITY)).is_empty());
    }

    #[test]
    fn parses_toml() {
        let settings = DspSettings::from_toml_str(SAMPLE_TOML).unwrap();
        assert_eq!(settings.pre_amp_db, -3.0);
        assert_eq!(settings.replay_gain_db, 0.0);
        assert!(settings.eq_enabled);
        assert_eq!(settings.bands.len(), 2);
        assert_eq!(settings.bands[0], EqBand::peaking(100.0, 4.0, 0.7));
        assert_eq!(settings.bands[1].gain_db, -2.5);
        assert!(!settings.bands[1].enabled);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SAMPLE_TOML.as_bytes()).unwrap();

        let settings = DspSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.bands.len(), 2);
        assert!(settings.eq_enabled);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(DspSettings::load(Some(&path)).is_err());
    }

    #[test]
    fn json_round_trip() {
        let settings = DspSettings::from_preset(EqPreset::Rock);
        let json = settings.to_json().unwrap();
        assert_eq!(DspSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn bad_json_is_a_serialization_error() {
        let err = DspSettings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::DspError::Serialization(_)));
    }

    #[test]
    fn validate_flags_out_of_range_values() {
        let settings = DspSettings {
            pre_amp_db: 40.0,
            replay_gain_db: f32::NAN,
            eq_enabled: true,
            bands: vec![
                EqBand::peaking(1000.0, 3.0, 0.0),
                EqBand::peaking(30_000.0, 3.0, 1.0),
                EqBand::peaking(-5.0, 3.0, 1.0),
            ],
        };

        let warnings = settings.validate(Some(SampleRate::CD_QUALITY));
        assert_eq!(warnings.len(), 5);
        assert!(warnings.contains(&ParameterWarning::GainOutOfRange {
            control: "pre-amp",
            db: 40.0
        }));
        assert!(warnings.contains(&ParameterWarning::InvalidQ { band: 0, q: 0.0 }));
        assert!(warnings.iter().any(|w| matches!(
            w,
            ParameterWarning::FrequencyOutOfRange { band: 1, .. }
        )));
        assert!(warnings.iter().any(|w| matches!(
            w,
            ParameterWarning::FrequencyOutOfRange { band: 2, .. }
        )));
    }

    #[test]
    fn nyquist_is_only_checked_with_a_sample_rate() {
        let settings = DspSettings {
            bands: vec![EqBand::peaking(30_000.0, 3.0, 1.0)],
            ..DspSettings::default()
        };
        assert!(settings.validate(None).is_empty());
        assert_eq!(settings.validate(Some(SampleRate::CD_QUALITY)).len(), 1);
    }

    #[test]
    fn too_many_bands_warns_once() {
        let settings = DspSettings {
            bands: vec![EqBand::peaking(1000.0, 1.0, 1.0); 40],
            ..DspSettings::default()
        };
        assert_eq!(
            settings.validate(None),
            vec![ParameterWarning::TooManyBands { supplied: 40 }]
        );
    }

    #[test]
    fn warning_messages() {
        let warning = ParameterWarning::InvalidQ { band: 3, q: -1.0 };
        assert_eq!(warning.to_string(), "band 3: Q of -1 must be positive");
    }

    #[test]
    fn apply_then_capture() {
        let controls = DspControls::new();
        let settings = DspSettings::from_toml_str(SAMPLE_TOML).unwrap();
        settings.apply(&controls);

        assert!(controls.is_eq_enabled());
        assert_eq!(controls.eq_bands().len(), 2);

        let captured = DspSettings::capture(&controls);
        assert!((captured.pre_amp_db - -3.0).abs() < 1e-4);
        assert_eq!(captured.bands, settings.bands);
    }
}
