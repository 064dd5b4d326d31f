//! Soul DSP - inline playback processing
//!
//! A real-time DSP stage for a media pipeline: gain staging (pre-amp and
//! ReplayGain), a 32-band parametric EQ, a hard peak limiter, and a peak
//! meter the UI can poll.
//!
//! # Architecture
//!
//! - **Effects**: `BiquadFilter`, `ParametricEq`, `GainStage`, `PeakLimiter`, `PeakMeter`
//! - **Sample adapter**: 16-bit / float PCM in, float PCM out
//! - **Controls**: `DspControls`, shared with the control thread through an `Arc`
//! - **Chain**: `DspChain`, owned by the audio thread, implements
//!   [`soul_core::AudioProcessor`]
//! - **Settings & presets**: `DspSettings` (TOML + env), `EqPreset`
//!
//! # Example
//!
//! ```rust
//! use soul_core::{AudioFormat, SampleEncoding, SampleRate};
//! use soul_dsp::{DspChain, EqBand};
//!
//! let mut chain = DspChain::new();
//! let controls = chain.controls();
//!
//! controls.set_pre_amp(6.0206);
//! controls.set_eq_bands(&[EqBand::peaking(100.0, 3.0, 0.7)]);
//!
//! let input = AudioFormat::new(SampleRate::CD_QUALITY, 2, SampleEncoding::Float32);
//! chain.configure(input).unwrap();
//!
//! let samples: Vec<u8> = [0.4f32, 0.4].iter().flat_map(|s| s.to_ne_bytes()).collect();
//! let mut output = vec![0u8; chain.output_len(samples.len())];
//! let block = chain.process_block(&samples, &mut output);
//!
//! assert_eq!(block.frames, 1);
//! assert!(controls.peak_amplitude() > 0.79);
//! ```

#![forbid(unsafe_code)]

pub mod controls;
pub mod effects;
pub mod error;
pub mod presets;
pub mod processor;
pub mod sample;
pub mod settings;

pub use controls::DspControls;
pub use effects::{
    db_to_linear, linear_to_db, BandSet, BiquadFilter, EqBand, GainStage, ParametricEq,
    PeakLimiter, PeakMeter, MAX_EQ_BANDS,
};
pub use error::{DspError, Result};
pub use presets::{EqPreset, ISO_10_BAND_FREQUENCIES};
pub use processor::{DspChain, ProcessorState};
pub use sample::SampleAdapter;
pub use settings::{DspSettings, ParameterWarning};
