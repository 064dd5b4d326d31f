//! DSP stages
//!
//! The building blocks of the chain, in signal order:
//! - **GainStage**: pre-amp and loudness adjustment as one linear scalar
//! - **ParametricEq**: up to 32 cascaded peaking bands (stereo pairs of `BiquadFilter`)
//! - **PeakLimiter**: hard clamp to [-1.0, 1.0]
//! - **PeakMeter**: peak-hold telemetry, read and reset by a UI thread
//!
//! All stages work on f32 samples and never allocate while processing.

mod biquad;
mod eq;
mod gain;
mod limiter;
mod meter;

pub use biquad::BiquadFilter;
pub use eq::{BandSet, EqBand, ParametricEq, MAX_EQ_BANDS};
pub use gain::{db_to_linear, linear_to_db, AtomicGainStage, GainStage, MAX_GAIN_DB, MIN_GAIN_DB};
pub use limiter::{PeakLimiter, CEILING};
pub use meter::{BlockPeak, PeakMeter};
