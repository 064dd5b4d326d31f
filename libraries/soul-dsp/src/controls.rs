//! Control surface shared with the UI / control thread
//!
//! The audio thread owns the DSP chain; everything another thread may touch
//! lives here behind an `Arc`:
//!
//! ```text
//! control thread                         audio thread
//! ──────────────                         ────────────
//! set_pre_amp / set_replay_gain ──► AtomicGainStage ──► load() once per block
//! set_eq_enabled               ──► AtomicBool      ──► load() once per block
//! set_eq_bands ──► BandSet ──► bounded channel     ──► try_recv() between blocks
//! peak_amplitude ◄── PeakMeter (swap to 0)         ◄── fetch_max per block
//! ```
//!
//! Nothing on the audio side blocks or allocates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::debug;

use crate::effects::{AtomicGainStage, BandSet, EqBand, GainStage, PeakMeter};

/// Pending band updates kept before the oldest is dropped
const BAND_QUEUE_DEPTH: usize = 4;

/// Thread-safe DSP controls and telemetry
#[derive(Debug)]
pub struct DspControls {
    gain: AtomicGainStage,
    eq_enabled: AtomicBool,
    meter: PeakMeter,

    band_tx: Sender<BandSet>,
    band_rx: Receiver<BandSet>,

    /// Last published band list, for read-back by the control side only
    published_bands: Mutex<BandSet>,
}

impl DspControls {
    /// Create controls at unity gain with the EQ off and no bands
    pub fn new() -> Self {
        let (band_tx, band_rx) = bounded(BAND_QUEUE_DEPTH);
        Self {
            gain: AtomicGainStage::default(),
            eq_enabled: AtomicBool::new(false),
            meter: PeakMeter::new(),
            band_tx,
            band_rx,
            published_bands: Mutex::new(BandSet::new()),
        }
    }

    /// Set the pre-amp in dB (contract range -30 to +30, not clamped)
    pub fn set_pre_amp(&self, db: f32) {
        self.gain.update(|gain| gain.set_pre_amp(db));
    }

    /// Set the loudness adjustment (ReplayGain) in dB (contract range -30 to +30, not clamped)
    pub fn set_replay_gain(&self, db: f32) {
        self.gain.update(|gain| gain.set_replay_gain(db));
    }

    /// Current gain stage snapshot
    pub fn gain(&self) -> GainStage {
        self.gain.load()
    }

    /// Enable or disable the EQ stage
    pub fn set_eq_enabled(&self, enabled: bool) {
        self.eq_enabled.store(enabled, Ordering::Release);
    }

    /// Check if the EQ stage is enabled
    pub fn is_eq_enabled(&self) -> bool {
        self.eq_enabled.load(Ordering::Acquire)
    }

    /// Replace the whole band list
    ///
    /// At most 32 bands are kept. The audio thread picks the new list up
    /// before its next block; it never sees a half-written list. If it has
    /// fallen behind, older unapplied lists are dropped in favour of newer
    /// ones.
    pub fn set_eq_bands(&self, bands: &[EqBand]) {
        let set = BandSet::from_slice(bands);

        // Hold the read-back lock while publishing so concurrent callers
        // enqueue in the same order they record
        let mut published = self
            .published_bands
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *published = set;

        let mut pending = set;
        loop {
            match self.band_tx.try_send(pending) {
                Ok(()) => break,
                Err(TrySendError::Full(rejected)) => {
                    // Drop the oldest queued list
                    let _ = self.band_rx.try_recv();
                    pending = rejected;
                }
                Err(TrySendError::Disconnected(_)) => break,
            }
        }

        debug!(
            bands = set.len(),
            enabled = set.enabled_count(),
            "Published EQ band list"
        );
    }

    /// Last band list passed to [`set_eq_bands`](Self::set_eq_bands)
    pub fn eq_bands(&self) -> Vec<EqBand> {
        self.published_bands
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_slice()
            .to_vec()
    }

    /// Peak amplitude in [0, 1] since the last call, then reset to 0
    pub fn peak_amplitude(&self) -> f32 {
        self.meter.read_and_reset()
    }

    /// Peak amplitude since the last read, without resetting it
    pub fn peek_amplitude(&self) -> f32 {
        self.meter.peek()
    }

    /// Peak meter shared with the audio thread
    pub(crate) fn meter(&self) -> &PeakMeter {
        &self.meter
    }

    /// Most recent unapplied band list, if any (audio thread)
    pub(crate) fn take_pending_bands(&self) -> Option<BandSet> {
        let mut latest = None;
        while let Ok(set) = self.band_rx.try_recv() {
            latest = Some(set);
        }
        latest
    }
}

impl Default for DspControls {
    fn default() -> Self {
        Self::new()
    }
}
