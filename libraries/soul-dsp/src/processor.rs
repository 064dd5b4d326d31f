//! DSP chain orchestrator
//!
//! Per sample, in order:
//!
//! ```text
//! decode ──► × total gain ──► [EQ: even → left cascade, odd → right cascade] ──► clamp ──► meter ──► encode f32
//! ```
//!
//! The chain is owned by the host's audio thread. Controls arrive through
//! the shared [`DspControls`] and are sampled once per block.

use std::sync::Arc;

use soul_core::{AudioFormat, AudioProcessor, ProcessedBlock, SampleEncoding};
use tracing::debug;

use crate::controls::DspControls;
use crate::effects::{BandSet, BlockPeak, EqBand, ParametricEq, PeakLimiter};
use crate::error::{DspError, Result};
use crate::sample::{SampleAdapter, OUTPUT_BYTES_PER_SAMPLE};

/// Lifecycle state of a [`DspChain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// No format negotiated yet (or forgotten by `reset`)
    Unconfigured,
    /// Format negotiated, no block processed yet
    Configured,
    /// Processing blocks
    Active,
    /// History cleared after a seek or discontinuity
    Flushed,
    /// Playback ended; the chain produces nothing from now on
    Released,
}

/// Inline DSP chain: gain, parametric EQ, limiter, and peak metering
pub struct DspChain {
    controls: Arc<DspControls>,
    state: ProcessorState,

    input_format: Option<AudioFormat>,
    adapter: Option<SampleAdapter>,

    eq: ParametricEq,
    limiter: PeakLimiter,

    /// Band list the EQ is set up with
    bands: BandSet,
    /// EQ flag seen on the previous block
    eq_was_enabled: bool,
}

impl DspChain {
    /// Create a chain with fresh controls and a 32-band EQ
    pub fn new() -> Self {
        Self::with_controls(Arc::new(DspControls::new()))
    }

    /// Create a chain driven by existing controls
    pub fn with_controls(controls: Arc<DspControls>) -> Self {
        Self::with_eq(controls, ParametricEq::new())
    }

    /// Create a chain whose EQ has `num_bands` slots (1 to 32)
    pub fn with_band_capacity(num_bands: usize) -> Self {
        Self::with_eq(Arc::new(DspControls::new()), ParametricEq::with_capacity(num_bands))
    }

    fn with_eq(controls: Arc<DspControls>, eq: ParametricEq) -> Self {
        Self {
            controls,
            state: ProcessorState::Unconfigured,
            input_format: None,
            adapter: None,
            eq,
            limiter: PeakLimiter::new(),
            bands: BandSet::new(),
            eq_was_enabled: false,
        }
    }

    /// Handle for the control / UI thread
    pub fn controls(&self) -> Arc<DspControls> {
        Arc::clone(&self.controls)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// Output format: 32-bit float, same rate and channel count as the input
    pub fn output_format(&self) -> Option<AudioFormat> {
        self.input_format
            .map(|format| format.with_encoding(SampleEncoding::Float32))
    }

    /// Band list the EQ engine is currently set up with
    pub fn applied_bands(&self) -> &BandSet {
        &self.bands
    }

    /// Set the pre-amp in dB
    pub fn set_pre_amp(&self, db: f32) {
        self.controls.set_pre_amp(db);
    }

    /// Set the loudness adjustment (ReplayGain) in dB
    pub fn set_replay_gain(&self, db: f32) {
        self.controls.set_replay_gain(db);
    }

    /// Enable or disable the EQ stage
    pub fn set_eq_enabled(&self, enabled: bool) {
        self.controls.set_eq_enabled(enabled);
    }

    /// Replace the EQ band list (applied before the next block)
    pub fn set_eq_bands(&self, bands: &[EqBand]) {
        self.controls.set_eq_bands(bands);
    }

    /// Peak amplitude since the last call, then reset to 0
    pub fn peak_amplitude(&self) -> f32 {
        self.controls.peak_amplitude()
    }

    /// Negotiate the input format
    ///
    /// Returns the output format (float PCM, same rate and channels). EQ
    /// coefficients are re-derived for the new sample rate; filter history
    /// is left alone until the host flushes.
    ///
    /// # Errors
    /// `UnsupportedFormat` if the adapter rejects the format, `Released`
    /// after [`release`](Self::release). On failure the chain stays
    /// unconfigured and processes nothing.
    pub fn configure(&mut self, input: AudioFormat) -> Result<AudioFormat> {
        if self.state == ProcessorState::Released {
            return Err(DspError::Released);
        }

        let adapter = match SampleAdapter::new(&input) {
            Ok(adapter) => adapter,
            Err(err) => {
                self.input_format = None;
                self.adapter = None;
                self.state = ProcessorState::Unconfigured;
                return Err(err);
            }
        };

        if let Some(bands) = self.controls.take_pending_bands() {
            self.bands = bands;
        }
        self.eq.setup(input.sample_rate.as_hz() as f32, &self.bands);

        self.input_format = Some(input);
        self.adapter = Some(adapter);
        self.state = ProcessorState::Configured;

        debug!(
            sample_rate = input.sample_rate.as_hz(),
            channels = input.channels,
            encoding = %input.encoding,
            bands = self.bands.len(),
            "Configured DSP chain"
        );

        Ok(input.with_encoding(SampleEncoding::Float32))
    }

    /// Output bytes produced for `input_len` input bytes (0 if unconfigured)
    pub fn output_len(&self, input_len: usize) -> usize {
        self.adapter
            .map(|adapter| adapter.output_len(input_len))
            .unwrap_or(0)
    }

    /// Process one block of interleaved input into `output`
    ///
    /// `output` should be at least [`output_len`](Self::output_len) bytes;
    /// if it is smaller, only the frames that fit are processed and consumed.
    /// Does nothing while unconfigured or released.
    ///
    /// # Real-Time Safety
    /// - No allocations, locks, or I/O
    /// - Never panics on short, empty, or misaligned input
    pub fn process_block(&mut self, input: &[u8], output: &mut [u8]) -> ProcessedBlock {
        let adapter = match (self.state, self.adapter) {
            (ProcessorState::Unconfigured | ProcessorState::Released, _) | (_, None) => {
                return ProcessedBlock::EMPTY;
            }
            (_, Some(adapter)) => adapter,
        };

        self.apply_pending_bands();

        let total_gain = self.controls.gain().total();
        let eq_enabled = self.controls.is_eq_enabled();
        if eq_enabled && !self.eq_was_enabled {
            self.eq.reset();
        }
        self.eq_was_enabled = eq_enabled;

        self.state = ProcessorState::Active;

        let plan = adapter.plan(input.len(), output.len());
        let in_sample = adapter.input_bytes_per_sample();
        let mut peak = BlockPeak::new();

        for (in_frame, out_frame) in input
            .chunks_exact(adapter.input_bytes_per_frame())
            .zip(output.chunks_exact_mut(adapter.output_bytes_per_frame()))
            .take(plan.frames)
        {
            for (channel, (src, dst)) in in_frame
                .chunks_exact(in_sample)
                .zip(out_frame.chunks_exact_mut(OUTPUT_BYTES_PER_SAMPLE))
                .enumerate()
            {
                let mut sample = adapter.decode(src) * total_gain;

                if eq_enabled {
                    sample = if channel % 2 == 0 {
                        self.eq.process_l(sample)
                    } else {
                        self.eq.process_r(sample)
                    };
                }

                let sample = self.limiter.process(sample);
                peak.track(sample);
                SampleAdapter::encode(sample, dst);
            }
        }

        peak.commit(self.controls.meter());

        ProcessedBlock {
            frames: plan.frames,
            bytes_consumed: plan.bytes_consumed,
            bytes_written: plan.bytes_written,
        }
    }

    /// Clear EQ history and the peak meter, keeping format, bands and gains
    pub fn flush(&mut self) {
        self.clear_history();
        if matches!(
            self.state,
            ProcessorState::Configured | ProcessorState::Active
        ) {
            self.state = ProcessorState::Flushed;
        }
        debug!("Flushed DSP chain");
    }

    /// Clear history and forget the negotiated format, keeping bands and gains
    pub fn reset(&mut self) {
        self.clear_history();
        if self.state != ProcessorState::Released {
            self.input_format = None;
            self.adapter = None;
            self.state = ProcessorState::Unconfigured;
        }
        debug!("Reset DSP chain");
    }

    /// Stop producing output for good
    pub fn release(&mut self) {
        self.clear_history();
        self.input_format = None;
        self.adapter = None;
        self.state = ProcessorState::Released;
        debug!("Released DSP chain");
    }

    fn clear_history(&mut self) {
        self.eq.reset();
        self.controls.meter().reset();
    }

    /// Pick up a band list published by the control thread
    fn apply_pending_bands(&mut self) {
        if let Some(bands) = self.controls.take_pending_bands() {
            self.bands = bands;
            if let Some(format) = self.input_format {
                self.eq.setup(format.sample_rate.as_hz() as f32, &self.bands);
            }
        }
    }
}

impl Default for DspChain {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioProcessor for DspChain {
    fn configure(&mut self, input: AudioFormat) -> soul_core::Result<AudioFormat> {
        DspChain::configure(self, input).map_err(Into::into)
    }

    fn process(&mut self, input: &[u8], output: &mut [u8]) -> ProcessedBlock {
        self.process_block(input, output)
    }

    fn flush(&mut self) {
        DspChain::flush(self);
    }

    fn reset(&mut self) {
        DspChain::reset(self);
    }

    fn release(&mut self) {
        DspChain::release(self);
    }

    fn is_active(&self) -> bool {
        self.adapter.is_some()
    }

    fn output_format(&self) -> Option<AudioFormat> {
        DspChain::output_format(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soul_core::SampleRate;

    fn stereo_float() -> AudioFormat {
        AudioFormat::new(SampleRate::CD_QUALITY, 2, SampleEncoding::Float32)
    }

    fn floats(samples: &[f32]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
    }

    fn read_floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    fn run(chain: &mut DspChain, samples: &[f32]) -> Vec<f32> {
        let input = floats(samples);
        let mut output = vec![0u8; chain.output_len(input.len())];
        let block = chain.process_block(&input, &mut output);
        read_floats(&output[..block.bytes_written])
    }

    #[test]
    fn starts_unconfigured() {
        let chain = DspChain::new();
        assert_eq!(chain.state(), ProcessorState::Unconfigured);
        assert!(chain.output_format().is_none());
        assert_eq!(chain.output_len(64), 0);
    }

    #[test]
    fn configure_returns_float_output() {
        let mut chain = DspChain::new();
        let input = AudioFormat::new(SampleRate::DVD_QUALITY, 2, SampleEncoding::Pcm16);
        let output = chain.configure(input).unwrap();

        assert_eq!(output.encoding, SampleEncoding::Float32);
        assert_eq!(output.sample_rate, SampleRate::DVD_QUALITY);
        assert_eq!(output.channels, 2);
        assert_eq!(chain.state(), ProcessorState::Configured);
        assert_eq!(chain.output_format(), Some(output));
    }

    #[test]
    fn unsupported_format_leaves_chain_unconfigured() {
        let mut chain = DspChain::new();
        chain.configure(stereo_float()).unwrap();

        let bad = stereo_float().with_encoding(SampleEncoding::Pcm24);
        assert!(matches!(chain.configure(bad), Err(DspError::UnsupportedFormat(_))));
        assert_eq!(chain.state(), ProcessorState::Unconfigured);
        assert!(run(&mut chain, &[0.5, 0.5]).is_empty());

        chain.configure(stereo_float()).unwrap();
        assert_eq!(run(&mut chain, &[0.5, 0.5]), vec![0.5, 0.5]);
    }

    #[test]
    fn lifecycle_transitions() {
        let mut chain = DspChain::new();
        chain.configure(stereo_float()).unwrap();

        run(&mut chain, &[0.1, 0.1]);
        assert_eq!(chain.state(), ProcessorState::Active);

        chain.flush();
        assert_eq!(chain.state(), ProcessorState::Flushed);
        assert!(chain.output_format().is_some());

        run(&mut chain, &[0.1, 0.1]);
        assert_eq!(chain.state(), ProcessorState::Active);

        chain.reset();
        assert_eq!(chain.state(), ProcessorState::Unconfigured);
        assert!(chain.output_format().is_none());

        chain.flush();
        assert_eq!(chain.state(), ProcessorState::Unconfigured);
    }

    #[test]
    fn released_chain_refuses_work() {
        let mut chain = DspChain::new();
        chain.configure(stereo_float()).unwrap();
        chain.release();

        assert_eq!(chain.state(), ProcessorState::Released);
        assert!(run(&mut chain, &[0.5, 0.5]).is_empty());
        assert!(matches!(chain.configure(stereo_float()), Err(DspError::Released)));

        chain.reset();
        assert_eq!(chain.state(), ProcessorState::Released);
    }

    #[test]
    fn unconfigured_consumes_nothing() {
        let mut chain = DspChain::new();
        let mut output = [0u8; 16];
        let block = chain.process_block(&[0u8; 16], &mut output);
        assert_eq!(block, ProcessedBlock::EMPTY);
    }

    #[test]
    fn bands_survive_reconfigure_and_reset() {
        let mut chain = DspChain::new();
        chain.set_eq_bands(&[EqBand::peaking(1000.0, 6.0, 1.0)]);
        chain.configure(stereo_float()).unwrap();
        assert_eq!(chain.applied_bands().len(), 1);

        chain.reset();
        chain.configure(stereo_float()).unwrap();
        assert_eq!(chain.applied_bands().len(), 1);
    }

    #[test]
    fn flush_clears_meter() {
        let mut chain = DspChain::new();
        chain.configure(stereo_float()).unwrap();
        run(&mut chain, &[0.7, -0.2]);

        chain.flush();
        assert_eq!(chain.peak_amplitude(), 0.0);
    }

    #[test]
    fn trait_object_drives_chain() {
        let mut processor: Box<dyn AudioProcessor> = Box::new(DspChain::new());
        assert!(!processor.is_active());

        let out_format = processor.configure(stereo_float()).unwrap();
        assert_eq!(out_format.encoding, SampleEncoding::Float32);
        assert!(processor.is_active());

        let input = floats(&[0.25, -0.25]);
        let mut output = [0u8; 8];
        let block = processor.process(&input, &mut output);
        assert_eq!(block.frames, 1);
        assert_eq!(read_floats(&output), vec![0.25, -0.25]);

        let err = processor
            .configure(stereo_float().with_encoding(SampleEncoding::Float64))
            .unwrap_err();
        assert!(matches!(err, soul_core::SoulError::Audio(_)));
    }
}
