/// Core traits for Soul DSP
use crate::error::Result;
use crate::types::AudioFormat;

/// Outcome of one [`AudioProcessor::process`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessedBlock {
    /// Complete frames that were processed
    pub frames: usize,
    /// Input bytes the host may drop, including any discarded partial frame
    pub bytes_consumed: usize,
    /// Bytes written to the front of the output buffer
    pub bytes_written: usize,
}

impl ProcessedBlock {
    /// Nothing processed, nothing consumed
    pub const EMPTY: Self = Self {
        frames: 0,
        bytes_consumed: 0,
        bytes_written: 0,
    };

    /// Check if no output was produced
    pub fn is_empty(&self) -> bool {
        self.bytes_written == 0
    }
}

/// Inline audio processor driven by a host media pipeline
///
/// The host negotiates a format with [`configure`](Self::configure), then
/// feeds interleaved PCM blocks through [`process`](Self::process) from a
/// single audio thread. The host owns both the input and output buffers.
///
/// Lifecycle:
///
/// ```text
/// Unconfigured ──configure──► Configured ──process──► Active ◄──process── Flushed
///      ▲                                                 │                  ▲
///      └───────────────────reset─────────────────────────┴──────flush───────┘
///                                       release ──► Released (terminal)
/// ```
pub trait AudioProcessor: Send {
    /// Negotiate the input format and return the output format
    ///
    /// # Errors
    /// Returns an error if the input format is not supported. The host must
    /// not call [`process`](Self::process) until a later call succeeds.
    fn configure(&mut self, input: AudioFormat) -> Result<AudioFormat>;

    /// Process one block of interleaved input bytes into `output`
    ///
    /// # Real-Time Constraints
    /// - No allocations
    /// - No blocking operations
    /// - Never fails; anomalies produce empty or clamped output
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> ProcessedBlock;

    /// Clear signal history (seek, discontinuity) keeping the negotiated format
    fn flush(&mut self);

    /// Clear signal history and forget the negotiated format
    fn reset(&mut self);

    /// Release the processor; it produces no output afterwards
    fn release(&mut self);

    /// Check if the processor has a negotiated format and can produce output
    fn is_active(&self) -> bool;

    /// Output format negotiated by the last successful `configure`
    fn output_format(&self) -> Option<AudioFormat>;
}
