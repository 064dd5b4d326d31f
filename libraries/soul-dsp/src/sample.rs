//! Sample format adaptation
//!
//! Turns the host's interleaved PCM bytes into f32 samples and writes the
//! processed f32 samples back out. Input may be 16-bit integer or 32-bit
//! float in native byte order; output is always 32-bit float.
//!
//! Only whole frames are processed. A trailing partial frame is dropped
//! rather than carried over to the next call.

use soul_core::{AudioFormat, SampleEncoding};

use crate::error::{DspError, Result};

/// Bytes per output sample (f32)
pub const OUTPUT_BYTES_PER_SAMPLE: usize = 4;

/// Scale for 16-bit integer samples
const PCM16_SCALE: f32 = 32768.0;

/// Convert a 16-bit sample to float
///
/// `-32768` maps to exactly `-1.0`; `32767` maps just below `1.0`.
#[inline]
pub fn pcm16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / PCM16_SCALE
}

/// Input encodings the adapter can decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputEncoding {
    Pcm16,
    Float32,
}

impl InputEncoding {
    fn bytes_per_sample(self) -> usize {
        match self {
            Self::Pcm16 => 2,
            Self::Float32 => 4,
        }
    }
}

/// How much of an input block one call can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    /// Complete frames to process
    pub frames: usize,
    /// Input bytes consumed, including a dropped partial frame
    pub bytes_consumed: usize,
    /// Output bytes produced
    pub bytes_written: usize,
}

/// Converter between host PCM bytes and f32 samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleAdapter {
    encoding: InputEncoding,
    channels: usize,
}

impl SampleAdapter {
    /// Create an adapter for `format`
    ///
    /// # Errors
    /// `UnsupportedFormat` for any encoding other than 16-bit integer or
    /// 32-bit float, and for zero channels or a zero sample rate.
    pub fn new(format: &AudioFormat) -> Result<Self> {
        let encoding = match format.encoding {
            SampleEncoding::Pcm16 => InputEncoding::Pcm16,
            SampleEncoding::Float32 => InputEncoding::Float32,
            other => {
                return Err(DspError::UnsupportedFormat(format!(
                    "{} input (expected pcm16 or float32)",
                    other
                )))
            }
        };

        if format.channels == 0 {
            return Err(DspError::UnsupportedFormat("zero channels".to_string()));
        }
        if format.sample_rate.as_hz() == 0 {
            return Err(DspError::UnsupportedFormat("zero sample rate".to_string()));
        }

        Ok(Self {
            encoding,
            channels: usize::from(format.channels),
        })
    }

    /// Bytes per input sample
    pub fn input_bytes_per_sample(&self) -> usize {
        self.encoding.bytes_per_sample()
    }

    /// Bytes per input frame
    pub fn input_bytes_per_frame(&self) -> usize {
        self.encoding.bytes_per_sample() * self.channels
    }

    /// Bytes per output frame
    pub fn output_bytes_per_frame(&self) -> usize {
        OUTPUT_BYTES_PER_SAMPLE * self.channels
    }

    /// Whole frames contained in `available` input bytes
    pub fn complete_frames(&self, available: usize) -> usize {
        available / self.input_bytes_per_frame()
    }

    /// Output bytes produced for `input_len` input bytes
    pub fn output_len(&self, input_len: usize) -> usize {
        self.complete_frames(input_len) * self.output_bytes_per_frame()
    }

    /// Work out how much of a block fits in the output buffer
    ///
    /// If every complete frame fits, the whole input (partial frame
    /// included) is consumed. Otherwise only the frames that fit are
    /// consumed and the host is expected to call again with the rest.
    pub fn plan(&self, input_len: usize, output_capacity: usize) -> BlockPlan {
        let complete = self.complete_frames(input_len);
        let fits = output_capacity / self.output_bytes_per_frame();

        let (frames, bytes_consumed) = if fits >= complete {
            (complete, input_len)
        } else {
            (fits, fits * self.input_bytes_per_frame())
        };

        BlockPlan {
            frames,
            bytes_consumed,
            bytes_written: frames * self.output_bytes_per_frame(),
        }
    }

    /// Decode one input sample
    ///
    /// `bytes` must hold exactly one sample in the input encoding.
    #[inline]
    pub fn decode(&self, bytes: &[u8]) -> f32 {
        match self.encoding {
            InputEncoding::Pcm16 => pcm16_to_f32(i16::from_ne_bytes([bytes[0], bytes[1]])),
            InputEncoding::Float32 => f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }

    /// Encode one output sample into 4 bytes
    #[inline]
    pub fn encode(sample: f32, out: &mut [u8]) {
        out.copy_from_slice(&sample.to_ne_bytes());
    }
}
