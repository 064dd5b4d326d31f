//! Soul DSP Core
//!
//! Platform-agnostic types, traits, and error handling shared by the Soul DSP
//! crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Audio Types**: `SampleRate`, `SampleEncoding`, `AudioFormat`
//! - **Core Traits**: `AudioProcessor`, the host media pipeline's view of an
//!   inline processing stage
//! - **Error Handling**: Unified `SoulError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use soul_core::types::{AudioFormat, SampleEncoding, SampleRate};
//!
//! let input = AudioFormat::new(SampleRate::DVD_QUALITY, 2, SampleEncoding::Pcm16);
//! let output = input.with_encoding(SampleEncoding::Float32);
//!
//! assert_eq!(input.bytes_per_frame(), 4);
//! assert_eq!(output.bytes_per_frame(), 8);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SoulError};
pub use traits::{AudioProcessor, ProcessedBlock};
pub use types::{AudioFormat, SampleEncoding, SampleRate};
