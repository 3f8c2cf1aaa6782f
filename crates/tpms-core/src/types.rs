//! Core types shared across the TPMS decoding engine.
//!
//! A receiver front-end reduces the RF stream to *pulses*: level transitions
//! annotated with how long the level was held. Everything downstream of the
//! radio (coherent-signal search, line-code decoding, protocol decoders)
//! operates on pulses and on MSB-first bitmaps derived from them.

use serde::{Deserialize, Serialize};

/// A single RF pulse: the instantaneous level and how long it lasted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pulse {
    /// Instantaneous RF level at the demodulator output.
    pub level: bool,
    /// Duration the level was held, in microseconds.
    pub duration: u32,
}

impl Pulse {
    pub fn new(level: bool, duration: u32) -> Self {
        Self { level, duration }
    }
}

/// Result type for decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reasons a protocol decoder rejects a candidate bitmap.
///
/// None of these are fatal: the dispatcher simply moves on to the next
/// decoder in the registry. Allocation failure is not represented here —
/// running out of memory aborts, which is the intended no-recovery policy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The candidate bitmap is too short to contain this protocol's frame.
    #[error("bitmap too short: need {needed} bits, have {available}")]
    TooShort { needed: u32, available: u32 },

    /// The preamble / sync word was not found anywhere in the bitmap.
    #[error("preamble not found")]
    PreambleMissing,

    /// The line-code decoder hit a non-matching window before producing
    /// enough data bits.
    #[error("line code error: decoded {decoded} bits, need {needed}")]
    CodecReject { decoded: u32, needed: u32 },

    /// CRC / checksum validation failed.
    #[error("checksum mismatch: computed {computed:#04x}, expected {expected:#04x}")]
    ChecksumMismatch { computed: u16, expected: u16 },

    /// The frame passed structural checks but the reading is garbage
    /// (all-zero payload, out-of-range pressure, inverted-byte check).
    #[error("implausible reading: {0}")]
    ImplausibleReading(&'static str),
}
