//! Decode Dispatcher
//!
//! Converts a candidate pulse region into a wide bitmap and runs the
//! protocol decoder registry against it. The bitmap window is deliberately
//! widened: conversion starts 32 samples *before* the detected run (relying
//! on the ring buffer's modular indexing) and extends 100 samples past it,
//! so decoders can lock onto preambles that begin slightly outside the run
//! the scanner reported.
//!
//! Registry order is a contract: more specific decoders run before generic
//! ones, and the first decoder to accept wins.

use tracing::{debug, trace};

use crate::bitmap;
use crate::fields::FieldSet;
use crate::line_code;
use crate::protocols;
use crate::raw_samples::RawSamples;

/// Working bitmap size in bytes.
const BITMAP_BYTES: usize = 4096;
/// Samples prepended before the detected run.
const BEFORE_SAMPLES: u32 = 32;
/// Samples appended after the detected run.
const AFTER_SAMPLES: u32 = 100;

/// Everything known about a successfully decoded message.
///
/// Allocated per candidate by the scanner; dropped when the candidate loses
/// the best-signal race or after the shell consumes it.
#[derive(Debug, Clone, Default)]
pub struct MsgInfo {
    /// Name of the decoder that accepted the frame.
    pub decoder_name: Option<&'static str>,
    /// Bit offset in the widened bitmap where the preamble matched.
    pub start_off: u32,
    /// Span of raw bits the decoder consumed. Display-span hint only; the
    /// Manchester decoders over-count by up to 2x.
    pub pulses_count: u32,
    /// Symbol period estimate the bitmap was sampled at, in microseconds.
    pub short_pulse_dur: u32,
    /// Raw matched bits, `ceil(pulses_count / 8)` bytes, copied from the
    /// working bitmap starting at `start_off`.
    pub bits: Option<Vec<u8>>,
    /// Decoded fields, in the order the decoder emitted them.
    pub fields: FieldSet,
}

impl MsgInfo {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Run the decoder registry against a candidate region of `len` pulses.
///
/// On success fills `info` (decoder name, offsets, payload bits, fields)
/// and returns `true`. On failure `info` keeps only whatever the rejecting
/// decoders never touched — they have no side effects on failure.
pub fn decode_signal(s: &RawSamples, len: u64, info: &mut MsgInfo) -> bool {
    let mut bits = vec![0u8; BITMAP_BYTES];
    let num_bits = line_code::signal_to_bits(
        &mut bits,
        s,
        -(BEFORE_SAMPLES as i64),
        len as u32 + BEFORE_SAMPLES + AFTER_SAMPLES,
        s.short_pulse_dur,
    );

    debug!(
        num_bits,
        "sampled: {}",
        bitmap::to_bit_string(&bits, 0, num_bits.min(1023))
    );

    for decoder in protocols::DECODERS {
        match decoder.decode(&bits, num_bits, info) {
            Ok(()) => {
                debug!(decoder = decoder.name(), "decoded");
                info.decoder_name = Some(decoder.name());
                if info.pulses_count > 0 {
                    let nbytes = (info.pulses_count as usize + 7) / 8;
                    let mut payload = vec![0u8; nbytes];
                    bitmap::copy(&mut payload, 0, &bits, info.start_off, info.pulses_count);
                    info.bits = Some(payload);
                }
                return true;
            }
            Err(err) => trace!(decoder = decoder.name(), %err, "rejected"),
        }
    }

    debug!("no decoding possible");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_signal_no_decode() {
        let buf = RawSamples::new(256);
        let mut info = MsgInfo::new();
        // short_pulse_dur is zero: the NRZ conversion produces nothing and
        // every decoder rejects.
        assert!(!decode_signal(&buf, 64, &mut info));
        assert!(info.decoder_name.is_none());
        assert!(info.bits.is_none());
        assert!(info.fields.is_empty());
    }

    #[test]
    fn test_noise_no_decode() {
        let mut buf = RawSamples::new(1024);
        // Alternating short/long pulses with no protocol structure.
        for i in 0..200u32 {
            buf.append(i % 2 == 0, if i % 3 == 0 { 52 } else { 104 });
        }
        buf.short_pulse_dur = 52;
        let mut info = MsgInfo::new();
        buf.center(1024 - 200);
        assert!(!decode_signal(&buf, 200, &mut info));
        assert!(info.fields.is_empty());
    }
}
