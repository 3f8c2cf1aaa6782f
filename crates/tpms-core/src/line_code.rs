//! Line Code Decoders
//!
//! Converts between the pulse domain and the bit domain:
//!
//! - [`signal_to_bits`]: non-return-to-zero reconstruction by symbol rate.
//!   Each pulse contributes `round(duration / rate)` repetitions of its
//!   level to the output bitmap.
//! - [`from_line_code`]: generic two-pattern decoder covering Manchester
//!   (`"01"`/`"10"`) and its zero-inverted variant (`"10"`/`"01"`).
//! - [`from_diff_manchester`]: pairwise differential Manchester, kept for
//!   the decoders that depend on its exact bit sense (Renault, Toyota EU).
//! - [`diff_manchester_decode`]: sliding three-sample differential
//!   Manchester (Biphase-Mark sense) used by PMV-107J, BMW Gen2/3 and
//!   Porsche.
//!
//! The two differential Manchester forms are not equivalent. Decoders pick
//! the one whose bit sense matches their sensor; do not unify them.

use crate::bitmap;
use crate::raw_samples::RawSamples;

/// Per-pulse cap on NRZ expansion. A pulse longer than 1024 symbol periods
/// is noise or dead air, not data.
const MAX_BITS_PER_PULSE: u32 = 1024;

/// Reconstruct a level bitstream from `count` pulses starting at relative
/// index `idx`, assuming one symbol every `rate` microseconds.
///
/// Each pulse emits `round(duration / rate)` copies of its level. Pulses
/// that round to zero symbols contribute nothing. A `rate` of zero yields
/// zero bits. Negative `idx` is legal and relies on the ring buffer's
/// modular indexing; the dispatcher uses it to widen the decode window
/// before the detected run.
///
/// Returns the number of bits written to `dst`.
pub fn signal_to_bits(dst: &mut [u8], src: &RawSamples, idx: i64, count: u32, rate: u32) -> u32 {
    if rate == 0 {
        return 0;
    }
    let mut bitpos = 0u32;
    for j in 0..count as i64 {
        let pulse = src.get(idx + j);

        let mut numbits = pulse.duration / rate;
        if pulse.duration % rate > rate / 2 {
            numbits += 1;
        }
        if numbits > MAX_BITS_PER_PULSE {
            numbits = MAX_BITS_PER_PULSE;
        }

        for _ in 0..numbits {
            bitmap::set(dst, bitpos, pulse.level);
            bitpos += 1;
        }
    }
    bitpos
}

/// Decode a two-pattern line code from `bits` starting at bit `off`.
///
/// While the cursor matches `zero_pattern`, emit 0 and advance by the
/// pattern length; likewise `one_pattern` for 1. The first window matching
/// neither pattern stops the walk. Writing stops once `dst` is full.
///
/// Returns the number of data bits decoded into `dst`.
pub fn from_line_code(
    dst: &mut [u8],
    bits: &[u8],
    mut off: u32,
    zero_pattern: &str,
    one_pattern: &str,
) -> u32 {
    let len = bits.len() as u32 * 8;
    let mut decoded = 0u32;
    while off < len {
        let bitval;
        if bitmap::match_bits(bits, off, zero_pattern) {
            bitval = false;
            off += zero_pattern.len() as u32;
        } else if bitmap::match_bits(bits, off, one_pattern) {
            bitval = true;
            off += one_pattern.len() as u32;
        } else {
            break;
        }
        bitmap::set(dst, decoded, bitval);
        decoded += 1;
        if decoded as usize / 8 == dst.len() {
            break;
        }
    }
    decoded
}

/// Pairwise differential Manchester decoder.
///
/// Walks the source two bits at a time: emits `b0 == b1` as the data bit
/// and carries `b1` into the next pair. Stops when `b0` equals the carried
/// state (missing transition). `previous` seeds the carried state.
///
/// Returns the number of data bits decoded into `dst`.
pub fn from_diff_manchester(
    dst: &mut [u8],
    bits: &[u8],
    off: u32,
    mut previous: bool,
) -> u32 {
    let len = bits.len() as u32 * 8;
    let mut decoded = 0u32;
    let mut j = off;
    while j < len {
        let b0 = bitmap::get(bits, j);
        let b1 = bitmap::get(bits, j + 1);
        if b0 == previous {
            break;
        }
        bitmap::set(dst, decoded, b0 == b1);
        decoded += 1;
        previous = b1;
        if decoded as usize / 8 == dst.len() {
            break;
        }
        j += 2;
    }
    decoded
}

/// Sliding differential Manchester decoder (Biphase-Mark sense).
///
/// Bootstraps with a single half-bit, then consumes two source bits per
/// output bit: the first must differ from the carried state (mid-bit
/// transition, always present — its absence stops the decode), the second
/// determines the transition at the start of the next bit. No start
/// transition decodes as 1, a start transition as 0.
///
/// Returns the number of data bits decoded into `dst`, at most `max_bits`.
pub fn diff_manchester_decode(
    dst: &mut [u8],
    bits: &[u8],
    mut off: u32,
    max_bits: u32,
) -> u32 {
    let limit = bits.len() as u32 * 8;
    let mut decoded = 0u32;

    if off >= limit {
        return 0;
    }
    let mut bit = bitmap::get(bits, off);
    off += 1;

    while decoded < max_bits && off < limit {
        let bit2 = bitmap::get(bits, off);
        off += 1;
        if bit == bit2 {
            break; // Missing mid-bit transition.
        }

        if off >= limit {
            break;
        }
        let bit3 = bitmap::get(bits, off);
        off += 1;

        bitmap::set(dst, decoded, bit2 == bit3);
        decoded += 1;
        bit = bit3;
    }
    decoded
}
