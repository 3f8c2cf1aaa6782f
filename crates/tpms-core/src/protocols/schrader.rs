//! Schrader GEN1 TPMS decoder.
//!
//! The original OOK Schrader format, found across many US makes of the
//! 2000s (GM, Chrysler, others).
//!
//! Preamble tail: `0001111100`. Payload: 8 Manchester bytes — 4 flag bits,
//! 28-bit sensor ID, pressure, temperature, CRC-8 poly 0x07 init 0xF0.
//!
//! Pressure kPa = raw * 2.5, temperature C = raw - 50.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::crc8;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct SchraderGen1;

impl ProtocolDecoder for SchraderGen1 {
    fn name(&self) -> &'static str {
        "Schrader TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let sync_len = 10;
        let needed = sync_len + 8 * 8 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "0001111100")
            .ok_or(DecodeError::PreambleMissing)?;
        let off = start_off + sync_len;

        let mut raw = [0u8; 8];
        let decoded = line_code::from_line_code(&mut raw, bits, off, "01", "10");
        if decoded < 64 {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 64,
            });
        }

        let crc = crc8(&raw[..7], 0xF0, 0x07);
        if crc != raw[7] {
            return Err(DecodeError::ChecksumMismatch {
                computed: crc as u16,
                expected: raw[7] as u16,
            });
        }

        // High nibble of b[0] is flags, the low nibble starts the 28-bit ID.
        let flags = (raw[0] >> 4) as u64;
        let tire_id = [raw[0] & 0x0F, raw[1], raw[2], raw[3]];
        let pressure_kpa = raw[4] as f32 * 2.5;
        let temp_c = raw[5] as i64 - 50;

        info.start_off = start_off;
        info.pulses_count = (off + 8 * 8 * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 1);
        info.fields.add_int("Temperature C", temp_c, 8);
        info.fields.add_hex("Flags", flags, 4);
        Ok(())
    }
}
