//! Ford TPMS decoder.
//!
//! FSK modulation, Manchester encoding, 315 MHz US-market Ford/Lincoln/
//! Mercury.
//!
//! Preamble: long alternating `0101...` run + sync `0110`. Payload: 8
//! Manchester bytes — `ID[4], Pressure, Temp, Flags, SUM` — where the last
//! byte is the additive checksum of the seven before it. The ninth
//! pressure bit lives in flag bit 0x20.
//!
//! Pressure PSI = raw * 0.25, temperature C = raw - 56. Learn-mode frames
//! carry no temperature (raw zero) and the field is simply not emitted.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::sum_bytes;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct Ford;

impl ProtocolDecoder for Ford {
    fn name(&self) -> &'static str {
        "Ford TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let sync_len = 20 + 4;
        let needed = sync_len + 8 * 8 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "010101010101010101010110")
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

        let sum = sum_bytes(&raw[..7], 0);
        if sum != raw[7] {
            return Err(DecodeError::ChecksumMismatch {
                computed: sum as u16,
                expected: raw[7] as u16,
            });
        }

        let tire_id = [raw[0], raw[1], raw[2], raw[3]];
        let pressure_raw = ((raw[6] & 0x20) as u16) << 3 | raw[4] as u16;
        let pressure_psi = pressure_raw as f32 * 0.25;

        info.start_off = start_off;
        info.pulses_count = (off + 8 * 8 * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure psi", pressure_psi, 2);
        if raw[5] != 0 {
            info.fields.add_int("Temperature C", raw[5] as i64 - 56, 8);
        }
        info.fields.add_hex("Flags", raw[6] as u64, 8);
        Ok(())
    }
}
