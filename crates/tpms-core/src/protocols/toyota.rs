//! Toyota TPMS decoder (EU-market PMV-C210 sensors).
//!
//! FSK modulation, pairwise differential Manchester, 433.92 MHz. The
//! US-market PMV-107J sensors use a different framing and are handled by
//! their own decoder, which runs earlier in the registry.
//!
//! Sync: `00111110`. Payload: 9 bytes — 32-bit sensor ID, 9-bit pressure
//! and 9-bit temperature packed across b[4..7], status, CRC-8 poly 0x07
//! init 0x80.
//!
//! Pressure PSI = raw * 0.25 - 7, temperature C = raw - 40.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::crc8;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct ToyotaEu;

impl ProtocolDecoder for ToyotaEu {
    fn name(&self) -> &'static str {
        "Toyota TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let sync_len = 8;
        let needed = sync_len + 9 * 8 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "00111110")
            .ok_or(DecodeError::PreambleMissing)?;
        let off = start_off + sync_len;

        let mut raw = [0u8; 9];
        let decoded = line_code::from_diff_manchester(&mut raw, bits, off, true);
        if decoded < 72 {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 72,
            });
        }

        let crc = crc8(&raw[..8], 0x80, 0x07);
        if crc != raw[8] {
            return Err(DecodeError::ChecksumMismatch {
                computed: crc as u16,
                expected: raw[8] as u16,
            });
        }

        let tire_id = [raw[0], raw[1], raw[2], raw[3]];
        let pressure_raw = ((raw[4] & 0x7F) as u16) << 1 | (raw[5] >> 7) as u16;
        let pressure_psi = pressure_raw as f32 * 0.25 - 7.0;
        let temp_raw = ((raw[5] & 0x7F) as u16) << 1 | (raw[6] >> 7) as u16;
        let temp_c = temp_raw as i64 - 40;

        info.start_off = start_off;
        info.pulses_count = (off + 9 * 8 * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure psi", pressure_psi, 2);
        info.fields.add_int("Temperature C", temp_c, 8);
        Ok(())
    }
}
