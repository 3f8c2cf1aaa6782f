//! Renault TPMS decoder.
//!
//! FSK modulation, 433.92 MHz on European models. The payload is carried
//! in the pairwise differential Manchester form — this decoder depends on
//! that form's exact bit sense, which is why the engine keeps it alongside
//! the sliding decoder.
//!
//! Preamble: alternating `0101...` + sync `0110`. Payload: 9 bytes —
//! 10-bit pressure (split over b[0] low bits and b[1]), temperature,
//! 24-bit sensor ID, flags, CRC-8 poly 0x07 init 0x00.
//!
//! Pressure kPa = raw * 0.75, temperature C = raw - 30.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::crc8;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct Renault;

impl ProtocolDecoder for Renault {
    fn name(&self) -> &'static str {
        "Renault TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let sync_len = 10 + 4;
        let needed = sync_len + 9 * 8 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "01010101010110")
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

        let crc = crc8(&raw[..8], 0x00, 0x07);
        if crc != raw[8] {
            return Err(DecodeError::ChecksumMismatch {
                computed: crc as u16,
                expected: raw[8] as u16,
            });
        }

        let pressure_raw = ((raw[0] & 0x03) as u32) << 8 | raw[1] as u32;
        let pressure_kpa = pressure_raw as f32 * 0.75;
        let temp_c = raw[2] as i64 - 30;
        let tire_id = [raw[3], raw[4], raw[5]];

        info.start_off = start_off;
        info.pulses_count = (off + 9 * 8 * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 3 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 2);
        info.fields.add_int("Temperature C", temp_c, 8);
        Ok(())
    }
}
