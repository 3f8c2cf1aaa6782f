//! Hyundai Elantra 2012 / Honda Civic TPMS (TRW sensor, FCC ID GQ4-44T).
//!
//! FSK modulation, Manchester encoding, 315 MHz (US) / 433 MHz (EU).
//!
//! Preamble: 0x7155. Data: 64 bits Manchester -> 8 bytes laid out as
//! `PP TT II II II II FF CC`: pressure raw (kPa = raw + 60), temperature
//! raw (C = raw - 50), 32-bit sensor ID, flags, CRC-8 poly 0x07 init 0x00.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::crc8;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct Elantra2012;

impl ProtocolDecoder for Elantra2012 {
    fn name(&self) -> &'static str {
        "Elantra2012 TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let needed = 16 + 64 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "0111000101010101")
            .ok_or(DecodeError::PreambleMissing)?;
        let off = start_off + 16;

        // Manchester decode: 01=0, 10=1.
        let mut raw = [0u8; 8];
        let decoded = line_code::from_line_code(&mut raw, bits, off, "01", "10");
        if decoded < 64 {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 64,
            });
        }

        let crc = crc8(&raw[..7], 0x00, 0x07);
        if crc != raw[7] {
            return Err(DecodeError::ChecksumMismatch {
                computed: crc as u16,
                expected: raw[7] as u16,
            });
        }

        let pressure_kpa = raw[0] as f32 + 60.0;
        let temp_c = raw[1] as i64 - 50;
        let tire_id = [raw[2], raw[3], raw[4], raw[5]];

        info.start_off = start_off;
        info.pulses_count = (off + 64 * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 1);
        info.fields.add_int("Temperature C", temp_c, 8);
        Ok(())
    }
}
