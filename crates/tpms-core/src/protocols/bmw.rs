//! BMW Gen4/Gen5 and Audi TPMS decoder.
//!
//! Multi-brand sensors: HUF/Beru, Continental, Schrader/Sensata, Audi.
//! FSK modulation, Manchester encoding (zero-bit inverted), 315/433 MHz.
//!
//! Preamble: 0xAA59. Payload: 11 bytes for BMW
//! (`Brand, ID[4], Pressure, Temp, Flags[3], CRC`) or 8 for Audi
//! (`Brand, ID[4], Pressure, Temp, CRC`). CRC-8 poly 0x2F init 0xAA.
//!
//! Pressure kPa = raw * 2.45, temperature C = raw - 52.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::crc8;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct BmwGen45;

impl ProtocolDecoder for BmwGen45 {
    fn name(&self) -> &'static str {
        "BMW/Audi TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let needed = 16 + 64 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "1010101001011001")
            .ok_or(DecodeError::PreambleMissing)?;
        let off = start_off + 16;

        // Manchester decode, zero-bit inverted: 10=0, 01=1.
        let mut raw = [0u8; 11];
        let decoded = line_code::from_line_code(&mut raw, bits, off, "10", "01");

        // BMW frames carry 11 bytes, Audi 8.
        let msg_len: usize = if decoded >= 88 {
            11
        } else if decoded >= 64 {
            8
        } else {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 64,
            });
        };
        let crc_len = msg_len - 1;

        let crc = crc8(&raw[..crc_len], 0xAA, 0x2F);
        if crc != raw[crc_len] {
            return Err(DecodeError::ChecksumMismatch {
                computed: crc as u16,
                expected: raw[crc_len] as u16,
            });
        }

        let tire_id = [raw[1], raw[2], raw[3], raw[4]];
        let pressure_kpa = raw[5] as f32 * 2.45;
        let temp_c = raw[6] as i64 - 52;

        info.start_off = start_off;
        info.pulses_count = (off + decoded * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 1);
        info.fields.add_int("Temperature C", temp_c, 8);
        Ok(())
    }
}
