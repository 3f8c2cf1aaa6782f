//! Citroen / Peugeot TPMS decoder (VDO sensors).
//!
//! FSK modulation, Manchester encoding, 433.92 MHz.
//!
//! Preamble: alternating `0101...` + sync `0110`. Payload: 10 Manchester
//! bytes — `State, ID[4], Pressure, Temp, Battery, Spare, XOR` — where the
//! XOR of bytes 1 through 9 is zero.
//!
//! Pressure kPa = raw * 1.364, temperature C = raw - 50.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::xor_bytes;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct Citroen;

impl ProtocolDecoder for Citroen {
    fn name(&self) -> &'static str {
        "Citroen TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let sync_len = 16 + 4;
        let needed = sync_len + 10 * 8 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "01010101010101010110")
            .ok_or(DecodeError::PreambleMissing)?;
        let off = start_off + sync_len;

        let mut raw = [0u8; 10];
        let decoded = line_code::from_line_code(&mut raw, bits, off, "01", "10");
        if decoded < 80 {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 80,
            });
        }

        // XOR over bytes 1..=9 (checksum included) reduces to zero.
        let xor = xor_bytes(&raw[1..10], 0);
        if xor != 0 {
            return Err(DecodeError::ChecksumMismatch {
                computed: xor as u16,
                expected: 0,
            });
        }

        let tire_id = [raw[1], raw[2], raw[3], raw[4]];
        let pressure_kpa = raw[5] as f32 * 1.364;
        let temp_c = raw[6] as i64 - 50;
        let battery = raw[7] as u64;

        info.start_off = start_off;
        info.pulses_count = (off + 10 * 8 * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 1);
        info.fields.add_int("Temperature C", temp_c, 8);
        info.fields.add_uint("Battery", battery, 8);
        Ok(())
    }
}
