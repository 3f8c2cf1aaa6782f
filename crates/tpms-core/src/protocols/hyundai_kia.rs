//! Hyundai / Kia TPMS (Continental/VDO sensors).
//!
//! Common on US-market Hyundai and Kia vehicles at 315 MHz, also at
//! 433.92 MHz on European models. FSK, ~52 us short pulse.
//!
//! Preamble: alternating `0101...` + sync `0110`. Payload: 10 Manchester
//! bytes — `Type, ID[4], Battery, Pressure, Temp, Spare, XOR` — where the
//! final byte is the XOR of the nine before it.
//!
//! Pressure kPa = raw * 2.5, temperature C = raw - 50.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::xor_bytes;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct HyundaiKia;

impl ProtocolDecoder for HyundaiKia {
    fn name(&self) -> &'static str {
        "Hyundai/Kia TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let sync_len = 12 + 4;
        let needed = sync_len + 10 * 8 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "0101010101010110")
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

        // XOR of bytes 0 through 8 must equal byte 9.
        let crc = xor_bytes(&raw[..9], 0);
        if crc != raw[9] {
            return Err(DecodeError::ChecksumMismatch {
                computed: crc as u16,
                expected: raw[9] as u16,
            });
        }

        let tire_id = [raw[1], raw[2], raw[3], raw[4]];
        let pressure_kpa = raw[6] as f32 * 2.5;
        let temp_c = raw[7] as i64 - 50;
        let battery = (raw[5] & 0x7F) as u64;
        let flags = raw[0] as u64;

        info.start_off = start_off;
        info.pulses_count = (off + 10 * 8 * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 2);
        info.fields.add_int("Temperature C", temp_c, 8);
        info.fields.add_uint("Battery", battery, 7);
        info.fields.add_hex("Flags", flags, 8);
        Ok(())
    }
}
