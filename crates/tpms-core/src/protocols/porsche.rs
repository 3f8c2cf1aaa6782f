//! Porsche Boxster/Cayman (Typ 987) TPMS decoder.
//!
//! FSK modulation, differential Manchester encoding, 315/433 MHz.
//!
//! Preamble: alternating `1100` pairs ending in `1010` (~30 bits); the
//! decoder searches for the `110011001010` tail. Payload: 10 bytes —
//! `ID[4], Pressure, Temp, Flags[2], CRC16[2]` — verifying to zero under
//! CRC-16 poly 0x1021 init 0xFFFF.
//!
//! Pressure kPa = raw * 2.5 - 100, temperature C = raw - 40.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::crc16;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct Porsche987;

impl ProtocolDecoder for Porsche987 {
    fn name(&self) -> &'static str {
        "Porsche TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let needed = 20 + 80 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "110011001010")
            .ok_or(DecodeError::PreambleMissing)?;
        let off = start_off + 12;

        let mut raw = [0u8; 10];
        let decoded = line_code::diff_manchester_decode(&mut raw, bits, off, 82);
        if decoded < 80 {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 80,
            });
        }

        let crc = crc16(&raw, 0xFFFF, 0x1021);
        if crc != 0 {
            return Err(DecodeError::ChecksumMismatch {
                computed: crc,
                expected: 0,
            });
        }

        let tire_id = [raw[0], raw[1], raw[2], raw[3]];
        let pressure_kpa = raw[4] as f32 * 2.5 - 100.0;
        let temp_c = raw[5] as i64 - 40;

        info.start_off = start_off;
        info.pulses_count = (off + decoded * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 1);
        info.fields.add_int("Temperature C", temp_c, 8);
        Ok(())
    }
}
