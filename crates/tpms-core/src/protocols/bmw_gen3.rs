//! BMW Gen2/Gen3 TPMS decoder.
//!
//! FSK modulation, differential Manchester encoding, 315/433 MHz.
//!
//! Preamble: 0xCCCD. Payload: 11 bytes for Gen3
//! (`ID[4], Pressure, Temp, Flags[3], CRC16[2]`), 10 for Gen2. The whole
//! payload including the trailing CRC-16 (poly 0x1021, init 0x0000)
//! reduces to zero.
//!
//! Pressure kPa = (raw - 43) * 2.5, temperature C = raw - 40.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::crc16;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct BmwGen23;

impl ProtocolDecoder for BmwGen23 {
    fn name(&self) -> &'static str {
        "BMW Gen2/3 TPMS"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let needed = 16 + 88 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "1100110011001101")
            .ok_or(DecodeError::PreambleMissing)?;
        let off = start_off + 16;

        let mut raw = [0u8; 11];
        let decoded = line_code::diff_manchester_decode(&mut raw, bits, off, 90);

        // Gen3 needs 88 bits (11 bytes), Gen2 80 (10 bytes).
        let msg_len: usize = if decoded >= 88 {
            11
        } else if decoded >= 80 {
            10
        } else {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 80,
            });
        };

        let crc = crc16(&raw[..msg_len], 0x0000, 0x1021);
        if crc != 0 {
            return Err(DecodeError::ChecksumMismatch {
                computed: crc,
                expected: 0,
            });
        }

        let tire_id = [raw[0], raw[1], raw[2], raw[3]];
        let pressure_kpa = (raw[4] as f32 - 43.0) * 2.5;
        let temp_c = raw[5] as i64 - 40;

        info.start_off = start_off;
        info.pulses_count = (off + decoded * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 1);
        info.fields.add_int("Temperature C", temp_c, 8);
        Ok(())
    }
}
