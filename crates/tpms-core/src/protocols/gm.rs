//! GM Aftermarket TPMS decoder.
//!
//! OOK modulation, ~120 us short pulse, 315 MHz. Covers the aftermarket
//! and late-OEM GM sensors that frame their payload rtl_433-style: six
//! 0x00 lead-in bytes (whose Manchester encoding doubles as the preamble),
//! then the sensor record.
//!
//! Preamble: 48 x `10` (the zero-inverted Manchester image of the six zero
//! bytes). Payload: 17 Manchester bytes, zero-bit inverted (`10`=0,
//! `01`=1):
//!
//! ```text
//! b[0..6]:  0x00 lead-in, must decode to zero
//! b[6..8]:  status / message type
//! b[8..13]: 40-bit sensor ID
//! b[13]:    flags
//! b[14]:    pressure raw (kPa = raw * 2.75)
//! b[15]:    temperature raw (C = raw - 60)
//! b[16]:    additive checksum of b[6..16]
//! ```
//!
//! A 9-byte legacy variant of this sensor family exists; only this frame
//! is decoded here since the registry gives it precedence anyway.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::sum_bytes;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct GmAftermarket;

impl ProtocolDecoder for GmAftermarket {
    fn name(&self) -> &'static str {
        "GM Aftermarket"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let needed = 17 * 8 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        // The lead-in bytes are part of the payload, so decoding starts at
        // the preamble match itself.
        let preamble = "10".repeat(48);
        let start_off = bitmap::seek_bits(bits, 0, num_bits, &preamble)
            .ok_or(DecodeError::PreambleMissing)?;

        let mut raw = [0u8; 17];
        let decoded = line_code::from_line_code(&mut raw, bits, start_off, "10", "01");
        if decoded < 17 * 8 {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 17 * 8,
            });
        }

        if raw[..6].iter().any(|&b| b != 0) {
            return Err(DecodeError::ImplausibleReading("lead-in bytes not zero"));
        }

        let sum = sum_bytes(&raw[6..16], 0);
        if sum != raw[16] {
            return Err(DecodeError::ChecksumMismatch {
                computed: sum as u16,
                expected: raw[16] as u16,
            });
        }

        let tire_id = [raw[8], raw[9], raw[10], raw[11], raw[12]];
        if tire_id.iter().all(|&b| b == 0) {
            return Err(DecodeError::ImplausibleReading("all-zero sensor id"));
        }

        let pressure_kpa = raw[14] as f32 * 2.75;
        if pressure_kpa > 1000.0 {
            return Err(DecodeError::ImplausibleReading("pressure out of range"));
        }
        let temp_c = raw[15] as i64 - 60;

        info.start_off = start_off;
        info.pulses_count = decoded * 2;
        info.fields.add_bytes("Tire ID", &tire_id, 5 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 2);
        info.fields.add_int("Temperature C", temp_c, 8);
        info.fields.add_hex("Status", ((raw[6] as u64) << 8) | raw[7] as u64, 16);
        info.fields.add_hex("Flags", raw[13] as u64, 8);
        Ok(())
    }
}
