//! Pacific PMV-107J TPMS decoder.
//!
//! Used in Toyota Highlander (2015+), Camry, Corolla, Lexus, etc.
//! US market: 315 MHz. Other markets: 433.92 MHz.
//!
//! FSK modulation, differential Manchester encoding, ~10 kBaud.
//!
//! Preamble: `111110` (five ones + first half of the reference clock).
//! Data: 66 bits differential Manchester, realigned into 9 bytes:
//!
//! ```text
//! b[0]: 000000II  (MSB 2 bits of ID)
//! b[1..4]: IIIIIIII x3
//! b[4]: IISSSSSS  (LSB 2 bits of ID + 6 status bits)
//! b[5]: PPPPPPPP  (pressure raw)
//! b[6]: NNNNNNNN  (inverted pressure, b[5] ^ b[6] == 0xFF)
//! b[7]: TTTTTTTT  (temperature raw)
//! b[8]: CCCCCCCC  (CRC-8, poly 0x13, init 0x00)
//! ```
//!
//! Pressure kPa = (b[5] - 40) * 2.48, temperature C = b[7] - 40.

use tracing::debug;

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::crc8;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct Pmv107j;

impl ProtocolDecoder for Pmv107j {
    fn name(&self) -> &'static str {
        "Toyota PMV-107J"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        // Preamble (6 bits) + at least 66 * 2 raw bits of diff Manchester.
        let needed = 6 + 66 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off =
            bitmap::seek_bits(bits, 0, num_bits, "111110").ok_or(DecodeError::PreambleMissing)?;
        debug!(start_off, "preamble found");

        // Skip the preamble, start at the second half of the reference clock.
        let off = start_off + 6;

        let mut decoded_buf = [0u8; 10];
        let decoded = line_code::diff_manchester_decode(&mut decoded_buf, bits, off, 70);
        if decoded < 66 {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 66,
            });
        }

        // Realign: first 2 decoded bits form b[0], the next 64 fill b[1..9].
        let mut b = [0u8; 9];
        b[0] = (bitmap::get(&decoded_buf, 0) as u8) << 1 | bitmap::get(&decoded_buf, 1) as u8;
        bitmap::copy(&mut b[1..], 0, &decoded_buf, 2, 64);

        let crc = crc8(&b[..8], 0x00, 0x13);
        if crc != b[8] {
            return Err(DecodeError::ChecksumMismatch {
                computed: crc as u16,
                expected: b[8] as u16,
            });
        }

        // Pressure integrity: raw and inverted pressure must XOR to 0xFF.
        if b[5] ^ b[6] != 0xFF {
            return Err(DecodeError::ImplausibleReading(
                "pressure bytes not complementary",
            ));
        }

        // The 28-bit ID sits at bit 6 of the realigned frame; store it as
        // four whole bytes the way the sensor tools print it.
        let tire_id = [
            b[0] << 6 | b[1] >> 2,
            b[1] << 6 | b[2] >> 2,
            b[2] << 6 | b[3] >> 2,
            b[3] << 6 | b[4] >> 2,
        ];

        let pressure_kpa = (b[5] as f32 - 40.0) * 2.48;
        let temp_c = b[7] as i64 - 40;

        info.start_off = start_off;
        info.pulses_count = decoded * 2 + 6; // Approximate raw pulse span.
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 2);
        info.fields.add_int("Temperature C", temp_c, 8);
        Ok(())
    }
}
