//! Schrader SMD3MA4 TPMS decoder.
//!
//! Used in Subaru, Infiniti, Nissan, some Renault.
//! OOK modulation, Manchester encoding, 315/433 MHz.
//!
//! Preamble: long alternating sequence ending with `1110`; the decoder
//! searches for the `010101011110` tail. Payload: 39 Manchester bits —
//! 3 flag bits, 24-bit sensor ID, 10-bit pressure, 2 check bits. No
//! temperature in this protocol, and no checksum beyond an all-zero
//! reject and a pressure range clamp.
//!
//! Pressure PSI = raw * 0.2.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct SchraderSmd3ma4;

impl ProtocolDecoder for SchraderSmd3ma4 {
    fn name(&self) -> &'static str {
        "Schrader SMD3MA4"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let needed = 12 + 39 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "010101011110")
            .ok_or(DecodeError::PreambleMissing)?;
        let off = start_off + 12;

        // Manchester decode: 01=0, 10=1. We need 39 bits.
        let mut raw = [0u8; 5];
        let decoded = line_code::from_line_code(&mut raw, bits, off, "01", "10");
        if decoded < 39 {
            return Err(DecodeError::CodecReject {
                decoded,
                needed: 39,
            });
        }

        if raw[0] == 0 && raw[1] == 0 && raw[2] == 0 && raw[3] == 0 {
            return Err(DecodeError::ImplausibleReading("all-zero payload"));
        }

        // Bits 0-2 flags, 3-26 sensor ID, 27-36 pressure, 37-38 check.
        let tire_id = [
            (raw[0] & 0x1F) << 3 | raw[1] >> 5,
            raw[1] << 3 | raw[2] >> 5,
            raw[2] << 3 | raw[3] >> 5,
        ];

        let pressure_raw = ((raw[3] & 0x1F) as u16) << 5 | (raw[4] >> 3) as u16;
        let pressure_psi = pressure_raw as f32 * 0.2;
        if !(0.0..=100.0).contains(&pressure_psi) {
            return Err(DecodeError::ImplausibleReading("pressure out of range"));
        }

        info.start_off = start_off;
        info.pulses_count = (off + decoded * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 3 * 2);
        info.fields.add_float("Pressure psi", pressure_psi, 1);
        Ok(())
    }
}
