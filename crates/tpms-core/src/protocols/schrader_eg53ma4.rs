//! Schrader EG53MA4 TPMS decoder.
//!
//! OOK Manchester format used by GM-family vehicles with Schrader OEM
//! sensors (Cadillac, Saab, Opel).
//!
//! Preamble tail: `0001111101`. Payload: 10 Manchester bytes —
//! `Flags, ID[4], Pressure, Temp, Spare[2], SUM` — where the last byte is
//! the additive checksum of the nine before it. The temperature byte is
//! Fahrenheit on the wire.
//!
//! Pressure kPa = raw * 2.75, temperature C = (raw_F - 32) * 5 / 9.

use super::ProtocolDecoder;
use crate::bitmap;
use crate::crc::sum_bytes;
use crate::dispatcher::MsgInfo;
use crate::line_code;
use crate::types::{DecodeError, DecodeResult};

pub struct SchraderEg53ma4;

impl ProtocolDecoder for SchraderEg53ma4 {
    fn name(&self) -> &'static str {
        "Schrader EG53MA4"
    }

    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()> {
        let sync_len = 10;
        let needed = sync_len + 10 * 8 * 2;
        if num_bits < needed {
            return Err(DecodeError::TooShort {
                needed,
                available: num_bits,
            });
        }

        let start_off = bitmap::seek_bits(bits, 0, num_bits, "0001111101")
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

        let sum = sum_bytes(&raw[..9], 0);
        if sum != raw[9] {
            return Err(DecodeError::ChecksumMismatch {
                computed: sum as u16,
                expected: raw[9] as u16,
            });
        }

        let tire_id = [raw[1], raw[2], raw[3], raw[4]];
        let pressure_kpa = raw[5] as f32 * 2.75;
        let temp_c = (raw[6] as i64 - 32) * 5 / 9;

        info.start_off = start_off;
        info.pulses_count = (off + 10 * 8 * 2) - start_off;
        info.fields.add_bytes("Tire ID", &tire_id, 4 * 2);
        info.fields.add_float("Pressure kpa", pressure_kpa, 2);
        info.fields.add_int("Temperature C", temp_c, 8);
        info.fields.add_hex("Flags", raw[0] as u64, 8);
        Ok(())
    }
}
