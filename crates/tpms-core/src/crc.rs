//! CRC and Checksum Engine
//!
//! Table-based CRC computation plus the trivial additive/XOR checksums that
//! TPMS sensors use. All CRCs here are MSB-first with no input/output
//! reflection and no final XOR; polynomial and initial value vary per
//! protocol.
//!
//! ## Parameters in the registry
//!
//! - CRC-8 poly 0x07 init 0x00 (Elantra2012, Renault, GM legacy)
//! - CRC-8 poly 0x07 init 0x80 (Toyota EU)
//! - CRC-8 poly 0x07 init 0xF0 (Schrader GEN1)
//! - CRC-8 poly 0x13 init 0x00 (Toyota PMV-107J)
//! - CRC-8 poly 0x2F init 0xAA (BMW Gen4/5, Audi)
//! - CRC-16 poly 0x1021 init 0x0000 (BMW Gen2/3)
//! - CRC-16 poly 0x1021 init 0xFFFF (Porsche 987)
//!
//! ## Example
//!
//! ```rust
//! use tpms_core::crc::{crc8, Crc8, CrcComputer};
//!
//! assert_eq!(crc8(b"123456789", 0x00, 0x07), 0xF4);
//!
//! let mut crc = Crc8::with_poly(0x2F, 0xAA);
//! crc.update(&[0x01, 0x02]);
//! let _ = crc.finalize();
//! ```

/// Trait for CRC computation.
pub trait CrcComputer {
    /// The output type of the CRC (u8 or u16).
    type Output: Copy + PartialEq + std::fmt::LowerHex;

    /// Update the CRC with additional data.
    fn update(&mut self, data: &[u8]);

    /// Finalize and return the CRC value.
    fn finalize(&self) -> Self::Output;

    /// Reset the CRC to its initial state.
    fn reset(&mut self);

    /// Verify that data matches an expected CRC.
    fn verify(&mut self, data: &[u8], expected: Self::Output) -> bool
    where
        Self: Sized,
    {
        self.reset();
        self.update(data);
        self.finalize() == expected
    }
}

// ============================================================================
// CRC-8
// ============================================================================

/// CRC-8 with configurable polynomial and initial value.
#[derive(Clone)]
pub struct Crc8 {
    table: [u8; 256],
    value: u8,
    init: u8,
}

impl Crc8 {
    /// Create a new CRC-8 with the standard polynomial 0x07.
    pub fn new() -> Self {
        Self::with_poly(0x07, 0x00)
    }

    /// Create a CRC-8 with custom polynomial and initial value.
    pub fn with_poly(poly: u8, init: u8) -> Self {
        let mut table = [0u8; 256];
        for i in 0..256u16 {
            let mut crc = i as u8;
            for _ in 0..8 {
                if crc & 0x80 != 0 {
                    crc = (crc << 1) ^ poly;
                } else {
                    crc <<= 1;
                }
            }
            table[i as usize] = crc;
        }
        Self {
            table,
            value: init,
            init,
        }
    }
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::new()
    }
}

impl CrcComputer for Crc8 {
    type Output = u8;

    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.value = self.table[(self.value ^ byte) as usize];
        }
    }

    fn finalize(&self) -> u8 {
        self.value
    }

    fn reset(&mut self) {
        self.value = self.init;
    }
}

// ============================================================================
// CRC-16
// ============================================================================

/// CRC-16 with configurable polynomial and initial value.
#[derive(Clone)]
pub struct Crc16 {
    table: [u16; 256],
    value: u16,
    init: u16,
}

impl Crc16 {
    /// CRC-16/XMODEM (polynomial 0x1021, init 0x0000). BMW Gen2/3 frames.
    pub fn xmodem() -> Self {
        Self::with_poly(0x1021, 0x0000)
    }

    /// CRC-16/CCITT-FALSE (polynomial 0x1021, init 0xFFFF). Porsche frames.
    pub fn ccitt_false() -> Self {
        Self::with_poly(0x1021, 0xFFFF)
    }

    /// Create a CRC-16 with custom polynomial and initial value.
    pub fn with_poly(poly: u16, init: u16) -> Self {
        let mut table = [0u16; 256];
        for i in 0..256u32 {
            let mut crc = (i as u16) << 8;
            for _ in 0..8 {
                if crc & 0x8000 != 0 {
                    crc = (crc << 1) ^ poly;
                } else {
                    crc <<= 1;
                }
            }
            table[i as usize] = crc;
        }
        Self {
            table,
            value: init,
            init,
        }
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::xmodem()
    }
}

impl CrcComputer for Crc16 {
    type Output = u16;

    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let idx = ((self.value >> 8) ^ (byte as u16)) as u8;
            self.value = (self.value << 8) ^ self.table[idx as usize];
        }
    }

    fn finalize(&self) -> u16 {
        self.value
    }

    fn reset(&mut self) {
        self.value = self.init;
    }
}

// ============================================================================
// One-shot helpers
// ============================================================================

/// One-shot CRC-8 over `data` with the given init and polynomial.
pub fn crc8(data: &[u8], init: u8, poly: u8) -> u8 {
    let mut crc = Crc8::with_poly(poly, init);
    crc.update(data);
    crc.finalize()
}

/// One-shot CRC-16 over `data` with the given init and polynomial.
pub fn crc16(data: &[u8], init: u16, poly: u16) -> u16 {
    let mut crc = Crc16::with_poly(poly, init);
    crc.update(data);
    crc.finalize()
}

/// Additive checksum: `(init + sum of bytes) mod 256`.
pub fn sum_bytes(data: &[u8], init: u8) -> u8 {
    data.iter().fold(init, |acc, &b| acc.wrapping_add(b))
}

/// Running XOR of all bytes, seeded with `init`.
pub fn xor_bytes(data: &[u8], init: u8) -> u8 {
    data.iter().fold(init, |acc, &b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bit-by-bit reference implementation, MSB first.
    fn crc8_bitwise(data: &[u8], init: u8, poly: u8) -> u8 {
        let mut crc = init;
        for &byte in data {
            crc ^= byte;
            for _ in 0..8 {
                if crc & 0x80 != 0 {
                    crc = (crc << 1) ^ poly;
                } else {
                    crc <<= 1;
                }
            }
        }
        crc
    }

    #[test]
    fn test_crc8_standard_vector() {
        assert_eq!(crc8(b"123456789", 0x00, 0x07), 0xF4);
    }

    #[test]
    fn test_crc8_empty() {
        assert_eq!(crc8(b"", 0x00, 0x07), 0x00);
        assert_eq!(crc8(b"", 0xAA, 0x2F), 0xAA);
    }

    #[test]
    fn test_crc8_table_matches_bitwise() {
        for (poly, init) in [(0x07u8, 0x00u8), (0x07, 0x80), (0x07, 0xF0), (0x13, 0x00), (0x2F, 0xAA)] {
            let data = [0x00, 0x12, 0x34, 0x56, 0x78, 0xC8, 0x37, 0x5A];
            assert_eq!(
                crc8(&data, init, poly),
                crc8_bitwise(&data, init, poly),
                "poly={poly:#04x} init={init:#04x}"
            );
        }
    }

    #[test]
    fn test_crc16_xmodem_vector() {
        // CRC-16/XMODEM of "123456789" is 0x31C3.
        assert_eq!(crc16(b"123456789", 0x0000, 0x1021), 0x31C3);
    }

    #[test]
    fn test_crc16_ccitt_false_vector() {
        // CRC-16/CCITT-FALSE of "123456789" is 0x29B1.
        assert_eq!(crc16(b"123456789", 0xFFFF, 0x1021), 0x29B1);
    }

    #[test]
    fn test_crc16_residue_is_zero() {
        // A message with its own CRC appended verifies to zero. This is the
        // check BMW Gen2/3 and Porsche frames rely on.
        let mut msg = vec![0x11, 0x22, 0x33, 0x44, 0x8E, 0x32, 0x00, 0x01];
        let crc = crc16(&msg, 0xFFFF, 0x1021);
        msg.push((crc >> 8) as u8);
        msg.push((crc & 0xFF) as u8);
        assert_eq!(crc16(&msg, 0xFFFF, 0x1021), 0);
    }

    #[test]
    fn test_crc_verify_and_reset() {
        let mut crc = Crc8::with_poly(0x07, 0x00);
        crc.update(b"garbage");
        crc.reset();
        crc.update(b"123456789");
        assert_eq!(crc.finalize(), 0xF4);
        assert!(crc.verify(b"123456789", 0xF4));
        assert!(!crc.verify(b"123456789", 0xF5));
    }

    #[test]
    fn test_sum_bytes() {
        assert_eq!(sum_bytes(&[], 0), 0);
        assert_eq!(sum_bytes(&[1, 2, 3], 0), 6);
        assert_eq!(sum_bytes(&[0xFF, 0x02], 0), 0x01);
        assert_eq!(sum_bytes(&[0x10], 0xF8), 0x08);
    }

    #[test]
    fn test_xor_bytes() {
        assert_eq!(xor_bytes(&[], 0x5A), 0x5A);
        assert_eq!(xor_bytes(&[0xFF, 0x0F], 0), 0xF0);
        // XOR of a buffer with its own XOR appended is zero.
        let data = [0x12, 0x34, 0x56];
        let x = xor_bytes(&data, 0);
        assert_eq!(xor_bytes(&[0x12, 0x34, 0x56, x], 0), 0);
    }
}
