//! Decoded Message Fields
//!
//! A decoder that accepts a frame describes it as an ordered, append-only
//! set of named, type-tagged fields. The shell pulls readings out by exact
//! name: every TPMS decoder emits `"Tire ID"` (bytes) plus `"Pressure kpa"`
//! or `"Pressure psi"` (float) and, when the protocol carries it,
//! `"Temperature C"` (signed int).
//!
//! Byte fields record their length in *nibbles*, so a 4-byte sensor ID has
//! length 8. Consumers divide by two and round up to get the byte count.

use serde::{Deserialize, Serialize};

/// Payload of a decoded field, tagged by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Free-form text.
    Str(String),
    /// Signed integer (temperatures, offsets).
    SignedInt(i64),
    /// Unsigned integer (counters, battery levels).
    UnsignedInt(u64),
    /// Integer rendered as binary digits.
    Binary(u64),
    /// Integer rendered as hex digits.
    Hex(u64),
    /// Raw bytes (sensor IDs).
    Bytes(Vec<u8>),
    /// Floating point value with a display precision.
    Float { value: f32, digits_after_dot: u32 },
}

impl FieldValue {
    /// Human-readable name of the type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Str(_) => "str",
            FieldValue::SignedInt(_) => "int",
            FieldValue::UnsignedInt(_) => "uint",
            FieldValue::Binary(_) => "bin",
            FieldValue::Hex(_) => "hex",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Float { .. } => "float",
        }
    }
}

/// A single named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// Length in bits, except for `Bytes` where it counts nibbles.
    pub len: u32,
    pub value: FieldValue,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            FieldValue::Str(s) => write!(f, "{s}"),
            FieldValue::SignedInt(v) => write!(f, "{v}"),
            FieldValue::UnsignedInt(v) => write!(f, "{v}"),
            FieldValue::Binary(v) => {
                for j in (0..self.len).rev() {
                    write!(f, "{}", (v >> j) & 1)?;
                }
                Ok(())
            }
            FieldValue::Hex(v) => write!(f, "{v:#x}"),
            FieldValue::Bytes(bytes) => {
                // len is in nibbles; an odd length drops the final low nibble.
                for j in 0..self.len as usize {
                    let byte = bytes.get(j / 2).copied().unwrap_or(0);
                    let nibble = if j % 2 == 0 { byte >> 4 } else { byte & 0xF };
                    write!(f, "{nibble:X}")?;
                }
                Ok(())
            }
            FieldValue::Float {
                value,
                digits_after_dot,
            } => write!(f, "{:.*}", *digits_after_dot as usize, value),
        }
    }
}

/// Ordered, append-only collection of decoded fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Exact-name lookup. Returns the first match in append order.
    pub fn find(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn add_int(&mut self, name: &str, val: i64, bits: u8) {
        self.push(name, bits as u32, FieldValue::SignedInt(val));
    }

    pub fn add_uint(&mut self, name: &str, val: u64, bits: u8) {
        self.push(name, bits as u32, FieldValue::UnsignedInt(val));
    }

    pub fn add_hex(&mut self, name: &str, val: u64, bits: u8) {
        self.push(name, bits as u32, FieldValue::Hex(val));
    }

    pub fn add_bin(&mut self, name: &str, val: u64, bits: u8) {
        self.push(name, bits as u32, FieldValue::Binary(val));
    }

    pub fn add_str(&mut self, name: &str, s: &str) {
        self.push(name, s.len() as u32, FieldValue::Str(s.to_string()));
    }

    /// Append a byte field. `nibbles` is the length in hex digits, so pass
    /// `bytes.len() * 2` for whole bytes.
    pub fn add_bytes(&mut self, name: &str, bytes: &[u8], nibbles: u32) {
        self.push(name, nibbles, FieldValue::Bytes(bytes.to_vec()));
    }

    pub fn add_float(&mut self, name: &str, value: f32, digits_after_dot: u32) {
        self.push(
            name,
            32,
            FieldValue::Float {
                value,
                digits_after_dot,
            },
        );
    }

    fn push(&mut self, name: &str, len: u32, value: FieldValue) {
        self.fields.push(Field {
            name: name.to_string(),
            len,
            value,
        });
    }
}
