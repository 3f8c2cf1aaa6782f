//! TPMS Sensor Tracking
//!
//! Extracts sensor readings from decoded messages and maintains a bounded
//! list of unique sensors with their latest values. Sensors are identified
//! by their tire ID bytes; repeated receptions update the stored reading
//! in place and bump the reception counter.
//!
//! Readings are stored in the units the decoders emit them in — kPa and
//! degrees Celsius — with PSI-only protocols normalized to kPa at store
//! time so rows stay comparable. Display conversion is the shell's job.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dispatcher::MsgInfo;
use crate::fields::{FieldSet, FieldValue};

/// Maximum number of tracked sensors.
pub const MAX_SENSORS: usize = 32;
/// Maximum tire ID length in bytes.
pub const ID_MAX_BYTES: usize = 8;

/// kPa per PSI.
const KPA_PER_PSI: f32 = 6.894757;

/// Latest known state of one tire sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    /// Tire ID bytes as emitted by the decoder.
    pub id: Vec<u8>,
    /// Name of the decoder that last received this sensor.
    pub protocol: String,
    /// Last pressure reading in kPa, if the frame carried one.
    pub pressure_kpa: Option<f32>,
    /// Last temperature reading in degrees C, if the frame carried one.
    pub temperature_c: Option<i32>,
    /// Shell-supplied timestamp of the last reception.
    pub last_seen: u64,
    /// Number of receptions.
    pub rx_count: u32,
}

impl Sensor {
    /// Tire ID rendered as uppercase hex.
    pub fn id_hex(&self) -> String {
        self.id.iter().map(|b| format!("{b:02X}")).collect()
    }
}

/// Bounded registry of sensors deduplicated by tire ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorList {
    sensors: Vec<Sensor>,
}

impl SensorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Sensor> {
        self.sensors.get(idx)
    }

    /// Drop all tracked sensors.
    pub fn clear(&mut self) {
        self.sensors.clear();
    }

    fn find_by_id(&mut self, id: &[u8]) -> Option<&mut Sensor> {
        self.sensors.iter_mut().find(|s| s.id == id)
    }

    /// Extract the reading from a decoded message and add it to the list,
    /// or refresh the existing entry with the same tire ID. `now` is a
    /// shell-supplied timestamp stored as `last_seen`.
    ///
    /// Returns `true` if a valid TPMS reading was stored. Messages without
    /// a byte-typed `"Tire ID"` field are not TPMS frames and are ignored;
    /// so is any reading once the list is full.
    pub fn extract_and_store(&mut self, info: &MsgInfo, now: u64) -> bool {
        let Some(id_field) = info.fields.find("Tire ID") else {
            return false;
        };
        let FieldValue::Bytes(id_bytes) = &id_field.value else {
            return false;
        };

        // Field length is in nibbles; round up to bytes.
        let id_len = (((id_field.len + 1) / 2) as usize).min(ID_MAX_BYTES);
        let id = id_bytes[..id_len.min(id_bytes.len())].to_vec();

        let protocol = info.decoder_name.unwrap_or("unknown").to_string();
        let pressure_kpa = extract_pressure_kpa(&info.fields);
        let temperature_c = extract_temperature_c(&info.fields);

        if let Some(existing) = self.find_by_id(&id) {
            if pressure_kpa.is_some() {
                existing.pressure_kpa = pressure_kpa;
            }
            if temperature_c.is_some() {
                existing.temperature_c = temperature_c;
            }
            existing.last_seen = now;
            existing.rx_count += 1;
            // A more specific decoder may have matched this time.
            existing.protocol = protocol;
            return true;
        }

        if self.sensors.len() >= MAX_SENSORS {
            debug!("sensor list full, dropping reading");
            return false;
        }

        debug!(?id, %protocol, "new sensor");
        self.sensors.push(Sensor {
            id,
            protocol,
            pressure_kpa,
            temperature_c,
            last_seen: now,
            rx_count: 1,
        });
        true
    }
}

/// Pull the pressure out of a field set, normalizing PSI frames to kPa.
fn extract_pressure_kpa(fields: &FieldSet) -> Option<f32> {
    if let Some(f) = fields.find("Pressure kpa") {
        if let FieldValue::Float { value, .. } = f.value {
            return Some(value);
        }
    }
    if let Some(f) = fields.find("Pressure psi") {
        if let FieldValue::Float { value, .. } = f.value {
            return Some(value * KPA_PER_PSI);
        }
    }
    None
}

fn extract_temperature_c(fields: &FieldSet) -> Option<i32> {
    match fields.find("Temperature C")?.value {
        FieldValue::SignedInt(v) => Some(v as i32),
        _ => None,
    }
}
