//! # TPMS Receiver Core Engine
//!
//! Signal-processing and protocol-decoding engine for a Tire Pressure
//! Monitoring System receiver. A sub-GHz radio at 315/433 MHz reduces the
//! RF stream to pulses (level transitions with microsecond durations);
//! this crate takes it from there:
//!
//! - **Ring buffer**: lock-free pulse store written from the sampling
//!   interrupt, snapshotted by the scanner
//! - **Coherent-signal scanner**: clusters pulse durations into timing
//!   classes to locate transmissions and estimate the symbol period
//! - **Bit codecs**: NRZ-by-rate reconstruction, Manchester and both
//!   differential Manchester variants, over MSB-first bitmaps
//! - **Protocol decoders**: fourteen vehicle-specific TPMS decoders
//!   (preamble search, line-code decode, CRC, field extraction)
//! - **Sensor tracking**: deduplicated registry of seen sensors
//!
//! ## Signal Flow
//!
//! ```text
//! RF interrupt → RawSamples → SignalScanner → decode_signal → decoders
//!                                  │                              │
//!                             latched best                    FieldSet
//!                             candidate          → SensorList (by tire ID)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tpms_core::{RawSamples, SignalScanner};
//!
//! let buffer = RawSamples::new(1024);
//! // The radio worker appends pulses as they arrive...
//! for i in 0..30 {
//!     buffer.append(i % 2 == 0, 100);
//! }
//!
//! // ...and the shell periodically scans for coherent transmissions.
//! let mut scanner = SignalScanner::new(1024);
//! scanner.scan(&buffer, 50);
//! assert_eq!(scanner.best_len, 30);
//! ```
//!
//! The engine never touches the radio, the display or the filesystem, and
//! it only emits `tracing` events — the shell owns every policy around it.

pub mod bitmap;
pub mod crc;
pub mod dispatcher;
pub mod fields;
pub mod line_code;
pub mod modulation;
pub mod observe;
pub mod protocols;
pub mod raw_samples;
pub mod scanner;
pub mod sensor;
pub mod types;

pub use dispatcher::{decode_signal, MsgInfo};
pub use fields::{Field, FieldSet, FieldValue};
pub use modulation::{ModulationPreset, MODULATIONS};
pub use protocols::{ProtocolDecoder, DECODERS};
pub use raw_samples::RawSamples;
pub use scanner::{search_coherent_signal, SignalScanner};
pub use sensor::{Sensor, SensorList};
pub use types::{DecodeError, DecodeResult, Pulse};

/// Receiver constants shared with the shell.
pub mod spec {
    /// Default US TPMS carrier frequency in Hz.
    pub const DEFAULT_FREQUENCY: u32 = 315_000_000;

    /// Default ring buffer capacity in pulses.
    pub const RAW_SAMPLES_CAPACITY: usize = crate::raw_samples::DEFAULT_CAPACITY;

    /// Field names every TPMS decoder emits (the decoder/shell contract).
    pub const FIELD_TIRE_ID: &str = "Tire ID";
    pub const FIELD_PRESSURE_KPA: &str = "Pressure kpa";
    pub const FIELD_PRESSURE_PSI: &str = "Pressure psi";
    pub const FIELD_TEMPERATURE_C: &str = "Temperature C";
}
