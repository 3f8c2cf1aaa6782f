//! TPMS Protocol Decoders
//!
//! One decoder per sensor family. Every decoder follows the same shape:
//! quick length precheck, preamble search, line-code decode into a fixed
//! buffer, CRC / checksum validation, field extraction. A decoder that
//! rejects a candidate has no side effects beyond its own stack buffers —
//! it touches the shared [`MsgInfo`] only on the success path.
//!
//! [`DECODERS`] fixes the dispatch order. Order is a contract: a more
//! specific decoder (PMV-107J) is listed before the generic ones that could
//! partially match the same bit stream, and the six decoders covering the
//! common US-market sensors come first.

use crate::dispatcher::MsgInfo;
use crate::types::DecodeResult;

mod bmw;
mod bmw_gen3;
mod citroen;
mod elantra2012;
mod ford;
mod gm;
mod hyundai_kia;
mod pmv107j;
mod porsche;
mod renault;
mod schrader;
mod schrader_eg53ma4;
mod schrader_smd3ma4;
mod toyota;

pub use bmw::BmwGen45;
pub use bmw_gen3::BmwGen23;
pub use citroen::Citroen;
pub use elantra2012::Elantra2012;
pub use ford::Ford;
pub use gm::GmAftermarket;
pub use hyundai_kia::HyundaiKia;
pub use pmv107j::Pmv107j;
pub use porsche::Porsche987;
pub use renault::Renault;
pub use schrader::SchraderGen1;
pub use schrader_eg53ma4::SchraderEg53ma4;
pub use schrader_smd3ma4::SchraderSmd3ma4;
pub use toyota::ToyotaEu;

/// A vehicle-specific TPMS frame decoder.
pub trait ProtocolDecoder: Send + Sync {
    /// Decoder name as shown to the user and stored per sensor.
    fn name(&self) -> &'static str;

    /// Try to decode a frame from the widened candidate bitmap.
    ///
    /// `bits` is the working bitmap, `num_bits` the number of sampled bits
    /// in it. On success the decoder fills `info`'s fields, `start_off` and
    /// `pulses_count`; on failure it must leave `info` untouched.
    fn decode(&self, bits: &[u8], num_bits: u32, info: &mut MsgInfo) -> DecodeResult<()>;
}

/// Decoder registry in dispatch order.
pub static DECODERS: &[&dyn ProtocolDecoder] = &[
    &Pmv107j,         // Toyota Highlander, Camry, Lexus (US).
    &Elantra2012,     // Hyundai Elantra 2012 / Honda Civic.
    &BmwGen45,        // BMW Gen4/5 and Audi.
    &BmwGen23,        // BMW Gen2/Gen3.
    &Porsche987,      // Porsche Boxster/Cayman.
    &SchraderSmd3ma4, // Schrader SMD3MA4 (Subaru, Nissan, etc).
    &Renault,
    &ToyotaEu,
    &SchraderGen1,
    &SchraderEg53ma4,
    &Citroen,
    &Ford,
    &HyundaiKia,
    &GmAftermarket,
];
