//! Modulation Presets
//!
//! The radio front-end cycles through a small set of demodulator
//! configurations, since TPMS sensors split between OOK and two FSK
//! deviations. The preset itself (registers, deviation, bandwidth) is
//! opaque to this engine — only the per-preset glitch filter threshold
//! enters the scanner, as its `min_duration`.
//!
//! The cycling *policy* (when to advance) belongs to the shell;
//! [`next_tpms_preset`] just answers "which one is next".

use serde::{Deserialize, Serialize};

/// A named demodulator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulationPreset {
    /// Display name. TPMS-focused presets contain "TPMS".
    pub name: &'static str,
    /// Stable identifier for configuration files.
    pub id: &'static str,
    /// Pulses shorter than this many microseconds are glitches under this
    /// preset and are rejected by the scanner.
    pub duration_filter: u32,
}

/// Preset table, in cycling order.
pub static MODULATIONS: &[ModulationPreset] = &[
    ModulationPreset {
        name: "TPMS 1 (FSK 19k)",
        id: "TPMS1",
        duration_filter: 10,
    },
    ModulationPreset {
        name: "TPMS 2 (FSK 47k)",
        id: "TPMS2",
        duration_filter: 15,
    },
    ModulationPreset {
        name: "TPMS 3 (OOK 650k)",
        id: "TPMS3",
        duration_filter: 30,
    },
    ModulationPreset {
        name: "OOK 270k",
        id: "OOK270",
        duration_filter: 30,
    },
    ModulationPreset {
        name: "2FSK 2.38k",
        id: "FSK238",
        duration_filter: 15,
    },
];

/// Index of the first TPMS preset, the startup default.
pub fn default_tpms_preset() -> usize {
    MODULATIONS
        .iter()
        .position(|m| m.name.contains("TPMS"))
        .unwrap_or(0)
}

/// Next TPMS preset after `current`, wrapping around the table. Returns
/// `current` when no other TPMS preset exists.
pub fn next_tpms_preset(current: usize) -> usize {
    let n = MODULATIONS.len();
    let mut idx = current;
    loop {
        idx = (idx + 1) % n;
        if idx == current {
            return current;
        }
        if MODULATIONS[idx].name.contains("TPMS") {
            return idx;
        }
    }
}
