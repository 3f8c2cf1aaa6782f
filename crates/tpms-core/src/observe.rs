//! Observability Glue
//!
//! The engine itself only emits `tracing` events; the shell decides where
//! they go. This module provides the subscriber setup the shell calls once
//! at startup, plus the atomic counters the scanner exposes for telemetry
//! (scan passes, coherent runs found, decode attempts, decode successes).
//!
//! ## Example
//!
//! ```rust,ignore
//! use tpms_core::observe::{init_logging, LogConfig, LogLevel};
//!
//! init_logging(&LogConfig { level: LogLevel::Debug, ..Default::default() });
//! tracing::info!(scans = 12, "telemetry tick");
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum level to emit. `RUST_LOG` overrides this when set.
    pub level: LogLevel,
    /// Emit compact single-line output instead of the default formatter.
    pub compact: bool,
}

/// Install the global tracing subscriber.
///
/// Safe to call more than once; subsequent calls are no-ops. The filter
/// honors `RUST_LOG` when present, otherwise falls back to the configured
/// level for this crate.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tpms_core={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.compact {
        registry.with(fmt::layer().compact()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    // Already-initialized is fine: the shell may own the subscriber.
    let _ = result;
}

/// A monotonically increasing atomic counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// Scanner instrumentation counters surfaced to the shell's telemetry.
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Scan passes over the raw buffer.
    pub scan_count: Counter,
    /// Coherent runs exceeding the minimum length.
    pub coherent_count: Counter,
    /// Dispatcher invocations.
    pub decode_try_count: Counter,
    /// Successful decodes.
    pub decode_ok_count: Counter,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot all counters as plain values.
    pub fn snapshot(&self) -> ScanStatsSnapshot {
        ScanStatsSnapshot {
            scan_count: self.scan_count.get(),
            coherent_count: self.coherent_count.get(),
            decode_try_count: self.decode_try_count.get(),
            decode_ok_count: self.decode_ok_count.get(),
        }
    }
}

/// Point-in-time copy of [`ScanStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStatsSnapshot {
    pub scan_count: u64,
    pub coherent_count: u64,
    pub decode_try_count: u64,
    pub decode_ok_count: u64,
}
