//! Coherent Signal Scanner
//!
//! Walks a snapshot of the raw pulse buffer looking for *coherent* runs:
//! stretches of pulses whose durations cluster into at most three timing
//! classes per level. A modulated transmission produces exactly that
//! signature — one or two symbol widths per level plus a sync width —
//! while noise scatters across durations and breaks the run quickly.
//!
//! Each coherent run longer than the minimum is handed to the dispatcher.
//! The scanner latches the most promising candidate (first decode wins,
//! otherwise the longest run seen) together with a centered copy of the
//! samples, until the shell consumes it via [`SignalScanner::take_decoded`]
//! or resets it.

use tracing::debug;

use crate::dispatcher::{decode_signal, MsgInfo};
use crate::observe::ScanStats;
use crate::raw_samples::RawSamples;

/// Timing class slots per level.
const SEARCH_CLASSES: usize = 3;
/// Pulses longer than this are dead air, not modulation.
const MAX_DURATION: u32 = 4000;
/// A run must exceed this many pulses to become a candidate.
const MIN_COHERENT_LEN: u32 = 18;

/// Absolute difference of two durations.
#[inline]
pub fn duration_delta(a: u32, b: u32) -> u32 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Measure the coherent run starting at relative index `idx`.
///
/// Pulses are accepted while they fit an existing timing class for their
/// level (within 20% of the running mean, which is then updated as a
/// count-weighted mean) or an empty class slot remains. A pulse outside
/// `min_duration..=4000` us or beyond the third class ends the run.
///
/// Also derives the short-pulse duration estimate: per level, the smallest
/// class mean backed by at least 3 pulses; a level with no reliable class
/// borrows the other's; the buffer's `short_pulse_dur` becomes the mean of
/// the two.
///
/// Returns the run length in pulses.
pub fn search_coherent_signal(s: &mut RawSamples, idx: u32, min_duration: u32) -> u32 {
    #[derive(Clone, Copy, Default)]
    struct Class {
        dur: [u32; 2],
        count: [u32; 2],
    }
    let mut classes = [Class::default(); SEARCH_CLASSES];
    let mut len = 0u32;
    s.short_pulse_dur = 0;

    for j in idx..idx + s.capacity() as u32 {
        let pulse = s.get(j as i64);
        if pulse.duration < min_duration || pulse.duration > MAX_DURATION {
            break;
        }

        let level = pulse.level as usize;
        let mut k = 0;
        while k < SEARCH_CLASSES {
            let class = &mut classes[k];
            if class.count[level] == 0 {
                class.dur[level] = pulse.duration;
                class.count[level] = 1;
                break;
            }
            let avg = class.dur[level];
            let count = class.count[level];
            if duration_delta(pulse.duration, avg) < avg / 5 {
                class.dur[level] = (avg * count + pulse.duration) / (count + 1);
                class.count[level] += 1;
                break;
            }
            k += 1;
        }
        if k == SEARCH_CLASSES {
            break;
        }
        len += 1;
    }

    let mut short_dur = [0u32; 2];
    for class in &classes {
        for level in 0..2 {
            if class.dur[level] == 0 || class.count[level] < 3 {
                continue;
            }
            if short_dur[level] == 0 || short_dur[level] > class.dur[level] {
                short_dur[level] = class.dur[level];
            }
        }
    }
    if short_dur[0] == 0 {
        short_dur[0] = short_dur[1];
    }
    if short_dur[1] == 0 {
        short_dur[1] = short_dur[0];
    }
    s.short_pulse_dur = (short_dur[0] + short_dur[1]) / 2;

    len
}

/// Scanner state: the latched best candidate plus telemetry counters.
pub struct SignalScanner {
    /// Length in pulses of the latched run.
    pub best_len: u32,
    /// Whether the latched run decoded successfully.
    pub decoded: bool,
    /// Message info of the latched run.
    pub msg_info: Option<MsgInfo>,
    /// Centered sample copy of the latched run.
    pub detected: RawSamples,
    /// Instrumentation counters.
    pub stats: ScanStats,
    /// Source head position at the previous scan, for the refill gate.
    last_scan_head: usize,
}

impl SignalScanner {
    /// Create a scanner for sources of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            best_len: 0,
            decoded: false,
            msg_info: None,
            detected: RawSamples::new(capacity),
            stats: ScanStats::new(),
            last_scan_head: 0,
        }
    }

    /// Whether the source buffer has refilled enough (half its capacity)
    /// since the previous scan to make another pass worthwhile.
    pub fn should_scan(&self, source: &RawSamples) -> bool {
        let head = source.head();
        let delta = if self.last_scan_head <= head {
            head - self.last_scan_head
        } else {
            source.capacity() - self.last_scan_head + head
        };
        delta >= source.capacity() / 2
    }

    /// Scan a snapshot of `source` for coherent runs and try to decode each
    /// one. `min_duration` comes from the active modulation preset and
    /// filters sub-threshold glitches.
    ///
    /// The latched candidate is replaced only while the previous one has
    /// not decoded, and only by a longer run or by one that decodes.
    pub fn scan(&mut self, source: &RawSamples, min_duration: u32) {
        let mut copy = source.snapshot();
        self.last_scan_head = source.head();
        self.stats.scan_count.inc();

        let capacity = copy.capacity();
        let mut i = 0u32;
        while (i as usize) < capacity - 1 {
            let thislen = search_coherent_signal(&mut copy, i, min_duration);

            if thislen > MIN_COHERENT_LEN {
                self.stats.coherent_count.inc();
                debug!(
                    len = thislen,
                    short_pulse_us = copy.short_pulse_dur,
                    "coherent run"
                );

                let mut info = MsgInfo::new();
                info.short_pulse_dur = copy.short_pulse_dur;

                copy.center(i as usize);
                self.stats.decode_try_count.inc();
                let decoded = decode_signal(&copy, thislen as u64, &mut info);
                if decoded {
                    self.stats.decode_ok_count.inc();
                }
                // Undo the centering so `i` keeps addressing the snapshot.
                copy.center(capacity - i as usize % capacity);

                let old_not_decoded = !self.decoded;
                if old_not_decoded && (thislen > self.best_len || decoded) {
                    self.msg_info = Some(info);
                    self.best_len = thislen;
                    self.decoded = decoded;
                    self.detected.copy_from(&copy);
                    self.detected.center(i as usize);
                    debug!(
                        samples = thislen,
                        short_pulse_us = self.detected.short_pulse_dur,
                        decoded,
                        "signal updated"
                    );
                }
            }
            i += thislen.max(1);
        }
    }

    /// Consume the latched message if it decoded, resetting the detection
    /// state for the next signal. The raw source buffer is untouched.
    pub fn take_decoded(&mut self) -> Option<MsgInfo> {
        if !self.decoded {
            return None;
        }
        self.best_len = 0;
        self.decoded = false;
        self.detected.reset();
        self.msg_info.take()
    }

    /// Drop the current signal entirely: latched state, detected samples
    /// and the raw source buffer.
    pub fn reset_current_signal(&mut self, source: &RawSamples) {
        self.best_len = 0;
        self.decoded = false;
        self.msg_info = None;
        self.detected.reset();
        source.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Append a coherent alternating run of `n` pulses of `dur` us.
    fn append_run(buf: &RawSamples, n: u32, dur: u32) {
        for i in 0..n {
            buf.append(i % 2 == 0, dur);
        }
    }

    #[test]
    fn test_duration_delta() {
        assert_eq!(duration_delta(100, 120), 20);
        assert_eq!(duration_delta(120, 100), 20);
        assert_eq!(duration_delta(7, 7), 0);
    }

    #[test]
    fn test_search_rejects_out_of_range() {
        let buf = RawSamples::new(64);
        buf.append(true, 100);
        buf.append(false, 4500); // over the 4000 us ceiling
        buf.append(true, 100);
        let mut copy = buf.snapshot();
        copy.center(64 - 3);
        assert_eq!(search_coherent_signal(&mut copy, 0, 50), 1);
    }

    #[test]
    fn test_search_class_means() {
        let buf = RawSamples::new(64);
        // Two timing classes per level: ~100 and ~200 us.
        for _ in 0..5 {
            buf.append(true, 100);
            buf.append(false, 100);
            buf.append(true, 200);
            buf.append(false, 200);
        }
        let mut copy = buf.snapshot();
        copy.center(64 - 20);
        let len = search_coherent_signal(&mut copy, 0, 50);
        assert_eq!(len, 20);
        // Smallest reliable class on both levels is 100 us.
        assert_eq!(copy.short_pulse_dur, 100);
    }

    #[test]
    fn test_search_borrows_missing_level() {
        let buf = RawSamples::new(64);
        // Level 1 has a reliable 100 us class; level 0 pulses never reach
        // count >= 3 in any single class.
        buf.append(true, 100);
        buf.append(false, 300);
        buf.append(true, 100);
        buf.append(false, 600);
        buf.append(true, 100);
        buf.append(false, 900);
        buf.append(true, 100);
        let mut copy = buf.snapshot();
        copy.center(64 - 7);
        let len = search_coherent_signal(&mut copy, 0, 50);
        assert_eq!(len, 7);
        assert_eq!(copy.short_pulse_dur, 100);
    }

    #[test]
    fn test_search_stops_at_fourth_class() {
        let buf = RawSamples::new(64);
        // Four incompatible duration classes on the same level.
        for dur in [100, 300, 900, 2700] {
            buf.append(true, dur);
            buf.append(true, dur);
        }
        let mut copy = buf.snapshot();
        copy.center(64 - 8);
        assert_eq!(search_coherent_signal(&mut copy, 0, 50), 6);
    }

    #[test]
    fn test_short_run_emits_no_candidate() {
        let buf = RawSamples::new(256);
        append_run(&buf, 18, 100); // exactly the minimum, not above it
        let mut scanner = SignalScanner::new(256);
        scanner.scan(&buf, 50);
        assert_eq!(scanner.best_len, 0);
        assert!(scanner.msg_info.is_none());
        assert_eq!(scanner.stats.coherent_count.get(), 0);
    }

    #[test]
    fn test_coherent_run_latches_candidate() {
        let buf = RawSamples::new(256);
        append_run(&buf, 30, 100);
        let mut scanner = SignalScanner::new(256);
        scanner.scan(&buf, 50);

        assert_eq!(scanner.best_len, 30);
        assert!(!scanner.decoded);
        let info = scanner.msg_info.as_ref().unwrap();
        // Short pulse estimate lies strictly between the filter and ceiling.
        assert!(info.short_pulse_dur > 50 && info.short_pulse_dur < 4000);
        assert_eq!(info.short_pulse_dur, 100);
        assert!(scanner.stats.coherent_count.get() >= 1);
        assert_eq!(scanner.stats.decode_ok_count.get(), 0);
        // Not decoded: nothing to take.
        assert!(scanner.take_decoded().is_none());
    }

    #[test]
    fn test_longer_run_replaces_latched() {
        let buf = RawSamples::new(512);
        append_run(&buf, 25, 100);
        buf.append(true, 5000); // incoherent separator
        append_run(&buf, 40, 150);
        let mut scanner = SignalScanner::new(512);
        scanner.scan(&buf, 50);
        assert_eq!(scanner.best_len, 40);
        assert_eq!(scanner.msg_info.as_ref().unwrap().short_pulse_dur, 150);
    }

    #[test]
    fn test_shorter_run_does_not_replace() {
        let buf = RawSamples::new(512);
        append_run(&buf, 40, 150);
        buf.append(true, 5000);
        append_run(&buf, 25, 100);
        let mut scanner = SignalScanner::new(512);
        scanner.scan(&buf, 50);
        assert_eq!(scanner.best_len, 40);
        assert_eq!(scanner.msg_info.as_ref().unwrap().short_pulse_dur, 150);
    }

    #[test]
    fn test_detected_samples_centered_on_run() {
        let buf = RawSamples::new(256);
        append_run(&buf, 30, 120);
        let mut scanner = SignalScanner::new(256);
        scanner.scan(&buf, 50);
        // Index 0 of the detected copy is the start of the latched run.
        let first = scanner.detected.get(0);
        assert_eq!(first.duration, 120);
    }

    #[test]
    fn test_reset_current_signal() {
        let buf = RawSamples::new(256);
        append_run(&buf, 30, 100);
        let mut scanner = SignalScanner::new(256);
        scanner.scan(&buf, 50);
        assert!(scanner.msg_info.is_some());

        scanner.reset_current_signal(&buf);
        assert_eq!(scanner.best_len, 0);
        assert!(scanner.msg_info.is_none());
        assert_eq!(buf.get(-1).duration, 0);
    }

    #[test]
    fn test_should_scan_gate() {
        let buf = RawSamples::new(64);
        let mut scanner = SignalScanner::new(64);
        // Empty buffer: head has not moved since construction.
        assert!(!scanner.should_scan(&buf));
        for _ in 0..32 {
            buf.append(true, 100);
        }
        assert!(scanner.should_scan(&buf));
        scanner.scan(&buf, 50);
        // Right after a scan the buffer has not refilled.
        assert!(!scanner.should_scan(&buf));
    }
}
