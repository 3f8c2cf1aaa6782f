//! Raw Sample Ring Buffer
//!
//! A fixed-capacity circular store of RF pulses written by the radio's
//! sampling interrupt and read by the coherent-signal scanner. The producer
//! only ever appends; old samples are silently overwritten. The consumer
//! takes a snapshot before analysis, so it never races the producer over a
//! region it is actively reading.
//!
//! ## Memory Ordering
//!
//! Single producer, single consumer, no locks:
//! - Producer: Relaxed store of the packed pulse word, then Release store
//!   of the head cursor.
//! - Consumer: Acquire load of the head cursor in [`RawSamples::copy_from`],
//!   then Relaxed loads of the pulse words.
//!
//! This ensures every pulse published before a head value is visible to a
//! snapshot that observed that head value. A pulse overwritten mid-snapshot
//! is read as whichever packed word won the race, never as a torn value.
//!
//! ## Indexing
//!
//! [`RawSamples::get`] interprets its index relative to the head and reduces
//! it modulo the capacity, so `get(-1)` is the most recently appended pulse
//! and any `i64` index is legal. [`RawSamples::center`] rotates the logical
//! origin so a region of interest sits near index zero.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::types::Pulse;

/// Default ring capacity in pulses.
pub const DEFAULT_CAPACITY: usize = 32768;

/// Packed pulse word: level in bit 31, duration in the low 31 bits.
const LEVEL_BIT: u32 = 1 << 31;
const DURATION_MASK: u32 = LEVEL_BIT - 1;

#[inline]
fn pack(level: bool, duration: u32) -> u32 {
    let d = duration.min(DURATION_MASK);
    if level {
        d | LEVEL_BIT
    } else {
        d
    }
}

#[inline]
fn unpack(word: u32) -> Pulse {
    Pulse {
        level: word & LEVEL_BIT != 0,
        duration: word & DURATION_MASK,
    }
}

/// Circular pulse buffer shared between the sampling worker and the scanner.
pub struct RawSamples {
    /// Packed pulse words.
    samples: Box<[AtomicU32]>,
    /// Write cursor, always kept in `0..capacity`.
    head: AtomicUsize,
    /// Estimated symbol period in microseconds of the best candidate found
    /// in this buffer. Scratch field written by the scanner on its working
    /// copies; stays zero on the shared producer buffer.
    pub short_pulse_dur: u32,
}

impl RawSamples {
    /// Create a buffer holding `capacity` pulses, all zeroed.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be non-zero");
        let samples: Vec<AtomicU32> = (0..capacity).map(|_| AtomicU32::new(0)).collect();
        Self {
            samples: samples.into_boxed_slice(),
            head: AtomicUsize::new(0),
            short_pulse_dur: 0,
        }
    }

    /// Capacity in pulses.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Current head position (next write slot).
    #[inline]
    pub fn head(&self) -> usize {
        self.head.load(Ordering::Acquire)
    }

    /// Zero all pulses and the head cursor.
    pub fn reset(&self) {
        for slot in self.samples.iter() {
            slot.store(0, Ordering::Relaxed);
        }
        self.head.store(0, Ordering::Release);
    }

    /// Append a pulse at the head, overwriting the oldest sample.
    ///
    /// Safe to call from the radio interrupt through a shared reference;
    /// the paired Release store publishes the pulse to [`copy_from`].
    ///
    /// [`copy_from`]: RawSamples::copy_from
    pub fn append(&self, level: bool, duration: u32) {
        let head = self.head.load(Ordering::Relaxed);
        self.samples[head].store(pack(level, duration), Ordering::Relaxed);
        let next = if head + 1 == self.capacity() { 0 } else { head + 1 };
        self.head.store(next, Ordering::Release);
    }

    /// Read the pulse at position `idx` relative to the head.
    ///
    /// The index is reduced modulo the capacity, so negative values address
    /// the most recent pulses: `get(-1)` is the last append. Reads of slots
    /// never written return a zero pulse.
    #[inline]
    pub fn get(&self, idx: i64) -> Pulse {
        let cap = self.capacity() as i64;
        let head = self.head.load(Ordering::Relaxed) as i64;
        let pos = (head + idx).rem_euclid(cap) as usize;
        unpack(self.samples[pos].load(Ordering::Relaxed))
    }

    /// Snapshot `src` into `self`: pulses, head and short-pulse estimate.
    ///
    /// Performs the Acquire load that pairs with the producer's Release
    /// publication, then copies slots with Relaxed loads. Pulses overwritten
    /// while the copy runs show up as their newer value, which the scanner
    /// tolerates.
    ///
    /// # Panics
    /// Panics if the capacities differ.
    pub fn copy_from(&mut self, src: &RawSamples) {
        assert_eq!(
            self.capacity(),
            src.capacity(),
            "snapshot requires equal capacities"
        );
        let head = src.head.load(Ordering::Acquire);
        for (dst, s) in self.samples.iter().zip(src.samples.iter()) {
            dst.store(s.load(Ordering::Relaxed), Ordering::Relaxed);
        }
        self.head.store(head, Ordering::Relaxed);
        self.short_pulse_dur = src.short_pulse_dur;
    }

    /// Allocate a fresh snapshot of this buffer.
    pub fn snapshot(&self) -> RawSamples {
        let mut copy = RawSamples::new(self.capacity());
        copy.copy_from(self);
        copy
    }

    /// Rotate the logical origin so that the pulse currently at relative
    /// index `offset` becomes index zero. Used by the scanner to position a
    /// candidate run near the start of the decode window.
    pub fn center(&mut self, offset: usize) {
        let head = self.head.load(Ordering::Relaxed);
        self.head
            .store((head + offset) % self.capacity(), Ordering::Relaxed);
    }
}

impl Default for RawSamples {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
