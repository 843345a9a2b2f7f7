#![forbid(unsafe_code)]

//! Injectable random sources for the arrangement engine.
//!
//! Arrangement never reaches for a global RNG: every shuffling entry point
//! takes a [`RandomSource`] so tests can pin the exact output with a seeded
//! generator while production callers get fresh draws per catalog load.
//!
//! Two sources are provided:
//!
//! - [`SplitMix`] — deterministic splitmix64 generator, seeded explicitly.
//! - [`EntropyRng`] — production default; seeds a [`SplitMix`] from the
//!   system clock and a per-process stream counter so that consecutive
//!   loads differ even within the same clock tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stream counter mixed into [`EntropyRng`] seeds.
static NEXT_STREAM: AtomicU64 = AtomicU64::new(0);

// ---------------------------------------------------------------------------
// RandomSource
// ---------------------------------------------------------------------------

/// A stream of uniform random `u64` values.
///
/// Implementors only supply [`next_u64`](RandomSource::next_u64); the
/// bounded helper is derived and shared by every source.
pub trait RandomSource {
    /// Produce the next raw 64-bit draw.
    fn next_u64(&mut self) -> u64;

    /// Produce a uniform value in `[0, bound)`.
    ///
    /// Draws below `threshold` are rejected, which keeps the residue
    /// uniform over the full range; without it, `% bound` over-weights
    /// small residues. `bound` of 0 or 1 yields 0.
    fn next_below(&mut self, bound: u64) -> u64 {
        if bound <= 1 {
            return 0;
        }
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let v = self.next_u64();
            if v >= threshold {
                return v % bound;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SplitMix
// ---------------------------------------------------------------------------

/// Deterministic splitmix64 generator.
///
/// Same seed, same sequence. Used directly by tests and by callers that
/// want a reproducible arrangement; [`EntropyRng`] wraps it for everyone
/// else.
#[derive(Debug, Clone)]
pub struct SplitMix {
    state: u64,
}

impl SplitMix {
    /// Create a generator from an explicit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl RandomSource for SplitMix {
    fn next_u64(&mut self) -> u64 {
        // splitmix64: Weyl step, then two multiply-xorshift rounds.
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

// ---------------------------------------------------------------------------
// EntropyRng
// ---------------------------------------------------------------------------

/// Default production source: a [`SplitMix`] seeded from wall-clock nanos
/// mixed with a per-process stream counter.
///
/// Two instances created back-to-back get distinct seeds even when the
/// clock has not advanced between them.
#[derive(Debug, Clone)]
pub struct EntropyRng {
    inner: SplitMix,
}

impl EntropyRng {
    /// Create a freshly-seeded source.
    #[must_use]
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let stream = NEXT_STREAM.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: SplitMix::new(nanos ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        }
    }
}

impl Default for EntropyRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRng {
    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
