//! # Deadline Jitter
//!
//! Each decay scheduler draws a random offset in `[0, interval)` every time
//! its epoch advances and adds it to the next deadline. Arenas created at
//! the same instant with the same decay time therefore drift apart instead
//! of purging in lockstep.
//!
//! The generator is a 64-bit LCG. It is fast and deterministic for a given
//! seed, which is all decorrelation needs; it is not suitable for anything
//! security related.

use core::sync::atomic::{AtomicU64, Ordering};

/// LCG multiplier (Knuth MMIX)
const LCG_MUL: u64 = 6364136223846793005;

/// LCG increment (Knuth MMIX)
const LCG_INC: u64 = 1442695040888963407;

// ============================================================================
// GENERATOR
// ============================================================================

/// Deadline randomness generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Jitter {
    state: u64,
}

impl Jitter {
    /// Create a generator from a seed
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Create a generator seeded by [`entropy_seed`]
    pub fn from_entropy(salt: u64) -> Self {
        Self::new(entropy_seed(salt))
    }

    /// Raw generator state
    pub const fn state(&self) -> u64 {
        self.state
    }

    #[inline]
    const fn next_state(state: u64) -> u64 {
        state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC)
    }

    /// Advance once and return the top `lg_range` bits.
    ///
    /// The low bits of an LCG have short periods, so samples always come
    /// from the high end of the state.
    #[inline]
    const fn lg_range(self, lg_range: u32) -> (Self, u64) {
        let state = Self::next_state(self.state);
        let sample = if lg_range == 0 { 0 } else { state >> (64 - lg_range) };
        (Self { state }, sample)
    }

    /// Advance the generator and draw a uniform sample in `[0, range)`.
    ///
    /// Pure: the receiver is consumed and the successor state returned with
    /// the sample. A `range` of 0 or 1 yields 0 without advancing.
    pub const fn advance_and_sample(self, range: u64) -> (Self, u64) {
        if range <= 1 {
            return (self, 0);
        }
        // ceil(log2(range)), so rejection discards less than half the draws
        let lg = 64 - (range - 1).leading_zeros();
        let mut jitter = self;
        loop {
            let (next, sample) = jitter.lg_range(lg);
            jitter = next;
            if sample < range {
                return (jitter, sample);
            }
        }
    }

    /// In-place form of [`Jitter::advance_and_sample`]
    #[inline]
    pub fn sample(&mut self, range: u64) -> u64 {
        let (next, sample) = self.advance_and_sample(range);
        *self = next;
        sample
    }
}

// ============================================================================
// SEEDING
// ============================================================================

/// Instances seeded so far; keeps seeds distinct when the other inputs
/// collide (same address reused, no timestamp counter).
static SEED_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Read the CPU timestamp counter, or 0 where none is available
#[inline]
fn timestamp_counter() -> u64 {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "x86_64")] {
            // SAFETY: RDTSC has no side effects and is available on every
            // x86_64 CPU.
            unsafe { core::arch::x86_64::_rdtsc() }
        } else {
            0
        }
    }
}

/// Avalanche mix (MurmurHash3 finalizer)
#[inline]
const fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51AFD7ED558CCD);
    x ^= x >> 33;
    x = x.wrapping_mul(0xC4CEB9FE1A85EC53);
    x ^= x >> 33;
    x
}

/// Derive a jitter seed.
///
/// `salt` should identify the instance (its address is a good choice). It
/// is combined with a process-wide sequence number and the timestamp
/// counter, then mixed.
pub fn entropy_seed(salt: u64) -> u64 {
    let sequence = SEED_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let mut state = mix64(salt ^ 0x853c49e6748fea9b);
    state = mix64(state ^ sequence.wrapping_mul(LCG_MUL));
    mix64(state ^ timestamp_counter())
}

// ============================================================================
// TESTS
// ============================================================================
