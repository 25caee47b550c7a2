//! # Smoothing Curve
//!
//! Fixed-point samples of a sigmoidal "smoothstep" curve, used to age-weight
//! the decay backlog into a single retention target.
//!
//! ```text
//!  weight
//!  1.0 ┤                                   ▄▄▄▄▄▄▄▄▄▄
//!      │                             ▄▄▀▀▀▀
//!      │                        ▄▄▀▀▀
//!      │                    ▄▄▀▀
//!      │               ▄▄▀▀▀
//!      │         ▄▄▄▀▀▀
//!  0.0 ┤▄▄▄▄▄▄▀▀▀
//!      └────────────────────────────────────────────── backlog index
//!       0 (oldest epoch)                   N-1 (newest epoch)
//! ```
//!
//! Entry `i` of a table is `h(i / N)` scaled by `2^SMOOTHSTEP_BFP`, so the
//! newest epoch is retained almost completely and the oldest not at all.
//! Tables are generated at compile time; the scheduler only ever reads them.

use static_assertions::const_assert;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of epochs a decay period is split into
pub const SMOOTHSTEP_NSTEPS: usize = 200;

/// Fractional bits of the fixed-point weights
pub const SMOOTHSTEP_BFP: u32 = 24;

/// Fixed-point representation of 1.0
pub const SMOOTHSTEP_ONE: u64 = 1 << SMOOTHSTEP_BFP;

// ============================================================================
// CURVE VARIANTS
// ============================================================================

/// Polynomial used to generate a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothstepVariant {
    /// `3x^2 - 2x^3`
    Smooth,
    /// `6x^5 - 15x^4 + 10x^3`
    Smoother,
    /// `-20x^7 + 70x^6 - 84x^5 + 35x^4`
    Smoothest,
}

/// Fixed-point `h(i / n)` rounded to nearest.
///
/// Evaluated as an exact rational with `i128` so the compile-time table has
/// no floating point in it.
const fn step(variant: SmoothstepVariant, i: i128, n: i128) -> u64 {
    let (num, den) = match variant {
        SmoothstepVariant::Smooth => (i * i * (3 * n - 2 * i), n.pow(3)),
        SmoothstepVariant::Smoother => (
            i * i * i * (10 * n * n - 15 * i * n + 6 * i * i),
            n.pow(5),
        ),
        SmoothstepVariant::Smoothest => (
            i * i * i * i * (35 * n * n * n - 84 * i * n * n + 70 * i * i * n - 20 * i * i * i),
            n.pow(7),
        ),
    };
    ((num * SMOOTHSTEP_ONE as i128 + den / 2) / den) as u64
}

// ============================================================================
// TABLE
// ============================================================================

/// A smoothing curve sampled at `SMOOTHSTEP_NSTEPS` points.
///
/// Index 0 pairs with the oldest backlog slot, index `N - 1` with the newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothstepTable {
    steps: [u64; SMOOTHSTEP_NSTEPS],
}

impl SmoothstepTable {
    /// Generate a table for the given curve
    pub const fn generate(variant: SmoothstepVariant) -> Self {
        let mut steps = [0u64; SMOOTHSTEP_NSTEPS];
        let mut i = 0;
        while i < SMOOTHSTEP_NSTEPS {
            steps[i] = step(variant, i as i128, SMOOTHSTEP_NSTEPS as i128);
            i += 1;
        }
        Self { steps }
    }

    /// Wrap a caller-supplied curve.
    ///
    /// The scheduler clamps its output to the observed page count, so an
    /// out-of-range table can only make purging lazier or more eager. Use
    /// [`SmoothstepTable::is_valid`] to check a table before injecting it.
    pub const fn from_steps(steps: [u64; SMOOTHSTEP_NSTEPS]) -> Self {
        Self { steps }
    }

    /// Weight for backlog index `i` (0 = oldest)
    #[inline]
    pub const fn get(&self, i: usize) -> u64 {
        self.steps[i]
    }

    /// Weight for an epoch `age` epochs old (0 = newest)
    #[inline]
    pub const fn weight(&self, age: usize) -> u64 {
        self.steps[SMOOTHSTEP_NSTEPS - 1 - age]
    }

    /// All weights, oldest first
    #[inline]
    pub fn as_slice(&self) -> &[u64] {
        &self.steps
    }

    /// Non-decreasing from oldest to newest and never above 1.0
    pub const fn is_valid(&self) -> bool {
        if self.steps[SMOOTHSTEP_NSTEPS - 1] > SMOOTHSTEP_ONE {
            return false;
        }
        let mut i = 1;
        while i < SMOOTHSTEP_NSTEPS {
            if self.steps[i] < self.steps[i - 1] {
                return false;
            }
            i += 1;
        }
        true
    }
}

impl Default for SmoothstepTable {
    fn default() -> Self {
        SMOOTHSTEP
    }
}

/// Default curve (5th-order smootherstep)
pub const SMOOTHSTEP: SmoothstepTable = SmoothstepTable::generate(SmoothstepVariant::Smoother);

const_assert!(SMOOTHSTEP_NSTEPS >= 2);
const_assert!(SMOOTHSTEP.is_valid());
const_assert!(SMOOTHSTEP.get(0) == 0);
// The newest epoch must decay a little, otherwise a single epoch of growth
// would never produce purgeable pages.
const_assert!(SMOOTHSTEP.get(SMOOTHSTEP_NSTEPS - 1) < SMOOTHSTEP_ONE);
const_assert!(SMOOTHSTEP.get(SMOOTHSTEP_NSTEPS - 1) > SMOOTHSTEP_ONE - SMOOTHSTEP_ONE / 1000);

// ============================================================================
// TESTS
// ============================================================================
