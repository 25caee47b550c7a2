//! # Monotonic Time
//!
//! Nanosecond-resolution instants and durations used by the decay
//! scheduler. The decay code never reads a clock itself; callers pass the
//! current instant in, so `Nstime` only needs arithmetic and ordering.

use core::fmt;
use core::ops::{Add, Sub};

/// Nanoseconds per second
pub const NSEC_PER_SEC: u64 = 1_000_000_000;

/// Nanoseconds per millisecond
pub const NSEC_PER_MSEC: u64 = 1_000_000;

/// Monotonic time value in nanoseconds.
///
/// Used both as an instant (time since an arbitrary origin) and as a
/// duration, the same way the allocator's time type is. Arithmetic
/// saturates instead of wrapping.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Nstime(u64);

impl Nstime {
    /// Zero time (the default epoch baseline)
    pub const ZERO: Self = Self(0);

    /// Largest representable time
    pub const MAX: Self = Self(u64::MAX);

    /// Create from nanoseconds
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Create from milliseconds, saturating on overflow
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(NSEC_PER_MSEC))
    }

    /// Create from seconds, saturating on overflow
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(NSEC_PER_SEC))
    }

    /// Get raw nanosecond value
    #[inline]
    pub const fn ns(self) -> u64 {
        self.0
    }

    /// Get whole milliseconds
    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.0 / NSEC_PER_MSEC
    }

    /// Check if zero
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Saturating addition
    #[inline]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction
    #[inline]
    pub const fn subtract(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Multiply by an integer, saturating on overflow
    #[inline]
    pub const fn imultiply(self, factor: u64) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// Divide by an integer
    ///
    /// Division by zero yields zero.
    #[inline]
    pub const fn idivide(self, divisor: u64) -> Self {
        match self.0.checked_div(divisor) {
            Some(v) => Self(v),
            None => Self(0),
        }
    }

    /// How many whole `divisor` spans fit in `self`
    ///
    /// Returns zero for a zero divisor.
    #[inline]
    pub const fn divide(self, divisor: Self) -> u64 {
        match self.0.checked_div(divisor.0) {
            Some(v) => v,
            None => 0,
        }
    }
}

impl fmt::Debug for Nstime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nstime({}.{:09}s)",
            self.0 / NSEC_PER_SEC,
            self.0 % NSEC_PER_SEC
        )
    }
}

impl fmt::Display for Nstime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < NSEC_PER_MSEC {
            write!(f, "{}ns", self.0)
        } else {
            write!(f, "{}ms", self.as_millis())
        }
    }
}

impl Add for Nstime {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sub for Nstime {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.subtract(rhs)
    }
}

// ============================================================================
// TESTS
// ============================================================================
