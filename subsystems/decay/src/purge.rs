//! # Purge Driver
//!
//! Glue between a [`Decay`] scheduler and the allocator that owns the pages.
//! The allocator is seen only through [`PageSource`]: how many decay-eligible
//! pages it holds, and a way to release some of them.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::decay::Decay;
use crate::time::Nstime;

// ============================================================================
// PAGE SOURCE
// ============================================================================

/// Holder of decay-eligible pages
pub trait PageSource {
    /// Pages currently eligible for purging
    fn npages(&self) -> usize;

    /// Release up to `npages` pages to the OS, returning how many were
    /// actually released.
    fn purge(&mut self, npages: usize) -> usize;
}

/// When a purge pass is allowed to release pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeEagerness {
    /// Only when an epoch advance reports pages above the limit
    OnEpochAdvance,
    /// Whenever pages are above the limit
    Force,
}

/// Result of a purge pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Nothing to release
    Idle,
    /// Another purge is already in flight for this scheduler
    Busy,
    /// Pages were released
    Purged {
        /// Pages actually released
        npages: usize,
    },
}

impl PurgeOutcome {
    /// Pages released by this pass
    pub fn npurged(&self) -> usize {
        match self {
            Self::Purged { npages } => *npages,
            _ => 0,
        }
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Purge counters. Updated with relaxed atomics; readers may see a pass
/// partially accounted.
#[derive(Debug, Default)]
pub struct DecayStats {
    npurge: AtomicU64,
    nmadvise: AtomicU64,
    purged: AtomicU64,
}

/// Point-in-time copy of [`DecayStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecayStatsSnapshot {
    /// Purge passes
    pub npurge: u64,
    /// Release calls issued to the page source
    pub nmadvise: u64,
    /// Pages released
    pub purged: u64,
}

impl DecayStats {
    /// Zeroed counters
    pub const fn new() -> Self {
        Self {
            npurge: AtomicU64::new(0),
            nmadvise: AtomicU64::new(0),
            purged: AtomicU64::new(0),
        }
    }

    /// Account one purge pass
    pub fn record_purge(&self, nmadvise: u64, npages: usize) {
        self.npurge.fetch_add(1, Ordering::Relaxed);
        self.nmadvise.fetch_add(nmadvise, Ordering::Relaxed);
        self.purged.fetch_add(npages as u64, Ordering::Relaxed);
    }

    /// Copy the counters
    pub fn snapshot(&self) -> DecayStatsSnapshot {
        DecayStatsSnapshot {
            npurge: self.npurge.load(Ordering::Relaxed),
            nmadvise: self.nmadvise.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// DRIVER
// ============================================================================

impl Decay {
    /// Pages to release after an advance attempt, given whether the advance
    /// reported excess pages.
    pub(crate) fn purge_target(
        &self,
        current_npages: usize,
        over_limit: bool,
        eagerness: PurgeEagerness,
    ) -> usize {
        if self.disabled() {
            return 0;
        }
        if eagerness == PurgeEagerness::OnEpochAdvance && !over_limit {
            return 0;
        }
        let limit = if self.immediately() { 0 } else { self.npages_limit() };
        current_npages.saturating_sub(limit)
    }

    /// Advance the epoch and purge down to the limit.
    ///
    /// Single-threaded driver: the caller owns both the scheduler and the
    /// page source. Use [`crate::SyncDecay::decay_and_purge`] when the
    /// scheduler is shared.
    pub fn try_purge<P: PageSource>(
        &mut self,
        now: Nstime,
        pages: &mut P,
        eagerness: PurgeEagerness,
        stats: &DecayStats,
    ) -> PurgeOutcome {
        let current = pages.npages();
        let over_limit = self.maybe_advance_epoch(now, current);
        let npurge = self.purge_target(current, over_limit, eagerness);
        if npurge == 0 {
            return PurgeOutcome::Idle;
        }

        let purged = pages.purge(npurge);
        stats.record_purge(1, purged);
        log::trace!("decay: purged {}/{} pages", purged, npurge);
        PurgeOutcome::Purged { npages: purged }
    }
}

// ============================================================================
// TESTS
// ============================================================================
