//! # Shared Scheduler
//!
//! [`SyncDecay`] wraps a [`Decay`] in a spinlock for allocators that share
//! one scheduler between threads. The lock is held for bookkeeping only;
//! releasing pages happens with the lock dropped, guarded by the scheduler's
//! `purging` flag so at most one purge runs at a time.
//!
//! The lock-free decay time copy is refreshed whenever a [`SyncDecayGuard`]
//! is dropped, so a `reinit` through [`SyncDecay::lock`] is visible to
//! [`SyncDecay::ms_read`] once the guard goes away.

use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicI64, Ordering};

use spin::{Mutex, MutexGuard};

use crate::config::{validate_decay_ms, DecayConfig};
use crate::decay::Decay;
use crate::error::DecayResult;
use crate::purge::{DecayStats, PageSource, PurgeEagerness, PurgeOutcome};
use crate::time::Nstime;

/// Lock-protected decay scheduler
#[derive(Debug)]
pub struct SyncDecay {
    /// Copy of the decay time readable without the lock
    time_ms: AtomicI64,
    inner: Mutex<Decay>,
    stats: DecayStats,
}

impl SyncDecay {
    /// Create from a configuration
    pub fn new(config: DecayConfig) -> DecayResult<Self> {
        let decay = Decay::with_config(config)?;
        Ok(Self {
            time_ms: AtomicI64::new(decay.ms_read()),
            inner: Mutex::new(decay),
            stats: DecayStats::new(),
        })
    }

    /// Configured decay time, without taking the lock
    #[inline]
    pub fn ms_read(&self) -> i64 {
        self.time_ms.load(Ordering::Relaxed)
    }

    /// Lock the scheduler
    pub fn lock(&self) -> SyncDecayGuard<'_> {
        SyncDecayGuard {
            decay: self.inner.lock(),
            time_ms: &self.time_ms,
        }
    }

    /// Purge counters
    pub fn stats(&self) -> &DecayStats {
        &self.stats
    }

    /// Validate and apply a new decay time
    pub fn reinit(&self, decay_ms: i64) -> DecayResult<()> {
        let decay_ms = validate_decay_ms(decay_ms)?;
        self.lock().reinit(decay_ms);
        Ok(())
    }

    /// Advance the epoch and purge down to the limit.
    ///
    /// Returns [`PurgeOutcome::Busy`] without touching the scheduler if
    /// another thread is already purging. The lock is not held while
    /// `pages` releases memory.
    pub fn decay_and_purge<P: PageSource>(
        &self,
        now: Nstime,
        pages: &mut P,
        eagerness: PurgeEagerness,
    ) -> PurgeOutcome {
        let npurge = {
            let mut decay = self.inner.lock();
            if decay.purging() {
                return PurgeOutcome::Busy;
            }
            let current = pages.npages();
            let over_limit = decay.maybe_advance_epoch(now, current);
            let npurge = decay.purge_target(current, over_limit, eagerness);
            if npurge == 0 {
                return PurgeOutcome::Idle;
            }
            decay.set_purging(true);
            npurge
        };

        let purged = pages.purge(npurge);

        self.inner.lock().set_purging(false);
        self.stats.record_purge(1, purged);
        log::trace!("decay: purged {}/{} pages", purged, npurge);
        PurgeOutcome::Purged { npages: purged }
    }
}

// ============================================================================
// GUARD
// ============================================================================

/// Exclusive access to a [`SyncDecay`]'s scheduler.
///
/// Publishes the scheduler's decay time to the lock-free copy on drop.
#[derive(Debug)]
pub struct SyncDecayGuard<'a> {
    decay: MutexGuard<'a, Decay>,
    time_ms: &'a AtomicI64,
}

impl Deref for SyncDecayGuard<'_> {
    type Target = Decay;

    fn deref(&self) -> &Decay {
        &self.decay
    }
}

impl DerefMut for SyncDecayGuard<'_> {
    fn deref_mut(&mut self) -> &mut Decay {
        &mut self.decay
    }
}

impl Drop for SyncDecayGuard<'_> {
    fn drop(&mut self) {
        self.time_ms.store(self.decay.ms_read(), Ordering::Relaxed);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecayError;
    use std::sync::atomic::{AtomicU64, AtomicUsize};
    use std::sync::Arc;
    use std::thread;

    /// Page pool shared between threads
    struct SharedPages<'a> {
        npages: &'a AtomicUsize,
        calls: &'a AtomicUsize,
    }

    impl PageSource for SharedPages<'_> {
        fn npages(&self) -> usize {
            self.npages.load(Ordering::SeqCst)
        }

        fn purge(&mut self, npages: usize) -> usize {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut current = self.npages.load(Ordering::SeqCst);
            loop {
                let n = npages.min(current);
                match self.npages.compare_exchange(
                    current,
                    current - n,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                ) {
                    Ok(_) => return n,
                    Err(actual) => current = actual,
                }
            }
        }
    }

    fn config(decay_ms: i64) -> DecayConfig {
        DecayConfig::builder()
            .decay_ms(decay_ms)
            .seed(23)
            .build()
            .expect("valid config")
    }

    #[test]
    fn test_reinit_validates() {
        let decay = SyncDecay::new(config(10_000)).expect("init");
        assert_eq!(decay.reinit(-9), Err(DecayError::InvalidDecayTime(-9)));
        assert_eq!(decay.ms_read(), 10_000);

        decay.reinit(500).expect("valid decay time");
        assert_eq!(decay.ms_read(), 500);
        assert_eq!(decay.lock().ms_read(), 500);
    }

    #[test]
    fn test_reinit_through_guard_updates_mirror() {
        let decay = SyncDecay::new(config(10_000)).expect("init");
        decay.lock().reinit(500);
        assert_eq!(decay.ms_read(), 500);

        {
            let mut guard = decay.lock();
            guard.reinit(-1);
            assert!(guard.disabled());
        }
        assert_eq!(decay.ms_read(), -1);
    }

    #[test]
    fn test_busy_while_purging() {
        let decay = SyncDecay::new(config(0)).expect("init");
        let npages = AtomicUsize::new(10);
        let calls = AtomicUsize::new(0);
        let mut pages = SharedPages {
            npages: &npages,
            calls: &calls,
        };

        decay.lock().set_purging(true);
        let outcome = decay.decay_and_purge(Nstime::ZERO, &mut pages, PurgeEagerness::Force);
        assert_eq!(outcome, PurgeOutcome::Busy);
        assert_eq!(npages.load(Ordering::SeqCst), 10);

        decay.lock().set_purging(false);
        let outcome = decay.decay_and_purge(Nstime::ZERO, &mut pages, PurgeEagerness::Force);
        assert_eq!(outcome, PurgeOutcome::Purged { npages: 10 });
        assert!(!decay.lock().purging());
        assert_eq!(decay.stats().snapshot().purged, 10);
    }

    #[test]
    fn test_concurrent_purgers() {
        let decay = Arc::new(SyncDecay::new(config(0)).expect("init"));
        let npages = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        // One clock shared by every purger, read once per call.
        let clock = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let decay = Arc::clone(&decay);
                let npages = Arc::clone(&npages);
                let calls = Arc::clone(&calls);
                let clock = Arc::clone(&clock);
                thread::spawn(move || {
                    let mut pages = SharedPages {
                        npages: &npages,
                        calls: &calls,
                    };
                    for _ in 0..200 {
                        npages.fetch_add(3, Ordering::SeqCst);
                        let now = Nstime::from_nanos(clock.fetch_add(1_000, Ordering::SeqCst));
                        decay.decay_and_purge(now, &mut pages, PurgeEagerness::Force);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("purger thread");
        }

        let stats = decay.stats().snapshot();
        assert!(!decay.lock().purging());
        assert_eq!(stats.nmadvise, calls.load(Ordering::SeqCst) as u64);
        assert_eq!(stats.purged + npages.load(Ordering::SeqCst) as u64, 4 * 200 * 3);
    }
}
