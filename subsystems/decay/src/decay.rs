//! # Decay Scheduler
//!
//! Computes how many decay-eligible pages a page allocator should keep at
//! any instant. Pages enter the scheduler's view as a page count sampled at
//! each epoch boundary; the growth observed during each of the last
//! `SMOOTHSTEP_NSTEPS` epochs is kept in a backlog and weighted by the
//! smoothing curve, so each cohort of freed pages is released gradually over
//! the configured decay time instead of all at once.
//!
//! ## Timeline
//!
//! ```text
//!   epoch                deadline                      now
//!     │◄── interval ──►│◄ jitter ►│                     │
//!     ├────────────────┼──────────┼─────────────────────┤
//!     │                           │                     │
//!     └─ window start             └─ earliest advance   └─ advance by
//!                                                          floor((now-epoch)/interval)
//! ```
//!
//! Epochs always move by whole intervals; only the deadline is randomized.
//! Every deadline, including the first one after init or reinit, carries a
//! fresh jitter sample.
//!
//! ## Synchronization
//!
//! Every mutating method takes `&mut self`: the caller must hold whatever
//! lock protects the scheduler (see [`crate::SyncDecay`]). The decay time is
//! also mirrored in an atomic so [`Decay::ms_read`] stays meaningful for
//! racy readers.

use core::fmt;
use core::sync::atomic::{AtomicI64, Ordering};

use crate::config::{
    decay_ms_valid, validate_decay_ms, DecayConfig, DECAY_MS_DISABLED, DECAY_MS_IMMEDIATE,
};
use crate::error::DecayResult;
use crate::jitter::Jitter;
use crate::smoothstep::{SmoothstepTable, SMOOTHSTEP, SMOOTHSTEP_BFP, SMOOTHSTEP_NSTEPS};
use crate::time::Nstime;

/// Span of the backlog, in epochs
const NSTEPS: usize = SMOOTHSTEP_NSTEPS;

/// Interval derived from a decay time; zero unless decay is gradual
#[inline]
fn interval_for(decay_ms: i64) -> Nstime {
    if decay_ms > 0 {
        Nstime::from_millis(decay_ms as u64).idivide(NSTEPS as u64)
    } else {
        Nstime::ZERO
    }
}

// ============================================================================
// DECAY STATE
// ============================================================================

/// Per-category decay scheduler state
pub struct Decay {
    /// A purge for this category is in flight. Owned by the caller.
    purging: bool,
    /// Decay time in milliseconds (-1 disabled, 0 immediate)
    time_ms: AtomicI64,
    /// `time_ms / SMOOTHSTEP_NSTEPS`
    interval: Nstime,
    /// Start of the current epoch
    epoch: Nstime,
    /// Deadline randomness
    jitter: Jitter,
    /// Earliest instant the epoch may advance
    deadline: Nstime,
    /// Pages to keep in the current epoch
    npages_limit: usize,
    /// Page count at the start of the current epoch
    nunpurged: usize,
    /// Pages generated in each of the last `NSTEPS` epochs, newest last
    backlog: [usize; NSTEPS],
    /// Peak page count ever observed
    ceil_npages: u64,
    /// Smoothing curve
    weights: &'static SmoothstepTable,
}

impl Default for Decay {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Decay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decay")
            .field("time_ms", &self.ms_read())
            .field("purging", &self.purging)
            .field("interval", &self.interval)
            .field("epoch", &self.epoch)
            .field("deadline", &self.deadline)
            .field("npages_limit", &self.npages_limit)
            .field("nunpurged", &self.nunpurged)
            .field("epoch_npages_delta", &self.epoch_npages_delta())
            .field("ceil_npages", &self.ceil_npages)
            .finish_non_exhaustive()
    }
}

impl Decay {
    /// Empty, unconfigured state.
    ///
    /// Every field is zero; the value must go through [`Decay::init`] (or be
    /// built with [`Decay::with_config`]) before it is advanced.
    pub const fn new() -> Self {
        Self {
            purging: false,
            time_ms: AtomicI64::new(0),
            interval: Nstime::ZERO,
            epoch: Nstime::ZERO,
            jitter: Jitter::new(0),
            deadline: Nstime::ZERO,
            npages_limit: 0,
            nunpurged: 0,
            backlog: [0; NSTEPS],
            ceil_npages: 0,
            weights: &SMOOTHSTEP,
        }
    }

    /// Build an initialized scheduler from a configuration
    pub fn with_config(config: DecayConfig) -> DecayResult<Self> {
        let mut decay = Self::new();
        decay.init_with(&config)?;
        Ok(decay)
    }

    /// Initialize with a decay time and initial epoch.
    ///
    /// The jitter generator is seeded with [`Jitter::from_entropy`]. On error
    /// the state is left exactly as it was.
    pub fn init(&mut self, decay_ms: i64, epoch: Nstime) -> DecayResult<()> {
        let mut config = DecayConfig::new(decay_ms);
        config.epoch = epoch;
        self.init_with(&config)
    }

    /// Initialize from a full configuration.
    ///
    /// Validation happens before any field is written, so a rejected
    /// configuration leaves the state untouched.
    pub fn init_with(&mut self, config: &DecayConfig) -> DecayResult<()> {
        let decay_ms = validate_decay_ms(config.decay_ms).map_err(|err| {
            log::warn!("decay: rejecting decay time {}ms", config.decay_ms);
            err
        })?;

        let jitter = match config.seed {
            Some(seed) => Jitter::new(seed),
            None => Jitter::from_entropy(self as *const Self as u64),
        };
        let interval = interval_for(decay_ms);

        *self = Self {
            purging: false,
            time_ms: AtomicI64::new(decay_ms),
            interval,
            epoch: config.epoch,
            jitter,
            deadline: config.epoch,
            npages_limit: 0,
            nunpurged: 0,
            backlog: [0; NSTEPS],
            ceil_npages: 0,
            weights: config.weights,
        };
        self.deadline_init();

        log::debug!(
            "decay: init {}ms (interval {}, epoch {}, deadline {})",
            decay_ms,
            interval,
            config.epoch,
            self.deadline
        );
        Ok(())
    }

    /// Change the decay time of an initialized scheduler.
    ///
    /// `decay_ms` must already be validated. Backlog, baseline, peak, epoch
    /// and the `purging` flag survive. Only the period and the deadline
    /// change, and the new deadline draws a fresh jitter sample.
    /// An invalid value panics in debug builds and is ignored in release
    /// builds.
    pub fn reinit(&mut self, decay_ms: i64) {
        debug_assert!(decay_ms_valid(decay_ms), "unvalidated decay time {}", decay_ms);
        if !decay_ms_valid(decay_ms) {
            log::error!("decay: reinit with invalid decay time {}ms ignored", decay_ms);
            return;
        }

        self.time_ms.store(decay_ms, Ordering::Relaxed);
        self.interval = interval_for(decay_ms);
        self.deadline_init();

        log::debug!("decay: reinit {}ms (interval {})", decay_ms, self.interval);
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Configured decay time. Safe to call without holding the lock.
    #[inline]
    pub fn ms_read(&self) -> i64 {
        self.time_ms.load(Ordering::Relaxed)
    }

    /// Decay time is zero: purge everything as soon as possible
    #[inline]
    pub fn immediately(&self) -> bool {
        self.ms_read() == DECAY_MS_IMMEDIATE
    }

    /// Decay is turned off
    #[inline]
    pub fn disabled(&self) -> bool {
        self.ms_read() == DECAY_MS_DISABLED
    }

    /// Pages decay over time (positive decay time)
    #[inline]
    pub fn gradually(&self) -> bool {
        self.ms_read() > 0
    }

    /// Retention target for the current epoch
    #[inline]
    pub fn npages_limit(&self) -> usize {
        self.npages_limit
    }

    /// Pages generated during the most recent epoch
    #[inline]
    pub fn epoch_npages_delta(&self) -> usize {
        self.backlog[NSTEPS - 1]
    }

    /// Page count at the start of the current epoch
    #[inline]
    pub fn nunpurged(&self) -> usize {
        self.nunpurged
    }

    /// Peak page count observed
    #[inline]
    pub fn ceil_npages(&self) -> u64 {
        self.ceil_npages
    }

    /// Start of the current epoch
    #[inline]
    pub fn epoch(&self) -> Nstime {
        self.epoch
    }

    /// Earliest instant of the next epoch advance
    #[inline]
    pub fn deadline(&self) -> Nstime {
        self.deadline
    }

    /// Length of one epoch (zero unless decay is gradual)
    #[inline]
    pub fn epoch_duration(&self) -> Nstime {
        self.interval
    }

    /// Per-epoch page deltas, oldest first
    #[inline]
    pub fn backlog(&self) -> &[usize; NSTEPS] {
        &self.backlog
    }

    /// Current jitter generator state
    #[inline]
    pub fn jitter(&self) -> Jitter {
        self.jitter
    }

    /// A purge is in flight for this category
    #[inline]
    pub fn purging(&self) -> bool {
        self.purging
    }

    /// Mark a purge as started or finished. Only the purging caller
    /// touches this flag.
    #[inline]
    pub fn set_purging(&mut self, purging: bool) {
        self.purging = purging;
    }

    // ========================================================================
    // EPOCH ADVANCEMENT
    // ========================================================================

    /// Advance the epoch if its deadline has passed.
    ///
    /// `current_npages` is the number of decay-eligible pages the caller
    /// holds right now. Returns `true` when the epoch advanced and more
    /// pages are held than [`Decay::npages_limit`] allows; the caller should
    /// then purge down to the limit.
    pub fn maybe_advance_epoch(&mut self, now: Nstime, current_npages: usize) -> bool {
        if now < self.epoch {
            // Non-monotonic clock. Restart the window from `now` rather than
            // waiting for time to catch up with the old epoch.
            log::warn!(
                "decay: clock went backwards ({} < epoch {}), re-anchoring",
                now,
                self.epoch
            );
            self.epoch = now;
            self.deadline_init();
            return false;
        }

        if now < self.deadline {
            return false;
        }

        let decay_ms = self.ms_read();
        if decay_ms == DECAY_MS_DISABLED {
            self.advance_disabled(now, current_npages);
            false
        } else if decay_ms == DECAY_MS_IMMEDIATE {
            self.advance_immediate(now, current_npages)
        } else {
            self.advance_gradual(now, current_npages)
        }
    }

    /// Disabled decay: keep the window anchored at `now`, never purge
    fn advance_disabled(&mut self, now: Nstime, current_npages: usize) {
        self.epoch = now;
        self.deadline = now;
        self.nunpurged = current_npages;
        self.npages_limit = current_npages;
        self.update_ceil(current_npages);
    }

    /// Immediate decay: all history is stale, nothing is retained.
    ///
    /// The next advance may happen at any strictly later instant.
    fn advance_immediate(&mut self, now: Nstime, current_npages: usize) -> bool {
        self.backlog_update(NSTEPS as u64, current_npages);
        self.epoch = now;
        self.deadline = now + Nstime::from_nanos(1);
        self.nunpurged = current_npages;
        self.npages_limit = 0;
        self.update_ceil(current_npages);
        current_npages > 0
    }

    fn advance_gradual(&mut self, now: Nstime, current_npages: usize) -> bool {
        let nadvance = (now - self.epoch).divide(self.interval);
        debug_assert!(nadvance > 0, "deadline passed without a full interval");

        self.epoch = self.epoch + self.interval.imultiply(nadvance);
        self.deadline_init();

        self.backlog_update(nadvance, current_npages);
        self.nunpurged = current_npages;
        self.npages_limit = self.backlog_npages_limit().min(current_npages);
        self.update_ceil(current_npages);

        log::trace!(
            "decay: advanced {} epoch(s) to {}, limit {}/{} pages",
            nadvance,
            self.epoch,
            self.npages_limit,
            current_npages
        );
        #[cfg(feature = "debug")]
        log::trace!("decay: backlog tail {:?}", &self.backlog[NSTEPS - 4..]);

        self.npages_limit < current_npages
    }

    /// Place the deadline one interval past the epoch plus a jitter sample
    /// in `[0, interval)`. Zero-interval modes get no offset.
    fn deadline_init(&mut self) {
        let (jitter, offset) = self.jitter.advance_and_sample(self.interval.ns());
        self.jitter = jitter;
        self.deadline = self.epoch + self.interval + Nstime::from_nanos(offset);
    }

    /// Shift the backlog by `nadvance` epochs and record the newest delta.
    ///
    /// Skipped epochs have no observation of their own and count as zero;
    /// all growth since the last advance lands in the newest slot.
    fn backlog_update(&mut self, nadvance: u64, current_npages: usize) {
        if nadvance >= NSTEPS as u64 {
            self.backlog = [0; NSTEPS];
        } else {
            let shift = nadvance as usize;
            self.backlog.copy_within(shift.., 0);
            self.backlog[NSTEPS - shift..].fill(0);
        }
        self.backlog[NSTEPS - 1] = current_npages.saturating_sub(self.nunpurged);
    }

    #[inline]
    fn update_ceil(&mut self, current_npages: usize) {
        self.ceil_npages = self.ceil_npages.max(current_npages as u64);
    }

    // ========================================================================
    // LIMIT COMPUTATION
    // ========================================================================

    /// Backlog convolved with the smoothing curve
    fn backlog_npages_limit(&self) -> usize {
        let sum: u128 = self
            .backlog
            .iter()
            .zip(self.weights.as_slice())
            .map(|(&npages, &weight)| npages as u128 * weight as u128)
            .sum();
        usize::try_from(sum >> SMOOTHSTEP_BFP).unwrap_or(usize::MAX)
    }

    // ========================================================================
    // PURGE TIMING
    // ========================================================================

    /// Pages that become purgeable after `nepochs` more epochs without new
    /// pages arriving.
    pub fn npurge_after_interval(&self, nepochs: usize) -> usize {
        let nepochs = nepochs.min(NSTEPS);
        let w = self.weights.as_slice();

        let mut sum: u128 = 0;
        for i in 0..nepochs {
            sum += self.backlog[i] as u128 * w[i] as u128;
        }
        for i in nepochs..NSTEPS {
            sum += self.backlog[i] as u128 * w[i].saturating_sub(w[i - nepochs]) as u128;
        }
        usize::try_from(sum >> SMOOTHSTEP_BFP).unwrap_or(usize::MAX)
    }

    /// How long a background purger may sleep before more than
    /// `npages_threshold` pages become purgeable.
    ///
    /// Returns `None` when no amount of waiting will produce purge work
    /// (decay is not gradual, or there is nothing in flight).
    pub fn ns_until_purge(&self, current_npages: usize, npages_threshold: usize) -> Option<Nstime> {
        if !self.gradually() {
            return None;
        }
        let interval = self.epoch_duration();

        if current_npages == 0 && self.backlog.iter().all(|&npages| npages == 0) {
            return None;
        }

        if current_npages <= npages_threshold {
            return Some(interval.imultiply(NSTEPS as u64));
        }

        // At least two intervals, so the sleeper wakes past the next
        // deadline whatever its jitter.
        let mut lb = 2usize;
        let mut ub = NSTEPS;

        let mut npurge_lb = self.npurge_after_interval(lb);
        if npurge_lb > npages_threshold {
            return Some(interval.imultiply(lb as u64));
        }
        let mut npurge_ub = self.npurge_after_interval(ub);
        if npurge_ub < npages_threshold {
            return Some(interval.imultiply(ub as u64));
        }

        while npurge_lb.saturating_add(npages_threshold) < npurge_ub && lb + 2 < ub {
            let target = (lb + ub) / 2;
            let npurge = self.npurge_after_interval(target);
            if npurge > npages_threshold {
                ub = target;
                npurge_ub = npurge;
            } else {
                lb = target;
                npurge_lb = npurge;
            }
        }

        Some(interval.imultiply(((lb + ub) / 2) as u64))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecayError;

    fn ms(v: u64) -> Nstime {
        Nstime::from_millis(v)
    }

    fn seeded(decay_ms: i64, seed: u64) -> Decay {
        let config = DecayConfig::builder()
            .decay_ms(decay_ms)
            .seed(seed)
            .build()
            .expect("valid config");
        Decay::with_config(config).expect("init")
    }

    /// Advance exactly at the pending deadline
    fn advance_at_deadline(decay: &mut Decay, npages: usize) -> bool {
        let now = decay.deadline();
        decay.maybe_advance_epoch(now, npages)
    }

    fn assert_jittered(decay: &Decay) {
        let interval = decay.epoch_duration();
        assert!(decay.deadline() >= decay.epoch() + interval);
        assert!(decay.deadline() < decay.epoch() + interval.imultiply(2));
    }

    #[test]
    fn test_empty_state() {
        let decay = Decay::new();
        assert_eq!(decay.ms_read(), 0);
        assert_eq!(decay.npages_limit(), 0);
        assert_eq!(decay.epoch_npages_delta(), 0);
        assert!(!decay.purging());
    }

    #[test]
    fn test_init_reads_back() {
        for decay_ms in [-1, 0, 1, 10_000] {
            let mut decay = Decay::new();
            decay.init(decay_ms, Nstime::ZERO).expect("valid decay time");
            assert_eq!(decay.ms_read(), decay_ms);
        }
    }

    #[test]
    fn test_init_interval_and_deadline() {
        let mut decay = Decay::new();
        decay.init(10_000, ms(3)).expect("init");
        assert_eq!(decay.epoch_duration(), ms(50));
        assert_eq!(decay.epoch(), ms(3));
        assert_jittered(&decay);
    }

    #[test]
    fn test_init_deadlines_differ_across_seeds() {
        let deadlines: Vec<Nstime> = (1..=8u64).map(|seed| seeded(10_000, seed).deadline()).collect();
        assert!(deadlines.iter().any(|&d| d != deadlines[0]), "{:?}", deadlines);
    }

    #[test]
    fn test_reinit_deadlines_differ_across_seeds() {
        let deadlines: Vec<Nstime> = [1u64, 0xDEADBEEF, 42, 7]
            .iter()
            .map(|&seed| {
                let mut decay = seeded(10_000, seed);
                decay.reinit(2_000);
                assert_jittered(&decay);
                decay.deadline()
            })
            .collect();
        assert!(deadlines.iter().any(|&d| d != deadlines[0]), "{:?}", deadlines);
    }

    #[test]
    fn test_init_failure_leaves_state_untouched() {
        let mut decay = Decay::new();
        assert_eq!(decay.init(-2, ms(5)), Err(DecayError::InvalidDecayTime(-2)));
        assert_eq!(decay.ms_read(), 0);
        assert_eq!(decay.epoch(), Nstime::ZERO);
        assert_eq!(decay.deadline(), Nstime::ZERO);
    }

    #[test]
    fn test_mode_predicates() {
        assert!(seeded(-1, 1).disabled());
        assert!(seeded(0, 1).immediately());
        assert!(seeded(5, 1).gradually());
    }

    #[test]
    fn test_first_epoch_advance() {
        let mut decay = seeded(10_000, 7);
        assert!(!decay.maybe_advance_epoch(ms(0), 0));
        assert!(!decay.maybe_advance_epoch(ms(49), 100));

        assert!(advance_at_deadline(&mut decay, 100));
        assert_eq!(decay.npages_limit(), 99);
        assert_eq!(decay.epoch_npages_delta(), 100);
        assert_eq!(decay.nunpurged(), 100);
        assert_eq!(decay.epoch(), ms(50));
    }

    #[test]
    fn test_deadline_window() {
        let mut decay = seeded(10_000, 11);
        let interval = decay.epoch_duration();
        let mut now = ms(50);
        for step in 0..500 {
            let deadline = decay.deadline();
            decay.maybe_advance_epoch(now, step);
            assert_jittered(&decay);
            if decay.deadline() != deadline {
                assert!(decay.deadline() > now);
                assert!(decay.deadline() < now + interval.imultiply(2));
            }
            now = now + ms(13);
        }
    }

    #[test]
    fn test_same_instant_advances_once() {
        let mut decay = seeded(10_000, 3);
        assert!(decay.maybe_advance_epoch(ms(120), 100));
        let limit = decay.npages_limit();
        let backlog = *decay.backlog();

        assert!(!decay.maybe_advance_epoch(ms(120), 100));
        assert_eq!(decay.npages_limit(), limit);
        assert_eq!(*decay.backlog(), backlog);
    }

    #[test]
    fn test_immediate_same_instant_advances_once() {
        let mut decay = seeded(0, 1);
        assert!(decay.maybe_advance_epoch(ms(5), 7));
        assert_eq!(decay.epoch_npages_delta(), 7);

        assert!(!decay.maybe_advance_epoch(ms(5), 7));
        assert_eq!(decay.epoch_npages_delta(), 7);
        assert_eq!(decay.nunpurged(), 7);

        // Any later instant is a new advance.
        assert!(decay.maybe_advance_epoch(ms(5) + Nstime::from_nanos(1), 9));
        assert_eq!(decay.epoch_npages_delta(), 2);
    }

    #[test]
    fn test_skipped_epochs_are_zero() {
        let mut decay = seeded(10_000, 5);
        assert!(advance_at_deadline(&mut decay, 40));
        // Jump well past the next deadline: 4 intervals elapsed.
        decay.maybe_advance_epoch(ms(250), 60);
        let backlog = decay.backlog();
        assert_eq!(backlog[NSTEPS - 1], 20);
        assert_eq!(&backlog[NSTEPS - 4..NSTEPS - 1], &[0, 0, 0]);
        assert_eq!(backlog[NSTEPS - 5], 40);
        assert_eq!(decay.epoch(), ms(250));
    }

    #[test]
    fn test_stale_backlog_is_cleared() {
        let mut decay = seeded(1_000, 5);
        assert!(advance_at_deadline(&mut decay, 40));
        decay.maybe_advance_epoch(ms(5_000), 30);
        assert_eq!(decay.epoch_npages_delta(), 0);
        assert!(decay.backlog().iter().all(|&npages| npages == 0));
        assert_eq!(decay.npages_limit(), 0);
    }

    #[test]
    fn test_shrinking_page_count_records_zero() {
        let mut decay = seeded(10_000, 9);
        assert!(advance_at_deadline(&mut decay, 100));
        decay.maybe_advance_epoch(ms(150), 10);
        assert_eq!(decay.epoch_npages_delta(), 0);
        assert!(decay.npages_limit() <= 10);
    }

    #[test]
    fn test_disabled_never_purges() {
        let mut decay = seeded(-1, 1);
        for step in 1..100u64 {
            assert!(!decay.maybe_advance_epoch(ms(step * 1_000), (step * 1_000_000) as usize));
            assert_eq!(decay.npages_limit(), (step * 1_000_000) as usize);
        }
        assert_eq!(decay.epoch(), ms(99_000));
    }

    #[test]
    fn test_immediate_purges_everything() {
        let mut decay = seeded(0, 1);
        assert!(decay.maybe_advance_epoch(Nstime::ZERO, 5));
        assert_eq!(decay.npages_limit(), 0);
        assert!(!decay.maybe_advance_epoch(ms(1), 0));
    }

    #[test]
    fn test_clock_regression_reanchors() {
        let mut decay = seeded(10_000, 2);
        assert!(decay.maybe_advance_epoch(ms(1_000), 50));
        let limit = decay.npages_limit();

        assert!(!decay.maybe_advance_epoch(ms(10), 80));
        assert_eq!(decay.epoch(), ms(10));
        assert_jittered(&decay);
        assert_eq!(decay.npages_limit(), limit);
    }

    #[test]
    fn test_reinit_preserves_history() {
        let mut decay = seeded(10_000, 4);
        assert!(advance_at_deadline(&mut decay, 100));
        decay.set_purging(true);
        let backlog = *decay.backlog();
        let ceil = decay.ceil_npages();
        let nunpurged = decay.nunpurged();
        let epoch = decay.epoch();

        decay.reinit(2_000);
        assert_eq!(decay.ms_read(), 2_000);
        assert_eq!(decay.epoch_duration(), ms(10));
        assert_eq!(decay.epoch(), epoch);
        assert_jittered(&decay);
        assert_eq!(*decay.backlog(), backlog);
        assert_eq!(decay.ceil_npages(), ceil);
        assert_eq!(decay.nunpurged(), nunpurged);
        assert!(decay.purging());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unvalidated decay time")]
    fn test_reinit_rejects_invalid() {
        let mut decay = seeded(10_000, 4);
        decay.reinit(-3);
    }

    #[test]
    fn test_ceil_never_decreases() {
        let mut decay = seeded(100, 8);
        let mut ceil = 0;
        for (step, npages) in [10usize, 500, 20, 0, 300, 1_000, 5].into_iter().enumerate() {
            decay.maybe_advance_epoch(ms(step as u64 * 7), npages);
            assert!(decay.ceil_npages() >= ceil);
            ceil = decay.ceil_npages();
        }
        assert_eq!(ceil, 1_000);
    }

    #[test]
    fn test_npurge_after_interval() {
        let mut decay = seeded(10_000, 6);
        assert!(advance_at_deadline(&mut decay, 1_000));
        assert_eq!(decay.npurge_after_interval(0), 0);
        // After a full period the whole cohort is purgeable.
        assert_eq!(decay.npurge_after_interval(NSTEPS), decay.npages_limit());
        let half = decay.npurge_after_interval(NSTEPS / 2);
        assert!(half > 0 && half < decay.npages_limit());
    }

    #[test]
    fn test_ns_until_purge() {
        assert_eq!(seeded(0, 1).ns_until_purge(100, 0), None);
        assert_eq!(seeded(-1, 1).ns_until_purge(100, 0), None);

        let mut decay = seeded(10_000, 6);
        assert_eq!(decay.ns_until_purge(0, 0), None);

        assert!(advance_at_deadline(&mut decay, 1_000));
        let full = ms(10_000);
        assert_eq!(decay.ns_until_purge(10, 1_000), Some(full));

        // The first page of the cohort becomes purgeable about nine epochs in.
        let soon = decay.ns_until_purge(1_000, 0).expect("pending pages");
        assert!(soon >= ms(100) && soon <= ms(500), "{}", soon);

        let later = decay.ns_until_purge(1_000, 500).expect("pending pages");
        assert!(later > soon && later <= full);
    }
}
