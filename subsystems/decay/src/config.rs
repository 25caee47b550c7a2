//! # Decay Configuration
//!
//! Decay time validation, per-category defaults, the [`DecayConfig`]
//! builder used to construct a scheduler, and parsing of the allocator's
//! `key:value` option string.

use crate::error::{DecayError, DecayResult};
use crate::smoothstep::{SmoothstepTable, SMOOTHSTEP};
use crate::time::{Nstime, NSEC_PER_MSEC};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Decay time sentinel: never purge
pub const DECAY_MS_DISABLED: i64 = -1;

/// Decay time for immediate purging
pub const DECAY_MS_IMMEDIATE: i64 = 0;

/// Largest decay time whose nanosecond value fits the time arithmetic
pub const DECAY_MS_MAX: i64 = (u64::MAX / NSEC_PER_MSEC) as i64;

/// Default decay time for dirty pages (10 seconds)
pub const DEFAULT_DIRTY_DECAY_MS: i64 = 10_000;

/// Default decay time for muzzy pages (purge immediately)
pub const DEFAULT_MUZZY_DECAY_MS: i64 = 0;

/// Check whether `decay_ms` is an acceptable decay time.
///
/// Accepts [`DECAY_MS_DISABLED`] and every non-negative value whose
/// nanosecond representation fits in a `u64`.
#[inline]
pub const fn decay_ms_valid(decay_ms: i64) -> bool {
    decay_ms == DECAY_MS_DISABLED || (decay_ms >= 0 && decay_ms <= DECAY_MS_MAX)
}

/// Validate `decay_ms`, returning it unchanged on success
#[inline]
pub fn validate_decay_ms(decay_ms: i64) -> DecayResult<i64> {
    if decay_ms_valid(decay_ms) {
        Ok(decay_ms)
    } else {
        Err(DecayError::InvalidDecayTime(decay_ms))
    }
}

// ============================================================================
// CATEGORIES
// ============================================================================

/// Decay-eligible page categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecayCategory {
    /// Freed pages still holding data
    Dirty,
    /// Pages already lazily released (`MADV_FREE`) but not yet purged
    Muzzy,
}

impl DecayCategory {
    /// Both categories, in purge order
    pub const ALL: [Self; 2] = [Self::Dirty, Self::Muzzy];

    /// Short name for logging
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dirty => "dirty",
            Self::Muzzy => "muzzy",
        }
    }

    /// Option key for this category's decay time
    pub const fn option_key(self) -> &'static str {
        match self {
            Self::Dirty => "dirty_decay_ms",
            Self::Muzzy => "muzzy_decay_ms",
        }
    }

    /// Default decay time
    pub const fn default_ms(self) -> i64 {
        match self {
            Self::Dirty => DEFAULT_DIRTY_DECAY_MS,
            Self::Muzzy => DEFAULT_MUZZY_DECAY_MS,
        }
    }
}

// ============================================================================
// SCHEDULER CONFIGURATION
// ============================================================================

/// Parameters for constructing a [`crate::Decay`]
#[derive(Debug, Clone, Copy)]
pub struct DecayConfig {
    /// Decay time in milliseconds (-1 disabled, 0 immediate)
    pub decay_ms: i64,
    /// Start of the first epoch
    pub epoch: Nstime,
    /// Jitter seed; `None` draws one from [`crate::jitter::entropy_seed`]
    pub seed: Option<u64>,
    /// Smoothing curve
    pub weights: &'static SmoothstepTable,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DIRTY_DECAY_MS)
    }
}

impl DecayConfig {
    /// Configuration with the given decay time and defaults elsewhere
    pub const fn new(decay_ms: i64) -> Self {
        Self {
            decay_ms,
            epoch: Nstime::ZERO,
            seed: None,
            weights: &SMOOTHSTEP,
        }
    }

    /// Default configuration for a page category
    pub const fn for_category(category: DecayCategory) -> Self {
        Self::new(category.default_ms())
    }

    /// Create builder for config
    pub fn builder() -> DecayConfigBuilder {
        DecayConfigBuilder::new()
    }

    /// Check the configuration without building a scheduler
    pub fn validate(&self) -> DecayResult<()> {
        validate_decay_ms(self.decay_ms).map(|_| ())
    }
}

/// Builder for [`DecayConfig`]
#[derive(Debug, Clone, Copy)]
pub struct DecayConfigBuilder {
    config: DecayConfig,
}

impl Default for DecayConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DecayConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self {
            config: DecayConfig::default(),
        }
    }

    /// Set decay time in milliseconds
    pub fn decay_ms(mut self, decay_ms: i64) -> Self {
        self.config.decay_ms = decay_ms;
        self
    }

    /// Set the initial epoch
    pub fn epoch(mut self, epoch: Nstime) -> Self {
        self.config.epoch = epoch;
        self
    }

    /// Use a fixed jitter seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Inject a smoothing curve
    pub fn weights(mut self, weights: &'static SmoothstepTable) -> Self {
        self.config.weights = weights;
        self
    }

    /// Build, validating the decay time
    pub fn build(self) -> DecayResult<DecayConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ============================================================================
// OPTION STRING
// ============================================================================

/// Decay times parsed from an allocator option string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayOptions {
    /// Decay time for dirty pages
    pub dirty_decay_ms: i64,
    /// Decay time for muzzy pages
    pub muzzy_decay_ms: i64,
}

impl Default for DecayOptions {
    fn default() -> Self {
        Self {
            dirty_decay_ms: DEFAULT_DIRTY_DECAY_MS,
            muzzy_decay_ms: DEFAULT_MUZZY_DECAY_MS,
        }
    }
}

impl DecayOptions {
    /// Parse a comma-separated `key:value` list.
    ///
    /// Recognised keys are `dirty_decay_ms` and `muzzy_decay_ms`; anything
    /// else belongs to another subsystem and is skipped. Keys that are
    /// absent keep their defaults.
    ///
    /// ```
    /// use helix_decay::DecayOptions;
    ///
    /// let opts = DecayOptions::from_conf("narenas:4,dirty_decay_ms:5000,muzzy_decay_ms:-1")?;
    /// assert_eq!(opts.dirty_decay_ms, 5000);
    /// assert_eq!(opts.muzzy_decay_ms, -1);
    /// # Ok::<(), helix_decay::DecayError>(())
    /// ```
    pub fn from_conf(conf: &str) -> DecayResult<Self> {
        let mut opts = Self::default();

        for entry in conf.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry.split_once(':').ok_or(DecayError::MalformedOption)?;
            let key = key.trim();
            let value = value.trim();

            let Some(category) = DecayCategory::ALL
                .into_iter()
                .find(|c| c.option_key() == key)
            else {
                log::debug!("decay: ignoring unrelated option '{}'", key);
                continue;
            };

            if value.is_empty() {
                return Err(DecayError::MissingValue);
            }
            let ms: i64 = value.parse().map_err(|_| DecayError::MalformedOption)?;
            *opts.decay_ms_mut(category) = validate_decay_ms(ms)?;
            log::debug!("decay: {} decay time {}ms", category.name(), ms);
        }

        Ok(opts)
    }

    /// Decay time for a category
    pub fn decay_ms(&self, category: DecayCategory) -> i64 {
        match category {
            DecayCategory::Dirty => self.dirty_decay_ms,
            DecayCategory::Muzzy => self.muzzy_decay_ms,
        }
    }

    fn decay_ms_mut(&mut self, category: DecayCategory) -> &mut i64 {
        match category {
            DecayCategory::Dirty => &mut self.dirty_decay_ms,
            DecayCategory::Muzzy => &mut self.muzzy_decay_ms,
        }
    }

    /// Scheduler configuration for a category
    pub fn config(&self, category: DecayCategory) -> DecayConfig {
        DecayConfig::new(self.decay_ms(category))
    }
}

// ============================================================================
// TESTS
// ============================================================================
