//! # Helix Page-Decay Scheduler
//!
//! Decides how many freed-but-unreturned pages a page allocator keeps at any
//! moment, and when it should hand the excess back to the OS. Keeping every
//! freed page wastes memory; returning them at once makes the next burst of
//! allocations pay for fresh page faults. The scheduler releases each cohort
//! of freed pages along a smooth curve spread over a configurable decay time.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                        HELIX PAGE DECAY                              │
//! │                                                                      │
//! │   allocator ── now, current pages ──▶ ┌──────────────────────────┐   │
//! │                                       │          Decay           │   │
//! │                                       │                          │   │
//! │   ┌──────────┐   offset in            │  epoch ──▶ deadline      │   │
//! │   │  Jitter  │── [0, interval) ──────▶│                          │   │
//! │   └──────────┘                        │  backlog[0] .. [N-1]     │   │
//! │                                       │   oldest        newest   │   │
//! │   ┌──────────┐   weights              │       │                  │   │
//! │   │Smoothstep│──────────────────────▶ │       ▼  Σ w·backlog     │   │
//! │   └──────────┘                        │  npages_limit            │   │
//! │                                       └────────────┬─────────────┘   │
//! │                                                    │                 │
//! │   PageSource::purge(current - limit) ◀─────────────┘                 │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Decay Time
//!
//! | `decay_ms` | Behaviour                                        |
//! |------------|--------------------------------------------------|
//! | `-1`       | disabled: never purge                            |
//! | `0`        | immediate: purge everything on every advance     |
//! | `> 0`      | gradual: purge along the curve over `decay_ms`   |
//!
//! ## Usage
//!
//! ```
//! use helix_decay::{Decay, DecayConfig, Nstime};
//!
//! let config = DecayConfig::builder().decay_ms(10_000).seed(1).build()?;
//! let mut decay = Decay::with_config(config)?;
//!
//! // Two epochs (10s / 200 each) later the first deadline has certainly
//! // passed, and 100 freshly freed pages are over the limit.
//! assert!(decay.maybe_advance_epoch(Nstime::from_millis(100), 100));
//! assert!(decay.npages_limit() < 100);
//! # Ok::<(), helix_decay::DecayError>(())
//! ```
//!
//! ## Synchronization
//!
//! [`Decay`] is externally synchronized: mutation takes `&mut self`. Only
//! the decay time may be read without the lock ([`Decay::ms_read`]).
//! [`SyncDecay`] packages a scheduler behind a spinlock and never holds it
//! while pages are being released.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Decay time validation, builder, option parsing
pub mod config;

/// The scheduler itself
pub mod decay;

/// Error types
pub mod error;

/// Deadline randomization
pub mod jitter;

/// Page source trait, purge driver and counters
pub mod purge;

/// Smoothing curve tables
pub mod smoothstep;

/// Lock-protected scheduler
pub mod sync;

/// Nanosecond time values
pub mod time;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use config::{
    decay_ms_valid, validate_decay_ms, DecayCategory, DecayConfig, DecayConfigBuilder,
    DecayOptions, DECAY_MS_DISABLED, DECAY_MS_IMMEDIATE, DECAY_MS_MAX,
};
pub use decay::Decay;
pub use error::{DecayError, DecayResult};
pub use jitter::{entropy_seed, Jitter};
pub use purge::{DecayStats, DecayStatsSnapshot, PageSource, PurgeEagerness, PurgeOutcome};
pub use smoothstep::{
    SmoothstepTable, SmoothstepVariant, SMOOTHSTEP, SMOOTHSTEP_BFP, SMOOTHSTEP_NSTEPS,
};
pub use sync::{SyncDecay, SyncDecayGuard};
pub use time::Nstime;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
