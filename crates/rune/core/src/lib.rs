//! Self-regenerating rune pool for continuous-time combat simulation.
//!
//! `rune-core` models a fixed set of rune slots that are consumed by actions
//! and regenerate over time, at most [`RuneConfig::MAX_REGENERATING`] at once.
//! All mutation flows through [`RunePool`]; the periodic driver is
//! [`RegenerationClock`], and every fill, overflow and waste event is routed
//! through the [`EconomyBridge`] so an external resource counter and gain
//! statistics stay in sync with the pool.
//!
//! Modules are organized leaf-first:
//! - [`slot`] holds the per-rune state machine
//! - [`pool`] owns pool-wide invariants, mutations and the regeneration step
//! - [`query`] answers time-to-ready questions for decision making
//! - [`rate`] and [`clock`] turn haste and the double-speed buff into progress
//! - [`bridge`] synchronizes the external counter and records gains
//! - [`hooks`] exposes the probabilistic refill, rate doubling and bulk fill
pub mod bridge;
pub mod clock;
pub mod config;
pub mod error;
pub mod expr;
pub mod hooks;
pub mod pool;
pub mod query;
pub mod rate;
pub mod rng;
pub mod slot;
pub mod time;

pub use bridge::{
    CategoryTotals, EconomyBridge, GainCategory, GainLedger, GainRecord, GainSink,
};
pub use clock::RegenerationClock;
pub use config::RuneConfig;
pub use error::{ErrorSeverity, RuneError, RuneFault};
pub use expr::RuneExpression;
pub use hooks::{
    DoubleSpeedBuff, DoubleSpeedProc, EmpowerOutcome, PartialRefill, RefillOutcome, empower_all,
};
pub use pool::{FillOutcome, PoolSnapshot, RunePool, SlotSelector};
pub use rate::{RateModifiers, RateSource, RegenRate, haste_from_percent};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use slot::{RuneSlot, RuneState};
pub use time::SimTime;
