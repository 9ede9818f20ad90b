//! Simulation runtime for the rune pool.
//!
//! This crate wires a [`RuneActor`] (one pool plus haste, double-speed buff
//! and power-spend procs) into a fixed-tick loop driven by a [`Scenario`].
//! Consumers build a [`Simulation`] from a [`RuntimeConfig`] and a scenario,
//! run it, and get back a [`SimulationReport`] with gain statistics and a
//! reproducibility digest.
//!
//! Modules are organized by responsibility:
//! - [`actor`] owns the pool and answers the clock's rate queries
//! - [`simulation`] hosts the loop and the report
//! - [`scenario`] loads scripted runs from RON
//! - [`utils`] provides trace hashing
pub mod actor;
pub mod config;
pub mod error;
pub mod scenario;
pub mod simulation;
pub mod utils;

pub use actor::{CastOutcome, RuneActor, SkipReason};
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use scenario::{AutoCast, Scenario, ScenarioEvent, TimedEvent};
pub use simulation::{CategoryReport, Simulation, SimulationReport};
pub use utils::{TraceDigest, hash_snapshot};
