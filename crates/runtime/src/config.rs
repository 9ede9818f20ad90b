//! Runtime configuration shared by the simulation loop.
use std::env;
use std::time::Duration;

use crate::error::{Result, RuntimeError};

/// Simulation loop parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    /// Fixed period between regeneration ticks.
    pub tick: Duration,
    /// Base seed for every proc roll.
    pub seed: u64,
    /// Number of iterations; the actor is reset between them.
    pub iterations: u32,
    /// Upper bound on a single iteration's length.
    pub max_duration: Duration,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK: Duration = Duration::from_millis(100);
    pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(300);

    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUNESIM_TICK_MS` - Tick period in milliseconds (default: 100)
    /// - `RUNESIM_SEED` - Base RNG seed (default: 0)
    /// - `RUNESIM_ITERATIONS` - Iteration count (default: 1)
    ///
    /// Unparseable or zero values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_var::<u64>(&lookup, "RUNESIM_TICK_MS").filter(|&ms| ms > 0) {
            config.tick = Duration::from_millis(ms);
        }
        if let Some(seed) = read_var::<u64>(&lookup, "RUNESIM_SEED") {
            config.seed = seed;
        }
        if let Some(iterations) = read_var::<u32>(&lookup, "RUNESIM_ITERATIONS").filter(|&n| n > 0)
        {
            config.iterations = iterations;
        }

        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick.is_zero() || self.tick.subsec_nanos() % 1_000_000 != 0 {
            return Err(RuntimeError::InvalidConfig(format!(
                "tick must be a positive whole number of milliseconds (got {:?})",
                self.tick
            )));
        }
        if self.iterations == 0 {
            return Err(RuntimeError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.max_duration.is_zero() {
            return Err(RuntimeError::InvalidConfig(
                "max_duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick: Self::DEFAULT_TICK,
            seed: 0,
            iterations: 1,
            max_duration: Self::DEFAULT_MAX_DURATION,
        }
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}
