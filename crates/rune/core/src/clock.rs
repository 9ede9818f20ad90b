//! Periodic regeneration driver.
//!
//! The enclosing simulation calls [`RegenerationClock::tick`] once per fixed
//! period. The rate is re-evaluated on every tick because haste and the
//! double-speed buff change between ticks.
//!
//! While the actor is out of play the clock is deferred: ticks are ignored and
//! the last-tick timestamp is frozen, so the first tick after
//! [`resume`](RegenerationClock::resume) covers all wall time since the last
//! real tick. That catch-up is applied in period-sized steps so overflow is
//! redistributed the same way it would have been had the ticks happened.

use core::time::Duration;

use crate::bridge::GainSink;
use crate::config::RuneConfig;
use crate::error::RuneError;
use crate::pool::RunePool;
use crate::rate::{RateSource, RegenRate};
use crate::time::SimTime;

#[derive(Clone, Debug, PartialEq)]
pub struct RegenerationClock {
    config: RuneConfig,
    period: Duration,
    last_tick: SimTime,
    deferred: bool,
}

impl RegenerationClock {
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(100);

    pub fn new(config: RuneConfig, period: Duration) -> Result<Self, RuneError> {
        config.validate()?;
        if period.is_zero() {
            return Err(RuneError::InvalidConfig("tick period must be positive"));
        }
        Ok(Self {
            config,
            period,
            last_tick: SimTime::ZERO,
            deferred: false,
        })
    }

    pub fn config(&self) -> &RuneConfig {
        &self.config
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn last_tick(&self) -> SimTime {
        self.last_tick
    }

    /// When the next regular tick is due.
    pub fn next_due(&self) -> SimTime {
        self.last_tick + self.period
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Stops regeneration until [`resume`](Self::resume).
    pub fn defer(&mut self) {
        self.deferred = true;
    }

    pub fn resume(&mut self) {
        self.deferred = false;
    }

    /// Restarts the clock at `now` (iteration boundary).
    pub fn reset(&mut self, now: SimTime) {
        self.last_tick = now;
        self.deferred = false;
    }

    /// Current rate for `source` under this clock's configuration.
    pub fn rate<R: RateSource + ?Sized>(&self, source: &R) -> Result<RegenRate, RuneError> {
        RegenRate::from_source(&self.config, source)
    }

    /// Regenerates `pool` for the time since the last tick.
    ///
    /// Returns the elapsed time applied, or `None` while deferred.
    pub fn tick<S, R>(
        &mut self,
        now: SimTime,
        pool: &mut RunePool<S>,
        source: &R,
    ) -> Result<Option<Duration>, RuneError>
    where
        S: GainSink,
        R: RateSource + ?Sized,
    {
        if self.deferred {
            return Ok(None);
        }

        let rate = self.rate(source)?;
        let elapsed = now.saturating_since(self.last_tick);
        self.last_tick = self.last_tick.max(now);

        let mut remaining = elapsed;
        while !remaining.is_zero() {
            let step = remaining.min(self.period);
            pool.regenerate(step, rate);
            remaining -= step;
        }

        if elapsed > self.period {
            tracing::debug!(?elapsed, period = ?self.period, "regeneration caught up after deferral");
        }

        Ok(Some(elapsed))
    }
}

impl Default for RegenerationClock {
    fn default() -> Self {
        Self {
            config: RuneConfig::default(),
            period: Self::DEFAULT_PERIOD,
            last_tick: SimTime::ZERO,
            deferred: false,
        }
    }
}
