//! Simulated actor owning one rune pool.
//!
//! The actor supplies everything the regeneration clock asks for on each tick
//! (haste multiplier, double-speed state) and owns the procs that fire when
//! power is spent.

use std::time::Duration;

use rune_core::{
    DoubleSpeedBuff, DoubleSpeedProc, GainLedger, PartialRefill, PcgRng, RateSource,
    RefillOutcome, RegenRate, RegenerationClock, RuneError, RuneExpression, RunePool, SimTime,
    compute_seed, haste_from_percent,
};

use crate::error::Result;
use crate::scenario::Scenario;

/// RNG contexts so the two procs of one cast roll independently.
const CONTEXT_REFILL: u32 = 0;
const CONTEXT_DOUBLE_SPEED: u32 = 1;

/// Why a cast did not happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientRunes { requested: u32, available: u32 },
    OutOfPlay,
}

/// Result of [`RuneActor::cast`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastOutcome {
    Skipped(SkipReason),
    Cast {
        refill: RefillOutcome,
        double_speed: bool,
    },
}

#[derive(Clone, Debug)]
pub struct RuneActor {
    id: u32,
    seed: u64,
    nonce: u64,
    now: SimTime,
    in_play: bool,
    base_haste: f64,
    haste: f64,
    pool: RunePool<GainLedger>,
    clock: RegenerationClock,
    buff: DoubleSpeedBuff,
    refill: PartialRefill,
    double_speed: DoubleSpeedProc,
}

impl RuneActor {
    pub fn new(id: u32, seed: u64, tick: Duration, scenario: &Scenario) -> Result<Self> {
        let clock = RegenerationClock::new(scenario.rune_config(), tick)?;
        let haste = haste_from_percent(scenario.haste_percent);
        if !haste.is_finite() || haste <= 0.0 {
            return Err(RuneError::InvalidHaste(haste).into());
        }

        Ok(Self {
            id,
            seed,
            nonce: 0,
            now: SimTime::ZERO,
            in_play: true,
            base_haste: haste,
            haste,
            pool: RunePool::new(),
            clock,
            buff: DoubleSpeedBuff::new(),
            refill: PartialRefill::new(scenario.refill_chance_per_cost),
            double_speed: DoubleSpeedProc::new(scenario.double_speed_chance_per_cost),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn pool(&self) -> &RunePool<GainLedger> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut RunePool<GainLedger> {
        &mut self.pool
    }

    pub fn buff(&self) -> &DoubleSpeedBuff {
        &self.buff
    }

    pub fn is_in_play(&self) -> bool {
        self.in_play
    }

    /// Current regeneration rate.
    pub fn rate(&self) -> Result<RegenRate> {
        Ok(self.clock.rate(self)?)
    }

    pub fn evaluate(&self, expr: RuneExpression) -> Result<f64> {
        Ok(expr.evaluate(&self.pool, self.rate()?))
    }

    pub fn set_haste_percent(&mut self, percent: f64) -> Result<()> {
        let haste = haste_from_percent(percent);
        if !haste.is_finite() || haste <= 0.0 {
            return Err(RuneError::InvalidHaste(haste).into());
        }
        self.haste = haste;
        Ok(())
    }

    /// Starts or extends the double-speed buff for `duration`.
    pub fn trigger_double_speed(&mut self, duration: Duration) {
        self.buff.trigger(self.now, duration);
    }

    /// Regenerates up to `now` with the rate in effect since the previous
    /// tick. Returns the elapsed time applied, `None` while out of play.
    pub fn tick(&mut self, now: SimTime) -> Result<Option<Duration>> {
        let modifiers = self.rate_modifiers();
        let applied = self.clock.tick(now, &mut self.pool, &modifiers)?;
        self.now = now;
        Ok(applied)
    }

    /// Spends `runes` and `power_cost`, then rolls both power-spend procs.
    pub fn cast(&mut self, runes: u32, power_cost: f64) -> CastOutcome {
        if !self.in_play {
            return CastOutcome::Skipped(SkipReason::OutOfPlay);
        }

        if let Err(RuneError::InsufficientRunes {
            requested,
            available,
        }) = self.pool.try_consume(runes)
        {
            tracing::debug!(
                actor = self.id,
                requested,
                available,
                "cast skipped, not enough runes"
            );
            return CastOutcome::Skipped(SkipReason::InsufficientRunes {
                requested,
                available,
            });
        }

        let nonce = self.next_nonce();
        let refill = self.refill.trigger(
            &mut self.pool,
            &PcgRng,
            compute_seed(self.seed, nonce, self.id, CONTEXT_REFILL),
            power_cost,
        );
        let double_speed = self.double_speed.trigger(
            &mut self.buff,
            &PcgRng,
            compute_seed(self.seed, nonce, self.id, CONTEXT_DOUBLE_SPEED),
            power_cost,
            self.haste,
            self.now,
        );

        CastOutcome::Cast {
            refill,
            double_speed,
        }
    }

    pub fn leave_play(&mut self) {
        self.in_play = false;
        self.clock.defer();
        tracing::debug!(actor = self.id, at = %self.now, "actor left play");
    }

    pub fn return_to_play(&mut self) {
        self.in_play = true;
        self.clock.resume();
        tracing::debug!(actor = self.id, at = %self.now, "actor returned to play");
    }

    /// Iteration boundary: all runes full, buff gone, clock restarted at zero.
    ///
    /// Gain statistics and the RNG nonce carry over so later iterations roll
    /// fresh values.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.buff.expire();
        self.clock.reset(SimTime::ZERO);
        self.now = SimTime::ZERO;
        self.in_play = true;
        self.haste = self.base_haste;
    }

    fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }
}

impl RateSource for RuneActor {
    fn haste_multiplier(&self) -> f64 {
        self.haste
    }

    fn double_speed_active(&self) -> bool {
        self.buff.is_active(self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rune_core::RuneState;

    fn actor(scenario: &Scenario) -> RuneActor {
        RuneActor::new(0, 1, Duration::from_millis(100), scenario).unwrap()
    }

    fn run_until(actor: &mut RuneActor, secs: u64) {
        let end = SimTime::from_secs(secs).as_millis();
        let mut t = actor.now().as_millis();
        while t < end {
            t += 100;
            actor.tick(SimTime::from_millis(t)).unwrap();
        }
    }

    #[test]
    fn cast_consumes_runes() {
        let mut actor = actor(&Scenario::default());
        let outcome = actor.cast(2, 0.0);
        assert_eq!(
            outcome,
            CastOutcome::Cast {
                refill: RefillOutcome::NotTriggered,
                double_speed: false
            }
        );
        assert_eq!(actor.pool().ready_count(), 4);
    }

    #[test]
    fn cast_without_runes_is_skipped() {
        let mut actor = actor(&Scenario::default());
        actor.cast(5, 0.0);
        let outcome = actor.cast(2, 0.0);
        assert_eq!(
            outcome,
            CastOutcome::Skipped(SkipReason::InsufficientRunes {
                requested: 2,
                available: 1
            })
        );
        assert_eq!(actor.pool().ready_count(), 1);
    }

    #[test]
    fn certain_refill_restores_a_rune() {
        let mut scenario = Scenario::default();
        scenario.refill_chance_per_cost = 1.0;
        let mut actor = actor(&scenario);

        let outcome = actor.cast(1, 1.0);
        assert!(matches!(
            outcome,
            CastOutcome::Cast {
                refill: RefillOutcome::Refilled,
                ..
            }
        ));
        assert_eq!(actor.pool().ready_count(), 6);
    }

    #[test]
    fn double_speed_proc_doubles_regeneration() {
        let mut scenario = Scenario::default();
        scenario.double_speed_chance_per_cost = 100.0;
        let mut actor = actor(&scenario);

        actor.cast(1, 1.0);
        assert!(actor.buff().is_active(actor.now()));
        assert!(actor.rate().unwrap().is_doubled());

        // 3s doubled then 2s normal: 0.6 + 0.2
        run_until(&mut actor, 5);
        assert!((actor.pool().slots()[0].progress() - 0.8).abs() < 1e-9);
        assert!(!actor.buff().is_active(actor.now()));
    }

    #[test]
    fn out_of_play_defers_then_catches_up() {
        let mut actor = actor(&Scenario::default());
        actor.cast(1, 0.0);
        run_until(&mut actor, 1);

        actor.leave_play();
        assert_eq!(
            actor.cast(1, 0.0),
            CastOutcome::Skipped(SkipReason::OutOfPlay)
        );
        run_until(&mut actor, 3);
        assert!((actor.pool().slots()[0].progress() - 0.1).abs() < 1e-9);

        actor.return_to_play();
        let applied = actor.tick(SimTime::from_millis(3_100)).unwrap();
        assert_eq!(applied, Some(Duration::from_millis(2_100)));
        assert!((actor.pool().slots()[0].progress() - 0.31).abs() < 1e-9);
    }

    #[test]
    fn haste_speeds_up_regeneration() {
        let mut actor = actor(&Scenario::default());
        actor.set_haste_percent(100.0).unwrap();
        actor.cast(1, 0.0);
        run_until(&mut actor, 6);
        assert_eq!(actor.pool().slots()[0].state(), RuneState::Full);
        assert_eq!(actor.evaluate(RuneExpression::ReadyCount).unwrap(), 6.0);
    }

    #[test]
    fn reset_restores_iteration_state() {
        let mut scenario = Scenario::default();
        scenario.haste_percent = 30.0;
        let mut actor = actor(&scenario);
        actor.set_haste_percent(0.0).unwrap();
        actor.trigger_double_speed(Duration::from_secs(10));
        actor.cast(6, 0.0);
        actor.leave_play();

        actor.reset();

        assert_eq!(actor.pool().ready_count(), 6);
        assert!(actor.is_in_play());
        assert!(!actor.buff().is_active(SimTime::ZERO));
        assert!((actor.haste_multiplier() - 1.0 / 1.3).abs() < 1e-12);
    }
}
