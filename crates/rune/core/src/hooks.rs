//! External triggers that act on the pool without being part of its state
//! machine: a probabilistic single-rune refill, a timed regeneration-rate
//! doubling buff, and a bulk refill of every non-full rune.

use core::time::Duration;

use crate::bridge::{GainCategory, GainSink};
use crate::pool::RunePool;
use crate::rng::RngOracle;
use crate::slot::RuneState;
use crate::time::SimTime;

// ============================================================================
// Probabilistic refill
// ============================================================================

/// What a [`PartialRefill`] roll did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefillOutcome {
    /// The roll failed; nothing happened.
    NotTriggered,
    /// The roll succeeded and one rune was refilled.
    Refilled,
    /// The roll succeeded but every rune was already full.
    Wasted,
}

/// Refills one rune with a probability proportional to an external cost.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartialRefill {
    /// Probability contributed by each unit of cost.
    pub chance_per_cost: f64,
}

impl PartialRefill {
    pub const fn new(chance_per_cost: f64) -> Self {
        Self { chance_per_cost }
    }

    /// Proc chance for `cost`, clamped to `[0, 1]`.
    pub fn chance(&self, cost: f64) -> f64 {
        (self.chance_per_cost * cost).clamp(0.0, 1.0)
    }

    pub fn trigger<S, R>(
        &self,
        pool: &mut RunePool<S>,
        rng: &R,
        seed: u64,
        cost: f64,
    ) -> RefillOutcome
    where
        S: GainSink,
        R: RngOracle + ?Sized,
    {
        if !rng.roll(seed, self.chance(cost)) {
            return RefillOutcome::NotTriggered;
        }

        if pool.replenish(1, GainCategory::Replenish) == 1 {
            tracing::debug!(runes = %pool, "partial refill regenerated a rune");
            RefillOutcome::Refilled
        } else {
            RefillOutcome::Wasted
        }
    }
}

// ============================================================================
// Double-speed buff
// ============================================================================

/// Timed flag that doubles the regeneration rate while active.
///
/// Re-triggering an active buff only extends it; the rate never goes beyond
/// ×2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoubleSpeedBuff {
    expires_at: Option<SimTime>,
}

impl DoubleSpeedBuff {
    pub const fn new() -> Self {
        Self { expires_at: None }
    }

    pub fn is_active(&self, now: SimTime) -> bool {
        self.expires_at.is_some_and(|t| t > now)
    }

    /// Expiry tick if the buff is active at `now`.
    pub fn expires_at(&self, now: SimTime) -> Option<SimTime> {
        self.expires_at.filter(|&t| t > now)
    }

    pub fn remaining(&self, now: SimTime) -> Duration {
        self.expires_at(now)
            .map(|t| t.saturating_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Starts the buff for `duration`, or extends an active one by `duration`.
    pub fn trigger(&mut self, now: SimTime, duration: Duration) {
        let expires_at = match self.expires_at(now) {
            Some(current) => current + duration,
            None => now + duration,
        };
        self.expires_at = Some(expires_at);
    }

    pub fn expire(&mut self) {
        self.expires_at = None;
    }
}

/// Cost-driven proc for [`DoubleSpeedBuff`].
///
/// The chance is `chance_per_cost × cost / 100`; the duration is
/// `base_duration × haste multiplier`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoubleSpeedProc {
    pub chance_per_cost: f64,
    pub base_duration: Duration,
}

impl DoubleSpeedProc {
    pub const DEFAULT_BASE_DURATION: Duration = Duration::from_secs(3);

    pub const fn new(chance_per_cost: f64) -> Self {
        Self {
            chance_per_cost,
            base_duration: Self::DEFAULT_BASE_DURATION,
        }
    }

    pub fn chance(&self, cost: f64) -> f64 {
        (self.chance_per_cost * cost / 100.0).clamp(0.0, 1.0)
    }

    pub fn duration(&self, haste: f64) -> Duration {
        self.base_duration.mul_f64(haste.max(0.0))
    }

    /// Rolls the proc and starts or extends `buff`. Returns whether it fired.
    pub fn trigger<R: RngOracle + ?Sized>(
        &self,
        buff: &mut DoubleSpeedBuff,
        rng: &R,
        seed: u64,
        cost: f64,
        haste: f64,
        now: SimTime,
    ) -> bool {
        if !rng.roll(seed, self.chance(cost)) {
            return false;
        }

        buff.trigger(now, self.duration(haste));
        tracing::debug!(expires_at = ?buff.expires_at(now), "double-speed regeneration triggered");
        true
    }
}

impl Default for DoubleSpeedProc {
    fn default() -> Self {
        Self::new(0.0)
    }
}

// ============================================================================
// Bulk empowerment
// ============================================================================

/// Rune value granted by [`empower_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmpowerOutcome {
    /// Missing progress that was filled in.
    pub filled: f64,
    /// Progress regenerating runes already had, superseded by the fill.
    pub overflow: f64,
}

/// Fills every non-full rune.
///
/// A depleted rune adds 1.0 to `filled`; a regenerating rune adds its missing
/// progress to `filled` and its existing progress to `overflow`.
pub fn empower_all<S: GainSink>(pool: &mut RunePool<S>, category: GainCategory) -> EmpowerOutcome {
    let mut outcome = EmpowerOutcome::default();

    for index in 0..pool.slots().len() {
        let slot = pool.slots()[index];
        match slot.state() {
            RuneState::Full => continue,
            RuneState::Depleted => outcome.filled += 1.0,
            RuneState::Regenerating => {
                outcome.filled += 1.0 - slot.progress();
                outcome.overflow += slot.progress();
            }
        }

        pool.fill_index(index, category);
    }

    tracing::debug!(
        runes = %pool,
        filled = outcome.filled,
        overflow = outcome.overflow,
        "empowered all runes"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{GainLedger, GainRecord};
    use crate::rate::RegenRate;
    use crate::rng::{PcgRng, compute_seed};

    /// Rolls a fixed value regardless of seed.
    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn refill_triggers_on_successful_roll() {
        let mut pool = RunePool::new();
        pool.consume(6);

        let refill = PartialRefill::new(0.02);
        assert!(approx(refill.chance(30.0), 0.6));

        let outcome = refill.trigger(&mut pool, &FixedRng(0), 0, 30.0);
        assert_eq!(outcome, RefillOutcome::Refilled);
        assert_eq!(pool.ready_count(), 1);
        assert_eq!(pool.sink().totals(GainCategory::Replenish).actual, 1.0);
    }

    #[test]
    fn refill_skips_on_failed_roll() {
        let mut pool = RunePool::new();
        pool.consume(6);

        let outcome = PartialRefill::new(0.01).trigger(&mut pool, &FixedRng(u32::MAX), 0, 10.0);
        assert_eq!(outcome, RefillOutcome::NotTriggered);
        assert_eq!(pool.ready_count(), 0);
    }

    #[test]
    fn refill_on_full_pool_is_wasted() {
        let mut pool = RunePool::new();
        let outcome = PartialRefill::new(1.0).trigger(&mut pool, &PcgRng, 5, 1.0);
        assert_eq!(outcome, RefillOutcome::Wasted);
        assert_eq!(pool.bridge().wasted_refills(), 1);
    }

    #[test]
    fn zero_cost_never_refills() {
        let mut pool = RunePool::new();
        pool.consume(6);
        let refill = PartialRefill::new(0.5);
        for n in 0..50 {
            let outcome = refill.trigger(&mut pool, &PcgRng, compute_seed(1, n, 0, 0), 0.0);
            assert_eq!(outcome, RefillOutcome::NotTriggered);
        }
    }

    #[test]
    fn buff_extends_instead_of_stacking() {
        let mut buff = DoubleSpeedBuff::new();
        let t0 = SimTime::from_secs(10);
        assert!(!buff.is_active(t0));

        buff.trigger(t0, Duration::from_secs(3));
        assert!(buff.is_active(t0));
        assert_eq!(buff.expires_at(t0), Some(SimTime::from_secs(13)));

        buff.trigger(SimTime::from_secs(11), Duration::from_secs(3));
        assert_eq!(buff.expires_at(t0), Some(SimTime::from_secs(16)));
        assert_eq!(buff.remaining(SimTime::from_secs(12)), Duration::from_secs(4));

        assert!(!buff.is_active(SimTime::from_secs(16)));
        assert_eq!(buff.remaining(SimTime::from_secs(20)), Duration::ZERO);
    }

    #[test]
    fn expired_buff_restarts_from_now() {
        let mut buff = DoubleSpeedBuff::new();
        buff.trigger(SimTime::ZERO, Duration::from_secs(2));
        buff.trigger(SimTime::from_secs(5), Duration::from_secs(2));
        assert_eq!(
            buff.expires_at(SimTime::from_secs(5)),
            Some(SimTime::from_secs(7))
        );

        buff.expire();
        assert!(!buff.is_active(SimTime::from_secs(5)));
    }

    #[test]
    fn proc_duration_scales_with_haste() {
        let proc_ = DoubleSpeedProc::new(100.0);
        assert_eq!(proc_.duration(1.0), Duration::from_secs(3));
        assert_eq!(proc_.duration(0.5), Duration::from_millis(1500));
        assert!(approx(proc_.chance(0.5), 0.5));

        let mut buff = DoubleSpeedBuff::new();
        let fired = proc_.trigger(&mut buff, &FixedRng(0), 0, 1.0, 0.5, SimTime::ZERO);
        assert!(fired);
        assert_eq!(
            buff.expires_at(SimTime::ZERO),
            Some(SimTime::from_millis(1500))
        );
    }

    #[test]
    fn empower_fills_everything_and_reports_split() {
        let mut pool = RunePool::with_sink(GainLedger::new());
        pool.consume(5);
        pool.regenerate(Duration::from_secs(3), RegenRate::base());
        // rrrddF with 0.3 progress on each regenerating rune

        let outcome = empower_all(&mut pool, GainCategory::Empower);

        assert_eq!(pool.ready_count(), 6);
        assert!(approx(outcome.filled, 3.0 * 0.7 + 2.0));
        assert!(approx(outcome.overflow, 0.9));

        let totals = pool.sink().totals(GainCategory::Empower);
        assert_eq!(totals.records, 5);
        assert_eq!(totals.actual, 5.0);
    }

    #[test]
    fn empower_on_full_pool_does_nothing() {
        let mut pool = RunePool::with_sink(Vec::<GainRecord>::new());
        let outcome = empower_all(&mut pool, GainCategory::Empower);
        assert_eq!(outcome, EmpowerOutcome::default());
        assert!(pool.sink().is_empty());
    }
}
