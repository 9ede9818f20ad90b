//! Read-only queries used by the action layer for resource decisions.
//!
//! Time estimates assume no further consumption and treat every slot on its
//! own: a depleted rune reports a full cycle at the current rate. The
//! lane-aware variant [`RunePool::queued_ready_times`] accounts for the
//! regeneration cap instead.

use arrayvec::ArrayVec;

use crate::bridge::GainSink;
use crate::config::RuneConfig;
use crate::pool::RunePool;
use crate::rate::RegenRate;
use crate::slot::RuneState;

const MAX_RUNES: usize = RuneConfig::MAX_RUNES;
const MAX_REGENERATING: usize = RuneConfig::MAX_REGENERATING;

impl<S: GainSink> RunePool<S> {
    /// Number of full runes.
    pub fn ready_count(&self) -> u32 {
        self.count_in_state(RuneState::Full) as u32
    }

    /// Sum of all slot progress, e.g. `[1, 1, 0.3, 0.4, 0, 0]` → 2.7.
    pub fn ready_fraction(&self) -> f64 {
        self.slots().iter().map(|s| s.progress()).sum()
    }

    /// Seconds until each slot is ready at `rate`, sorted ascending.
    pub fn ready_times(&self, rate: RegenRate) -> [f64; MAX_RUNES] {
        let per_second = rate.per_second();

        let mut times = [0.0; MAX_RUNES];
        for (time, slot) in times.iter_mut().zip(self.slots()) {
            *time = slot.time_to_ready(per_second);
        }

        times.sort_by(|a, b| a.total_cmp(b));
        times
    }

    /// Like [`ready_times`](Self::ready_times), but a depleted rune only
    /// starts once one of the regeneration lanes frees up.
    pub fn queued_ready_times(&self, rate: RegenRate) -> [f64; MAX_RUNES] {
        let per_second = rate.per_second();
        let full_cycle = 1.0 / per_second;

        // Each lane holds the time at which it can take the next depleted rune.
        let mut lanes: ArrayVec<f64, MAX_REGENERATING> = self
            .slots()
            .iter()
            .filter(|s| s.is_regenerating())
            .map(|s| s.time_to_ready(per_second))
            .collect();
        while !lanes.is_full() {
            lanes.push(0.0);
        }

        let mut times = [0.0; MAX_RUNES];
        for (time, slot) in times.iter_mut().zip(self.slots()) {
            *time = match slot.state() {
                RuneState::Full => 0.0,
                RuneState::Regenerating => slot.time_to_ready(per_second),
                RuneState::Depleted => match lanes.iter_mut().min_by(|a, b| a.total_cmp(b)) {
                    Some(lane) => {
                        *lane += full_cycle;
                        *lane
                    }
                    None => f64::INFINITY,
                },
            };
        }

        times.sort_by(|a, b| a.total_cmp(b));
        times
    }

    /// Seconds until at least `n` runes are ready. `None` if `n` exceeds the
    /// pool size; `Some(0.0)` for `n == 0`.
    pub fn time_until_n_ready(&self, n: usize, rate: RegenRate) -> Option<f64> {
        match n {
            0 => Some(0.0),
            n if n > MAX_RUNES => None,
            n => Some(self.ready_times(rate)[n - 1]),
        }
    }

    /// Seconds until the next rune is ready; zero when one already is.
    pub fn min_time_to_next_ready(&self, rate: RegenRate) -> f64 {
        self.ready_times(rate)[0]
    }

    /// Seconds until every rune is full.
    pub fn max_time_to_full(&self, rate: RegenRate) -> f64 {
        self.ready_times(rate)[MAX_RUNES - 1]
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use crate::bridge::GainCategory;
    use crate::config::RuneConfig;
    use crate::pool::RunePool;
    use crate::rate::{RateModifiers, RegenRate};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn full_pool_is_ready_now() {
        let pool = RunePool::new();
        assert_eq!(pool.ready_count(), 6);
        assert!(approx(pool.ready_fraction(), 6.0));
        assert_eq!(pool.min_time_to_next_ready(RegenRate::base()), 0.0);
        assert_eq!(pool.max_time_to_full(RegenRate::base()), 0.0);
        assert_eq!(pool.time_until_n_ready(6, RegenRate::base()), Some(0.0));
    }

    #[test]
    fn depleted_runes_report_a_full_cycle() {
        let mut pool = RunePool::new();
        pool.consume(6);
        assert!(approx(pool.max_time_to_full(RegenRate::base()), 10.0));

        pool.regenerate(Duration::from_secs(4), RegenRate::base());

        let times = pool.ready_times(RegenRate::base());
        // Three runes at 0.4 progress finish in 6s; depleted ones in 10s.
        for t in &times[..3] {
            assert!(approx(*t, 6.0));
        }
        for t in &times[3..] {
            assert!(approx(*t, 10.0));
        }

        assert!(approx(pool.ready_fraction(), 1.2));
        assert_eq!(pool.ready_count(), 0);
        assert!(approx(pool.min_time_to_next_ready(RegenRate::base()), 6.0));
        assert!(approx(pool.max_time_to_full(RegenRate::base()), 10.0));
        assert!(approx(pool.time_until_n_ready(4, RegenRate::base()).unwrap(), 10.0));
    }

    #[test]
    fn queued_estimate_waits_for_a_free_lane() {
        let mut pool = RunePool::new();
        pool.consume(6);
        pool.regenerate(Duration::from_secs(4), RegenRate::base());

        let times = pool.queued_ready_times(RegenRate::base());
        for t in &times[..3] {
            assert!(approx(*t, 6.0));
        }
        for t in &times[3..] {
            assert!(approx(*t, 16.0));
        }
    }

    #[test]
    fn n_ready_picks_nth_smallest() {
        let mut pool = RunePool::new();
        pool.consume(2);
        pool.regenerate(Duration::from_secs(5), RegenRate::base());

        let rate = RegenRate::base();
        assert_eq!(pool.time_until_n_ready(0, rate), Some(0.0));
        assert_eq!(pool.time_until_n_ready(4, rate), Some(0.0));
        assert!(approx(pool.time_until_n_ready(5, rate).unwrap(), 5.0));
        assert!(approx(pool.time_until_n_ready(6, rate).unwrap(), 5.0));
        assert_eq!(pool.time_until_n_ready(7, rate), None);
    }

    #[test]
    fn faster_rate_shortens_estimates() {
        let mut pool = RunePool::new();
        pool.consume(3);

        let doubled = RegenRate::new(
            &RuneConfig::default(),
            RateModifiers {
                haste: 1.0,
                double_speed: true,
            },
        )
        .unwrap();

        assert!(approx(pool.max_time_to_full(RegenRate::base()), 10.0));
        assert!(approx(pool.max_time_to_full(doubled), 5.0));
    }

    #[test]
    fn replenished_rune_counts_immediately() {
        let mut pool = RunePool::new();
        pool.consume(6);
        pool.replenish(1, GainCategory::Administrative);
        assert_eq!(pool.min_time_to_next_ready(RegenRate::base()), 0.0);
        assert_eq!(pool.ready_count(), 1);
    }
}
