//! Fixed-tick simulation loop.
//!
//! Each iteration starts with a reset actor at time zero. Every step applies
//! the scenario events due at the current time, lets the auto-cast rule spend
//! runes, then advances the clock by one tick and records the pool snapshot
//! into the trace digest.

use std::time::Duration;

use rune_core::{CategoryTotals, GainCategory, RefillOutcome, SimTime, SlotSelector, empower_all};
use serde::{Deserialize, Serialize};

use crate::actor::{CastOutcome, RuneActor};
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::scenario::{Scenario, ScenarioEvent, TimedEvent, secs_to_duration};
use crate::utils::{TraceDigest, hash_snapshot};

/// Gain totals for one category over the whole run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: GainCategory,
    pub actual: f64,
    pub overflow: f64,
    pub records: u64,
}

impl CategoryReport {
    fn new(category: GainCategory, totals: CategoryTotals) -> Self {
        Self {
            category,
            actual: totals.actual,
            overflow: totals.overflow,
            records: totals.records,
        }
    }
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub scenario: String,
    pub seed: u64,
    pub iterations: u32,
    pub iteration_secs: f64,
    pub gains: Vec<CategoryReport>,
    pub casts: u64,
    pub skipped_casts: u64,
    pub refill_procs: u64,
    pub double_speed_procs: u64,
    pub ready_events: u64,
    pub wasted_refills: u64,
    /// Pool status line at the end of the last iteration.
    pub final_status: String,
    /// Hex SHA-256 over every tick's pool snapshot.
    pub digest: String,
}

#[derive(Default)]
struct Counters {
    casts: u64,
    skipped_casts: u64,
    refill_procs: u64,
    double_speed_procs: u64,
}

impl Counters {
    fn record(&mut self, outcome: CastOutcome) {
        match outcome {
            CastOutcome::Skipped(_) => self.skipped_casts += 1,
            CastOutcome::Cast {
                refill,
                double_speed,
            } => {
                self.casts += 1;
                if refill != RefillOutcome::NotTriggered {
                    self.refill_procs += 1;
                }
                if double_speed {
                    self.double_speed_procs += 1;
                }
            }
        }
    }
}

pub struct Simulation {
    config: RuntimeConfig,
    scenario: Scenario,
}

impl Simulation {
    pub fn new(config: RuntimeConfig, scenario: Scenario) -> Result<Self> {
        config.validate()?;
        scenario.validate()?;
        Ok(Self { config, scenario })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn run(&self) -> Result<SimulationReport> {
        let mut actor = RuneActor::new(0, self.config.seed, self.config.tick, &self.scenario)?;
        let timeline = self.scenario.timeline();
        let duration = self.scenario.duration(self.config.max_duration);
        let end = SimTime::ZERO + duration;

        let mut digest = TraceDigest::new();
        let mut counters = Counters::default();

        tracing::info!(
            scenario = %self.scenario.name,
            iterations = self.config.iterations,
            ?duration,
            seed = self.config.seed,
            "starting simulation"
        );

        for iteration in 0..self.config.iterations {
            actor.reset();
            tracing::debug!(iteration, "iteration started");

            self.run_iteration(&mut actor, &timeline, end, &mut digest, &mut counters)?;

            tracing::debug!(
                iteration,
                runes = %actor.pool(),
                state = %hash_snapshot(actor.now(), &actor.pool().snapshot())?,
                "iteration finished"
            );
        }

        let pool = actor.pool();
        let bridge = pool.bridge();
        let report = SimulationReport {
            scenario: self.scenario.name.clone(),
            seed: self.config.seed,
            iterations: self.config.iterations,
            iteration_secs: duration.as_secs_f64(),
            gains: pool
                .sink()
                .iter()
                .map(|(category, totals)| CategoryReport::new(category, totals))
                .collect(),
            casts: counters.casts,
            skipped_casts: counters.skipped_casts,
            refill_procs: counters.refill_procs,
            double_speed_procs: counters.double_speed_procs,
            ready_events: bridge.ready_events(),
            wasted_refills: bridge.wasted_refills(),
            final_status: pool.to_string(),
            digest: digest.finalize(),
        };

        tracing::info!(
            casts = report.casts,
            skipped = report.skipped_casts,
            digest = %report.digest,
            "simulation finished"
        );
        Ok(report)
    }

    fn run_iteration(
        &self,
        actor: &mut RuneActor,
        timeline: &[TimedEvent],
        end: SimTime,
        digest: &mut TraceDigest,
        counters: &mut Counters,
    ) -> Result<()> {
        let mut pending = timeline.iter().peekable();
        let mut now = SimTime::ZERO;

        loop {
            while let Some(timed) = pending.next_if(|t| SimTime::ZERO + t.at() <= now) {
                self.apply(actor, &timed.event, counters)?;
            }

            if let Some(auto) = &self.scenario.auto_cast
                && actor.is_in_play()
                && actor.pool().ready_count() >= auto.runes
            {
                counters.record(actor.cast(auto.runes, auto.power_cost));
            }

            if now >= end {
                return Ok(());
            }

            now = (now + self.config.tick).min(end);
            actor.tick(now)?;
            digest.record(now, &actor.pool().snapshot())?;
        }
    }

    fn apply(
        &self,
        actor: &mut RuneActor,
        event: &ScenarioEvent,
        counters: &mut Counters,
    ) -> Result<()> {
        tracing::debug!(at = %actor.now(), ?event, "scenario event");

        match *event {
            ScenarioEvent::Cast { runes, power_cost } => {
                counters.record(actor.cast(runes, power_cost));
            }
            ScenarioEvent::Fill(selector) => {
                let selector = match selector {
                    // Mix the run seed in so seeded runs differ.
                    SlotSelector::RandomDepleted { seed } => SlotSelector::RandomDepleted {
                        seed: seed ^ self.config.seed,
                    },
                    other => other,
                };
                actor
                    .pool_mut()
                    .fill(selector, GainCategory::Administrative)?;
            }
            ScenarioEvent::Replenish(n) => {
                actor
                    .pool_mut()
                    .replenish(n, GainCategory::Administrative);
            }
            ScenarioEvent::Empower => {
                empower_all(actor.pool_mut(), GainCategory::Empower);
            }
            ScenarioEvent::SetHaste(percent) => actor.set_haste_percent(percent)?,
            ScenarioEvent::DoubleSpeed { secs } => {
                actor.trigger_double_speed(secs_to_duration(secs).unwrap_or(Duration::MAX));
            }
            ScenarioEvent::LeavePlay => actor.leave_play(),
            ScenarioEvent::ReturnToPlay => actor.return_to_play(),
        }
        Ok(())
    }
}
