//! Scenario system for scripted rune usage.
//!
//! A scenario describes one actor (haste, proc chances, regeneration time),
//! an optional auto-cast rule and a timeline of events applied at fixed
//! offsets from the start of every iteration.

use std::path::Path;
use std::time::Duration;

use rune_core::{RuneConfig, SlotSelector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// Something the script does to the actor at a given time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScenarioEvent {
    /// Spends runes and power; skipped when too few runes are ready.
    Cast { runes: u32, power_cost: f64 },
    /// Fills one slot (administrative gain).
    Fill(SlotSelector),
    /// Refills up to `n` runes (administrative gain).
    Replenish(u32),
    /// Fills every non-full rune.
    Empower,
    /// Sets haste as a percentage (0 = neutral).
    SetHaste(f64),
    /// Starts or extends the double-speed buff directly.
    DoubleSpeed { secs: f64 },
    /// Actor leaves play; regeneration is deferred.
    LeavePlay,
    /// Actor returns; deferred regeneration catches up.
    ReturnToPlay,
}

/// Event scheduled at `at_secs` seconds into each iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at_secs: f64,
    pub event: ScenarioEvent,
}

impl TimedEvent {
    /// Offset from the iteration start. Saturates for times beyond `Duration`.
    pub fn at(&self) -> Duration {
        secs_to_duration(self.at_secs).unwrap_or(Duration::MAX)
    }
}

/// Converts seconds from a scenario file, `None` when negative, non-finite or
/// too large for `Duration`.
pub(crate) fn secs_to_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

/// Spends `runes` whenever at least that many are ready, at most once per
/// tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoCast {
    pub runes: u32,
    #[serde(default)]
    pub power_cost: f64,
}

/// Scenario configuration for a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    /// Iteration length; capped by the runtime's `max_duration`.
    pub duration_secs: Option<f64>,
    pub haste_percent: f64,
    pub base_regen_seconds: f64,
    /// Partial-refill chance per unit of power spent.
    pub refill_chance_per_cost: f64,
    /// Double-speed proc chance per unit of power spent, divided by 100.
    pub double_speed_chance_per_cost: f64,
    pub auto_cast: Option<AutoCast>,
    pub events: Vec<TimedEvent>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            duration_secs: None,
            haste_percent: 0.0,
            base_regen_seconds: RuneConfig::DEFAULT_BASE_REGEN_SECONDS,
            refill_chance_per_cost: 0.0,
            double_speed_chance_per_cost: 0.0,
            auto_cast: None,
            events: Vec::new(),
        }
    }
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn rune_config(&self) -> RuneConfig {
        RuneConfig::with_base_regen_seconds(self.base_regen_seconds)
    }

    /// Events in firing order. Ties keep their file order.
    pub fn timeline(&self) -> Vec<TimedEvent> {
        let mut events = self.events.clone();
        events.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        events
    }

    /// Iteration length given the runtime cap.
    pub fn duration(&self, max: Duration) -> Duration {
        self.duration_secs
            .and_then(secs_to_duration)
            .map_or(max, |d| d.min(max))
    }

    pub fn validate(&self) -> Result<()> {
        self.rune_config().validate()?;

        if let Some(secs) = self.duration_secs
            && !(secs > 0.0 && secs_to_duration(secs).is_some())
        {
            return Err(RuntimeError::InvalidConfig(format!(
                "scenario '{}': duration_secs must be positive (got {secs})",
                self.name
            )));
        }
        if !self.haste_percent.is_finite() || self.haste_percent <= -100.0 {
            return Err(RuntimeError::InvalidConfig(format!(
                "scenario '{}': haste_percent must be above -100 (got {})",
                self.name, self.haste_percent
            )));
        }
        if let Some(auto) = &self.auto_cast
            && auto.runes == 0
        {
            return Err(RuntimeError::InvalidConfig(format!(
                "scenario '{}': auto_cast must spend at least one rune",
                self.name
            )));
        }
        for timed in &self.events {
            if secs_to_duration(timed.at_secs).is_none() {
                return Err(RuntimeError::InvalidConfig(format!(
                    "scenario '{}': event time must be a non-negative duration (got {})",
                    self.name, timed.at_secs
                )));
            }
            match timed.event {
                ScenarioEvent::DoubleSpeed { secs } if secs_to_duration(secs).is_none() => {
                    return Err(RuntimeError::InvalidConfig(format!(
                        "scenario '{}': double-speed duration must be a non-negative duration (got {secs})",
                        self.name
                    )));
                }
                ScenarioEvent::SetHaste(percent) if !percent.is_finite() || percent <= -100.0 => {
                    return Err(RuntimeError::InvalidConfig(format!(
                        "scenario '{}': haste must be above -100% (got {percent})",
                        self.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Parses a scenario from RON text.
    pub fn from_ron_str(content: &str) -> Result<Self> {
        ron::from_str(content).map_err(RuntimeError::ScenarioParse)
    }

    /// Load scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let scenario = Self::from_ron_str(&content)?;
        tracing::info!(
            name = %scenario.name,
            events = scenario.events.len(),
            "loaded scenario from {}",
            path.display()
        );
        Ok(scenario)
    }
}
