//! Regeneration rate derived from haste and the double-speed buff.
//!
//! Formula: `rate = (1 / base_regen_seconds) / haste_multiplier × (2 if doubled)`
//!
//! The haste multiplier follows the attack-haste convention: `1.0` is neutral,
//! `1 / 1.3` is 30% haste. Smaller multipliers mean faster regeneration.

use crate::bridge::GainCategory;
use crate::config::RuneConfig;
use crate::error::RuneError;

/// Converts a haste percentage into the multiplier used by [`RegenRate`].
///
/// - 0% → 1.0
/// - 30% → 1 / 1.3
/// - 100% → 0.5 (runes regenerate in half the time)
pub fn haste_from_percent(percent: f64) -> f64 {
    1.0 / (1.0 + percent / 100.0)
}

/// External inputs that alter the regeneration rate.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RateModifiers {
    pub haste: f64,
    pub double_speed: bool,
}

impl RateModifiers {
    pub const NEUTRAL: RateModifiers = RateModifiers {
        haste: 1.0,
        double_speed: false,
    };
}

impl Default for RateModifiers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Accessors the regeneration clock consults on every tick.
pub trait RateSource {
    /// Current attack-haste multiplier.
    fn haste_multiplier(&self) -> f64;

    /// Whether the double-speed buff is active right now.
    fn double_speed_active(&self) -> bool;

    fn rate_modifiers(&self) -> RateModifiers {
        RateModifiers {
            haste: self.haste_multiplier(),
            double_speed: self.double_speed_active(),
        }
    }
}

impl RateSource for RateModifiers {
    fn haste_multiplier(&self) -> f64 {
        self.haste
    }

    fn double_speed_active(&self) -> bool {
        self.double_speed
    }
}

/// Instantaneous regeneration rate in progress per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegenRate {
    per_second: f64,
    doubled: bool,
}

impl RegenRate {
    /// Computes the rate, rejecting non-positive or non-finite haste.
    pub fn new(config: &RuneConfig, modifiers: RateModifiers) -> Result<Self, RuneError> {
        config.validate()?;
        if !modifiers.haste.is_finite() || modifiers.haste <= 0.0 {
            return Err(RuneError::InvalidHaste(modifiers.haste));
        }

        let mut per_second = config.base_rate_per_second() / modifiers.haste;
        if modifiers.double_speed {
            per_second *= 2.0;
        }

        Ok(Self {
            per_second,
            doubled: modifiers.double_speed,
        })
    }

    pub fn from_source<R: RateSource + ?Sized>(
        config: &RuneConfig,
        source: &R,
    ) -> Result<Self, RuneError> {
        Self::new(config, source.rate_modifiers())
    }

    /// Neutral haste, no buff, default configuration: 0.1 per second.
    pub fn base() -> Self {
        Self {
            per_second: RuneConfig::new().base_rate_per_second(),
            doubled: false,
        }
    }

    pub const fn per_second(&self) -> f64 {
        self.per_second
    }

    pub const fn is_doubled(&self) -> bool {
        self.doubled
    }

    /// Progress gained over `elapsed_secs`.
    pub fn progress_over(&self, elapsed_secs: f64) -> f64 {
        self.per_second * elapsed_secs
    }

    /// Category that organic regeneration at this rate is booked under.
    pub const fn gain_category(&self) -> GainCategory {
        if self.doubled {
            GainCategory::DoubledRegeneration
        } else {
            GainCategory::Regeneration
        }
    }
}
