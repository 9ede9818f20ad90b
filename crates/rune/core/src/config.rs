use crate::error::RuneError;

/// Rune pool constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuneConfig {
    /// Seconds a single rune needs to regenerate from empty at neutral haste
    /// without the double-speed buff.
    pub base_regen_seconds: f64,
}

impl RuneConfig {
    // ===== compile-time constants used as type parameters =====
    /// Number of rune slots in a pool.
    pub const MAX_RUNES: usize = 6;
    /// Upper bound on slots regenerating at the same time.
    pub const MAX_REGENERATING: usize = 3;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BASE_REGEN_SECONDS: f64 = 10.0;

    pub fn new() -> Self {
        Self {
            base_regen_seconds: Self::DEFAULT_BASE_REGEN_SECONDS,
        }
    }

    pub fn with_base_regen_seconds(base_regen_seconds: f64) -> Self {
        Self { base_regen_seconds }
    }

    /// Progress per second at neutral haste.
    pub fn base_rate_per_second(&self) -> f64 {
        1.0 / self.base_regen_seconds
    }

    /// Rejects configurations that would produce a non-finite or
    /// non-positive regeneration rate.
    pub fn validate(&self) -> Result<(), RuneError> {
        if !self.base_regen_seconds.is_finite() || self.base_regen_seconds <= 0.0 {
            return Err(RuneError::InvalidConfig(
                "base_regen_seconds must be finite and positive",
            ));
        }
        Ok(())
    }
}

const _: () = assert!(RuneConfig::MAX_REGENERATING <= RuneConfig::MAX_RUNES);

impl Default for RuneConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rate_is_one_tenth_per_second() {
        let config = RuneConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.base_rate_per_second() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_regen_time() {
        assert!(RuneConfig::with_base_regen_seconds(0.0).validate().is_err());
        assert!(RuneConfig::with_base_regen_seconds(-3.0).validate().is_err());
        assert!(RuneConfig::with_base_regen_seconds(f64::NAN).validate().is_err());
    }
}
