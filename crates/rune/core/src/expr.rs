//! Named rune queries for action-priority conditions.
//!
//! Expressions are written as `count`, `cooldown_min`, `cooldown_max`,
//! `frac` and `ready_in.N`. Names are case-insensitive; the empty string is an
//! alias for `count`.

use core::fmt;
use core::str::FromStr;

use crate::bridge::GainSink;
use crate::config::RuneConfig;
use crate::error::RuneError;
use crate::pool::RunePool;
use crate::rate::RegenRate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuneExpression {
    /// Number of full runes.
    ReadyCount,
    /// Seconds until the next rune is ready.
    CooldownMin,
    /// Seconds until every rune is full.
    CooldownMax,
    /// Sum of slot progress.
    Fractional,
    /// Seconds until at least `n` runes are ready.
    ReadyIn(usize),
}

impl RuneExpression {
    pub fn parse(input: &str) -> Result<Self, RuneError> {
        let name = input.trim().to_ascii_lowercase();

        let expr = match name.as_str() {
            "" | "count" => Self::ReadyCount,
            "cooldown_min" => Self::CooldownMin,
            "cooldown_max" => Self::CooldownMax,
            "frac" | "fractional" => Self::Fractional,
            other => {
                let n = other
                    .strip_prefix("ready_in.")
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|&n| n <= RuneConfig::MAX_RUNES)
                    .ok_or_else(|| RuneError::UnknownExpression(input.to_owned()))?;
                Self::ReadyIn(n)
            }
        };
        Ok(expr)
    }

    pub fn evaluate<S: GainSink>(&self, pool: &RunePool<S>, rate: RegenRate) -> f64 {
        match *self {
            Self::ReadyCount => pool.ready_count() as f64,
            Self::CooldownMin => pool.min_time_to_next_ready(rate),
            Self::CooldownMax => pool.max_time_to_full(rate),
            Self::Fractional => pool.ready_fraction(),
            Self::ReadyIn(n) => pool.time_until_n_ready(n, rate).unwrap_or(f64::INFINITY),
        }
    }
}

impl FromStr for RuneExpression {
    type Err = RuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RuneExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadyCount => f.write_str("count"),
            Self::CooldownMin => f.write_str("cooldown_min"),
            Self::CooldownMax => f.write_str("cooldown_max"),
            Self::Fractional => f.write_str("frac"),
            Self::ReadyIn(n) => write!(f, "ready_in.{n}"),
        }
    }
}
