//! Per-rune state machine.
//!
//! A slot cycles `Full → Depleted → Regenerating → Full`. Slots never look at
//! their siblings; promotions and overflow redistribution are pool-level
//! operations addressed by slot index (see [`crate::pool`]).

/// Lifecycle state of a single rune.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuneState {
    /// Consumed and waiting for a regeneration lane.
    Depleted,
    /// Accumulating progress toward `Full`.
    Regenerating,
    /// Ready to be consumed.
    Full,
}

impl RuneState {
    /// Single-letter code used in status lines.
    pub const fn letter(self) -> char {
        match self {
            RuneState::Depleted => 'd',
            RuneState::Regenerating => 'r',
            RuneState::Full => 'F',
        }
    }
}

/// Result of advancing a regenerating slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Advance {
    /// Progress moved but the slot is still regenerating.
    Partial,
    /// Progress reached 1.0; the slot must be filled and `overflow` carried.
    Completed { overflow: f64 },
}

/// One rune with continuous progress toward readiness.
///
/// Invariants:
/// - `Full` ⇔ `progress == 1.0`
/// - `Depleted` ⇒ `progress == 0.0`
/// - `Regenerating` ⇒ `0.0 <= progress < 1.0`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuneSlot {
    state: RuneState,
    progress: f64,
}

impl RuneSlot {
    pub const FULL: RuneSlot = RuneSlot {
        state: RuneState::Full,
        progress: 1.0,
    };

    pub const fn full() -> Self {
        Self::FULL
    }

    pub const fn state(&self) -> RuneState {
        self.state
    }

    pub const fn progress(&self) -> f64 {
        self.progress
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self.state, RuneState::Full)
    }

    pub const fn is_regenerating(&self) -> bool {
        matches!(self.state, RuneState::Regenerating)
    }

    pub const fn is_depleted(&self) -> bool {
        matches!(self.state, RuneState::Depleted)
    }

    /// Seconds until this slot alone becomes ready at `rate` progress/second.
    ///
    /// Ignores the regeneration cap; see [`crate::RunePool::queued_ready_times`]
    /// for the lane-aware estimate.
    pub fn time_to_ready(&self, rate_per_second: f64) -> f64 {
        if self.is_ready() {
            0.0
        } else {
            (1.0 - self.progress) / rate_per_second
        }
    }

    pub(crate) fn deplete(&mut self) {
        debug_assert!(self.is_ready(), "only full runes can be consumed");
        self.state = RuneState::Depleted;
        self.progress = 0.0;
    }

    /// Starts regeneration. Progress stays at 0.0; its clock starts now.
    pub(crate) fn promote(&mut self) {
        debug_assert!(self.is_depleted(), "only depleted runes can be promoted");
        self.state = RuneState::Regenerating;
    }

    /// Forces the slot full. Returns whether it was already full.
    pub(crate) fn fill(&mut self) -> bool {
        let was_full = self.is_ready();
        self.state = RuneState::Full;
        self.progress = 1.0;
        was_full
    }

    pub(crate) fn advance(&mut self, amount: f64) -> Advance {
        debug_assert!(self.is_regenerating());
        let new_progress = self.progress + amount;
        if new_progress >= 1.0 {
            Advance::Completed {
                overflow: new_progress - 1.0,
            }
        } else {
            self.progress = new_progress;
            Advance::Partial
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::FULL;
    }

    pub(crate) fn is_consistent(&self) -> bool {
        match self.state {
            RuneState::Full => self.progress == 1.0,
            RuneState::Depleted => self.progress == 0.0,
            RuneState::Regenerating => (0.0..1.0).contains(&self.progress),
        }
    }
}

impl Default for RuneSlot {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_states() {
        let mut slot = RuneSlot::full();
        assert!(slot.is_ready());

        slot.deplete();
        assert_eq!(slot.state(), RuneState::Depleted);
        assert_eq!(slot.progress(), 0.0);

        slot.promote();
        assert_eq!(slot.state(), RuneState::Regenerating);
        assert_eq!(slot.progress(), 0.0);
        assert!(slot.is_consistent());

        assert_eq!(slot.advance(0.4), Advance::Partial);
        assert!((slot.progress() - 0.4).abs() < 1e-12);

        match slot.advance(0.7) {
            Advance::Completed { overflow } => assert!((overflow - 0.1).abs() < 1e-12),
            other => panic!("expected completion, got {other:?}"),
        }

        assert!(!slot.fill());
        assert!(slot.is_ready());
        assert_eq!(slot.progress(), 1.0);
        assert!(slot.is_consistent());
    }

    #[test]
    fn exact_completion_has_zero_overflow() {
        let mut slot = RuneSlot::full();
        slot.deplete();
        slot.promote();
        assert_eq!(slot.advance(1.0), Advance::Completed { overflow: 0.0 });
    }

    #[test]
    fn time_to_ready_scales_with_rate() {
        let mut slot = RuneSlot::full();
        assert_eq!(slot.time_to_ready(0.1), 0.0);
        slot.deplete();
        assert!((slot.time_to_ready(0.1) - 10.0).abs() < 1e-9);
        assert!((slot.time_to_ready(0.2) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn letters_match_status_format() {
        assert_eq!(RuneState::Full.letter(), 'F');
        assert_eq!(RuneState::Regenerating.letter(), 'r');
        assert_eq!(RuneState::Depleted.letter(), 'd');
        assert_eq!(RuneState::Regenerating.to_string(), "Regenerating");
    }
}
