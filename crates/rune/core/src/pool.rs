//! Rune pool: fixed slots, regeneration cap and overflow redistribution.
//!
//! Slots live in a fixed array and are addressed by index; every side effect
//! that touches a sibling (promotion, overflow landing) goes through the pool.
//!
//! # Invariants
//!
//! Checked after every mutation (debug builds):
//! - `count(Regenerating) <= MAX_REGENERATING`
//! - `count(Depleted) == MAX_RUNES - count(Full) - count(Regenerating)`
//! - the bridge counter equals `count(Full)`
//!
//! # Promotion
//!
//! A depleted slot starts regenerating only as a side effect of `consume` or
//! `fill`, through [`RunePool::try_promote_one_depleted`]. The regeneration
//! step relies on states being consistent at the start of every tick and
//! never promotes on its own.

use core::fmt;
use core::time::Duration;

use arrayvec::ArrayVec;

use crate::bridge::{EconomyBridge, GainCategory, GainLedger, GainSink};
use crate::config::RuneConfig;
use crate::error::RuneError;
use crate::rate::RegenRate;
use crate::rng::{PcgRng, RngOracle};
use crate::slot::{Advance, RuneSlot, RuneState};

const MAX_RUNES: usize = RuneConfig::MAX_RUNES;
const MAX_REGENERATING: usize = RuneConfig::MAX_REGENERATING;

/// Chooses which slot an explicit fill targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlotSelector {
    /// A specific slot by index.
    Index(usize),
    /// First depleted slot in index order.
    FirstDepleted,
    /// First regenerating slot in index order (its partial progress is lost).
    FirstRegenerating,
    /// Uniformly random depleted slot, drawn from `seed`.
    RandomDepleted { seed: u64 },
}

/// What an explicit fill did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillOutcome {
    /// Slot that was filled.
    pub slot: usize,
    /// Depleted slot promoted to regenerating as a consequence, if any.
    pub promoted: Option<usize>,
}

/// Plain copy of the pool state, used for traces and digests.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolSnapshot {
    pub states: [RuneState; MAX_RUNES],
    pub progress: [f64; MAX_RUNES],
    pub available: u32,
}

/// Fixed-size pool of rune slots owned by a single actor.
#[derive(Clone, Debug)]
pub struct RunePool<S = GainLedger> {
    slots: [RuneSlot; MAX_RUNES],
    bridge: EconomyBridge<S>,
}

impl RunePool<GainLedger> {
    /// Creates a pool with every slot full and a fresh [`GainLedger`].
    pub fn new() -> Self {
        Self::with_sink(GainLedger::new())
    }
}

impl Default for RunePool<GainLedger> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GainSink> RunePool<S> {
    /// Creates a pool with every slot full, reporting gains into `sink`.
    pub fn with_sink(sink: S) -> Self {
        Self {
            slots: [RuneSlot::FULL; MAX_RUNES],
            bridge: EconomyBridge::new(MAX_RUNES as u32, sink),
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn slots(&self) -> &[RuneSlot; MAX_RUNES] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Result<&RuneSlot, RuneError> {
        self.slots.get(index).ok_or(RuneError::SlotOutOfRange {
            index,
            len: MAX_RUNES,
        })
    }

    pub fn bridge(&self) -> &EconomyBridge<S> {
        &self.bridge
    }

    pub fn sink(&self) -> &S {
        self.bridge.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.bridge.sink_mut()
    }

    /// Total slots currently in `state`.
    pub fn count_in_state(&self, state: RuneState) -> usize {
        self.slots.iter().filter(|s| s.state() == state).count()
    }

    /// First slot (in index order) in `state`.
    pub fn first_in_state(&self, state: RuneState) -> Option<usize> {
        self.slots.iter().position(|s| s.state() == state)
    }

    pub fn regenerating_count(&self) -> usize {
        self.count_in_state(RuneState::Regenerating)
    }

    pub fn depleted_count(&self) -> usize {
        self.count_in_state(RuneState::Depleted)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            states: self.slots.map(|s| s.state()),
            progress: self.slots.map(|s| s.progress()),
            available: self.bridge.available(),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Consumes `n` full runes, first full slot first.
    ///
    /// # Panics
    ///
    /// Callers must check availability first. Consuming more runes than are
    /// ready is a programming error and panics; clamping would desync the
    /// external rune counter.
    pub fn consume(&mut self, n: u32) {
        let available = self.count_in_state(RuneState::Full);
        assert!(
            available >= n as usize,
            "consumed {n} runes with only {available} ready"
        );

        for _ in 0..n {
            if let Some(index) = self.first_in_state(RuneState::Full) {
                self.consume_slot(index);
            }
        }

        tracing::debug!(runes = %self, consumed = n, "runes consumed");
    }

    /// Checked variant of [`consume`](Self::consume): leaves the pool
    /// untouched when fewer than `n` runes are ready.
    pub fn try_consume(&mut self, n: u32) -> Result<(), RuneError> {
        let available = self.count_in_state(RuneState::Full) as u32;
        if available < n {
            return Err(RuneError::InsufficientRunes {
                requested: n,
                available,
            });
        }
        self.consume(n);
        Ok(())
    }

    /// Forces the selected slot full and books one gain under `category`.
    ///
    /// Returns `Ok(None)` when the selector matches no slot.
    pub fn fill(
        &mut self,
        selector: SlotSelector,
        category: GainCategory,
    ) -> Result<Option<FillOutcome>, RuneError> {
        let Some(slot) = self.select(selector)? else {
            return Ok(None);
        };

        let promoted = self.fill_slot(slot, category);
        Ok(Some(FillOutcome { slot, promoted }))
    }

    /// Fills the slot at `index`, which the caller took from [`slots`](Self::slots).
    pub(crate) fn fill_index(&mut self, index: usize, category: GainCategory) -> Option<usize> {
        self.fill_slot(index, category)
    }

    /// Best-effort refill of up to `n` runes.
    ///
    /// Each unit prefers a depleted slot, then a regenerating one (dropping
    /// its partial progress). A unit with nowhere to go is booked as wasted.
    /// Returns how many units were granted.
    pub fn replenish(&mut self, n: u32, category: GainCategory) -> u32 {
        let mut granted = 0;

        for _ in 0..n {
            let target = self
                .first_in_state(RuneState::Depleted)
                .or_else(|| self.first_in_state(RuneState::Regenerating));

            match target {
                Some(index) => {
                    self.fill_slot(index, category);
                    granted += 1;
                }
                None => {
                    tracing::debug!(%category, "replenish wasted, all runes full");
                    self.bridge.on_wasted_refill(category);
                }
            }
        }

        granted
    }

    /// Forces every slot full. Used at simulation-iteration boundaries; books
    /// no gains.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.reset();
        }
        self.bridge.reset_available(MAX_RUNES as u32);
        self.check_invariants();
    }

    /// Advances every slot by `elapsed` at `rate`, in index order.
    ///
    /// - `Regenerating` slots gain `rate × elapsed`. On completion the slot is
    ///   filled and the excess lands in the slot promoted by that fill; with no
    ///   slot to land in, the excess is booked as overflow and dropped.
    /// - `Full` slots do not move, but while the pool has a free regeneration
    ///   lane the would-be progress is booked as overflow.
    /// - `Depleted` slots never move on their own.
    ///
    /// A slot promoted during this call already received its share through
    /// overflow and is not advanced again in the same call.
    pub fn regenerate(&mut self, elapsed: Duration, rate: RegenRate) {
        let amount = rate.progress_over(elapsed.as_secs_f64());
        if amount <= 0.0 {
            return;
        }

        let category = rate.gain_category();
        let mut promoted_this_tick = [false; MAX_RUNES];

        for index in 0..MAX_RUNES {
            if promoted_this_tick[index] {
                continue;
            }

            match self.slots[index].state() {
                RuneState::Full => {
                    if self.regenerating_count() < MAX_REGENERATING {
                        self.bridge.on_overflow(category, amount);
                    }
                }
                RuneState::Depleted => {}
                RuneState::Regenerating => {
                    if let Advance::Completed { overflow } = self.slots[index].advance(amount) {
                        self.complete(index, overflow, category, &mut promoted_this_tick);
                    }
                }
            }
        }

        self.check_invariants();
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn select(&self, selector: SlotSelector) -> Result<Option<usize>, RuneError> {
        let index = match selector {
            SlotSelector::Index(index) => {
                self.slot(index)?;
                Some(index)
            }
            SlotSelector::FirstDepleted => self.first_in_state(RuneState::Depleted),
            SlotSelector::FirstRegenerating => self.first_in_state(RuneState::Regenerating),
            SlotSelector::RandomDepleted { seed } => {
                let depleted: ArrayVec<usize, MAX_RUNES> = self
                    .slots
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.is_depleted())
                    .map(|(i, _)| i)
                    .collect();

                if depleted.is_empty() {
                    None
                } else {
                    let pick = PcgRng.range(seed, 0, depleted.len() as u32 - 1);
                    Some(depleted[pick as usize])
                }
            }
        };
        Ok(index)
    }

    fn consume_slot(&mut self, index: usize) {
        self.slots[index].deplete();
        self.bridge.on_consume();
        self.try_promote_one_depleted();
        self.check_invariants();
    }

    /// Fills `index` and returns the slot promoted to take over its lane.
    fn fill_slot(&mut self, index: usize, category: GainCategory) -> Option<usize> {
        let was_full = self.slots[index].fill();
        self.bridge.on_fill(category, was_full);
        tracing::trace!(slot = index, %category, was_full, "rune filled");

        let promoted = self.try_promote_one_depleted();
        self.check_invariants();
        promoted
    }

    /// Promotes the first depleted slot if a regeneration lane is free.
    fn try_promote_one_depleted(&mut self) -> Option<usize> {
        if self.regenerating_count() >= MAX_REGENERATING {
            return None;
        }

        let index = self.first_in_state(RuneState::Depleted)?;
        self.slots[index].promote();
        tracing::trace!(slot = index, "rune promoted to regenerating");
        Some(index)
    }

    /// Fills a slot whose progress completed and carries `overflow` into the
    /// promoted sibling, cascading if the carry completes that sibling too.
    fn complete(
        &mut self,
        index: usize,
        overflow: f64,
        category: GainCategory,
        promoted_this_tick: &mut [bool; MAX_RUNES],
    ) {
        let mut carry = overflow;
        let mut landing = self.fill_slot(index, category);

        while let Some(target) = landing {
            promoted_this_tick[target] = true;
            match self.slots[target].advance(carry) {
                Advance::Partial => return,
                Advance::Completed { overflow } => {
                    carry = overflow;
                    landing = self.fill_slot(target, category);
                }
            }
        }

        if carry > 0.0 {
            tracing::trace!(slot = index, overflow = carry, "regeneration overflow discarded");
            self.bridge.on_overflow(category, carry);
        }
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.regenerating_count() <= MAX_REGENERATING,
            "more than {MAX_REGENERATING} runes regenerating: {self}"
        );
        debug_assert_eq!(
            self.depleted_count(),
            MAX_RUNES - self.count_in_state(RuneState::Full) - self.regenerating_count(),
        );
        debug_assert_eq!(
            self.bridge.available() as usize,
            self.count_in_state(RuneState::Full),
            "rune counter out of sync: {self}"
        );
        debug_assert!(
            self.slots.iter().all(RuneSlot::is_consistent),
            "slot state/progress mismatch: {self}"
        );
    }
}

/// `FFrrdd [1.00][1.00][0.42][0.10][0.00][0.00]`
impl<S> fmt::Display for RunePool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.slots {
            write!(f, "{}", slot.state().letter())?;
        }
        f.write_str(" ")?;
        for slot in &self.slots {
            write!(f, "[{:.2}]", slot.progress())?;
        }
        Ok(())
    }
}
