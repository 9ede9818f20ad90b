//! Economy bridge between the pool and the rest of the simulation.
//!
//! The bridge keeps an externally visible rune counter equal to the number of
//! `Full` slots, so generic resource checks elsewhere can ask "how many runes
//! are available" without touching the pool, and turns every fill, overflow and
//! waste event into a categorized [`GainRecord`]. It owns no slot state.

use strum::{EnumCount, IntoEnumIterator};

/// Origin of a rune gain, used to split statistics.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GainCategory {
    /// Organic regeneration at the normal rate.
    Regeneration,
    /// Organic regeneration while the double-speed buff is active.
    DoubledRegeneration,
    /// Probabilistic single-rune refill.
    Replenish,
    /// Bulk refill of every non-full rune.
    Empower,
    /// Explicit fill or replenish requested by an ability.
    Administrative,
}

impl GainCategory {
    const fn index(self) -> usize {
        self as usize
    }
}

/// A single gain event.
///
/// `actual` is rune value that landed in a slot; `overflow` is value that had
/// nowhere to go (already-full target, discarded regeneration, wasted refill).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainRecord {
    pub category: GainCategory,
    pub actual: f64,
    pub overflow: f64,
}

impl GainRecord {
    pub const fn gained(category: GainCategory, actual: f64) -> Self {
        Self {
            category,
            actual,
            overflow: 0.0,
        }
    }

    pub const fn wasted(category: GainCategory, overflow: f64) -> Self {
        Self {
            category,
            actual: 0.0,
            overflow,
        }
    }
}

/// Statistics sink accepting gain records.
pub trait GainSink {
    fn record(&mut self, record: GainRecord);
}

impl GainSink for Vec<GainRecord> {
    fn record(&mut self, record: GainRecord) {
        self.push(record);
    }
}

impl<T: GainSink + ?Sized> GainSink for &mut T {
    fn record(&mut self, record: GainRecord) {
        (**self).record(record);
    }
}

/// Accumulated totals for one category.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryTotals {
    pub actual: f64,
    pub overflow: f64,
    pub records: u64,
}

/// Default sink: per-category running totals.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainLedger {
    totals: [CategoryTotals; GainCategory::COUNT],
}

impl GainLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self, category: GainCategory) -> CategoryTotals {
        self.totals[category.index()]
    }

    /// Iterates categories in declaration order with their totals.
    pub fn iter(&self) -> impl Iterator<Item = (GainCategory, CategoryTotals)> + '_ {
        GainCategory::iter().map(|category| (category, self.totals(category)))
    }

    pub fn total_actual(&self) -> f64 {
        self.totals.iter().map(|t| t.actual).sum()
    }

    pub fn total_overflow(&self) -> f64 {
        self.totals.iter().map(|t| t.overflow).sum()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl GainSink for GainLedger {
    fn record(&mut self, record: GainRecord) {
        let totals = &mut self.totals[record.category.index()];
        totals.actual += record.actual;
        totals.overflow += record.overflow;
        totals.records += 1;
    }
}

/// Synchronizes the external rune counter and forwards gain records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EconomyBridge<S = GainLedger> {
    available: u32,
    ready_events: u64,
    wasted_refills: u64,
    sink: S,
}

impl<S: GainSink> EconomyBridge<S> {
    pub fn new(available: u32, sink: S) -> Self {
        Self {
            available,
            ready_events: 0,
            wasted_refills: 0,
            sink,
        }
    }

    /// Number of ready runes as seen by consumption checks elsewhere.
    pub const fn available(&self) -> u32 {
        self.available
    }

    /// How many times a non-full rune became ready.
    pub const fn ready_events(&self) -> u64 {
        self.ready_events
    }

    /// How many refill requests found nothing to refill.
    pub const fn wasted_refills(&self) -> u64 {
        self.wasted_refills
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub(crate) fn on_consume(&mut self) {
        debug_assert!(self.available > 0, "rune counter underflow");
        self.available -= 1;
    }

    /// One fill, exactly one record. Filling an already-full rune grants
    /// nothing and is booked as overflow.
    pub(crate) fn on_fill(&mut self, category: GainCategory, was_full: bool) {
        if was_full {
            self.sink.record(GainRecord::wasted(category, 1.0));
        } else {
            self.available += 1;
            self.ready_events += 1;
            self.sink.record(GainRecord::gained(category, 1.0));
        }
    }

    pub(crate) fn on_overflow(&mut self, category: GainCategory, amount: f64) {
        self.sink.record(GainRecord::wasted(category, amount));
    }

    pub(crate) fn on_wasted_refill(&mut self, category: GainCategory) {
        self.wasted_refills += 1;
        self.sink.record(GainRecord::wasted(category, 1.0));
    }

    /// Resets the counter without recording gains (iteration boundary).
    pub(crate) fn reset_available(&mut self, available: u32) {
        self.available = available;
    }
}
