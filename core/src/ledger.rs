//! Availability ledger: the single source of truth for "can this be borrowed".
//!
//! The ledger only exposes compound adjustments (`reserve`, `release`,
//! `reclaim`). There is no raw setter, so callers cannot split a
//! check-then-decrement across two calls.

use crate::environment::Catalog;
use crate::error::LedgerError;
use crate::types::ItemId;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Per-item available stock counts
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    counts: BTreeMap<ItemId, u32>,
}

impl Ledger {
    /// Creates an empty ledger
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// Builds a ledger seeded from `catalog`
    #[must_use]
    pub fn seed(catalog: &dyn Catalog) -> Self {
        catalog.stock().into_iter().collect()
    }

    /// Available count for `item`; 0 for items the ledger has never seen
    #[must_use]
    pub fn get(&self, item: &ItemId) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    /// Whether the ledger tracks `item` at all (even with zero stock)
    #[must_use]
    pub fn contains(&self, item: &ItemId) -> bool {
        self.counts.contains_key(item)
    }

    /// Number of tracked items
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no items are tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates `(item, count)` pairs in item order
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.counts.iter().map(|(item, count)| (item, *count))
    }

    /// Takes one unit per occurrence of each item, all or nothing.
    ///
    /// Duplicates in `items` consume multiple units. Every item is checked
    /// before any count changes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::OutOfStock`] naming the first item (in list
    /// order) whose stock cannot cover the request. No count is modified.
    pub fn reserve(&mut self, items: &[ItemId]) -> Result<(), LedgerError> {
        let mut needed: BTreeMap<&ItemId, u32> = BTreeMap::new();
        for item in items {
            *needed.entry(item).or_insert(0) += 1;
        }

        for item in items {
            let wanted = needed.get(item).copied().unwrap_or(0);
            if self.get(item) < wanted {
                return Err(LedgerError::OutOfStock(item.clone()));
            }
        }

        for (item, wanted) in needed {
            if let Some(count) = self.counts.get_mut(item) {
                *count -= wanted;
            }
        }
        Ok(())
    }

    /// Gives back one unit per occurrence of each item. Never fails.
    ///
    /// Items the ledger did not track before start at zero; callers that
    /// treat the ledger as the catalog check [`contains`](Self::contains)
    /// first.
    pub fn release(&mut self, items: &[ItemId]) {
        for item in items {
            let count = self.counts.entry(item.clone()).or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    /// Takes back one unit per occurrence, clamping at zero.
    ///
    /// This is the inverse of [`release`](Self::release) used when a return
    /// is undone, so a redundant reversal can never drive a count negative.
    pub fn reclaim(&mut self, items: &[ItemId]) {
        for item in items {
            if let Some(count) = self.counts.get_mut(item) {
                *count = count.saturating_sub(1);
            }
        }
    }
}

impl FromIterator<(ItemId, u32)> for Ledger {
    fn from_iter<T: IntoIterator<Item = (ItemId, u32)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Ledger shared between several sessions.
///
/// Each compound operation runs inside a single lock acquisition, so two
/// submissions racing for the last unit cannot both succeed.
///
/// [`LendingController`](crate::LendingController) owns a plain [`Ledger`]
/// and does not use this type; it is for hosts that run several sessions
/// over one stock table.
#[derive(Clone, Debug, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    /// Wraps an existing ledger
    #[must_use]
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// See [`Ledger::get`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Poisoned`] if a previous holder panicked.
    pub fn get(&self, item: &ItemId) -> Result<u32, LedgerError> {
        let guard = self.inner.lock().map_err(|_| LedgerError::Poisoned)?;
        Ok(guard.get(item))
    }

    /// See [`Ledger::reserve`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::OutOfStock`] on shortfall, or
    /// [`LedgerError::Poisoned`] if a previous holder panicked.
    pub fn reserve(&self, items: &[ItemId]) -> Result<(), LedgerError> {
        let mut guard = self.inner.lock().map_err(|_| LedgerError::Poisoned)?;
        guard.reserve(items)
    }

    /// See [`Ledger::release`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Poisoned`] if a previous holder panicked.
    pub fn release(&self, items: &[ItemId]) -> Result<(), LedgerError> {
        let mut guard = self.inner.lock().map_err(|_| LedgerError::Poisoned)?;
        guard.release(items);
        Ok(())
    }

    /// See [`Ledger::reclaim`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Poisoned`] if a previous holder panicked.
    pub fn reclaim(&self, items: &[ItemId]) -> Result<(), LedgerError> {
        let mut guard = self.inner.lock().map_err(|_| LedgerError::Poisoned)?;
        guard.reclaim(items);
        Ok(())
    }

    /// Copy of the current counts
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Poisoned`] if a previous holder panicked.
    pub fn snapshot(&self) -> Result<Ledger, LedgerError> {
        let guard = self.inner.lock().map_err(|_| LedgerError::Poisoned)?;
        Ok(guard.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(names: &[&str]) -> Vec<ItemId> {
        names.iter().map(|n| ItemId::from(*n)).collect()
    }

    fn sample() -> Ledger {
        Ledger::from_iter([
            (ItemId::from("Breadboard"), 10),
            (ItemId::from("Switches"), 1),
            (ItemId::from("Potentiometer"), 0),
        ])
    }

    #[test]
    fn unknown_item_reads_zero() {
        assert_eq!(sample().get(&ItemId::from("Oscilloscope")), 0);
        assert!(!sample().contains(&ItemId::from("Oscilloscope")));
    }

    #[test]
    fn reserve_decrements_per_occurrence() {
        let mut ledger = sample();
        ledger
            .reserve(&ids(&["Breadboard", "Breadboard", "Switches"]))
            .unwrap();
        assert_eq!(ledger.get(&ItemId::from("Breadboard")), 8);
        assert_eq!(ledger.get(&ItemId::from("Switches")), 0);
    }

    #[test]
    fn reserve_is_all_or_nothing() {
        let mut ledger = sample();
        let before = ledger.clone();

        let err = ledger
            .reserve(&ids(&["Breadboard", "Potentiometer"]))
            .unwrap_err();

        assert_eq!(err, LedgerError::OutOfStock(ItemId::from("Potentiometer")));
        assert_eq!(ledger, before);
    }

    #[test]
    fn reserve_counts_duplicates_against_stock() {
        let mut ledger = sample();
        let err = ledger.reserve(&ids(&["Switches", "Switches"])).unwrap_err();
        assert_eq!(err, LedgerError::OutOfStock(ItemId::from("Switches")));
        assert_eq!(ledger.get(&ItemId::from("Switches")), 1);
    }

    #[test]
    fn reserve_unknown_item_is_out_of_stock() {
        let mut ledger = sample();
        let err = ledger.reserve(&ids(&["Oscilloscope"])).unwrap_err();
        assert_eq!(err, LedgerError::OutOfStock(ItemId::from("Oscilloscope")));
        assert!(!ledger.contains(&ItemId::from("Oscilloscope")));
    }

    #[test]
    fn reclaim_clamps_at_zero() {
        let mut ledger = sample();
        ledger.reclaim(&ids(&["Switches", "Switches", "Potentiometer"]));
        assert_eq!(ledger.get(&ItemId::from("Switches")), 0);
        assert_eq!(ledger.get(&ItemId::from("Potentiometer")), 0);
    }

    #[test]
    fn shared_ledger_serializes_last_unit() {
        let shared = SharedLedger::new(sample());
        let other = shared.clone();

        assert!(shared.reserve(&ids(&["Switches"])).is_ok());
        assert_eq!(
            other.reserve(&ids(&["Switches"])),
            Err(LedgerError::OutOfStock(ItemId::from("Switches")))
        );
        assert_eq!(shared.get(&ItemId::from("Switches")), Ok(0));
    }

    #[test]
    fn shared_ledger_across_threads_hands_out_each_unit_once() {
        let shared = SharedLedger::new(Ledger::from_iter([(ItemId::from("Breadboard"), 3)]));

        let granted = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let ledger = shared.clone();
                    scope.spawn(move || ledger.reserve(&ids(&["Breadboard"])).is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(granted, 3);
        assert_eq!(shared.get(&ItemId::from("Breadboard")), Ok(0));
    }

    fn item_strategy() -> impl Strategy<Value = ItemId> {
        prop_oneof![
            Just(ItemId::from("Breadboard")),
            Just(ItemId::from("Switches")),
            Just(ItemId::from("Potentiometer")),
            Just(ItemId::from("Oscilloscope")),
        ]
    }

    proptest! {
        #[test]
        fn reserve_then_release_restores_counts(items in prop::collection::vec(item_strategy(), 0..8)) {
            let mut ledger = Ledger::from_iter([
                (ItemId::from("Breadboard"), 20),
                (ItemId::from("Switches"), 20),
                (ItemId::from("Potentiometer"), 20),
                (ItemId::from("Oscilloscope"), 20),
            ]);
            let before = ledger.clone();

            ledger.reserve(&items).unwrap();
            ledger.release(&items);

            prop_assert_eq!(ledger, before);
        }

        #[test]
        fn failed_reserve_changes_nothing(items in prop::collection::vec(item_strategy(), 1..8)) {
            let mut ledger = sample();
            let before = ledger.clone();

            if ledger.reserve(&items).is_err() {
                prop_assert_eq!(ledger, before);
            }
        }

        #[test]
        fn counts_track_a_signed_model_and_stay_non_negative(
            ops in prop::collection::vec((0u8..3, prop::collection::vec(item_strategy(), 1..4)), 0..20)
        ) {
            let mut ledger = sample();
            let mut model: BTreeMap<ItemId, i64> =
                ledger.iter().map(|(item, count)| (item.clone(), i64::from(count))).collect();

            for (op, items) in ops {
                match op {
                    0 => {
                        if ledger.reserve(&items).is_ok() {
                            for item in &items {
                                *model.entry(item.clone()).or_insert(0) -= 1;
                            }
                        }
                    }
                    1 => {
                        ledger.release(&items);
                        for item in &items {
                            *model.entry(item.clone()).or_insert(0) += 1;
                        }
                    }
                    _ => {
                        ledger.reclaim(&items);
                        for item in &items {
                            if let Some(count) = model.get_mut(item) {
                                *count = (*count - 1).max(0);
                            }
                        }
                    }
                }

                for (item, expected) in &model {
                    prop_assert!(*expected >= 0);
                    prop_assert_eq!(i64::from(ledger.get(item)), *expected);
                }
            }
        }
    }
}
