//! Value table mapping encoded board states to value estimates

use std::collections::BTreeMap;

use super::LEARNING_RATE;
use crate::identifiers::StateKey;

/// Learned value estimate per board state.
///
/// Keys that were never updated read as `0.0`. Entries are kept ordered by
/// key so persisted tables are written in a stable order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    values: BTreeMap<StateKey, f64>,
}

impl ValueTable {
    /// Value assumed for a state with no entry
    pub const DEFAULT_VALUE: f64 = 0.0;

    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, or `0.0` when unseen
    pub fn get(&self, key: StateKey) -> f64 {
        self.get_or(key, Self::DEFAULT_VALUE)
    }

    /// Value of `key`, or `default` when unseen
    pub fn get_or(&self, key: StateKey, default: f64) -> f64 {
        self.values.get(&key).copied().unwrap_or(default)
    }

    /// Set the value of `key`, replacing any earlier estimate
    pub fn set(&mut self, key: StateKey, value: f64) {
        self.values.insert(key, value);
    }

    /// Move the estimate of `key` a step towards `target`.
    ///
    /// V(s) ← V(s) + α (target − V(s))
    ///
    /// Returns the updated value.
    pub fn td_update(&mut self, key: StateKey, target: f64) -> f64 {
        let current = self.get(key);
        let updated = current + LEARNING_RATE * (target - current);
        self.set(key, updated);
        updated
    }

    pub fn contains(&self, key: StateKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Number of states with an estimate
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (StateKey, f64)> + '_ {
        self.values.iter().map(|(&key, &value)| (key, value))
    }

    /// The same table seen from the other mark: every key has X and O swapped.
    #[must_use]
    pub fn relabeled(&self) -> Self {
        self.iter()
            .map(|(key, value)| (key.swap_marks(), value))
            .collect()
    }
}

impl FromIterator<(StateKey, f64)> for ValueTable {
    fn from_iter<I: IntoIterator<Item = (StateKey, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: u32) -> StateKey {
        StateKey::new(raw).unwrap()
    }

    #[test]
    fn test_unseen_states_default_to_zero() {
        let table = ValueTable::new();
        assert_eq!(table.get(key(81)), 0.0);
        assert_eq!(table.get_or(key(81), -2.0), -2.0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_set_get() {
        let mut table = ValueTable::new();
        table.set(key(81), 0.75);
        table.set(key(81), -0.25);
        assert_eq!(table.get(key(81)), -0.25);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_td_update_moves_towards_target() {
        let mut table = ValueTable::new();
        let first = table.td_update(key(5), 1.0);
        assert!((first - 0.1).abs() < 1e-12);

        // 0.1 + 0.1 * (1.0 - 0.1) = 0.19
        let second = table.td_update(key(5), 1.0);
        assert!((second - 0.19).abs() < 1e-12);
    }

    #[test]
    fn test_iter_is_key_ordered() {
        let table: ValueTable = [(key(9), 0.1), (key(1), 0.2), (key(4), 0.3)]
            .into_iter()
            .collect();
        let keys: Vec<u32> = table.iter().map(|(k, _)| k.value()).collect();
        assert_eq!(keys, vec![1, 4, 9]);
    }

    #[test]
    fn test_relabeled_swaps_marks_in_keys() {
        let mut table = ValueTable::new();
        // X in cell 0
        table.set(key(1), 0.5);
        let relabeled = table.relabeled();
        // O in cell 0
        assert_eq!(relabeled.get(key(2)), 0.5);
        assert!(!relabeled.contains(key(1)));
    }
}
