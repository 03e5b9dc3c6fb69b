//! Domain identifier types for board states and persisted models.
//!
//! These types provide type-safe wrappers around the integers used as value
//! table keys and model file numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of distinct 9-cell boards (3^9).
pub const STATE_SPACE_SIZE: u32 = 19_683;

/// Base-3 encoding of a full board configuration.
///
/// Cell `i` contributes `digit * 3^i`, where the digit is 0 for an empty
/// cell, 1 for X and 2 for O. Every key below [`STATE_SPACE_SIZE`] names
/// exactly one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateKey(u32);

impl StateKey {
    /// Create a key, validating it lies inside the board state space.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if `value >= 3^9`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tictactoe_td::identifiers::StateKey;
    ///
    /// assert_eq!(StateKey::new(81).unwrap().value(), 81);
    /// assert!(StateKey::new(19_683).is_err());
    /// ```
    pub fn new(value: u32) -> Result<Self, crate::Error> {
        if value < STATE_SPACE_SIZE {
            Ok(Self(value))
        } else {
            Err(crate::Error::InvalidConfiguration {
                message: format!("state key {value} exceeds board state space"),
            })
        }
    }

    pub(crate) const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Get the inner value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Base-3 digits of the key, least significant (cell 0) first.
    pub fn digits(self) -> [u8; 9] {
        let mut digits = [0u8; 9];
        let mut rest = self.0;
        for digit in &mut digits {
            *digit = (rest % 3) as u8;
            rest /= 3;
        }
        digits
    }

    /// Key of the same board with every X replaced by O and vice versa.
    ///
    /// # Examples
    ///
    /// ```
    /// use tictactoe_td::identifiers::StateKey;
    ///
    /// // X in cell 0, O in cell 1: 1 + 2*3 = 7  ->  O in cell 0, X in cell 1: 2 + 1*3 = 5
    /// let key = StateKey::new(7).unwrap();
    /// assert_eq!(key.swap_marks().value(), 5);
    /// ```
    #[must_use]
    pub fn swap_marks(self) -> Self {
        let swapped = self
            .digits()
            .iter()
            .rev()
            .fold(0u32, |acc, &digit| acc * 3 + [0, 2, 1][digit as usize]);
        Self(swapped)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<StateKey> for u32 {
    fn from(key: StateKey) -> Self {
        key.0
    }
}

/// Number of a persisted value table.
///
/// Model ids start at 1; a fresh install has no models and training allocates
/// the smallest id without a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ModelId(u32);

impl ModelId {
    /// The first model id.
    pub const FIRST: ModelId = ModelId(1);

    /// Create a model id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] for zero.
    pub fn new(value: u32) -> Result<Self, crate::Error> {
        if value == 0 {
            Err(crate::Error::InvalidConfiguration {
                message: "model ids start at 1".to_string(),
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Get the inner value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// The id following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ModelId {
    type Error = crate::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelId> for u32 {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_are_little_endian() {
        // O in cell 8 only
        let key = StateKey::new(2 * 6561).unwrap();
        assert_eq!(key.digits(), [0, 0, 0, 0, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn test_swap_marks_is_an_involution() {
        for raw in [0, 1, 2, 7, 4_000, 12_345, STATE_SPACE_SIZE - 1] {
            let key = StateKey::new(raw).unwrap();
            assert_eq!(key.swap_marks().swap_marks(), key);
        }
    }

    #[test]
    fn test_model_id_rejects_zero() {
        assert!(ModelId::new(0).is_err());
        assert_eq!(ModelId::new(3).unwrap().next().value(), 4);
    }

    #[test]
    fn test_model_id_serde_validates() {
        let id: ModelId = serde_json::from_str("5").unwrap();
        assert_eq!(id.value(), 5);
        assert!(serde_json::from_str::<ModelId>("0").is_err());
    }
}
