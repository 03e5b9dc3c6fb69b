//! Repository port for value table persistence.
//!
//! This module defines the trait boundary between the learning core and the
//! storage that keeps one value table per model id.

use crate::{Result, identifiers::ModelId, td_learning::ValueTable};

/// Port for persisting and loading value tables by model id.
///
/// # Examples
///
/// ```
/// use tictactoe_td::adapters::InMemoryRepository;
/// use tictactoe_td::identifiers::ModelId;
/// use tictactoe_td::ports::ValueTableRepository;
/// use tictactoe_td::td_learning::ValueTable;
///
/// let repo = InMemoryRepository::new();
/// assert_eq!(repo.next_free_id()?, ModelId::FIRST);
///
/// repo.save(ModelId::FIRST, &ValueTable::new())?;
/// assert_eq!(repo.next_free_id()?.value(), 2);
/// # Ok::<(), tictactoe_td::Error>(())
/// ```
pub trait ValueTableRepository: Send + Sync {
    /// Load the table persisted for `model_id`.
    ///
    /// A model without a persisted table loads as an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored table exists but cannot be read or
    /// contains a malformed row. No partial table is returned.
    fn load(&self, model_id: ModelId) -> Result<ValueTable>;

    /// Write the full table for `model_id`, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be written. Callers must not
    /// swallow it: trained values would be lost silently.
    fn save(&self, model_id: ModelId, table: &ValueTable) -> Result<()>;

    /// Whether a table has been persisted for `model_id`.
    fn exists(&self, model_id: ModelId) -> bool;

    /// All model ids with a persisted table, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be listed.
    fn model_ids(&self) -> Result<Vec<ModelId>>;

    /// Smallest model id without a persisted table.
    ///
    /// # Errors
    ///
    /// The default implementation never fails; adapters that must query an
    /// external store may.
    fn next_free_id(&self) -> Result<ModelId> {
        let mut id = ModelId::FIRST;
        while self.exists(id) {
            id = id.next();
        }
        Ok(id)
    }
}
