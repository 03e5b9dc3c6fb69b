//! In-memory value table repository for testing.
//!
//! This adapter keeps tables in a shared map, enabling fast tests without
//! any file system I/O.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{Result, identifiers::ModelId, ports::ValueTableRepository, td_learning::ValueTable};

/// In-memory repository for testing.
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
/// repo.save(ModelId::FIRST, &ValueTable::new())?;
///
/// let loaded = repo.load(ModelId::FIRST)?;
/// assert!(loaded.is_empty());
/// # Ok::<(), tictactoe_td::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<BTreeMap<ModelId, ValueTable>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of models currently stored.
    ///
    /// Useful for testing to verify save operations occurred.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Remove every stored table.
    pub fn clear(&self) {
        self.storage().clear();
    }

    fn storage(&self) -> MutexGuard<'_, BTreeMap<ModelId, ValueTable>> {
        // A panicking writer cannot leave a half-inserted table behind
        self.storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ValueTableRepository for InMemoryRepository {
    fn load(&self, model_id: ModelId) -> Result<ValueTable> {
        Ok(self.storage().get(&model_id).cloned().unwrap_or_default())
    }

    fn save(&self, model_id: ModelId, table: &ValueTable) -> Result<()> {
        self.storage().insert(model_id, table.clone());
        Ok(())
    }

    fn exists(&self, model_id: ModelId) -> bool {
        self.storage().contains_key(&model_id)
    }

    fn model_ids(&self) -> Result<Vec<ModelId>> {
        Ok(self.storage().keys().copied().collect())
    }
}
