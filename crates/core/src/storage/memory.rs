use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::errors::CoreError;
use crate::models::snapshot::PersistedState;

use super::traits::SnapshotStore;

/// In-memory store. Clones share the same slot, so a test can hand one clone
/// to the tracker and inspect what was saved through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<Option<PersistedState>>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a snapshot.
    pub fn with_state(state: PersistedState) -> Self {
        let store = Self::new();
        *store.state.borrow_mut() = Some(state);
        store
    }

    /// Copy of the currently saved snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<PersistedState> {
        self.state.borrow().clone()
    }

    /// Number of `save` calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl SnapshotStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<Option<PersistedState>, CoreError> {
        Ok(self.snapshot())
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), CoreError> {
        *self.state.borrow_mut() = Some(state.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
