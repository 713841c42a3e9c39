// Record store abstraction and the in-memory implementation

use crate::error::{Result, TodoError};
use crate::record::Todo;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Concurrent store of todo records keyed by `(user_id, id)`
///
/// Implementations serialize every operation through one lock, so a
/// completed `add_item`/`update_item` is visible to every later `get_item`
/// and concurrent updates of the same key resolve last-writer-wins.
/// Records reaching the store are assumed to be validated already.
pub trait TodoStore: Send + Sync + 'static {
    /// Insert a record, assigning a fresh id if it has none
    fn add_item(&self, item: Todo) -> Result<Todo>;

    /// Look up a record by its exact `(user_id, id)` pair
    fn get_item(&self, user_id: &str, id: Uuid) -> Result<Todo>;

    /// Replace an existing record wholesale; never inserts
    fn update_item(&self, item: Todo) -> Result<Todo>;

    /// Flush pending state to durable storage
    fn close(&self) -> Result<()>;
}

/// Handle shared between request handlers
pub type SharedStore = Arc<dyn TodoStore>;

/// Records indexed by user, then by id
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserIndex {
    users: HashMap<String, HashMap<Uuid, Todo>>,
}

impl UserIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite, assigning an id when missing
    pub fn insert(&mut self, mut item: Todo) -> Todo {
        if !item.has_id() {
            item.id = Uuid::new_v4();
        }
        self.users
            .entry(item.user_id.clone())
            .or_default()
            .insert(item.id, item.clone());
        item
    }

    pub fn get(&self, user_id: &str, id: Uuid) -> Option<&Todo> {
        self.users.get(user_id).and_then(|records| records.get(&id))
    }

    /// Overwrite the record at the item's key, or `None` if the key is absent
    pub fn replace(&mut self, item: Todo) -> Option<Todo> {
        let slot = self.users.get_mut(&item.user_id)?.get_mut(&item.id)?;
        *slot = item.clone();
        Some(item)
    }

    pub fn len(&self) -> usize {
        self.users.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattened copy of every record, sorted by user then id
    pub fn to_vec(&self) -> Vec<Todo> {
        let mut all: Vec<Todo> = self.users.values().flat_map(|records| records.values().cloned()).collect();
        all.sort_by(|a, b| a.user_id.cmp(&b.user_id).then(a.id.cmp(&b.id)));
        all
    }
}

impl FromIterator<Todo> for UserIndex {
    fn from_iter<I: IntoIterator<Item = Todo>>(iter: I) -> Self {
        let mut index = UserIndex::new();
        for item in iter {
            index.insert(item);
        }
        index
    }
}

/// Volatile store; everything is lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<UserIndex>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TodoStore for MemoryStore {
    fn add_item(&self, item: Todo) -> Result<Todo> {
        let stored = self.items.lock().insert(item);
        debug!(user_id = %stored.user_id, id = %stored.id, "add_item: stored");
        Ok(stored)
    }

    fn get_item(&self, user_id: &str, id: Uuid) -> Result<Todo> {
        self.items.lock().get(user_id, id).cloned().ok_or_else(TodoError::not_found)
    }

    fn update_item(&self, item: Todo) -> Result<Todo> {
        let stored = self.items.lock().replace(item).ok_or_else(TodoError::not_found)?;
        debug!(user_id = %stored.user_id, id = %stored.id, "update_item: replaced");
        Ok(stored)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
