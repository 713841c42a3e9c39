// Todo records as stored and as received over the wire

use crate::priority::Priority;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored todo item, addressable by `(user_id, id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Assigned by the store on creation; nil means "not assigned yet"
    pub id: Uuid,
    pub title: String,
    pub priority: Priority,
    #[serde(default)]
    pub complete: bool,
    /// Empty for records created through the v1 API
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
}

impl Todo {
    pub fn has_id(&self) -> bool {
        !self.id.is_nil()
    }
}

/// Request body for create and update
///
/// Every field is optional on the wire so that missing values reach the
/// validator and produce a field-level error instead of a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TodoPayload {
    pub id: Uuid,
    pub title: String,
    pub priority: String,
    pub complete: bool,
    pub user_id: String,
}
