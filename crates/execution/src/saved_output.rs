//! The `save`-node side channel.

use nebula_core::ExecutionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One value a `save` node recorded under a user-chosen key. Multiple rows
/// per execution are allowed (re-saving a key appends, it does not upsert).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedOutput {
    /// The execution that recorded this value.
    pub execution_id: ExecutionId,
    /// The user-chosen key, not required to be unique within an execution.
    pub key: String,
    /// The saved value.
    pub value_json: Value,
}
