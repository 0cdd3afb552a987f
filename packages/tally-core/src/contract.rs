//! # Contract Surface
//!
//! The fixed shape of the on-chain todo contract: one module, four entry
//! functions, one object type. The contract itself is an external
//! collaborator — this module only builds calls addressed to it and decodes
//! the objects it produces.
//!
//! | Function | Arguments        | Effect                                      |
//! |----------|------------------|---------------------------------------------|
//! | `new`    | name             | create a list owned by the sender, return id |
//! | `delete` | list id          | destroy the list                             |
//! | `add`    | list id, text    | append an item to the list's sequence        |
//! | `remove` | list id, index   | remove the item at index, shifting the rest  |

use serde::Deserialize;

use crate::chain::{CallArg, MoveCall, ObjectRecord};
use crate::error::{Error, Result};
use crate::model::{Address, ObjectId};

/// Module name within the published package.
pub const TODO_MODULE: &str = "todo_list";
/// Struct name of the list object type.
pub const LIST_STRUCT: &str = "TodoList";

/// Entry function: create a list.
pub const FN_NEW: &str = "new";
/// Entry function: destroy a list.
pub const FN_DELETE: &str = "delete";
/// Entry function: append an item.
pub const FN_ADD: &str = "add";
/// Entry function: remove an item by position.
pub const FN_REMOVE: &str = "remove";

/// Full type tag of a list object published under `package`.
pub fn list_type_tag(package: &Address) -> String {
    format!("{}::{}::{}", package, TODO_MODULE, LIST_STRUCT)
}

// ── Call Builders ─────────────────────────────────────────────────────────────

/// `new(name)` — create a list owned by the calling identity.
pub fn new_list(package: &Address, name: &str) -> MoveCall {
    MoveCall {
        package: package.clone(),
        module: TODO_MODULE.to_string(),
        function: FN_NEW.to_string(),
        args: vec![CallArg::Text {
            value: name.to_string(),
        }],
    }
}

/// `delete(id)` — destroy a list.
pub fn delete_list(package: &Address, id: &ObjectId) -> MoveCall {
    MoveCall {
        package: package.clone(),
        module: TODO_MODULE.to_string(),
        function: FN_DELETE.to_string(),
        args: vec![CallArg::Object { id: id.clone() }],
    }
}

/// `add(id, text)` — append an item to a list.
pub fn add_item(package: &Address, id: &ObjectId, text: &str) -> MoveCall {
    MoveCall {
        package: package.clone(),
        module: TODO_MODULE.to_string(),
        function: FN_ADD.to_string(),
        args: vec![
            CallArg::Object { id: id.clone() },
            CallArg::Text {
                value: text.to_string(),
            },
        ],
    }
}

/// `remove(id, index)` — remove the item at a zero-based position.
pub fn remove_item(package: &Address, id: &ObjectId, index: u64) -> MoveCall {
    MoveCall {
        package: package.clone(),
        module: TODO_MODULE.to_string(),
        function: FN_REMOVE.to_string(),
        args: vec![
            CallArg::Object { id: id.clone() },
            CallArg::Index { value: index },
        ],
    }
}

// ── Read Model ────────────────────────────────────────────────────────────────

/// Field values of a list object, as the contract's read model promises
/// them: an immutable name and an ordered sequence of item strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListFields {
    /// The list's display name.
    pub name: String,
    /// Item texts in positional order.
    pub items: Vec<String>,
}

impl ListFields {
    /// Decode an [`ObjectRecord`] into list fields, verifying the type tag
    /// first. A tag mismatch means the object is not a list of the expected
    /// contract and no partial state is applied.
    pub fn decode(record: &ObjectRecord, expected_tag: &str) -> Result<Self> {
        if record.type_tag != expected_tag {
            return Err(Error::ShapeMismatch {
                expected: expected_tag.to_string(),
                actual: record.type_tag.clone(),
            });
        }
        let fields: ListFields = serde_json::from_value(record.fields.clone())
            .map_err(|e| Error::MissingField(e.to_string()))?;
        Ok(fields)
    }
}
