use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A todo item as stored in the database and returned by the API.
///
/// Invariant: `completed_at` is non-null if and only if `completed` is true.
/// Every todo has exactly one owner; ownership never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    /// Completion timestamp in epoch milliseconds.
    pub completed_at: Option<i64>,
    /// Id of the owning user, immutable after creation.
    pub creator: Uuid,
}

/// Request body for creating a todo.
#[derive(Debug, Deserialize)]
pub struct TodoInput {
    pub text: String,
}

/// Request body for `PATCH /todos/:id`. Absent fields are left unchanged.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl Todo {
    pub fn new(creator: Uuid, text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            completed: false,
            completed_at: None,
            creator,
        }
    }

    /// Applies a patch in place, maintaining the `completed`/`completed_at`
    /// invariant: setting `completed` true stamps `completed_at` with the given
    /// time, setting it false clears the stamp, and a patch without `completed`
    /// leaves the stamp untouched.
    pub fn apply_patch(&mut self, patch: &TodoPatch, now_millis: i64) {
        if let Some(text) = &patch.text {
            self.text = text.trim().to_string();
        }
        match patch.completed {
            Some(true) => {
                self.completed = true;
                self.completed_at = Some(now_millis);
            }
            Some(false) => {
                self.completed = false;
                self.completed_at = None;
            }
            None => {}
        }
    }
}

/// Current time in epoch milliseconds, the unit `completed_at` is stored in.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
