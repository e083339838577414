//! Persistence contracts the core depends on.
//!
//! Handlers and middleware only ever see these traits; the concrete backend
//! (`postgres` in production, `memory` in tests) is chosen at app assembly.
//! Every read-modify-write an implementation performs must be a single atomic
//! store operation keyed by id/owner, never a fetch-then-write pair.

pub mod memory;
pub mod postgres;

use crate::auth::password::verify_password;
use crate::error::AppError;
use crate::models::{Todo, TodoPatch, User};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence contract for accounts and their active-token sets.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user. Fails with a 400 if the email is already
    /// registered; the new user starts with an empty token set.
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Exact-match lookup: the user must exist AND the exact token must be a
    /// live `auth` entry in their token set. Used by identity resolution.
    async fn find_by_id_and_token(&self, user_id: Uuid, token: &str)
        -> Result<Option<User>, AppError>;

    /// Appends a token entry to the user's set. Atomic per user: concurrent
    /// logins from different devices must not clobber each other.
    async fn append_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError>;

    /// Removes the exact matching entry; removing an absent entry succeeds.
    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError>;

    /// Looks a user up by credentials. Unknown email and wrong password fail
    /// identically, which prevents account enumeration.
    async fn find_by_credentials(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(AppError::invalid_credentials)?;
        if verify_password(password, &user.password_hash) {
            Ok(user)
        } else {
            Err(AppError::invalid_credentials())
        }
    }
}

/// Persistence contract for ownership-scoped todos.
///
/// Every lookup takes the caller's identity and filters on it inside the
/// store, so "not found" and "not owned" are indistinguishable by
/// construction and there is no window between existence and ownership
/// checks.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persists a new todo owned by `creator`. The text is trimmed; an empty
    /// result is a 400.
    async fn create(&self, creator: Uuid, text: &str) -> Result<Todo, AppError>;

    /// Returns the owner's todos in creation order.
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Todo>, AppError>;

    async fn find_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, AppError>;

    /// Ownership-scoped conditional update. Stamps or clears `completed_at`
    /// according to the patch; returns `None` when the todo does not exist or
    /// belongs to someone else.
    async fn update_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, AppError>;

    /// Ownership-scoped delete returning the deleted record's prior state.
    async fn delete_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, AppError>;
}

pub(crate) fn validate_todo_text(text: &str) -> Result<&str, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("text must not be empty".into()));
    }
    Ok(trimmed)
}
