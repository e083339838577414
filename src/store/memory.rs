//! In-memory store backing the test suites.
//!
//! Mirrors the Postgres implementation's semantics exactly: email
//! uniqueness, live token membership, ownership scoping, and the
//! `completed`/`completed_at` invariant. Each operation takes a lock for its
//! whole read-modify-write, so it is atomic per entity like the SQL
//! statements it stands in for.

use crate::error::AppError;
use crate::models::{todo::epoch_millis, Todo, TodoPatch, User};
use crate::store::{validate_todo_text, TodoStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct TokenEntry {
    user_id: Uuid,
    access: String,
    token: String,
}

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    tokens: Mutex<Vec<TokenEntry>>,
    todos: Mutex<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::BadRequest("email already registered".into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id_and_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<Option<User>, AppError> {
        let live = self.tokens.lock().unwrap().iter().any(|t| {
            t.user_id == user_id && t.access == crate::auth::token::ACCESS_AUTH && t.token == token
        });
        if !live {
            return Ok(None);
        }
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn append_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        self.tokens.lock().unwrap().push(TokenEntry {
            user_id,
            access: crate::auth::token::ACCESS_AUTH.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }

    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        self.tokens
            .lock()
            .unwrap()
            .retain(|t| !(t.user_id == user_id && t.token == token));
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create(&self, creator: Uuid, text: &str) -> Result<Todo, AppError> {
        let text = validate_todo_text(text)?;
        let todo = Todo::new(creator, text);
        self.todos.lock().unwrap().push(todo.clone());
        Ok(todo)
    }

    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Todo>, AppError> {
        let todos = self.todos.lock().unwrap();
        Ok(todos.iter().filter(|t| t.creator == owner).cloned().collect())
    }

    async fn find_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, AppError> {
        let todos = self.todos.lock().unwrap();
        Ok(todos
            .iter()
            .find(|t| t.id == id && t.creator == owner)
            .cloned())
    }

    async fn update_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, AppError> {
        if let Some(text) = &patch.text {
            validate_todo_text(text)?;
        }
        let mut todos = self.todos.lock().unwrap();
        match todos.iter_mut().find(|t| t.id == id && t.creator == owner) {
            Some(todo) => {
                todo.apply_patch(&patch, epoch_millis());
                Ok(Some(todo.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, AppError> {
        let mut todos = self.todos.lock().unwrap();
        match todos.iter().position(|t| t.id == id && t.creator == owner) {
            Some(idx) => Ok(Some(todos.remove(idx))),
            None => Ok(None),
        }
    }
}
