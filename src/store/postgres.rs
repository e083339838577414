//! Postgres-backed store.
//!
//! Token entries live in the `user_tokens` child table rather than inside the
//! user row, so appending and removing sessions are single-row statements and
//! concurrent logins cannot overwrite each other. All todo mutations are
//! single conditional statements keyed by `(id, creator)`.

use crate::error::AppError;
use crate::models::{todo::epoch_millis, Todo, TodoPatch, User};
use crate::store::{validate_todo_text, TodoStore, UserStore};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // Uniqueness is enforced by the constraint, not a pre-check, so
            // two concurrent signups for the same email cannot both succeed.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::BadRequest("email already registered".into())
            }
            _ => e.into(),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id_and_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.created_at
             FROM users u
             JOIN user_tokens t ON t.user_id = u.id
             WHERE u.id = $1 AND t.access = 'auth' AND t.token = $2",
        )
        .bind(user_id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn append_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO user_tokens (user_id, access, token) VALUES ($1, 'auth', $2)")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        // Deleting an absent entry affects zero rows, which is still success.
        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn create(&self, creator: Uuid, text: &str) -> Result<Todo, AppError> {
        let text = validate_todo_text(text)?;
        let todo = sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (id, text, completed, creator)
             VALUES ($1, $2, FALSE, $3)
             RETURNING id, text, completed, completed_at, creator",
        )
        .bind(Uuid::new_v4())
        .bind(text)
        .bind(creator)
        .fetch_one(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Todo>, AppError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, text, completed, completed_at, creator
             FROM todos WHERE creator = $1 ORDER BY seq",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn find_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>(
            "SELECT id, text, completed, completed_at, creator
             FROM todos WHERE id = $1 AND creator = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn update_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, AppError> {
        let text = match &patch.text {
            Some(text) => Some(validate_todo_text(text)?.to_string()),
            None => None,
        };

        // One conditional statement: the ownership filter and the
        // completed_at stamping both happen inside the UPDATE, so there is no
        // read-then-write window.
        let todo = sqlx::query_as::<_, Todo>(
            "UPDATE todos SET
                 text = COALESCE($3, text),
                 completed = COALESCE($4, completed),
                 completed_at = CASE
                     WHEN $4 IS NULL THEN completed_at
                     WHEN $4 THEN $5
                     ELSE NULL
                 END
             WHERE id = $1 AND creator = $2
             RETURNING id, text, completed, completed_at, creator",
        )
        .bind(id)
        .bind(owner)
        .bind(text)
        .bind(patch.completed)
        .bind(epoch_millis())
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn delete_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>(
            "DELETE FROM todos WHERE id = $1 AND creator = $2
             RETURNING id, text, completed, completed_at, creator",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }
}
