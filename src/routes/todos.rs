use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TodoInput, TodoPatch},
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

/// Path ids that are not well-formed are treated exactly like ids that do not
/// exist: both are a 404, never a 400 or 500.
fn parse_todo_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("todo not found".into()))
}

/// Create a todo owned by the caller.
///
/// ## Responses:
/// - `200 OK`: the created todo.
/// - `400 Bad Request`: missing or whitespace-only `text`.
#[post("")]
pub async fn create_todo(
    state: web::Data<AppState>,
    body: web::Json<TodoInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let todo = state.todos.create(user.0.user_id, &body.text).await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// List the caller's todos as `{"todos": [...]}`.
///
/// Only todos created by the resolved identity are ever returned; there is no
/// way to widen the filter.
#[get("")]
pub async fn list_todos(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let todos = state.todos.list_for_owner(user.0.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "todos": todos })))
}

/// Fetch one of the caller's todos by id.
///
/// ## Responses:
/// - `200 OK`: `{"todo": ...}`.
/// - `404 Not Found`: the id does not exist, is malformed, or the todo
///   belongs to another user. The three cases are indistinguishable.
#[get("/{id}")]
pub async fn get_todo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&path)?;
    match state.todos.find_for_owner(id, user.0.user_id).await? {
        Some(todo) => Ok(HttpResponse::Ok().json(json!({ "todo": todo }))),
        None => Err(AppError::NotFound("todo not found".into())),
    }
}

/// Update one of the caller's todos.
///
/// `text` and/or `completed` may be patched. Setting `completed` true stamps
/// `completed_at`; setting it false clears it; omitting it leaves the stamp
/// unchanged.
#[patch("/{id}")]
pub async fn update_todo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<TodoPatch>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&path)?;
    match state
        .todos
        .update_for_owner(id, user.0.user_id, body.into_inner())
        .await?
    {
        Some(todo) => Ok(HttpResponse::Ok().json(json!({ "todo": todo }))),
        None => Err(AppError::NotFound("todo not found".into())),
    }
}

/// Delete one of the caller's todos, returning its prior state.
#[delete("/{id}")]
pub async fn delete_todo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&path)?;
    match state.todos.delete_for_owner(id, user.0.user_id).await? {
        Some(todo) => Ok(HttpResponse::Ok().json(json!({ "todo": todo }))),
        None => Err(AppError::NotFound("todo not found".into())),
    }
}
