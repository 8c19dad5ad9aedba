use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Todo, UpdateTodoRequest};

const TODO_COLUMNS: &str = "id, title, description, completed, user_id, created_at, updated_at";

/// All todos owned by `user_id`, newest first.
pub async fn find_all_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!(
        "SELECT {} FROM todos WHERE user_id = $1 ORDER BY created_at DESC",
        TODO_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id_and_user(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!(
        "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
        TODO_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &PgPool, todo: &Todo) -> Result<Todo, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!(
        "INSERT INTO todos (id, title, description, completed, user_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
        TODO_COLUMNS
    ))
    .bind(todo.id)
    .bind(&todo.title)
    .bind(&todo.description)
    .bind(todo.completed)
    .bind(todo.user_id)
    .bind(todo.created_at)
    .bind(todo.updated_at)
    .fetch_one(pool)
    .await
}

/// Replaces title, description and completed. `None` when no row matches
/// both `id` and `user_id`.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    changes: &UpdateTodoRequest,
) -> Result<Option<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!(
        "UPDATE todos SET title = $1, description = $2, completed = $3, updated_at = NOW() \
         WHERE id = $4 AND user_id = $5 RETURNING {}",
        TODO_COLUMNS
    ))
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(changes.completed)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
