use sqlx::PgPool;
use std::fmt::Display;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{CreateTodoRequest, Todo, TodoResponse, UpdateTodoRequest};
use crate::repositories::todos;

const TODO_NOT_FOUND: &str = "Todo not found";

/// Todo CRUD, always scoped to the requesting user. Someone else's todo is
/// reported exactly like a missing one.
#[derive(Clone)]
pub struct TodoService {
    pool: PgPool,
    debug: bool,
}

impl TodoService {
    pub fn new(pool: PgPool, debug: bool) -> Self {
        Self { pool, debug }
    }

    fn internal(&self, operation: &str, user_id: Uuid, message: &str, err: impl Display) -> AppError {
        log::error!(operation = operation, user_id:% = user_id, error:% = err; "{}", message);
        AppError::internal(message, err, self.debug)
    }

    fn not_found(operation: &str, user_id: Uuid, todo_id: Uuid) -> AppError {
        log::debug!(operation = operation, user_id:% = user_id, todo_id:% = todo_id; "Todo not found");
        AppError::NotFound(TODO_NOT_FOUND.into())
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<TodoResponse>, AppError> {
        let todos = todos::find_all_by_user(&self.pool, user_id)
            .await
            .map_err(|e| self.internal("Get all todos", user_id, "Failed to get todos", e))?;
        Ok(todos.into_iter().map(TodoResponse::from).collect())
    }

    pub async fn get(&self, user_id: Uuid, todo_id: Uuid) -> Result<TodoResponse, AppError> {
        todos::find_by_id_and_user(&self.pool, todo_id, user_id)
            .await
            .map_err(|e| self.internal("Get todo", user_id, "Failed to get todo", e))?
            .map(TodoResponse::from)
            .ok_or_else(|| Self::not_found("Get todo", user_id, todo_id))
    }

    pub async fn create(&self, user_id: Uuid, input: CreateTodoRequest) -> Result<TodoResponse, AppError> {
        let todo = Todo::new(input, user_id);
        let created = todos::create(&self.pool, &todo)
            .await
            .map_err(|e| self.internal("Create todo", user_id, "Failed to create todo", e))?;

        log::info!(user_id:% = user_id, todo_id:% = created.id; "Todo created");
        Ok(created.into())
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        todo_id: Uuid,
        changes: UpdateTodoRequest,
    ) -> Result<TodoResponse, AppError> {
        todos::update(&self.pool, todo_id, user_id, &changes)
            .await
            .map_err(|e| self.internal("Update todo", user_id, "Failed to update todo", e))?
            .map(TodoResponse::from)
            .ok_or_else(|| Self::not_found("Update todo", user_id, todo_id))
    }

    pub async fn delete(&self, user_id: Uuid, todo_id: Uuid) -> Result<(), AppError> {
        let deleted = todos::delete(&self.pool, todo_id, user_id)
            .await
            .map_err(|e| self.internal("Delete todo", user_id, "Failed to delete todo", e))?;
        if deleted == 0 {
            return Err(Self::not_found("Delete todo", user_id, todo_id));
        }

        log::info!(user_id:% = user_id, todo_id:% = todo_id; "Todo deleted");
        Ok(())
    }
}
