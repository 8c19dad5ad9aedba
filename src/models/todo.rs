use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A todo item as stored in the `todos` table.
#[derive(Debug, Clone, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// Owner of the todo. Every query is scoped by this column.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new, not yet completed todo owned by `user_id`.
    pub fn new(input: CreateTodoRequest, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            completed: false,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating a todo.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTodoRequest {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Optional, at most 1000 characters.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
}

/// Payload for updating a todo. All three fields are replaced.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// A todo as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            created_at: todo.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoData {
    pub todo: TodoResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodosData {
    pub todos: Vec<TodoResponse>,
}
