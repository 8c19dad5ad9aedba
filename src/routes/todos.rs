use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CreateTodoRequest, TodoData, TodosData, UpdateTodoRequest},
    response::ApiResponse,
    services::TodoService,
};
use actix_web::{delete, get, http::StatusCode, post, put, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

/// Lists the authenticated user's todos, newest first.
///
/// ## Responses:
/// - `200 OK`: `data.todos` is an array of todos (possibly empty).
/// - `401 Unauthorized`: missing or invalid access token.
/// - `500 Internal Server Error`: database failure.
#[utoipa::path(
    get,
    path = "/api/v1/todo",
    tag = "Todo",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Envelope `data` is `TodosData`", body = TodosData),
        (status = 401, description = "Missing or invalid access token", body = crate::routes::docs::ApiEnvelope),
        (status = 500, description = "Unexpected failure", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[get("")]
pub async fn list_todos(
    service: web::Data<TodoService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let todos = service.list(user.0).await?;
    Ok(ApiResponse::ok("Todos retrieved successfully", TodosData { todos }).into_response())
}

/// Creates a todo owned by the authenticated user. New todos start out not completed.
///
/// ## Request Body:
/// - `title`: 1 to 255 characters (required).
/// - `description` (optional): up to 1000 characters, defaults to empty.
///
/// ## Responses:
/// - `201 Created`: `data.todo` holds the new todo.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `422 Unprocessable Entity`: invalid body or failed validation.
/// - `500 Internal Server Error`: database failure.
#[utoipa::path(
    post,
    path = "/api/v1/todo",
    tag = "Todo",
    request_body = CreateTodoRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Envelope `data` is `TodoData`", body = TodoData),
        (status = 401, description = "Missing or invalid access token", body = crate::routes::docs::ApiEnvelope),
        (status = 422, description = "Validation failed", body = crate::routes::docs::ApiEnvelope),
        (status = 500, description = "Unexpected failure", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[post("")]
pub async fn create_todo(
    service: web::Data<TodoService>,
    user: AuthenticatedUser,
    body: web::Json<CreateTodoRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let todo = service.create(user.0, body.into_inner()).await?;
    Ok(ApiResponse::created("Success to create todo", TodoData { todo }).into_response())
}

/// Retrieves one of the authenticated user's todos.
#[utoipa::path(
    get,
    path = "/api/v1/todo/{id}",
    tag = "Todo",
    params(("id" = Uuid, Path, description = "Todo id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Envelope `data` is `TodoData`", body = TodoData),
        (status = 401, description = "Missing or invalid access token", body = crate::routes::docs::ApiEnvelope),
        (status = 404, description = "Todo not found", body = crate::routes::docs::ApiEnvelope),
        (status = 422, description = "Invalid todo ID", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[get("/{id}")]
pub async fn get_todo(
    service: web::Data<TodoService>,
    user: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let todo = service.get(user.0, todo_id.into_inner()).await?;
    Ok(ApiResponse::ok("Todo retrieved successfully", TodoData { todo }).into_response())
}

/// Replaces the title, description and completed flag of a todo.
///
/// ## Responses:
/// - `200 OK`: `data.todo` holds the updated todo.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `404 Not Found`: no such todo, or it belongs to another user.
/// - `422 Unprocessable Entity`: invalid id, invalid body or failed validation.
/// - `500 Internal Server Error`: database failure.
#[utoipa::path(
    put,
    path = "/api/v1/todo/{id}",
    tag = "Todo",
    params(("id" = Uuid, Path, description = "Todo id")),
    request_body = UpdateTodoRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Envelope `data` is `TodoData`", body = TodoData),
        (status = 401, description = "Missing or invalid access token", body = crate::routes::docs::ApiEnvelope),
        (status = 404, description = "Todo not found", body = crate::routes::docs::ApiEnvelope),
        (status = 422, description = "Invalid todo ID or validation failed", body = crate::routes::docs::ApiEnvelope),
        (status = 500, description = "Unexpected failure", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[put("/{id}")]
pub async fn update_todo(
    service: web::Data<TodoService>,
    user: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
    body: web::Json<UpdateTodoRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let todo = service
        .update(user.0, todo_id.into_inner(), body.into_inner())
        .await?;
    Ok(ApiResponse::ok("Todo updated successfully", TodoData { todo }).into_response())
}

/// Deletes a todo owned by the authenticated user.
#[utoipa::path(
    delete,
    path = "/api/v1/todo/{id}",
    tag = "Todo",
    params(("id" = Uuid, Path, description = "Todo id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted; envelope `data` is null", body = crate::routes::docs::ApiEnvelope),
        (status = 401, description = "Missing or invalid access token", body = crate::routes::docs::ApiEnvelope),
        (status = 404, description = "Todo not found", body = crate::routes::docs::ApiEnvelope),
        (status = 422, description = "Invalid todo ID", body = crate::routes::docs::ApiEnvelope),
        (status = 500, description = "Unexpected failure", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[delete("/{id}")]
pub async fn delete_todo(
    service: web::Data<TodoService>,
    user: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    service.delete(user.0, todo_id.into_inner()).await?;
    Ok(ApiResponse::message_only(StatusCode::OK, "Todo deleted successfully").into_response())
}

#[cfg(test)]
mod tests {
    use crate::models::UpdateTodoRequest;
    use validator::Validate;

    #[test]
    fn test_update_input_validation() {
        let empty_title = UpdateTodoRequest {
            title: String::new(),
            description: "Still here".to_string(),
            completed: true,
        };
        assert!(empty_title.validate().is_err(), "Validation should fail for empty title.");

        let long_description = UpdateTodoRequest {
            title: "Valid".to_string(),
            description: "b".repeat(1001),
            completed: false,
        };
        assert!(
            long_description.validate().is_err(),
            "Validation should fail for overly long description."
        );

        let valid = UpdateTodoRequest {
            title: "Valid".to_string(),
            description: String::new(),
            completed: true,
        };
        assert!(valid.validate().is_ok(), "Validation should pass for valid input.");
    }
}
