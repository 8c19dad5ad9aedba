//! Generated OpenAPI document and a Swagger UI page that renders it.

use actix_web::{get, web, HttpResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::{OpenApi as OpenApiDocument, Server};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::auth::{LoginRequest, LoginResponse, RefreshTokenRequest, RegisterRequest, TokenPair, UserData};
use crate::models::{CreateTodoRequest, TodoData, TodoResponse, TodosData, UpdateTodoRequest, UserResponse};
use crate::routes::{auth, health, todos};

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// The response envelope as it appears on the wire. `data` depends on the
/// operation and is `null` for errors.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ApiEnvelope {
    message: String,
    #[schema(value_type = Option<Object>)]
    data: Option<serde_json::Value>,
    status_code: u16,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut OpenApiDocument) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::logout,
        auth::refresh_token,
        auth::me,
        todos::list_todos,
        todos::create_todo,
        todos::get_todo,
        todos::update_todo,
        todos::delete_todo
    ),
    components(schemas(
        ApiEnvelope,
        RegisterRequest,
        LoginRequest,
        RefreshTokenRequest,
        LoginResponse,
        TokenPair,
        UserData,
        UserResponse,
        CreateTodoRequest,
        UpdateTodoRequest,
        TodoResponse,
        TodoData,
        TodosData
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Registration, login and token management"),
        (name = "Todo", description = "Todo items of the authenticated user"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Builds the document with the running application's name and public URL.
pub fn openapi(app_name: &str, app_url: &str) -> OpenApiDocument {
    let mut doc = ApiDoc::openapi();
    doc.info.title = format!("{} API", app_name);
    doc.info.description = Some(format!("API documentation for {}", app_name));
    doc.info.version = "1.0".to_string();
    doc.servers = Some(vec![Server::new(app_url)]);
    doc
}

#[get("/api-docs/openapi.json")]
pub async fn openapi_json(doc: web::Data<OpenApiDocument>) -> HttpResponse {
    HttpResponse::Ok().json(doc.get_ref())
}

const SWAGGER_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>API documentation</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({ url: "__OPENAPI_PATH__", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

#[get("/swagger")]
pub async fn swagger_ui() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(SWAGGER_PAGE.replace("__OPENAPI_PATH__", OPENAPI_PATH))
}
