pub mod auth;
pub mod docs;
pub mod health;
pub mod todos;

use actix_cors::Cors;
use actix_web::web;
use sqlx::PgPool;

use crate::auth::{AuthMiddleware, TokenService};
use crate::config::{Config, ConfigError};
use crate::error;
use crate::services::{AuthService, TodoService};

/// Everything the HTTP layer needs, cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub todos: TodoService,
    pub tokens: TokenService,
    pub debug: bool,
    pub app_name: String,
    pub app_url: String,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self, ConfigError> {
        let debug = config.is_debug();
        let tokens = TokenService::from_config(&config.app.name, &config.jwt)?;
        Ok(Self {
            auth: AuthService::new(pool.clone(), tokens.clone(), debug),
            todos: TodoService::new(pool, debug),
            tokens,
            debug,
            app_name: config.app.name.clone(),
            app_url: config.app.url.clone(),
        })
    }
}

/// Browser access from any origin.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

/// Versioned API routes. Mounted under `/api/v1` behind `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::logout)
            .service(auth::refresh_token)
            .service(auth::me),
    )
    .service(
        web::scope("/todo")
            .service(todos::list_todos)
            .service(todos::create_todo)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    );
}

/// Registers shared state, extractor error handling, and every route on an
/// `App`: `App::new().configure(routes::app(state))`.
pub fn app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state.auth.clone()))
            .app_data(web::Data::new(state.todos.clone()))
            .app_data(web::Data::new(health::ServiceName(state.app_name.clone())))
            .app_data(web::Data::new(docs::openapi(&state.app_name, &state.app_url)))
            .app_data(error::json_config(state.debug))
            .app_data(error::path_config(state.debug))
            .service(health::health)
            .service(docs::openapi_json)
            .service(docs::swagger_ui)
            .service(
                web::scope("/api/v1")
                    .wrap(AuthMiddleware::new(state.tokens.clone()))
                    .configure(config),
            );
    }
}
