#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Authentication (bcrypt passwords, JWT access tokens, stored refresh tokens),"]
#![doc = "per-user todo management, the response envelope, error handling, logging and"]
#![doc = "configuration. The binary (`main.rs`) wires these into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use routes::AppState;
