//! Business rules for each resource. Services own the pool handle and the
//! debug flag, log every failure with structured fields, and translate
//! storage errors into `AppError`s for the HTTP layer.

pub mod auth;
pub mod todos;

pub use auth::AuthService;
pub use todos::TodoService;
