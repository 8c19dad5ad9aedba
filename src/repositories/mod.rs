//! Thin data-access functions over the connection pool. Each function is a
//! single query (or one transaction) and returns `sqlx::Error` untouched so
//! the service layer decides how a failure is reported.

pub mod refresh_tokens;
pub mod todos;
pub mod users;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// True when the error is a Postgres unique constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
