pub mod refresh_token;
pub mod todo;
pub mod user;

pub use refresh_token::RefreshToken;
pub use todo::{CreateTodoRequest, Todo, TodoData, TodoResponse, TodosData, UpdateTodoRequest};
pub use user::{User, UserResponse};
