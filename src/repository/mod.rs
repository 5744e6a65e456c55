pub mod tasks;
pub mod users;

pub use tasks::{TaskFilter, TaskRepository};
pub use users::{ArticleList, NewUser, UserRepository};
