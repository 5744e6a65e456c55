pub mod news;
pub mod task;
pub mod user;

pub use news::Article;
pub use task::{Priority, Task, TaskInput, TaskPayload, TaskSnapshot};
pub use user::{Preferences, User, UserProfile, UserSnapshot};
