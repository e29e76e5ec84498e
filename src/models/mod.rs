mod user;
mod forms;
mod task;

pub use user::{User, CurrentUser};
pub use forms::{LoginForm, RegisterForm, TaskForm, ActionForm, SearchQuery};
pub use task::{Task, NewTask};
