pub mod db;
mod task_service;
mod user_service;

pub use task_service::TaskService;
pub use user_service::UserService;
