pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod render;
pub mod services;
pub mod session;
pub mod validation;

pub use app::{build_router, AppState};
