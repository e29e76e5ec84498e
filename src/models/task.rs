use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::validation::{validate_task_fields, ValidationError};

#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
}

/// Title and description that passed validation. The task store only
/// accepts this type, so raw form input never reaches the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: Option<String>,
}

impl NewTask {
    pub fn new(title: &str, description: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        let description = description.trim();
        validate_task_fields(title, description)?;

        Ok(Self {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
