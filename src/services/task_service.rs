use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::{StoreError, StoreResult};
use crate::models::{NewTask, Task};

/// Task store. Every query is scoped to the requesting owner, so a task
/// belonging to someone else behaves exactly like a task that does not exist.
#[derive(Clone)]
pub struct TaskService {
    pool: SqlitePool,
}

impl TaskService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: i64, task: &NewTask) -> StoreResult<Task> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (title, description, completed, created_at, updated_at, user_id) \
             VALUES (?, ?, 0, ?, ?, ?) \
             RETURNING id, title, description, completed, created_at, updated_at, user_id",
        )
        .bind(task.title())
        .bind(task.description())
        .bind(now)
        .bind(now)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!("Created task {} for user {}", task.id, owner_id);
        Ok(task)
    }

    /// The owner's tasks, newest first. A non-empty `search` keeps only titles
    /// containing it, ignoring case.
    pub async fn list(&self, owner_id: i64, search: Option<&str>) -> StoreResult<Vec<Task>> {
        let mut tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, completed, created_at, updated_at, user_id \
             FROM tasks WHERE user_id = ?",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        // Ids break ties between tasks created within the same instant.
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        if let Some(query) = search.filter(|q| !q.is_empty()) {
            let needle = query.to_lowercase();
            tasks.retain(|task| task.title.to_lowercase().contains(&needle));
        }

        Ok(tasks)
    }

    pub async fn get(&self, task_id: i64, requester_id: i64) -> StoreResult<Task> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, description, completed, created_at, updated_at, user_id \
             FROM tasks WHERE id = ? AND user_id = ?",
        )
        .bind(task_id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotOwned)
    }

    pub async fn update(&self, task_id: i64, requester_id: i64, task: &NewTask) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET title = ?, description = ?, updated_at = ? \
             WHERE id = ? AND user_id = ? \
             RETURNING id, title, description, completed, created_at, updated_at, user_id",
        )
        .bind(task.title())
        .bind(task.description())
        .bind(Utc::now())
        .bind(task_id)
        .bind(requester_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotOwned)?;
        tx.commit().await?;

        tracing::info!("Updated task {} for user {}", task_id, requester_id);
        Ok(updated)
    }

    pub async fn toggle(&self, task_id: i64, requester_id: i64) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;
        let toggled = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET completed = NOT completed, updated_at = ? \
             WHERE id = ? AND user_id = ? \
             RETURNING id, title, description, completed, created_at, updated_at, user_id",
        )
        .bind(Utc::now())
        .bind(task_id)
        .bind(requester_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotOwned)?;
        tx.commit().await?;

        tracing::info!(
            "Task {} for user {} is now {}",
            task_id,
            requester_id,
            if toggled.completed { "completed" } else { "incomplete" }
        );
        Ok(toggled)
    }

    /// Returns the removed task.
    pub async fn delete(&self, task_id: i64, requester_id: i64) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query_as::<_, Task>(
            "DELETE FROM tasks WHERE id = ? AND user_id = ? \
             RETURNING id, title, description, completed, created_at, updated_at, user_id",
        )
        .bind(task_id)
        .bind(requester_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotOwned)?;
        tx.commit().await?;

        tracing::info!("Deleted task {} for user {}", task_id, requester_id);
        Ok(deleted)
    }
}
