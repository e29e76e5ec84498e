use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::{StoreError, StoreResult};
use crate::models::User;
use crate::services::db::is_unique_violation;
use crate::validation::{validate_password, validate_username};

/// Credential store: user rows and bcrypt password hashes.
#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
    bcrypt_cost: u32,
    // Verified against when the username is unknown, so both login
    // failures cost one bcrypt verification.
    dummy_hash: Arc<str>,
}

impl UserService {
    pub async fn new(pool: SqlitePool, bcrypt_cost: u32) -> StoreResult<Self> {
        let dummy_hash = hash_password("unused-Passw0rd".to_string(), bcrypt_cost).await?;
        Ok(Self {
            pool,
            bcrypt_cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub async fn register(&self, username: &str, password: &str) -> StoreResult<User> {
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = hash_password(password.to_string(), self.bcrypt_cost).await?;

        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?) \
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(&password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateUsername(username.to_string())
            } else {
                StoreError::Database(e)
            }
        })?;
        tx.commit().await?;

        tracing::info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Returns the user only when the password matches. Unknown username and
    /// wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> StoreResult<Option<User>> {
        let user = self.find_by_username(username).await?;

        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };
        let matches = verify_password(password.to_string(), hash).await?;

        Ok(user.filter(|_| matches))
    }

    pub async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Administrative removal, not reachable over HTTP. Owned tasks go with
    /// the user through the foreign key cascade.
    pub async fn delete(&self, user_id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("Deleted user {} and their tasks", user_id);
        }
        Ok(deleted)
    }
}

// bcrypt is deliberately slow, keep it off the async workers.
async fn hash_password(password: String, cost: u32) -> StoreResult<String> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

async fn verify_password(password: String, hash: String) -> StoreResult<bool> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use crate::services::{db, TaskService};

    async fn service() -> UserService {
        let pool = db::connect_in_memory().await.unwrap();
        UserService::new(pool, 4).await.unwrap()
    }

    #[tokio::test]
    async fn registers_once_then_reports_duplicate() {
        let users = service().await;

        let alice = users.register("alice_1", "Passw0rd!").await.unwrap();
        assert_eq!(alice.username, "alice_1");

        let err = users.register("alice_1", "Other1234").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername(name) if name == "alice_1"));
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let users = service().await;
        users.register("alice_1", "Passw0rd!").await.unwrap();
        assert!(users.register("Alice_1", "Passw0rd!").await.is_ok());
    }

    #[tokio::test]
    async fn password_is_stored_hashed() {
        let users = service().await;
        let user = users.register("bob_2", "Passw0rd!").await.unwrap();

        assert_ne!(user.password_hash, "Passw0rd!");
        assert!(user.password_hash.starts_with("$2"));
        assert!(bcrypt::verify("Passw0rd!", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn register_enforces_field_rules() {
        let users = service().await;

        let err = users.register("a b", "Passw0rd!").await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = users.register("carol", "weak").await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        assert!(users.find_by_username("carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authenticate_matches_only_correct_password() {
        let users = service().await;
        let alice = users.register("alice_1", "Passw0rd!").await.unwrap();

        let found = users.authenticate("alice_1", "Passw0rd!").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(alice.id));

        assert!(users.authenticate("alice_1", "passw0rd!").await.unwrap().is_none());
        assert!(users.authenticate("nobody", "Passw0rd!").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_tasks() {
        let pool = db::connect_in_memory().await.unwrap();
        let users = UserService::new(pool.clone(), 4).await.unwrap();
        let tasks = TaskService::new(pool);

        let alice = users.register("alice_1", "Passw0rd!").await.unwrap();
        let draft = NewTask::new("Buy milk", "").unwrap();
        let task = tasks.create(alice.id, &draft).await.unwrap();

        assert!(users.delete(alice.id).await.unwrap());
        assert!(users.find_by_id(alice.id).await.unwrap().is_none());
        assert!(matches!(
            tasks.get(task.id, alice.id).await,
            Err(StoreError::NotOwned)
        ));
        assert!(!users.delete(alice.id).await.unwrap());
    }
}
