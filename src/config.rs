use chrono::{FixedOffset, Offset, Utc};
use config::ConfigError;
use serde::Deserialize;
use tower_sessions::cookie::Key;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub auth: AuthConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub secret: Option<String>,
    pub inactivity_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    pub utc_offset_minutes: i32, // 330 = IST
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/default")
    }

    /// Reads the given file (extension optional), then `APP_*` environment
    /// overrides such as `APP_SERVER__PORT=8080`.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::Message(format!(
                "auth.bcrypt_cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        if let Some(secret) = &self.session.secret {
            if secret.len() < 64 {
                return Err(ConfigError::Message(
                    "session.secret must be at least 64 bytes".into(),
                ));
            }
        }
        if self.session.inactivity_minutes <= 0 {
            return Err(ConfigError::Message(
                "session.inactivity_minutes must be positive".into(),
            ));
        }
        if self.display.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Message(format!(
                "display.utc_offset_minutes out of range: {}",
                self.display.utc_offset_minutes
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Key used to sign the session cookie. Without a configured secret a
    /// fresh key is generated, so sessions do not survive a restart.
    pub fn session_key(&self) -> Result<Key, ConfigError> {
        match &self.session.secret {
            Some(secret) => Key::try_from(secret.as_bytes())
                .map_err(|e| ConfigError::Message(format!("Invalid session secret: {}", e))),
            None => {
                tracing::warn!("No session secret configured, generating a temporary key");
                Ok(Key::generate())
            }
        }
    }

    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}
