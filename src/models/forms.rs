use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Used by both add and edit.
#[derive(Debug, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Toggle and delete submit nothing but the token.
#[derive(Debug, Deserialize)]
pub struct ActionForm {
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Default)]
pub struct SearchQuery {
    pub search: String,
}

impl SearchQuery {
    /// Picks the first `search` parameter; repeats and unknown keys are ignored.
    pub fn from_params(params: Vec<(String, String)>) -> Self {
        let search = params
            .into_iter()
            .find(|(key, _)| key == "search")
            .map(|(_, value)| value)
            .unwrap_or_default();
        Self { search }
    }
}
