#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use tower::util::ServiceExt; // for `oneshot`

use axum_todo::config::{AuthConfig, Config, DatabaseConfig, DisplayConfig, ServerConfig, SessionConfig};
use axum_todo::services::db;
use axum_todo::{build_router, AppState};

pub const PASSWORD: &str = "Passw0rd!";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            max_body_bytes: 65536,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        },
        session: SessionConfig {
            secret: Some("test-secret-".repeat(6)),
            inactivity_minutes: 60,
            secure_cookie: false,
        },
        auth: AuthConfig { bcrypt_cost: 4 },
        display: DisplayConfig {
            utc_offset_minutes: 0,
        },
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }
}

/// One browser talking to the app: remembers the session cookie between
/// requests and picks the CSRF token out of rendered forms.
pub struct Browser {
    router: Router,
    cookie: Option<String>,
    pub state: AppState,
}

impl Browser {
    pub async fn new() -> Self {
        let pool = db::connect_in_memory().await.expect("in-memory database");
        let state = AppState::new(pool, test_config()).await.expect("app state");
        let router = build_router(state.clone()).expect("router");
        Self { router, cookie: None, state }
    }

    /// A second browser against the same server and database.
    pub fn another(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
            state: self.state.clone(),
        }
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
            let cleared = pair.split_once('=').map_or(true, |(_, value)| value.is_empty());
            self.cookie = (!cleared).then_some(pair);
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Loads `page` and returns the token embedded in its forms.
    pub async fn csrf_token(&mut self, page: &str) -> String {
        let response = self.get(page).await;
        extract_csrf(&response.body)
            .unwrap_or_else(|| panic!("no CSRF token on {}: {}", page, response.body))
    }

    /// Posts a form the way a browser would after loading `page`.
    pub async fn submit(&mut self, page: &str, action: &str, fields: &[(&str, &str)]) -> TestResponse {
        let token = self.csrf_token(page).await;
        let mut fields = fields.to_vec();
        fields.push(("csrf_token", token.as_str()));
        self.post(action, &fields).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> TestResponse {
        self.submit(
            "/register",
            "/register",
            &[
                ("username", username),
                ("password", password),
                ("confirm_password", password),
            ],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.submit("/login", "/login", &[("username", username), ("password", password)])
            .await
    }

    pub async fn sign_up_and_in(&mut self, username: &str) -> i64 {
        self.register(username, PASSWORD).await.assert_redirect("/login");
        self.login(username, PASSWORD).await.assert_redirect("/dashboard");
        self.state
            .users
            .find_by_username(username)
            .await
            .unwrap()
            .expect("registered user")
            .id
    }

    pub async fn add_task(&mut self, title: &str, description: &str) -> TestResponse {
        self.submit(
            "/dashboard",
            "/add_task",
            &[("title", title), ("description", description)],
        )
        .await
    }

    /// Ids of the user's tasks, newest first.
    pub async fn task_ids(&self, user_id: i64) -> Vec<i64> {
        self.state
            .tasks
            .list(user_id, None)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect()
    }
}

pub fn extract_csrf(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].to_string())
}
