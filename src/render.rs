//! HTML pages, one askama template per page under `templates/`. Every page
//! extends `layout.html`, so each struct carries the signed-in user (if any)
//! and the flash notices. Values are HTML-escaped by askama.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, FixedOffset, Utc};

use crate::errors::AppResult;
use crate::models::{CurrentUser, Task};
use crate::session::Flash;

pub fn format_time(time: &DateTime<Utc>, offset: &FixedOffset) -> String {
    time.with_timezone(offset).format("%Y-%m-%d %H:%M").to_string()
}

/// Renders a page into a 200 response.
pub fn page<T: Template>(template: &T) -> AppResult<Response> {
    Ok(Html(template.render()?).into_response())
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    pub user: Option<&'a CurrentUser>,
    pub flashes: &'a [Flash],
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage<'a> {
    pub user: Option<&'a CurrentUser>,
    pub flashes: &'a [Flash],
    pub csrf_token: &'a str,
    pub username: &'a str,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage<'a> {
    pub user: Option<&'a CurrentUser>,
    pub flashes: &'a [Flash],
    pub csrf_token: &'a str,
    pub username: &'a str,
}

pub struct DashboardView<'a> {
    pub user: &'a CurrentUser,
    pub tasks: &'a [Task],
    pub search_query: &'a str,
    pub flashes: &'a [Flash],
    pub csrf_token: &'a str,
    pub offset: &'a FixedOffset,
}

pub struct TaskRow<'a> {
    pub id: i64,
    pub title: &'a str,
    pub description: &'a str,
    pub status_class: &'static str,
    pub toggle_label: &'static str,
    pub created_at: String,
    pub updated_at: String,
}

impl<'a> TaskRow<'a> {
    fn new(task: &'a Task, offset: &FixedOffset) -> Self {
        let (status_class, toggle_label) = if task.completed {
            ("completed", "Mark incomplete")
        } else {
            ("pending", "Mark complete")
        };
        Self {
            id: task.id,
            title: &task.title,
            description: task.description.as_deref().unwrap_or(""),
            status_class,
            toggle_label,
            created_at: format_time(&task.created_at, offset),
            updated_at: format_time(&task.updated_at, offset),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage<'a> {
    pub user: Option<&'a CurrentUser>,
    pub flashes: &'a [Flash],
    pub csrf_token: &'a str,
    pub search_query: &'a str,
    pub rows: Vec<TaskRow<'a>>,
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
}

impl<'a> From<DashboardView<'a>> for DashboardPage<'a> {
    fn from(view: DashboardView<'a>) -> Self {
        let total = view.tasks.len();
        let completed = view.tasks.iter().filter(|t| t.completed).count();
        Self {
            user: Some(view.user),
            flashes: view.flashes,
            csrf_token: view.csrf_token,
            search_query: view.search_query,
            rows: view.tasks.iter().map(|t| TaskRow::new(t, view.offset)).collect(),
            total,
            completed,
            incomplete: total - completed,
        }
    }
}

/// `title` and `description` are what the form should show, which after a
/// rejected submission is the submitted text rather than the stored task.
pub struct EditView<'a> {
    pub user: &'a CurrentUser,
    pub task: &'a Task,
    pub title: &'a str,
    pub description: &'a str,
    pub flashes: &'a [Flash],
    pub csrf_token: &'a str,
    pub offset: &'a FixedOffset,
}

#[derive(Template)]
#[template(path = "edit_task.html")]
pub struct EditTaskPage<'a> {
    pub user: Option<&'a CurrentUser>,
    pub flashes: &'a [Flash],
    pub csrf_token: &'a str,
    pub id: i64,
    pub title: &'a str,
    pub description: &'a str,
    pub created_at: String,
    pub updated_at: String,
    pub status: &'static str,
}

impl<'a> From<EditView<'a>> for EditTaskPage<'a> {
    fn from(view: EditView<'a>) -> Self {
        Self {
            user: Some(view.user),
            flashes: view.flashes,
            csrf_token: view.csrf_token,
            id: view.task.id,
            title: view.title,
            description: view.description,
            created_at: format_time(&view.task.created_at, view.offset),
            updated_at: format_time(&view.task.updated_at, view.offset),
            status: if view.task.completed { "Completed" } else { "Pending" },
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub user: Option<&'a CurrentUser>,
    pub flashes: &'a [Flash],
    pub heading: &'a str,
    pub message: &'a str,
}

impl ErrorPage<'static> {
    fn new(heading: &'static str, message: &'static str) -> Self {
        Self { user: None, flashes: &[], heading, message }
    }

    pub fn not_found() -> Self {
        Self::new("Page not found", "The page you were looking for does not exist.")
    }

    pub fn bad_request() -> Self {
        Self::new(
            "Bad request",
            "The form has expired or was tampered with. Go back, reload the page and try again.",
        )
    }

    pub fn server_error() -> Self {
        Self::new(
            "Something went wrong",
            "An unexpected error occurred. Please try again in a moment.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(title: &str, completed: bool) -> Task {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 18, 45, 0).unwrap();
        Task {
            id: 7,
            title: title.to_string(),
            description: None,
            completed,
            created_at: at,
            updated_at: at,
            user_id: 1,
        }
    }

    #[test]
    fn times_use_display_offset() {
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 18, 45, 0).unwrap();
        assert_eq!(format_time(&at, &ist), "2024-03-02 00:15");
    }

    #[test]
    fn dashboard_counts_and_escapes() {
        let user = CurrentUser { id: 1, username: "alice_1".into() };
        let tasks = vec![task("<b>bold</b>", true), task("plain", false)];
        let offset = FixedOffset::east_opt(0).unwrap();
        let flashes = [Flash::success("Saved")];
        let html = DashboardPage::from(DashboardView {
            user: &user,
            tasks: &tasks,
            search_query: r#""><script>x</script>"#,
            flashes: &flashes,
            csrf_token: "tok",
            offset: &offset,
        })
        .render()
        .unwrap();

        assert!(html.contains(r#"id="total-tasks">2<"#));
        assert!(html.contains(r#"id="completed-tasks">1<"#));
        assert!(html.contains(r#"id="incomplete-tasks">1<"#));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains(r#"<div class="flash success">Saved</div>"#));
        assert!(html.contains("Hi, alice_1"));
        assert!(html.contains("Created 2024-03-01 18:45"));
    }

    #[test]
    fn empty_dashboard_explains_itself() {
        let user = CurrentUser { id: 1, username: "alice_1".into() };
        let offset = FixedOffset::east_opt(0).unwrap();
        let render = |search_query: &'static str| {
            DashboardPage::from(DashboardView {
                user: &user,
                tasks: &[],
                search_query,
                flashes: &[],
                csrf_token: "tok",
                offset: &offset,
            })
            .render()
            .unwrap()
        };

        assert!(render("").contains("No tasks yet."));
        assert!(render("milk").contains("No tasks match your search."));
    }

    #[test]
    fn edit_page_shows_submitted_text_escaped() {
        let user = CurrentUser { id: 1, username: "alice_1".into() };
        let stored = task("Stored", true);
        let offset = FixedOffset::east_opt(0).unwrap();
        let html = EditTaskPage::from(EditView {
            user: &user,
            task: &stored,
            title: "a & b",
            description: "</textarea><i>",
            flashes: &[],
            csrf_token: "tok",
            offset: &offset,
        })
        .render()
        .unwrap();

        assert!(html.contains(r#"action="/edit_task/7""#));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("</textarea><i>"));
        assert!(!html.contains("Stored"));
        assert!(html.contains("Completed"));
    }

    #[test]
    fn anonymous_pages_offer_login() {
        let html = ErrorPage::not_found().render().unwrap();
        assert!(html.contains("<title>Page not found - To-Do</title>"));
        assert!(html.contains(r#"href="/login""#));
        assert!(!html.contains("Log out"));
    }
}
