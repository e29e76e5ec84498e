use axum::{
    extract::{Form, Path, State},
    response::Response,
    Extension,
};
use tower_sessions::Session;

use crate::app::AppState;
use crate::errors::{AppError, AppResult, StoreError};
use crate::models::{ActionForm, CurrentUser, NewTask, Task, TaskForm};
use crate::render::{self, EditTaskPage, EditView};
use crate::session::{self, Flash};
use super::redirect_with;

// Ids that are not numbers cannot name a task.
fn parse_task_id(raw: &str) -> AppResult<i64> {
    raw.parse().map_err(|_| AppError::NotFound)
}

pub async fn add_task(
    State(state): State<AppState>,
    session: Session,
    Extension(user): Extension<CurrentUser>,
    Form(task_form): Form<TaskForm>,
) -> AppResult<Response> {
    session::verify_csrf(&session, &task_form.csrf_token).await?;

    let draft = match NewTask::new(&task_form.title, &task_form.description) {
        Ok(draft) => draft,
        Err(e) => return redirect_with(&session, Flash::error(e.message()), "/dashboard").await,
    };

    let flash = match state.tasks.create(user.id, &draft).await {
        Ok(_) => Flash::success("Task added successfully!"),
        Err(e) if e.is_transient() => {
            tracing::error!("Failed to add task for {}: {}", user.username, e);
            Flash::error("An error occurred while adding the task. Please try again.")
        }
        Err(e) => return Err(e.into()),
    };
    redirect_with(&session, flash, "/dashboard").await
}

async fn edit_form(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    task: &Task,
    submitted: Option<(&str, &str)>,
    error: Option<String>,
) -> AppResult<Response> {
    let mut flashes = session::take_flashes(session).await?;
    flashes.extend(error.map(Flash::error));
    let csrf_token = session::csrf_token(session).await?;
    let offset = state.config.display_offset();

    let (title, description) =
        submitted.unwrap_or((task.title.as_str(), task.description.as_deref().unwrap_or("")));

    render::page(&EditTaskPage::from(EditView {
        user,
        task,
        title,
        description,
        flashes: &flashes,
        csrf_token: &csrf_token,
        offset: &offset,
    }))
}

async fn refuse(session: &Session, user: &CurrentUser, task_id: i64, message: &str) -> AppResult<Response> {
    tracing::warn!("User {} refused access to task {}", user.username, task_id);
    redirect_with(session, Flash::error(message), "/dashboard").await
}

pub async fn serve_edit_task(
    State(state): State<AppState>,
    session: Session,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<String>,
) -> AppResult<Response> {
    let task_id = parse_task_id(&task_id)?;

    match state.tasks.get(task_id, user.id).await {
        Ok(task) => edit_form(&state, &session, &user, &task, None, None).await,
        Err(StoreError::NotOwned) => {
            refuse(&session, &user, task_id, "You can only edit your own tasks.").await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn handle_edit_task(
    State(state): State<AppState>,
    session: Session,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<String>,
    Form(task_form): Form<TaskForm>,
) -> AppResult<Response> {
    let task_id = parse_task_id(&task_id)?;
    session::verify_csrf(&session, &task_form.csrf_token).await?;

    let task = match state.tasks.get(task_id, user.id).await {
        Ok(task) => task,
        Err(StoreError::NotOwned) => {
            return refuse(&session, &user, task_id, "You can only edit your own tasks.").await
        }
        Err(e) => return Err(e.into()),
    };

    let submitted = Some((task_form.title.trim(), task_form.description.trim()));
    let draft = match NewTask::new(&task_form.title, &task_form.description) {
        Ok(draft) => draft,
        Err(e) => {
            return edit_form(&state, &session, &user, &task, submitted, Some(e.message().to_string())).await
        }
    };

    match state.tasks.update(task_id, user.id, &draft).await {
        Ok(_) => redirect_with(&session, Flash::success("Task updated successfully!"), "/dashboard").await,
        // Deleted between the read above and this write.
        Err(StoreError::NotOwned) => {
            refuse(&session, &user, task_id, "You can only edit your own tasks.").await
        }
        Err(e) if e.is_transient() => {
            tracing::error!("Failed to update task {}: {}", task_id, e);
            edit_form(
                &state,
                &session,
                &user,
                &task,
                submitted,
                Some("An error occurred while updating the task. Please try again.".into()),
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn toggle_task(
    State(state): State<AppState>,
    session: Session,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<String>,
    Form(action): Form<ActionForm>,
) -> AppResult<Response> {
    let task_id = parse_task_id(&task_id)?;
    session::verify_csrf(&session, &action.csrf_token).await?;

    let flash = match state.tasks.toggle(task_id, user.id).await {
        Ok(task) => {
            let status = if task.completed { "completed" } else { "marked as incomplete" };
            Flash::success(format!("Task \"{}\" {}!", task.title, status))
        }
        Err(StoreError::NotOwned) => {
            return refuse(&session, &user, task_id, "You can only modify your own tasks.").await
        }
        Err(e) if e.is_transient() => {
            tracing::error!("Failed to toggle task {}: {}", task_id, e);
            Flash::error("An error occurred while updating the task. Please try again.")
        }
        Err(e) => return Err(e.into()),
    };
    redirect_with(&session, flash, "/dashboard").await
}

pub async fn delete_task(
    State(state): State<AppState>,
    session: Session,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<String>,
    Form(action): Form<ActionForm>,
) -> AppResult<Response> {
    let task_id = parse_task_id(&task_id)?;
    session::verify_csrf(&session, &action.csrf_token).await?;

    let flash = match state.tasks.delete(task_id, user.id).await {
        Ok(task) => Flash::success(format!("Task \"{}\" deleted successfully!", task.title)),
        Err(StoreError::NotOwned) => {
            return refuse(&session, &user, task_id, "You can only delete your own tasks.").await
        }
        Err(e) if e.is_transient() => {
            tracing::error!("Failed to delete task {}: {}", task_id, e);
            Flash::error("An error occurred while deleting the task. Please try again.")
        }
        Err(e) => return Err(e.into()),
    };
    redirect_with(&session, flash, "/dashboard").await
}
