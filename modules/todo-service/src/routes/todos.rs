use super::AppState;
use super::extract::{Json, Path, Query};
use crate::error::{ApiError, ApiResult};
use crate::validate;
use axum::extract::State;
use std::sync::Arc;
use todo_types::{Ack, CreateTodoRequest, Todo, TodoFilter, TodoQuery, UpdateTodoRequest};

fn not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Todo #{} not found", id))
}

fn check_category(state: &AppState, category_id: Option<i64>) -> ApiResult<()> {
    match category_id {
        Some(id) if !state.db.category_exists(id)? => Err(ApiError::validation(format!(
            "Category #{} does not exist",
            id
        ))),
        _ => Ok(()),
    }
}

// GET /api/todos?category_id=&completed=&search=
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TodoQuery>,
) -> ApiResult<Json<Vec<Todo>>> {
    let filter = TodoFilter {
        category_id: query.category_id,
        completed: validate::completed_flag(query.completed.as_deref())?,
        search: validate::optional_text(query.search),
    };
    Ok(Json(state.db.list_todos(&filter)?))
}

// GET /api/todos/:id
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Todo>> {
    state.db.get_todo(id)?.map(Json).ok_or_else(|| not_found(id))
}

// POST /api/todos
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let req = CreateTodoRequest {
        title: validate::required_text(&req.title, "title")?,
        notes: validate::optional_text(req.notes),
        category_id: req.category_id,
        due_date: validate::due_date(req.due_date)?,
        due_time: validate::due_time(req.due_time)?,
        reminder_at: validate::reminder_at(req.reminder_at)?,
    };
    check_category(&state, req.category_id)?;

    let todo = state.db.create_todo(&req)?;
    log::info!("Created todo #{} '{}'", todo.id, todo.title);
    Ok(Json(todo))
}

// PUT /api/todos/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let title = match req.title {
        Some(ref t) => Some(validate::required_text(t, "title")?),
        None => None,
    };
    let req = UpdateTodoRequest {
        title,
        notes: validate::optional_text(req.notes),
        category_id: req.category_id,
        due_date: validate::due_date(req.due_date)?,
        due_time: validate::due_time(req.due_time)?,
        reminder_at: validate::reminder_at(req.reminder_at)?,
        completed: req.completed,
    };
    check_category(&state, req.category_id)?;

    state.db.update_todo(id, &req)?.map(Json).ok_or_else(|| not_found(id))
}

// PATCH /api/todos/:id/toggle
pub async fn toggle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Todo>> {
    state.db.toggle_todo(id)?.map(Json).ok_or_else(|| not_found(id))
}

// DELETE /api/todos/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ack>> {
    if state.db.delete_todo(id)? {
        log::info!("Deleted todo #{}", id);
    }
    Ok(Json(Ack::ok()))
}
