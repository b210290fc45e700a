use super::AppState;
use super::extract::{Json, Path};
use crate::error::{ApiError, ApiResult};
use crate::validate;
use axum::extract::State;
use std::sync::Arc;
use todo_types::{Ack, ReminderEntry, ScheduleReminderRequest, Todo};

// GET /api/reminders/pending
pub async fn pending(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Todo>>> {
    let now = validate::reminder_now();
    Ok(Json(state.db.pending_reminders(&now)?))
}

// PATCH /api/reminders/:id/sent
pub async fn mark_sent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ack>> {
    if !state.db.mark_reminder_sent(id)? {
        return Err(ApiError::not_found(format!("Todo #{} not found", id)));
    }
    Ok(Json(Ack::ok()))
}

// POST /api/reminders/schedule
pub async fn schedule(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScheduleReminderRequest>,
) -> ApiResult<Json<Ack>> {
    let reminder_at = validate::reminder_at(req.reminder_at)?
        .ok_or_else(|| ApiError::validation("No reminder time"))?;
    let entry = state
        .reminders
        .schedule(
            &state.db,
            req.todo_id,
            req.title.trim().to_string(),
            validate::optional_text(req.notes),
            reminder_at,
            validate::optional_text(req.category_name),
        )
        .await?;
    Ok(Json(Ack::with_message(format!(
        "Reminder recorded for {}",
        entry.reminder_at
    ))))
}

// GET /api/reminders/queue
pub async fn queue(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ReminderEntry>>> {
    Ok(Json(state.db.list_reminder_queue()?))
}
