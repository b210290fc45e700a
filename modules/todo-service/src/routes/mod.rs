//! Axum route handlers for the todo/memo REST API.

mod categories;
mod export;
mod extract;
mod memos;
mod reminders;
mod todos;
mod upload;


use crate::dashboard;
use crate::db::Db;
use crate::reminder_queue::ReminderQueue;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tower_http::services::ServeDir;

pub use upload::MAX_UPLOAD_BYTES;

pub struct AppState {
    pub db: Arc<Db>,
    pub reminders: ReminderQueue,
    pub upload_dir: PathBuf,
    pub start_time: Instant,
}

/// Build the full application: JSON API under `/api`, uploaded files under
/// `/uploads`, the dashboard, and static assets from `public_dir` for
/// everything else.
pub fn router(state: Arc<AppState>, public_dir: &Path) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);

    let api = Router::new()
        // Categories
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/:id",
            put(categories::update).delete(categories::remove),
        )
        // Todos
        .route("/todos", get(todos::list).post(todos::create))
        .route(
            "/todos/:id",
            get(todos::get_one).put(todos::update).delete(todos::remove),
        )
        .route("/todos/:id/toggle", patch(todos::toggle))
        // Memos
        .route("/memos", get(memos::list).post(memos::create))
        .route("/memos/tags", get(memos::tags))
        .route(
            "/memos/:id",
            get(memos::get_one).put(memos::update).delete(memos::remove),
        )
        // Upload
        .route(
            "/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        // Reminders
        .route("/reminders/pending", get(reminders::pending))
        .route("/reminders/queue", get(reminders::queue))
        .route("/reminders/schedule", post(reminders::schedule))
        .route("/reminders/:id/sent", patch(reminders::mark_sent))
        // Service
        .route("/export", get(export::export_all))
        .route("/status", get(export::status));

    Router::new()
        .nest("/api", api)
        .route("/dashboard", get(dashboard::dashboard))
        .nest_service("/uploads", uploads)
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}
